use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone};

use super::MediaRecord;

pub const TODAY_LABEL: &str = "Today";
pub const YESTERDAY_LABEL: &str = "Yesterday";
const UNKNOWN_DATE_LABEL: &str = "Unknown date";

/// A labeled run of media sharing one calendar day, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct DateSection {
    pub label: String,
    pub items: Vec<MediaRecord>,
}

impl DateSection {
    pub fn new(label: impl Into<String>, items: Vec<MediaRecord>) -> Self {
        Self {
            label: label.into(),
            items,
        }
    }

    /// Header row plus one slot per item.
    pub fn slot_count(&self) -> usize {
        1 + self.items.len()
    }
}

/// Calendar day of a millisecond timestamp in the timezone of `tz`.
pub(crate) fn local_date<Tz: TimeZone>(tz: &Tz, timestamp_ms: i64) -> Option<NaiveDate> {
    tz.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.date_naive())
}

/// Label for the calendar day of `timestamp_ms`, relative to `now`.
pub fn day_label<Tz: TimeZone>(timestamp_ms: i64, now: &DateTime<Tz>) -> String {
    let today = now.date_naive();
    let Some(day) = local_date(&now.timezone(), timestamp_ms) else {
        return UNKNOWN_DATE_LABEL.to_string();
    };

    if day == today {
        TODAY_LABEL.to_string()
    } else if Some(day) == today.pred_opt() {
        YESTERDAY_LABEL.to_string()
    } else if day.year() == today.year() {
        day.format("%B %-d").to_string()
    } else {
        day.format("%B %-d, %Y").to_string()
    }
}

/// Groups a descending-sorted record list into date sections.
///
/// Sections appear in first-occurrence order; records sharing a label are
/// gathered into the same section even if the input interleaves them.
pub fn group_by_date<Tz: TimeZone>(records: &[MediaRecord], now: &DateTime<Tz>) -> Vec<DateSection> {
    let mut sections: Vec<DateSection> = Vec::new();
    let mut by_label: HashMap<String, usize> = HashMap::new();

    for record in records {
        let label = day_label(record.effective_timestamp_ms(), now);
        match by_label.get(&label) {
            Some(&idx) => sections[idx].items.push(record.clone()),
            None => {
                by_label.insert(label.clone(), sections.len());
                sections.push(DateSection::new(label, vec![record.clone()]));
            }
        }
    }

    sections
}
