//! Slot index for the fast-scroll scrubber.
//!
//! The scrubbed grid is a flattened sequence of header rows and media items,
//! so a "slot" counts both. Scroll fractions map onto slots and every slot
//! resolves to the label of the section it belongs to.

use chrono::TimeZone;

use crate::models::date_section::local_date;
use crate::models::DateSection;

/// Which text the scrubber bubble shows for a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimelineLabels {
    /// The section's own label ("Today", "March 4", ...).
    #[default]
    Section,
    /// Month and year of the section's newest item ("March 2024").
    MonthYear,
}

/// Slot index of one section header and its label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionStart {
    pub slot: usize,
    pub label: String,
}

/// Derived from the section list; rebuilt wholesale whenever it changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimelineIndex {
    total_slots: usize,
    section_starts: Vec<SectionStart>,
}

impl TimelineIndex {
    /// Builds the index in O(sections + items). An empty list yields an empty
    /// index, which hides the scrubber.
    pub fn build(sections: &[DateSection]) -> Self {
        let mut section_starts = Vec::with_capacity(sections.len());
        let mut slot = 0usize;
        for section in sections {
            section_starts.push(SectionStart {
                slot,
                label: section.label.clone(),
            });
            slot += section.slot_count();
        }

        Self {
            total_slots: slot,
            section_starts,
        }
    }

    /// Builds the index with month/year labels taken from each section's first
    /// item, formatted in `tz`.
    pub fn build_with_labels<Tz: TimeZone>(
        sections: &[DateSection],
        labels: TimelineLabels,
        tz: &Tz,
    ) -> Self {
        let mut index = Self::build(sections);
        if labels == TimelineLabels::MonthYear {
            for (start, section) in index.section_starts.iter_mut().zip(sections) {
                let first = section.items.first().map(|r| r.effective_timestamp_ms());
                start.label = first
                    .and_then(|ts| local_date(tz, ts))
                    .map(|d| d.format("%B %Y").to_string())
                    .unwrap_or_default();
            }
        }
        index
    }

    pub fn total_slots(&self) -> usize {
        self.total_slots
    }

    pub fn section_starts(&self) -> &[SectionStart] {
        &self.section_starts
    }

    pub fn is_empty(&self) -> bool {
        self.total_slots == 0
    }

    fn last_slot(&self) -> usize {
        self.total_slots.saturating_sub(1)
    }

    /// Maps a scrubber fraction in [0, 1] to the nearest slot.
    pub fn fraction_to_slot(&self, fraction: f32) -> usize {
        if self.total_slots <= 1 || !fraction.is_finite() {
            return 0;
        }
        let last = self.last_slot();
        let slot = (fraction.clamp(0.0, 1.0) as f64 * last as f64).round();
        (slot.max(0.0) as usize).min(last)
    }

    /// Thumb position for the first visible slot.
    pub fn slot_to_fraction(&self, slot: usize) -> f32 {
        if self.total_slots <= 1 {
            return 0.0;
        }
        let last = self.last_slot();
        (slot.min(last) as f64 / last as f64) as f32
    }

    /// Ordinal of the section containing `slot`, `None` for an empty index.
    pub fn section_for_slot(&self, slot: usize) -> Option<usize> {
        let after = self.section_starts.partition_point(|s| s.slot <= slot);
        after.checked_sub(1)
    }

    /// Label of the section active at `slot`; empty for an empty index.
    pub fn label_for_slot(&self, slot: usize) -> &str {
        self.section_for_slot(slot)
            .map(|i| self.section_starts[i].label.as_str())
            .unwrap_or("")
    }
}
