use std::cmp::Reverse;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Local, TimeZone};
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio::task;
use tracing::{debug, info, warn};
use xxhash_rust::xxh3::xxh3_64;

use super::{LibraryError, MediaSource};
use crate::models::{group_by_album, group_by_date, Album, DateSection, MediaId, MediaRecord};
use crate::timeline::TimelineIndex;

/// Everything derived from one media query, never mutated after publication.
#[derive(Debug, Clone, Default)]
pub struct LibrarySnapshot {
    /// Newest first by effective timestamp.
    pub records: Vec<MediaRecord>,
    pub sections: Vec<DateSection>,
    pub albums: Vec<Album>,
    pub timeline: TimelineIndex,
    pub fingerprint: u64,
}

impl LibrarySnapshot {
    fn build<Tz: TimeZone>(mut records: Vec<MediaRecord>, now: &DateTime<Tz>) -> Self {
        sort_newest_first(&mut records);
        let fingerprint = fingerprint(&records, now);
        let sections = group_by_date(&records, now);
        let albums = group_by_album(&records);
        let timeline = TimelineIndex::build(&sections);
        Self {
            records,
            sections,
            albums,
            timeline,
            fingerprint,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find(&self, id: MediaId) -> Option<&MediaRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Records of one album, newest first.
    pub fn media_for_album(&self, album_id: i64) -> Vec<MediaRecord> {
        self.records
            .iter()
            .filter(|r| r.album_id == album_id)
            .cloned()
            .collect()
    }
}

fn sort_newest_first(records: &mut [MediaRecord]) {
    records.sort_by_key(|r| (Reverse(r.effective_timestamp_ms()), Reverse(r.id)));
}

/// Hash of (id, effective timestamp) in order, plus the current day so that
/// "Today"/"Yesterday" labels roll over at midnight.
fn fingerprint<Tz: TimeZone>(sorted: &[MediaRecord], now: &DateTime<Tz>) -> u64 {
    let mut input = Vec::with_capacity(sorted.len() * 16 + 4);
    input.extend_from_slice(&now.date_naive().num_days_from_ce().to_le_bytes());
    for record in sorted {
        input.extend_from_slice(&record.id.0.to_le_bytes());
        input.extend_from_slice(&record.effective_timestamp_ms().to_le_bytes());
    }
    xxh3_64(&input)
}

/// Current media snapshot plus change subscribers.
pub struct MediaLibrary {
    snapshot: RwLock<Arc<LibrarySnapshot>>,
    subscribers: Mutex<Vec<flume::Sender<Arc<LibrarySnapshot>>>>,
}

impl Default for MediaLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaLibrary {
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(LibrarySnapshot::default())),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn snapshot(&self) -> Arc<LibrarySnapshot> {
        Arc::clone(&self.snapshot.read())
    }

    pub fn find(&self, id: MediaId) -> Option<MediaRecord> {
        self.snapshot.read().find(id).cloned()
    }

    pub fn media_for_album(&self, album_id: i64) -> Vec<MediaRecord> {
        self.snapshot.read().media_for_album(album_id)
    }

    /// Receives every snapshot published after this call.
    pub fn subscribe(&self) -> flume::Receiver<Arc<LibrarySnapshot>> {
        let (tx, rx) = flume::unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Rebuilds from a fresh query result. Returns `false` when nothing
    /// visible changed and the current snapshot was kept.
    pub fn apply<Tz: TimeZone>(&self, records: Vec<MediaRecord>, now: &DateTime<Tz>) -> bool {
        let next = LibrarySnapshot::build(records, now);
        if next.fingerprint == self.snapshot.read().fingerprint {
            debug!(count = next.records.len(), "Media unchanged, keeping snapshot");
            return false;
        }

        info!(
            count = next.records.len(),
            sections = next.sections.len(),
            albums = next.albums.len(),
            "Media library rebuilt"
        );
        let next = Arc::new(next);
        *self.snapshot.write() = Arc::clone(&next);
        self.publish(&next);
        true
    }

    fn publish(&self, snapshot: &Arc<LibrarySnapshot>) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| tx.send(Arc::clone(snapshot)).is_ok());
    }

    /// Queries `source` on the calling thread and applies the result.
    pub fn refresh<Tz: TimeZone>(
        &self,
        source: &dyn MediaSource,
        now: &DateTime<Tz>,
    ) -> Result<bool, LibraryError> {
        let records = source.query_all()?;
        Ok(self.apply(records, now))
    }

    /// Queries on a blocking worker and applies the result.
    pub async fn refresh_async(&self, source: &Arc<dyn MediaSource>) -> Result<bool, LibraryError> {
        let source = Arc::clone(source);
        let records = task::spawn_blocking(move || source.query_all()).await??;
        Ok(self.apply(records, &Local::now()))
    }

    /// Keeps the library in sync with `source`.
    ///
    /// Queries once up front, then once per change notification. A failed
    /// query keeps the last good snapshot. Returns when the notification
    /// channel closes.
    pub async fn watch(self: Arc<Self>, source: Arc<dyn MediaSource>, mut changes: mpsc::Receiver<()>) {
        self.refresh_logged(&source).await;
        while changes.recv().await.is_some() {
            self.refresh_logged(&source).await;
        }
        debug!("Media change channel closed, watcher stopping");
    }

    async fn refresh_logged(&self, source: &Arc<dyn MediaSource>) {
        if let Err(e) = self.refresh_async(source).await {
            warn!(error = %e, "Media refresh failed, keeping previous snapshot");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use chrono::Utc;
    use std::collections::VecDeque;

    const HOUR_MS: i64 = 3_600_000;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 18, 0, 0).unwrap()
    }

    fn sample() -> Vec<MediaRecord> {
        let base = now().timestamp_millis();
        vec![
            MediaRecord::new(1, "a", base - 30 * HOUR_MS).with_album(10, "Camera"),
            MediaRecord::new(2, "b", base - HOUR_MS).with_album(10, "Camera"),
            MediaRecord::new(3, "c", base - 2 * HOUR_MS).with_album(20, "Screenshots"),
            MediaRecord::new(4, "d", base - 26 * HOUR_MS)
                .with_taken(base - 3 * HOUR_MS)
                .with_album(10, "Camera"),
        ]
    }

    /// Replays queued responses; the last one repeats.
    struct ScriptedSource {
        responses: parking_lot::Mutex<VecDeque<anyhow::Result<Vec<MediaRecord>>>>,
    }

    impl ScriptedSource {
        fn new(responses: Vec<anyhow::Result<Vec<MediaRecord>>>) -> Self {
            Self {
                responses: parking_lot::Mutex::new(responses.into()),
            }
        }
    }

    impl MediaSource for ScriptedSource {
        fn query_all(&self) -> anyhow::Result<Vec<MediaRecord>> {
            let mut responses = self.responses.lock();
            if responses.len() > 1 {
                return responses.pop_front().unwrap_or_else(|| Ok(Vec::new()));
            }
            match responses.front() {
                Some(Ok(records)) => Ok(records.clone()),
                Some(Err(e)) => Err(anyhow!("{e}")),
                None => Ok(Vec::new()),
            }
        }
    }

    #[test]
    fn test_apply_builds_sorted_snapshot() {
        let library = MediaLibrary::new();
        assert!(library.apply(sample(), &now()));

        let snap = library.snapshot();
        let ids: Vec<i64> = snap.records.iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![2, 3, 4, 1]);
        let labels: Vec<&str> = snap.sections.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Today", "Yesterday"]);
        assert_eq!(snap.timeline.total_slots(), 6);
        assert_eq!(snap.albums[0].name, "Camera");
        assert_eq!(snap.albums[0].count, 3);
        assert_eq!(snap.albums[0].cover, "b");
    }

    #[test]
    fn test_unchanged_input_keeps_snapshot() {
        let library = MediaLibrary::new();
        library.apply(sample(), &now());
        let first = library.snapshot();

        let mut shuffled = sample();
        shuffled.reverse();
        assert!(!library.apply(shuffled, &now()));
        assert!(Arc::ptr_eq(&first, &library.snapshot()));

        let tomorrow = now() + chrono::Duration::days(1);
        assert!(library.apply(sample(), &tomorrow));
    }

    #[test]
    fn test_lookup_helpers() {
        let library = MediaLibrary::new();
        library.apply(sample(), &now());
        assert_eq!(library.find(MediaId(3)).map(|r| r.location), Some("c".to_string()));
        assert!(library.find(MediaId(99)).is_none());
        let camera: Vec<i64> = library.media_for_album(10).iter().map(|r| r.id.0).collect();
        assert_eq!(camera, vec![2, 4, 1]);
    }

    #[test]
    fn test_subscribers_receive_and_are_pruned() {
        let library = MediaLibrary::new();
        let rx = library.subscribe();
        let dropped = library.subscribe();
        drop(dropped);

        library.apply(sample(), &now());
        assert_eq!(library.subscribers.lock().len(), 1);
        let published = rx.try_recv().unwrap();
        assert_eq!(published.records.len(), 4);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_refresh_error_keeps_snapshot() {
        let library = MediaLibrary::new();
        library.apply(sample(), &now());
        let failing = || -> anyhow::Result<Vec<MediaRecord>> { Err(anyhow!("index unavailable")) };
        let err = library.refresh(&failing, &now()).unwrap_err();
        assert!(matches!(err, LibraryError::Query(_)));
        assert_eq!(library.snapshot().records.len(), 4);
    }

    #[tokio::test]
    async fn test_watch_requeries_per_notification() {
        let mut newer = sample();
        newer.push(MediaRecord::new(5, "e", now().timestamp_millis()));
        let source: Arc<dyn MediaSource> = Arc::new(ScriptedSource::new(vec![
            Ok(sample()),
            Err(anyhow!("transient")),
            Ok(newer),
        ]));

        let library = Arc::new(MediaLibrary::new());
        let rx = library.subscribe();
        let (tx, changes) = mpsc::channel(4);
        tx.send(()).await.unwrap();
        tx.send(()).await.unwrap();
        drop(tx);

        Arc::clone(&library).watch(source, changes).await;

        assert_eq!(library.snapshot().records.len(), 5);
        assert_eq!(rx.drain().count(), 2);
    }

    #[tokio::test]
    async fn test_refresh_async_applies() {
        let library = MediaLibrary::new();
        let source: Arc<dyn MediaSource> = Arc::new(ScriptedSource::new(vec![Ok(sample())]));
        assert!(library.refresh_async(&source).await.unwrap());
        assert!(!library.refresh_async(&source).await.unwrap());
    }
}
