use std::fmt;

/// Stable identifier of a media asset, unique within one media source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct MediaId(pub i64);

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Anything that is not `video/*` is shown as an image.
    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("video/") {
            Self::Video
        } else {
            Self::Image
        }
    }
}

/// One media asset as reported by the media source.
///
/// Records are immutable; a change in the library produces a new list of
/// records rather than mutating existing ones.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRecord {
    pub id: MediaId,
    /// Opaque handle resolvable by the media source (content URI, path, ...).
    pub location: String,
    pub display_name: String,
    pub date_added_ms: i64,
    /// Capture time; 0 when the source does not know it.
    pub date_taken_ms: i64,
    pub mime_type: String,
    pub kind: MediaKind,
    /// Video duration, 0 for images.
    pub duration_ms: i64,
    pub width: u32,
    pub height: u32,
    pub album_id: i64,
    pub album_name: String,
}

impl MediaRecord {
    /// Create an image record with just the fields the timeline needs.
    pub fn new(id: i64, location: impl Into<String>, date_added_ms: i64) -> Self {
        Self {
            id: MediaId(id),
            location: location.into(),
            display_name: String::new(),
            date_added_ms,
            date_taken_ms: 0,
            mime_type: "image/*".to_string(),
            kind: MediaKind::Image,
            duration_ms: 0,
            width: 0,
            height: 0,
            album_id: 0,
            album_name: String::new(),
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime_type = mime.into();
        self.kind = MediaKind::from_mime(&self.mime_type);
        self
    }

    pub fn with_taken(mut self, date_taken_ms: i64) -> Self {
        self.date_taken_ms = date_taken_ms;
        self
    }

    pub fn with_album(mut self, album_id: i64, album_name: impl Into<String>) -> Self {
        self.album_id = album_id;
        self.album_name = album_name.into();
        self
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_duration(mut self, duration_ms: i64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Capture time when known, otherwise the time the asset was added.
    pub fn effective_timestamp_ms(&self) -> i64 {
        if self.date_taken_ms > 0 {
            self.date_taken_ms
        } else {
            self.date_added_ms
        }
    }

    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Grid badge text for videos, e.g. `"3:07"`.
    pub fn duration_label(&self) -> String {
        let total_seconds = self.duration_ms.max(0) / 1000;
        format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
    }
}
