use thiserror::Error;

use crate::models::MediaRecord;

/// Read access to the device media index.
///
/// Implementations may block (database or IPC queries); the library calls
/// them from a blocking worker when driven asynchronously.
pub trait MediaSource: Send + Sync {
    /// Every visible image and video. Order is not significant.
    fn query_all(&self) -> anyhow::Result<Vec<MediaRecord>>;
}

impl<F> MediaSource for F
where
    F: Fn() -> anyhow::Result<Vec<MediaRecord>> + Send + Sync,
{
    fn query_all(&self) -> anyhow::Result<Vec<MediaRecord>> {
        self()
    }
}

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("media query failed: {0:#}")]
    Query(#[from] anyhow::Error),
    #[error("media query worker died: {0}")]
    Worker(#[from] tokio::task::JoinError),
}
