use tracing::debug;

use crate::geometry::Vec2;
use crate::models::MediaId;
use crate::state::{ListenerId, StateHolder};

/// Whether the full-screen viewer is showing, and where it opened from.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewerPresentation {
    pub is_open: bool,
    pub start_media_id: Option<MediaId>,
    /// Center of the tapped grid cell; the open/close transition anchors here.
    pub origin: Vec2,
}

/// Shared open/close state of the viewer.
///
/// Closing keeps the last media id and origin so the exit transition can
/// land on the cell it came from.
#[derive(Default)]
pub struct ViewCoordinator {
    state: StateHolder<ViewerPresentation>,
}

impl ViewCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ViewerPresentation {
        self.state.get()
    }

    pub fn is_open(&self) -> bool {
        self.state.get().is_open
    }

    pub fn open_viewer(&self, media_id: MediaId, origin: Vec2) {
        debug!(media = %media_id, x = origin.x, y = origin.y, "Opening viewer");
        self.state.set(ViewerPresentation {
            is_open: true,
            start_media_id: Some(media_id),
            origin,
        });
    }

    pub fn close_viewer(&self) {
        debug!("Closing viewer");
        self.state.update(|p| p.is_open = false);
    }

    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&ViewerPresentation) + Send + Sync + 'static,
    {
        self.state.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.state.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_open_then_close_keeps_origin() {
        let coordinator = ViewCoordinator::new();
        assert!(!coordinator.is_open());

        coordinator.open_viewer(MediaId(42), Vec2::new(120.0, 340.0));
        let open = coordinator.snapshot();
        assert!(open.is_open);
        assert_eq!(open.start_media_id, Some(MediaId(42)));

        coordinator.close_viewer();
        let closed = coordinator.snapshot();
        assert!(!closed.is_open);
        assert_eq!(closed.start_media_id, Some(MediaId(42)));
        assert_eq!(closed.origin, Vec2::new(120.0, 340.0));
    }

    #[test]
    fn test_listeners_see_transitions() {
        let coordinator = ViewCoordinator::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let id = coordinator.subscribe(move |p| seen_clone.lock().push(p.is_open));

        coordinator.open_viewer(MediaId(1), Vec2::ZERO);
        coordinator.close_viewer();
        // Already closed: no change, no notification.
        coordinator.close_viewer();
        assert_eq!(*seen.lock(), vec![true, false]);

        assert!(coordinator.unsubscribe(id));
        coordinator.open_viewer(MediaId(2), Vec2::ZERO);
        assert_eq!(seen.lock().len(), 2);
    }
}
