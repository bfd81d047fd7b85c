use std::time::Instant;

use tracing::debug;

use super::ZoomAnimation;
use crate::geometry::{Rect, Size, Vec2};
use crate::gesture::{
    Capabilities, GestureAction, GestureConfig, GestureResolver, PointerSample, ZoomState,
};
use crate::models::MediaId;

/// Stable identity of a touch surface (one per grid cell or viewer page).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub i64);

impl From<MediaId> for SurfaceId {
    fn from(id: MediaId) -> Self {
        SurfaceId(id.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    GridItem,
    Image,
    Video,
}

impl SurfaceKind {
    pub fn capabilities(self) -> Capabilities {
        match self {
            SurfaceKind::GridItem => Capabilities::TAP_ONLY,
            SurfaceKind::Image => Capabilities::ZOOMABLE,
            SurfaceKind::Video => Capabilities::VIDEO,
        }
    }
}

/// Gesture resolver plus the zoom animation of one on-screen surface.
///
/// Created when the surface attaches and disposed when it detaches; a
/// disposed surface ignores input and never fires callbacks.
pub struct TouchSurface {
    id: SurfaceId,
    kind: SurfaceKind,
    resolver: GestureResolver,
    zoom_animation: Option<ZoomAnimation>,
    disposed: bool,
}

impl TouchSurface {
    pub fn new(id: SurfaceId, kind: SurfaceKind, config: GestureConfig, extent: Size) -> Self {
        Self {
            id,
            kind,
            resolver: GestureResolver::new(config, kind.capabilities(), extent),
            zoom_animation: None,
            disposed: false,
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    pub fn zoom(&self) -> ZoomState {
        self.resolver.zoom()
    }

    pub fn is_zoomed(&self) -> bool {
        self.resolver.is_zoomed()
    }

    pub fn is_animating(&self) -> bool {
        self.zoom_animation.is_some()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn resolver(&self) -> &GestureResolver {
        &self.resolver
    }

    pub fn set_extent(&mut self, extent: Size) {
        self.resolver.set_extent(extent);
    }

    pub fn handle_sample(&mut self, sample: &PointerSample) -> Vec<GestureAction> {
        if self.disposed {
            return Vec::new();
        }

        if !self.resolver.in_session() && sample.pressed_count() > 0 {
            // A new gesture supersedes a running zoom animation where it stands.
            if let Some(animation) = self.zoom_animation.take() {
                self.resolver.set_zoom(animation.state_at(sample.time));
            }
        }

        let actions = self.resolver.on_sample(sample);
        for action in &actions {
            if let GestureAction::DoubleTapZoom { target_scale } = *action {
                self.start_zoom_animation(target_scale, sample.time);
            }
        }
        actions
    }

    fn start_zoom_animation(&mut self, target_scale: f32, now: Instant) {
        let from = self.resolver.zoom();
        let to = if target_scale <= self.resolver.config().min_scale {
            ZoomState::IDENTITY
        } else {
            ZoomState::new(target_scale, from.offset)
        };
        debug!(surface = self.id.0, from = from.scale, to = to.scale, "Zoom animation");
        self.zoom_animation = Some(ZoomAnimation::new(from, to, now));
    }

    /// Advances the zoom animation and releases due deferred taps.
    pub fn poll(&mut self, now: Instant) -> Vec<GestureAction> {
        let mut actions = Vec::new();
        if self.disposed {
            return actions;
        }

        if let Some(animation) = self.zoom_animation {
            let state = animation.state_at(now);
            if state != self.resolver.zoom() {
                self.resolver.set_zoom(state);
                actions.push(GestureAction::ZoomChange {
                    scale: state.scale,
                    offset_x: state.offset.x,
                    offset_y: state.offset.y,
                });
            }
            if animation.is_finished(now) {
                self.zoom_animation = None;
            }
        }

        while let Some(tap) = self.resolver.poll(now) {
            actions.push(tap);
        }
        actions
    }

    /// Cancels deferred taps and the running session, keeping zoom.
    pub fn cancel_pending(&mut self) {
        self.resolver.cancel();
    }

    /// Back to scale 1.0 and offset (0, 0) with nothing in flight.
    pub fn reset(&mut self) {
        self.zoom_animation = None;
        self.resolver.cancel();
        self.resolver.reset_zoom();
    }

    pub fn dispose(&mut self) {
        self.reset();
        self.disposed = true;
    }

    /// Center of the surface's on-screen rect, used as the viewer's opening anchor.
    pub fn anchor(bounds: Rect) -> Vec2 {
        bounds.center()
    }
}
