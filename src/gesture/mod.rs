//! Pointer gesture disambiguation for touch surfaces.
//!
//! A [`GestureResolver`] consumes raw [`PointerSample`]s and emits high-level
//! [`GestureAction`]s: tap, double-tap zoom, pinch/pan zoom changes and the
//! vertical swipe-to-dismiss drag.

pub mod pointer;
pub mod resolver;
pub mod timer;
pub mod transform;
pub mod zoom;

use std::time::Duration;

pub use pointer::*;
pub use resolver::*;
pub use timer::*;
pub use transform::*;
pub use zoom::*;

/// Interaction tuning, all distances in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureConfig {
    /// Displacement before a drag direction is committed.
    pub touch_slop: f32,
    /// Vertical displacement needed to commit a dismiss.
    pub dismiss_threshold: f32,
    pub double_tap_window: Duration,
    pub min_scale: f32,
    pub max_scale: f32,
    pub double_tap_scale: f32,
    /// Scale above which content counts as zoomed in.
    pub zoomed_threshold: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            touch_slop: 18.0,
            dismiss_threshold: 412.5,
            double_tap_window: Duration::from_millis(300),
            min_scale: 1.0,
            max_scale: 5.0,
            double_tap_scale: 2.5,
            zoomed_threshold: 1.01,
        }
    }
}

impl GestureConfig {
    pub fn zoom_limits(&self) -> ZoomLimits {
        ZoomLimits {
            min_scale: self.min_scale,
            max_scale: self.max_scale,
        }
    }
}

/// How a vertical drag ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissOutcome {
    /// Past the threshold: close the viewer.
    Commit,
    /// Short of the threshold: animate back to rest.
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureAction {
    Tap,
    DoubleTapZoom { target_scale: f32 },
    ZoomChange { scale: f32, offset_x: f32, offset_y: f32 },
    /// Cumulative vertical displacement of the running drag.
    VerticalDrag { delta_y: f32 },
    VerticalDragEnd { delta_y: f32, outcome: DismissOutcome },
}

impl GestureAction {
    pub(crate) fn zoom_change(zoom: &ZoomState) -> Self {
        Self::ZoomChange {
            scale: zoom.scale,
            offset_x: zoom.offset.x,
            offset_y: zoom.offset.y,
        }
    }
}

/// Callback set a UI shell implements per touch surface.
pub trait GestureListener {
    fn on_tap(&mut self) {}
    fn on_double_tap_zoom(&mut self, _target_scale: f32) {}
    fn on_zoom_change(&mut self, _scale: f32, _offset_x: f32, _offset_y: f32) {}
    fn on_vertical_drag(&mut self, _delta_y: f32) {}
    fn on_vertical_drag_end(&mut self, _delta_y: f32, _outcome: DismissOutcome) {}
}

/// Forwards actions to the listener callbacks, in order.
pub fn dispatch<L, I>(actions: I, listener: &mut L)
where
    L: GestureListener + ?Sized,
    I: IntoIterator<Item = GestureAction>,
{
    for action in actions {
        match action {
            GestureAction::Tap => listener.on_tap(),
            GestureAction::DoubleTapZoom { target_scale } => listener.on_double_tap_zoom(target_scale),
            GestureAction::ZoomChange {
                scale,
                offset_x,
                offset_y,
            } => listener.on_zoom_change(scale, offset_x, offset_y),
            GestureAction::VerticalDrag { delta_y } => listener.on_vertical_drag(delta_y),
            GestureAction::VerticalDragEnd { delta_y, outcome } => {
                listener.on_vertical_drag_end(delta_y, outcome)
            }
        }
    }
}
