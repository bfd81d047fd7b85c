//! Time-sampled tweens for zoom and dismiss transitions.
//!
//! Animations are plain values sampled with the frame clock; superseding one
//! means sampling it one last time and dropping it.

use std::time::{Duration, Instant};

use crate::geometry::Vec2;
use crate::gesture::ZoomState;

pub const ZOOM_ANIMATION: Duration = Duration::from_millis(300);
pub const DISMISS_SNAP_BACK: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    EaseOutCubic,
    EaseInOutCubic,
}

impl Easing {
    /// Maps linear progress in [0, 1] to eased progress.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    from: f32,
    to: f32,
    start: Instant,
    duration: Duration,
    easing: Easing,
}

impl Animation {
    pub fn new(from: f32, to: f32, start: Instant, duration: Duration, easing: Easing) -> Self {
        Self {
            from,
            to,
            start,
            duration,
            easing,
        }
    }

    pub fn target(&self) -> f32 {
        self.to
    }

    fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.start);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    pub fn value_at(&self, now: Instant) -> f32 {
        let p = self.progress(now);
        if p >= 1.0 {
            return self.to;
        }
        self.from + (self.to - self.from) * self.easing.apply(p)
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }
}

/// Scale and both offset axes animated together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomAnimation {
    scale: Animation,
    offset_x: Animation,
    offset_y: Animation,
}

impl ZoomAnimation {
    pub fn new(from: ZoomState, to: ZoomState, start: Instant) -> Self {
        let tween = |a: f32, b: f32| Animation::new(a, b, start, ZOOM_ANIMATION, Easing::EaseInOutCubic);
        Self {
            scale: tween(from.scale, to.scale),
            offset_x: tween(from.offset.x, to.offset.x),
            offset_y: tween(from.offset.y, to.offset.y),
        }
    }

    pub fn state_at(&self, now: Instant) -> ZoomState {
        ZoomState::new(
            self.scale.value_at(now),
            Vec2::new(self.offset_x.value_at(now), self.offset_y.value_at(now)),
        )
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.scale.is_finished(now)
    }
}
