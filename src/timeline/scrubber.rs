use std::time::{Duration, Instant};

use tracing::trace;

use super::TimelineIndex;
use crate::config::ScrollerPosition;

/// Thumb height in dp.
pub const THUMB_HEIGHT_DP: f32 = 48.0;

/// Default delay before an idle scrubber fades out.
pub const DEFAULT_HIDE_DELAY: Duration = Duration::from_millis(1500);

/// Track and thumb extents in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrubberGeometry {
    pub track_height: f32,
    pub thumb_height: f32,
}

impl ScrubberGeometry {
    pub fn new(track_height: f32, thumb_height: f32) -> Self {
        Self {
            track_height,
            thumb_height,
        }
    }

    /// Track length the thumb's top edge can travel.
    pub fn usable_height(&self) -> f32 {
        (self.track_height - self.thumb_height).max(0.0)
    }

    /// Thumb top offset for a scroll fraction.
    pub fn thumb_offset(&self, fraction: f32) -> f32 {
        let usable = self.usable_height();
        (fraction * usable).clamp(0.0, usable)
    }

    /// Fraction for a touch at `touch_y`, centering the thumb under the finger.
    pub fn fraction_at(&self, touch_y: f32) -> f32 {
        let usable = self.usable_height();
        if usable <= 0.0 || !touch_y.is_finite() {
            return 0.0;
        }
        ((touch_y - self.thumb_height / 2.0) / usable).clamp(0.0, 1.0)
    }
}

/// Drag and visibility state of the fast-scroll scrubber.
#[derive(Debug, Clone)]
pub struct Scrubber {
    position: ScrollerPosition,
    geometry: ScrubberGeometry,
    hide_delay: Duration,
    scrolling: bool,
    dragging: bool,
    visible: bool,
    hide_at: Option<Instant>,
}

impl Scrubber {
    pub fn new(position: ScrollerPosition, geometry: ScrubberGeometry, hide_delay: Duration) -> Self {
        Self {
            position,
            geometry,
            hide_delay,
            scrolling: false,
            dragging: false,
            visible: false,
            hide_at: None,
        }
    }

    pub fn position(&self) -> ScrollerPosition {
        self.position
    }

    pub fn set_position(&mut self, position: ScrollerPosition) {
        self.position = position;
    }

    pub fn set_geometry(&mut self, geometry: ScrubberGeometry) {
        self.geometry = geometry;
    }

    pub fn geometry(&self) -> ScrubberGeometry {
        self.geometry
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Whether the thumb should be drawn for this index.
    pub fn is_visible(&self, index: &TimelineIndex) -> bool {
        self.visible && !index.is_empty() && self.position != ScrollerPosition::Off
    }

    /// Called whenever the grid starts or stops scrolling.
    pub fn set_scrolling(&mut self, scrolling: bool, now: Instant) {
        self.scrolling = scrolling;
        self.refresh_visibility(now);
    }

    /// Finger down on the track; returns the slot to scroll to.
    pub fn drag_start(&mut self, index: &TimelineIndex, touch_y: f32, now: Instant) -> Option<usize> {
        if index.is_empty() || self.position == ScrollerPosition::Off {
            return None;
        }
        self.dragging = true;
        self.refresh_visibility(now);
        self.drag_move(index, touch_y)
    }

    pub fn drag_move(&self, index: &TimelineIndex, touch_y: f32) -> Option<usize> {
        if !self.dragging || index.is_empty() {
            return None;
        }
        let fraction = self.geometry.fraction_at(touch_y);
        let slot = index.fraction_to_slot(fraction);
        trace!(touch_y, fraction, slot, "Scrubber drag");
        Some(slot)
    }

    pub fn drag_end(&mut self, now: Instant) {
        self.dragging = false;
        self.refresh_visibility(now);
    }

    /// Applies a pending fade-out; returns the current visibility flag.
    pub fn tick(&mut self, now: Instant) -> bool {
        if let Some(deadline) = self.hide_at {
            if now >= deadline {
                self.visible = false;
                self.hide_at = None;
            }
        }
        self.visible
    }

    /// Thumb top offset for the grid's first visible slot.
    pub fn thumb_offset(&self, index: &TimelineIndex, first_visible_slot: usize) -> f32 {
        self.geometry
            .thumb_offset(index.slot_to_fraction(first_visible_slot))
    }

    /// Date bubble text, shown only while dragging.
    pub fn bubble_label<'a>(&self, index: &'a TimelineIndex, first_visible_slot: usize) -> Option<&'a str> {
        if self.dragging && !index.is_empty() {
            Some(index.label_for_slot(first_visible_slot))
        } else {
            None
        }
    }

    fn refresh_visibility(&mut self, now: Instant) {
        if self.scrolling || self.dragging {
            self.visible = true;
            self.hide_at = None;
        } else if self.visible && self.hide_at.is_none() {
            self.hide_at = Some(now + self.hide_delay);
        }
    }
}
