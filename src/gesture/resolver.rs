//! Per-surface gesture state machine.
//!
//! ```text
//! Idle -> Undecided -> VerticalDrag | HorizontalPan | PinchOrPan -> Ended
//! ```
//!
//! One session spans first contact to the release of every contact. A session
//! commits to at most one direction and never returns to `Undecided`.
//! Scale, offset and the last tap time outlive sessions.

use std::collections::VecDeque;
use std::time::Instant;

use tracing::{debug, trace};

use super::{
    Contact, DismissOutcome, FrameTransform, GestureAction, GestureConfig, PendingTimer,
    PointerSample, ZoomState,
};
use crate::geometry::{Size, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    Undecided,
    VerticalDrag,
    /// Horizontal intent; left to the enclosing pager or scroller.
    HorizontalPan,
    PinchOrPan,
    Ended,
}

/// Which outputs a surface supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub zoom: bool,
    pub double_tap: bool,
    pub vertical_drag: bool,
}

impl Capabilities {
    /// Full-screen image page.
    pub const ZOOMABLE: Capabilities = Capabilities {
        zoom: true,
        double_tap: true,
        vertical_drag: true,
    };
    /// Full-screen video page: taps toggle controls, swipe dismisses.
    pub const VIDEO: Capabilities = Capabilities {
        zoom: false,
        double_tap: false,
        vertical_drag: true,
    };
    /// Grid thumbnail: taps only, drags belong to the grid scroller.
    pub const TAP_ONLY: Capabilities = Capabilities {
        zoom: false,
        double_tap: false,
        vertical_drag: false,
    };
}

#[derive(Debug, Clone)]
struct GestureSession {
    phase: GesturePhase,
    started_at: Instant,
    total: Vec2,
    was_pinching: bool,
    frame: Vec<Contact>,
}

impl GestureSession {
    fn begin(sample: &PointerSample) -> Self {
        Self {
            phase: GesturePhase::Undecided,
            started_at: sample.time,
            total: Vec2::ZERO,
            was_pinching: false,
            frame: sample.pressed().copied().collect(),
        }
    }
}

pub struct GestureResolver {
    config: GestureConfig,
    caps: Capabilities,
    extent: Size,
    zoom: ZoomState,
    session: Option<GestureSession>,
    last_phase: GesturePhase,
    last_tap: Option<Instant>,
    pending_taps: VecDeque<PendingTimer>,
}

impl GestureResolver {
    pub fn new(config: GestureConfig, caps: Capabilities, extent: Size) -> Self {
        Self {
            config,
            caps,
            extent,
            zoom: ZoomState::IDENTITY,
            session: None,
            last_phase: GesturePhase::Idle,
            last_tap: None,
            pending_taps: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    pub fn set_extent(&mut self, extent: Size) {
        self.extent = extent;
    }

    pub fn extent(&self) -> Size {
        self.extent
    }

    pub fn zoom(&self) -> ZoomState {
        self.zoom
    }

    /// Overwrites the zoom state (animation frames, restores).
    pub fn set_zoom(&mut self, zoom: ZoomState) {
        self.zoom = zoom;
    }

    pub fn reset_zoom(&mut self) {
        self.zoom.reset();
    }

    pub fn is_zoomed(&self) -> bool {
        self.zoom.is_zoomed(self.config.zoomed_threshold)
    }

    pub fn phase(&self) -> GesturePhase {
        self.session
            .as_ref()
            .map(|s| s.phase)
            .unwrap_or(self.last_phase)
    }

    pub fn in_session(&self) -> bool {
        self.session.is_some()
    }

    /// Most recent pending single tap, for hosts that schedule it on a runtime.
    pub fn pending_tap(&self) -> Option<&PendingTimer> {
        self.pending_taps.back().filter(|t| !t.is_cancelled())
    }

    /// Feeds one sample; returns the actions it produced, in order.
    pub fn on_sample(&mut self, sample: &PointerSample) -> Vec<GestureAction> {
        let mut actions = Vec::new();
        let pressed = sample.pressed_count();

        let Some(mut session) = self.session.take() else {
            if pressed > 0 {
                trace!(pressed, "Gesture started");
                let session = GestureSession::begin(sample);
                self.session = Some(session);
                if pressed >= 2 {
                    // Two fingers landing together.
                    self.step(sample, pressed, &mut actions);
                }
            }
            return actions;
        };

        if pressed == 0 {
            // Normal release and abrupt loss of every contact end alike.
            self.finish(&session, sample.time, &mut actions);
            return actions;
        }

        self.advance(&mut session, sample, pressed, &mut actions);
        self.session = Some(session);
        actions
    }

    fn step(&mut self, sample: &PointerSample, pressed: usize, actions: &mut Vec<GestureAction>) {
        if let Some(mut session) = self.session.take() {
            self.advance(&mut session, sample, pressed, actions);
            self.session = Some(session);
        }
    }

    fn advance(
        &mut self,
        session: &mut GestureSession,
        sample: &PointerSample,
        pressed: usize,
        actions: &mut Vec<GestureAction>,
    ) {
        let transform = FrameTransform::between(&session.frame, &sample.contacts);
        session.frame = sample.pressed().copied().collect();

        match session.phase {
            GesturePhase::Undecided | GesturePhase::HorizontalPan if pressed >= 2 => {
                debug!(from = ?session.phase, "Second contact, committing to pinch");
                session.phase = GesturePhase::PinchOrPan;
                session.was_pinching = true;
                self.apply_pinch(transform, pressed, actions);
            }
            GesturePhase::Undecided => {
                session.total += transform.pan;

                if self.caps.zoom && self.is_zoomed() {
                    // Jitter inside slop still resolves as a tap on zoomed content.
                    if session.total.x.abs().max(session.total.y.abs()) > self.config.touch_slop {
                        session.phase = GesturePhase::PinchOrPan;
                        let catch_up = FrameTransform {
                            pan: session.total,
                            zoom: 1.0,
                        };
                        self.apply_pinch(catch_up, pressed, actions);
                    }
                    return;
                }

                let (dx, dy) = (session.total.x.abs(), session.total.y.abs());
                if dx.max(dy) > self.config.touch_slop {
                    if dy > dx {
                        session.phase = GesturePhase::VerticalDrag;
                        debug!(dy = session.total.y, "Committed to vertical drag");
                        if self.caps.vertical_drag {
                            actions.push(GestureAction::VerticalDrag {
                                delta_y: session.total.y,
                            });
                        }
                    } else {
                        session.phase = GesturePhase::HorizontalPan;
                        debug!(dx = session.total.x, "Committed to horizontal pan");
                    }
                }
            }
            GesturePhase::VerticalDrag => {
                // A late second finger stays part of the drag.
                session.total += transform.pan;
                if self.caps.vertical_drag {
                    actions.push(GestureAction::VerticalDrag {
                        delta_y: session.total.y,
                    });
                }
            }
            GesturePhase::PinchOrPan => {
                if pressed >= 2 {
                    session.was_pinching = true;
                }
                self.apply_pinch(transform, pressed, actions);
            }
            GesturePhase::HorizontalPan | GesturePhase::Idle | GesturePhase::Ended => {}
        }
    }

    fn apply_pinch(&mut self, transform: FrameTransform, pressed: usize, actions: &mut Vec<GestureAction>) {
        if !self.caps.zoom {
            return;
        }
        let before = self.zoom;
        if pressed >= 2 {
            self.zoom.apply_transform(
                transform.zoom,
                transform.pan,
                self.extent,
                self.config.zoom_limits(),
            );
        } else if self.is_zoomed() {
            self.zoom.pan_by(transform.pan, self.extent);
        }
        if self.zoom != before {
            trace!(scale = self.zoom.scale, "Zoom changed");
            actions.push(GestureAction::zoom_change(&self.zoom));
        }
    }

    fn finish(&mut self, session: &GestureSession, now: Instant, actions: &mut Vec<GestureAction>) {
        trace!(
            phase = ?session.phase,
            elapsed_ms = now.saturating_duration_since(session.started_at).as_millis() as u64,
            "Gesture ended"
        );
        self.last_phase = GesturePhase::Ended;

        match session.phase {
            GesturePhase::VerticalDrag => {
                self.last_tap = None;
                if self.caps.vertical_drag {
                    let delta_y = session.total.y;
                    let outcome = if delta_y.abs() > self.config.dismiss_threshold {
                        DismissOutcome::Commit
                    } else {
                        DismissOutcome::Cancel
                    };
                    debug!(delta_y, ?outcome, "Vertical drag released");
                    actions.push(GestureAction::VerticalDragEnd { delta_y, outcome });
                }
            }
            GesturePhase::Undecided if !session.was_pinching => self.resolve_tap(now, actions),
            _ => self.last_tap = None,
        }
    }

    fn resolve_tap(&mut self, now: Instant, actions: &mut Vec<GestureAction>) {
        if !self.caps.double_tap {
            actions.push(GestureAction::Tap);
            return;
        }

        let is_double = self
            .last_tap
            .map(|prev| now.saturating_duration_since(prev) < self.config.double_tap_window)
            .unwrap_or(false);

        if is_double {
            if let Some(pending) = self.pending_taps.pop_back() {
                pending.cancel();
            }
            self.last_tap = None;
            let target_scale = if self.is_zoomed() {
                self.config.min_scale
            } else {
                self.config.double_tap_scale
            };
            debug!(target_scale, "Double tap");
            actions.push(GestureAction::DoubleTapZoom { target_scale });
        } else {
            // An earlier tap that lost its pairing (drag in between) still fires.
            self.last_tap = Some(now);
            self.pending_taps
                .push_back(PendingTimer::new(now + self.config.double_tap_window));
        }
    }

    /// Delivers a deferred single tap once its window has passed.
    ///
    /// Returns one tap per call; hosts poll until `None`.
    pub fn poll(&mut self, now: Instant) -> Option<GestureAction> {
        while self.pending_taps.front().is_some_and(|t| t.is_cancelled()) {
            self.pending_taps.pop_front();
        }
        if self.pending_taps.front()?.is_due(now) {
            self.pending_taps.pop_front();
            return Some(GestureAction::Tap);
        }
        None
    }

    /// Drops the running session and cancels the pending tap.
    pub fn cancel(&mut self) {
        for pending in self.pending_taps.drain(..) {
            pending.cancel();
        }
        if self.session.take().is_some() {
            self.last_phase = GesturePhase::Ended;
        }
        self.last_tap = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const EXTENT: Size = Size::new(1000.0, 2000.0);

    fn config() -> GestureConfig {
        GestureConfig {
            touch_slop: 10.0,
            dismiss_threshold: 300.0,
            ..GestureConfig::default()
        }
    }

    fn zoomable() -> GestureResolver {
        GestureResolver::new(config(), Capabilities::ZOOMABLE, EXTENT)
    }

    fn ms(t0: Instant, ms: u64) -> Instant {
        t0 + Duration::from_millis(ms)
    }

    fn one(t: Instant, x: f32, y: f32) -> PointerSample {
        PointerSample::new(t, vec![Contact::down(1, x, y)])
    }

    fn two(t: Instant, a: (f32, f32), b: (f32, f32)) -> PointerSample {
        PointerSample::new(t, vec![Contact::down(1, a.0, a.1), Contact::down(2, b.0, b.1)])
    }

    fn release(t: Instant, x: f32, y: f32) -> PointerSample {
        PointerSample::new(t, vec![Contact::up(1, x, y)])
    }

    /// Down, a small wiggle inside slop, up.
    fn tap(r: &mut GestureResolver, t: Instant) -> Vec<GestureAction> {
        let mut out = r.on_sample(&one(t, 100.0, 100.0));
        out.extend(r.on_sample(&one(t + Duration::from_millis(20), 103.0, 104.0)));
        out.extend(r.on_sample(&release(t + Duration::from_millis(40), 103.0, 104.0)));
        out
    }

    #[test]
    fn test_tap_is_deferred_then_delivered() {
        let t0 = Instant::now();
        let mut r = zoomable();
        assert!(tap(&mut r, t0).is_empty());
        assert_eq!(r.phase(), GesturePhase::Ended);
        assert_eq!(r.poll(ms(t0, 100)), None);
        assert_eq!(r.poll(ms(t0, 340)), Some(GestureAction::Tap));
        assert_eq!(r.poll(ms(t0, 1000)), None);
    }

    #[test]
    fn test_double_tap_cancels_single() {
        let t0 = Instant::now();
        let mut r = zoomable();
        tap(&mut r, t0);
        let timer = r.pending_tap().cloned().unwrap();
        let actions = tap(&mut r, ms(t0, 150));
        assert_eq!(actions, vec![GestureAction::DoubleTapZoom { target_scale: 2.5 }]);
        assert!(timer.is_cancelled());
        assert_eq!(r.poll(ms(t0, 2000)), None);
    }

    #[test]
    fn test_double_tap_while_zoomed_targets_rest() {
        let t0 = Instant::now();
        let mut r = zoomable();
        r.set_zoom(ZoomState::new(2.5, Vec2::new(40.0, 0.0)));
        tap(&mut r, t0);
        let actions = tap(&mut r, ms(t0, 100));
        assert_eq!(actions, vec![GestureAction::DoubleTapZoom { target_scale: 1.0 }]);
    }

    #[test]
    fn test_slow_second_tap_is_two_singles() {
        let t0 = Instant::now();
        let mut r = zoomable();
        tap(&mut r, t0);
        assert_eq!(r.poll(ms(t0, 345)), Some(GestureAction::Tap));
        assert!(tap(&mut r, ms(t0, 400)).is_empty());
        assert_eq!(r.poll(ms(t0, 800)), Some(GestureAction::Tap));
    }

    #[test]
    fn test_vertical_drag_commit_and_dismiss() {
        let t0 = Instant::now();
        let mut r = zoomable();
        r.on_sample(&one(t0, 500.0, 500.0));
        assert_eq!(r.on_sample(&one(ms(t0, 10), 502.0, 505.0)), vec![]);
        assert_eq!(
            r.on_sample(&one(ms(t0, 20), 503.0, 520.0)),
            vec![GestureAction::VerticalDrag { delta_y: 20.0 }]
        );
        assert_eq!(r.phase(), GesturePhase::VerticalDrag);
        r.on_sample(&one(ms(t0, 30), 503.0, 900.0));
        let end = r.on_sample(&release(ms(t0, 40), 503.0, 900.0));
        assert_eq!(
            end,
            vec![GestureAction::VerticalDragEnd {
                delta_y: 400.0,
                outcome: DismissOutcome::Commit
            }]
        );
        assert_eq!(r.poll(ms(t0, 1000)), None);
    }

    #[test]
    fn test_short_vertical_drag_cancels() {
        let t0 = Instant::now();
        let mut r = zoomable();
        r.on_sample(&one(t0, 500.0, 500.0));
        r.on_sample(&one(ms(t0, 10), 500.0, 400.0));
        let end = r.on_sample(&release(ms(t0, 20), 500.0, 400.0));
        assert_eq!(
            end,
            vec![GestureAction::VerticalDragEnd {
                delta_y: -100.0,
                outcome: DismissOutcome::Cancel
            }]
        );
    }

    #[test]
    fn test_vertical_drag_never_becomes_pinch() {
        let t0 = Instant::now();
        let mut r = zoomable();
        r.on_sample(&one(t0, 500.0, 500.0));
        r.on_sample(&one(ms(t0, 10), 500.0, 530.0));
        assert_eq!(r.phase(), GesturePhase::VerticalDrag);

        let actions = r.on_sample(&two(ms(t0, 20), (500.0, 540.0), (700.0, 540.0)));
        assert_eq!(r.phase(), GesturePhase::VerticalDrag);
        assert_eq!(actions, vec![GestureAction::VerticalDrag { delta_y: 40.0 }]);

        r.on_sample(&two(ms(t0, 30), (400.0, 540.0), (900.0, 540.0)));
        assert_eq!(r.phase(), GesturePhase::VerticalDrag);
        assert_eq!(r.zoom(), ZoomState::IDENTITY);
    }

    #[test]
    fn test_horizontal_drag_is_ignored() {
        let t0 = Instant::now();
        let mut r = zoomable();
        r.on_sample(&one(t0, 500.0, 500.0));
        assert!(r.on_sample(&one(ms(t0, 10), 560.0, 505.0)).is_empty());
        assert_eq!(r.phase(), GesturePhase::HorizontalPan);
        assert!(r.on_sample(&release(ms(t0, 20), 560.0, 505.0)).is_empty());
        assert_eq!(r.poll(ms(t0, 1000)), None);
    }

    #[test]
    fn test_pinch_before_slop_commits_and_clamps() {
        let t0 = Instant::now();
        let mut r = zoomable();
        r.on_sample(&one(t0, 490.0, 1000.0));
        r.on_sample(&two(ms(t0, 5), (490.0, 1000.0), (510.0, 1000.0)));
        assert_eq!(r.phase(), GesturePhase::PinchOrPan);

        // 20px apart -> 2000px apart: a 100x ratio.
        let actions = r.on_sample(&two(ms(t0, 10), (-500.0, 1000.0), (1500.0, 1000.0)));
        assert_eq!(r.zoom().scale, 5.0);
        assert!(matches!(
            actions.as_slice(),
            [GestureAction::ZoomChange { scale, .. }] if *scale == 5.0
        ));

        for i in 0..20 {
            r.on_sample(&two(ms(t0, 20 + i), (-500.0, 1000.0), (1500.0, 1000.0)));
            r.on_sample(&two(ms(t0, 21 + i), (499.0, 1000.0), (501.0, 1000.0)));
        }
        let scale = r.zoom().scale;
        assert!((1.0..=5.0).contains(&scale));

        // Lifting everything after a pinch is never a tap.
        r.on_sample(&PointerSample::new(
            ms(t0, 100),
            vec![Contact::up(1, 0.0, 0.0), Contact::up(2, 0.0, 0.0)],
        ));
        assert_eq!(r.poll(ms(t0, 2000)), None);
    }

    #[test]
    fn test_pinch_back_to_rest_clears_offset() {
        let t0 = Instant::now();
        let mut r = zoomable();
        r.on_sample(&two(t0, (400.0, 1000.0), (600.0, 1000.0)));
        r.on_sample(&two(ms(t0, 10), (300.0, 1050.0), (700.0, 1050.0)));
        assert_eq!(r.zoom().scale, 2.0);
        assert_eq!(r.zoom().offset, Vec2::new(0.0, 50.0));

        r.on_sample(&two(ms(t0, 20), (500.0, 1000.0), (500.5, 1000.0)));
        assert_eq!(r.zoom().scale, 1.0);
        assert_eq!(r.zoom().offset, Vec2::ZERO);
    }

    #[test]
    fn test_zoomed_single_finger_pans() {
        let t0 = Instant::now();
        let mut r = zoomable();
        r.set_zoom(ZoomState::new(2.0, Vec2::ZERO));
        r.on_sample(&one(t0, 500.0, 500.0));
        let actions = r.on_sample(&one(ms(t0, 10), 505.0, 700.0));
        assert_eq!(r.phase(), GesturePhase::PinchOrPan);
        assert_eq!(
            actions,
            vec![GestureAction::ZoomChange {
                scale: 2.0,
                offset_x: 5.0,
                offset_y: 200.0
            }]
        );
        r.on_sample(&release(ms(t0, 20), 505.0, 700.0));
        assert_eq!(r.poll(ms(t0, 1000)), None);
    }

    #[test]
    fn test_zoomed_jitter_inside_slop_is_tap() {
        let t0 = Instant::now();
        let mut r = zoomable();
        r.set_zoom(ZoomState::new(2.0, Vec2::ZERO));

        r.on_sample(&one(t0, 100.0, 100.0));
        assert!(r.on_sample(&one(ms(t0, 10), 101.0, 100.0)).is_empty());
        r.on_sample(&release(ms(t0, 20), 101.0, 100.0));
        assert_eq!(r.zoom(), ZoomState::new(2.0, Vec2::ZERO));
        assert_eq!(r.poll(ms(t0, 400)), Some(GestureAction::Tap));

        r.on_sample(&one(ms(t0, 1000), 100.0, 100.0));
        r.on_sample(&one(ms(t0, 1010), 101.0, 100.0));
        r.on_sample(&release(ms(t0, 1020), 101.0, 100.0));
        r.on_sample(&one(ms(t0, 1100), 100.0, 100.0));
        r.on_sample(&one(ms(t0, 1110), 100.0, 101.0));
        let actions = r.on_sample(&release(ms(t0, 1120), 100.0, 101.0));
        assert_eq!(actions, vec![GestureAction::DoubleTapZoom { target_scale: 1.0 }]);
        assert_eq!(r.poll(ms(t0, 2000)), None);
    }

    #[test]
    fn test_video_tap_is_immediate() {
        let t0 = Instant::now();
        let mut r = GestureResolver::new(config(), Capabilities::VIDEO, EXTENT);
        assert_eq!(tap(&mut r, t0), vec![GestureAction::Tap]);
        assert_eq!(tap(&mut r, ms(t0, 100)), vec![GestureAction::Tap]);
        assert!(r.pending_tap().is_none());
    }

    #[test]
    fn test_tap_only_surface_never_drags() {
        let t0 = Instant::now();
        let mut r = GestureResolver::new(config(), Capabilities::TAP_ONLY, EXTENT);
        r.on_sample(&one(t0, 0.0, 0.0));
        assert!(r.on_sample(&one(ms(t0, 10), 0.0, 500.0)).is_empty());
        assert!(r.on_sample(&release(ms(t0, 20), 0.0, 500.0)).is_empty());
    }

    #[test]
    fn test_empty_samples_are_inert_and_end_sessions() {
        let t0 = Instant::now();
        let mut r = zoomable();
        assert!(r.on_sample(&PointerSample::empty(t0)).is_empty());
        assert_eq!(r.phase(), GesturePhase::Idle);

        r.on_sample(&one(t0, 10.0, 10.0));
        r.on_sample(&one(ms(t0, 5), 10.0, 60.0));
        let actions = r.on_sample(&PointerSample::empty(ms(t0, 10)));
        assert_eq!(
            actions,
            vec![GestureAction::VerticalDragEnd {
                delta_y: 50.0,
                outcome: DismissOutcome::Cancel
            }]
        );
        assert!(!r.in_session());
        assert_eq!(r.phase(), GesturePhase::Ended);
    }

    #[test]
    fn test_drag_between_taps_breaks_double_tap() {
        let t0 = Instant::now();
        let mut r = zoomable();
        tap(&mut r, t0);
        r.on_sample(&one(ms(t0, 50), 0.0, 0.0));
        r.on_sample(&one(ms(t0, 60), 80.0, 0.0));
        r.on_sample(&release(ms(t0, 70), 80.0, 0.0));
        assert!(tap(&mut r, ms(t0, 120)).is_empty());
        assert!(r.pending_tap().is_some());

        // Both singles are delivered, each after its own window.
        assert_eq!(r.poll(ms(t0, 345)), Some(GestureAction::Tap));
        assert_eq!(r.poll(ms(t0, 345)), None);
        assert_eq!(r.poll(ms(t0, 500)), Some(GestureAction::Tap));
    }

    #[test]
    fn test_cancel_tears_down_pending_tap() {
        let t0 = Instant::now();
        let mut r = zoomable();
        tap(&mut r, t0);
        let timer = r.pending_tap().cloned().unwrap();
        r.on_sample(&one(ms(t0, 50), 0.0, 0.0));
        r.cancel();
        assert!(timer.is_cancelled());
        assert!(!r.in_session());
        assert_eq!(r.poll(ms(t0, 1000)), None);
    }
}
