//! Full-screen viewer pager.
//!
//! Owns one touch surface per attached page (current page plus one neighbor on
//! each side), routes input to the current page, and turns surface actions
//! into viewer state: bars visibility, the swipe-to-dismiss offset and its
//! derived visuals, and dismiss requests.

use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, trace};

use super::{Animation, Easing, SurfaceId, SurfaceKind, TouchSurface, DISMISS_SNAP_BACK};
use crate::geometry::{Size, Vec2};
use crate::gesture::{DismissOutcome, GestureAction, GestureConfig, PointerSample};
use crate::models::{MediaId, MediaKind, MediaRecord};

/// Pages kept attached on each side of the current one.
const BEYOND_VIEWPORT_PAGES: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PagerEvent {
    /// The user swiped past the dismiss threshold; close the viewer.
    Dismiss,
    BarsVisibility(bool),
    Zoom {
        media_id: MediaId,
        scale: f32,
        offset: Vec2,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Page {
    id: MediaId,
    kind: MediaKind,
}

impl Page {
    fn surface_kind(self) -> SurfaceKind {
        match self.kind {
            MediaKind::Image => SurfaceKind::Image,
            MediaKind::Video => SurfaceKind::Video,
        }
    }
}

pub struct ViewerPager {
    config: GestureConfig,
    extent: Size,
    pages: Vec<Page>,
    current: usize,
    surfaces: HashMap<SurfaceId, TouchSurface>,
    bars_visible: bool,
    dismiss_offset: f32,
    dismiss_animation: Option<Animation>,
    closed: bool,
}

impl ViewerPager {
    /// Opens on `start_id`, or on the first page when it is not in `records`.
    pub fn new(records: &[MediaRecord], start_id: MediaId, config: GestureConfig, extent: Size) -> Self {
        let pages: Vec<Page> = records
            .iter()
            .map(|r| Page {
                id: r.id,
                kind: r.kind,
            })
            .collect();
        let current = pages.iter().position(|p| p.id == start_id).unwrap_or(0);

        let mut pager = Self {
            config,
            extent,
            pages,
            current,
            surfaces: HashMap::new(),
            bars_visible: true,
            dismiss_offset: 0.0,
            dismiss_animation: None,
            closed: false,
        };
        pager.sync_attached();
        debug!(start = %start_id, page = current, pages = pager.pages.len(), "Viewer pager opened");
        pager
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn current_page(&self) -> usize {
        self.current
    }

    pub fn current_media(&self) -> Option<MediaId> {
        self.pages.get(self.current).map(|p| p.id)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn surface(&self, id: MediaId) -> Option<&TouchSurface> {
        self.surfaces.get(&SurfaceId::from(id))
    }

    fn current_surface_mut(&mut self) -> Option<&mut TouchSurface> {
        let id = self.current_media()?;
        self.surfaces.get_mut(&SurfaceId::from(id))
    }

    pub fn attached_count(&self) -> usize {
        self.surfaces.len()
    }

    /// Horizontal paging is locked while the current page is zoomed in.
    pub fn is_paging_enabled(&self) -> bool {
        !self
            .current_media()
            .and_then(|id| self.surface(id))
            .map(|s| s.is_zoomed())
            .unwrap_or(false)
    }

    pub fn bars_visible(&self) -> bool {
        self.bars_visible
    }

    /// Bars are hidden while the content is being dragged away.
    pub fn bars_shown(&self) -> bool {
        self.bars_visible && self.dismiss_offset == 0.0
    }

    pub fn dismiss_offset(&self) -> f32 {
        self.dismiss_offset
    }

    pub fn dismiss_progress(&self) -> f32 {
        if self.config.dismiss_threshold <= 0.0 {
            return if self.dismiss_offset == 0.0 { 0.0 } else { 1.0 };
        }
        (self.dismiss_offset.abs() / self.config.dismiss_threshold).clamp(0.0, 1.0)
    }

    pub fn background_alpha(&self) -> f32 {
        1.0 - self.dismiss_progress()
    }

    pub fn content_alpha(&self) -> f32 {
        1.0 - self.dismiss_progress() * 0.6
    }

    pub fn content_scale(&self) -> f32 {
        1.0 - self.dismiss_progress() * 0.1
    }

    pub fn set_extent(&mut self, extent: Size) {
        self.extent = extent;
        for surface in self.surfaces.values_mut() {
            surface.set_extent(extent);
        }
    }

    /// Switches pages. The incoming page always starts at rest zoom.
    pub fn set_page(&mut self, index: usize) {
        if self.closed || self.pages.is_empty() {
            return;
        }
        let index = index.min(self.pages.len() - 1);
        if index == self.current {
            return;
        }

        if let Some(outgoing) = self.current_surface_mut() {
            outgoing.cancel_pending();
        }
        self.current = index;
        self.sync_attached();
        if let Some(incoming) = self.current_surface_mut() {
            incoming.reset();
        }
        debug!(page = index, "Viewer page changed");
    }

    /// Replaces the page list after a library change, staying on the same
    /// media when it still exists.
    pub fn replace_media(&mut self, records: &[MediaRecord]) {
        let current_id = self.current_media();
        self.pages = records
            .iter()
            .map(|r| Page {
                id: r.id,
                kind: r.kind,
            })
            .collect();
        self.current = current_id
            .and_then(|id| self.pages.iter().position(|p| p.id == id))
            .unwrap_or_else(|| self.current.min(self.pages.len().saturating_sub(1)));
        if !self.closed {
            self.sync_attached();
            if self.current_media() != current_id {
                if let Some(incoming) = self.current_surface_mut() {
                    incoming.reset();
                }
            }
        }
    }

    /// Attaches surfaces inside the window around the current page and
    /// disposes the rest.
    fn sync_attached(&mut self) {
        let window: Vec<Page> = if self.pages.is_empty() {
            Vec::new()
        } else {
            let lo = self.current.saturating_sub(BEYOND_VIEWPORT_PAGES);
            let hi = (self.current + BEYOND_VIEWPORT_PAGES).min(self.pages.len() - 1);
            self.pages[lo..=hi].to_vec()
        };

        self.surfaces.retain(|id, surface| {
            let keep = window
                .iter()
                .any(|p| SurfaceId::from(p.id) == *id && p.surface_kind() == surface.kind());
            if !keep {
                trace!(surface = id.0, "Detaching surface");
                surface.dispose();
            }
            keep
        });

        for page in window {
            let id = SurfaceId::from(page.id);
            self.surfaces
                .entry(id)
                .or_insert_with(|| TouchSurface::new(id, page.surface_kind(), self.config.clone(), self.extent));
        }
    }

    /// Routes a pointer sample to the current page.
    pub fn handle_sample(&mut self, sample: &PointerSample) -> Vec<PagerEvent> {
        if self.closed {
            return Vec::new();
        }
        let Some(media_id) = self.current_media() else {
            return Vec::new();
        };
        let actions = match self.current_surface_mut() {
            Some(surface) => surface.handle_sample(sample),
            None => return Vec::new(),
        };
        self.apply_actions(media_id, actions, sample.time)
    }

    /// Advances animations and deferred taps of the current page.
    pub fn poll(&mut self, now: Instant) -> Vec<PagerEvent> {
        if self.closed {
            return Vec::new();
        }

        if let Some(animation) = self.dismiss_animation {
            self.dismiss_offset = animation.value_at(now);
            if animation.is_finished(now) {
                self.dismiss_animation = None;
            }
        }

        let Some(media_id) = self.current_media() else {
            return Vec::new();
        };
        let actions = match self.current_surface_mut() {
            Some(surface) => surface.poll(now),
            None => Vec::new(),
        };
        self.apply_actions(media_id, actions, now)
    }

    fn apply_actions(&mut self, media_id: MediaId, actions: Vec<GestureAction>, now: Instant) -> Vec<PagerEvent> {
        let mut events = Vec::new();
        for action in actions {
            match action {
                GestureAction::Tap => {
                    self.bars_visible = !self.bars_visible;
                    events.push(PagerEvent::BarsVisibility(self.bars_visible));
                }
                GestureAction::DoubleTapZoom { .. } => {}
                GestureAction::ZoomChange {
                    scale,
                    offset_x,
                    offset_y,
                } => events.push(PagerEvent::Zoom {
                    media_id,
                    scale,
                    offset: Vec2::new(offset_x, offset_y),
                }),
                GestureAction::VerticalDrag { delta_y } => {
                    self.dismiss_animation = None;
                    self.dismiss_offset = delta_y;
                }
                GestureAction::VerticalDragEnd { delta_y, outcome } => match outcome {
                    DismissOutcome::Commit => {
                        debug!(delta_y, "Viewer dismissed by swipe");
                        events.push(PagerEvent::Dismiss);
                    }
                    DismissOutcome::Cancel => {
                        self.dismiss_offset = delta_y;
                        self.dismiss_animation = Some(Animation::new(
                            delta_y,
                            0.0,
                            now,
                            DISMISS_SNAP_BACK,
                            Easing::EaseOutCubic,
                        ));
                    }
                },
            }
        }
        events
    }

    /// Tears down every surface, timer and animation. Later input is ignored.
    pub fn close(&mut self) {
        for surface in self.surfaces.values_mut() {
            surface.dispose();
        }
        self.surfaces.clear();
        self.dismiss_animation = None;
        self.closed = true;
        debug!("Viewer pager closed");
    }
}

impl Drop for ViewerPager {
    fn drop(&mut self) {
        if !self.closed {
            self.close();
        }
    }
}
