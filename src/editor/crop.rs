//! Crop overlay handle math, in display coordinates.

use crate::geometry::{Rect, Vec2};

/// Touch radius around each crop corner.
pub const HANDLE_RADIUS: f32 = 40.0;
/// Smallest edge a crop rect can be dragged down to.
pub const MIN_CROP_SIZE: f32 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropHandle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Body,
    None,
}

impl CropHandle {
    /// Picks the handle under `pos`. Corners win over the body.
    pub fn hit_test(pos: Vec2, crop: Rect) -> CropHandle {
        let corners = [
            (crop.top_left(), CropHandle::TopLeft),
            (crop.top_right(), CropHandle::TopRight),
            (crop.bottom_left(), CropHandle::BottomLeft),
            (crop.bottom_right(), CropHandle::BottomRight),
        ];
        for (corner, handle) in corners {
            if pos.distance(corner) < HANDLE_RADIUS {
                return handle;
            }
        }
        if crop.contains(pos) {
            CropHandle::Body
        } else {
            CropHandle::None
        }
    }

    /// Moves this handle of `crop` by `delta`, keeping the result inside
    /// `bounds` and at least [`MIN_CROP_SIZE`] on each edge.
    pub fn apply_drag(self, crop: Rect, delta: Vec2, bounds: Rect) -> Rect {
        let left = || clamp(crop.left + delta.x, bounds.left, crop.right - MIN_CROP_SIZE);
        let top = || clamp(crop.top + delta.y, bounds.top, crop.bottom - MIN_CROP_SIZE);
        let right = || clamp(crop.right + delta.x, crop.left + MIN_CROP_SIZE, bounds.right);
        let bottom = || clamp(crop.bottom + delta.y, crop.top + MIN_CROP_SIZE, bounds.bottom);

        match self {
            CropHandle::TopLeft => Rect::new(left(), top(), crop.right, crop.bottom),
            CropHandle::TopRight => Rect::new(crop.left, top(), right(), crop.bottom),
            CropHandle::BottomLeft => Rect::new(left(), crop.top, crop.right, bottom()),
            CropHandle::BottomRight => Rect::new(crop.left, crop.top, right(), bottom()),
            CropHandle::Body => {
                let dx = clamp(delta.x, bounds.left - crop.left, bounds.right - crop.right);
                let dy = clamp(delta.y, bounds.top - crop.top, bounds.bottom - crop.bottom);
                crop.translate(dx, dy)
            }
            CropHandle::None => crop,
        }
    }
}

// `f32::clamp` panics on an inverted range; a crop already below the minimum
// size (or larger than its bounds) must still produce a rect.
fn clamp(v: f32, lo: f32, hi: f32) -> f32 {
    v.max(lo).min(hi)
}
