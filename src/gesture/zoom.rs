use crate::geometry::{Size, Vec2};

/// Scale bounds for a zoomable surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLimits {
    pub min_scale: f32,
    pub max_scale: f32,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min_scale: 1.0,
            max_scale: 5.0,
        }
    }
}

/// Scale and pan offset of zoomable content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomState {
    pub scale: f32,
    pub offset: Vec2,
}

impl Default for ZoomState {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ZoomState {
    pub const IDENTITY: ZoomState = ZoomState {
        scale: 1.0,
        offset: Vec2::ZERO,
    };

    pub fn new(scale: f32, offset: Vec2) -> Self {
        Self { scale, offset }
    }

    pub fn is_zoomed(&self, threshold: f32) -> bool {
        self.scale > threshold
    }

    /// Largest offset per axis that keeps the content covering the surface.
    pub fn max_offset(&self, extent: Size) -> Vec2 {
        let excess = (self.scale - 1.0).max(0.0);
        Vec2::new(excess * extent.width / 2.0, excess * extent.height / 2.0)
    }

    fn clamp_offset(&self, offset: Vec2, extent: Size) -> Vec2 {
        let max = self.max_offset(extent);
        Vec2::new(offset.x.clamp(-max.x, max.x), offset.y.clamp(-max.y, max.y))
    }

    /// Applies one pinch frame: scale by `ratio`, then pan.
    ///
    /// At the minimum scale the offset is forced back to zero.
    pub fn apply_transform(&mut self, ratio: f32, pan: Vec2, extent: Size, limits: ZoomLimits) {
        let ratio = if ratio.is_finite() && ratio > 0.0 { ratio } else { 1.0 };
        self.scale = (self.scale * ratio).clamp(limits.min_scale, limits.max_scale);
        if self.scale <= limits.min_scale {
            self.offset = Vec2::ZERO;
        } else {
            self.offset = self.clamp_offset(self.offset + pan, extent);
        }
    }

    /// Single-finger pan of already zoomed content.
    pub fn pan_by(&mut self, delta: Vec2, extent: Size) {
        self.offset = self.clamp_offset(self.offset + delta, extent);
    }

    pub fn reset(&mut self) {
        *self = Self::IDENTITY;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXTENT: Size = Size::new(1000.0, 2000.0);

    #[test]
    fn test_scale_clamped() {
        let mut z = ZoomState::default();
        z.apply_transform(100.0, Vec2::ZERO, EXTENT, ZoomLimits::default());
        assert_eq!(z.scale, 5.0);
        z.apply_transform(0.0001, Vec2::ZERO, EXTENT, ZoomLimits::default());
        assert_eq!(z.scale, 1.0);
        z.apply_transform(f32::NAN, Vec2::ZERO, EXTENT, ZoomLimits::default());
        assert_eq!(z.scale, 1.0);
    }

    #[test]
    fn test_offset_clamped_to_bounds() {
        let mut z = ZoomState::new(2.0, Vec2::ZERO);
        z.pan_by(Vec2::new(10_000.0, -10_000.0), EXTENT);
        assert_eq!(z.offset, Vec2::new(500.0, -1000.0));
    }

    #[test]
    fn test_offset_reset_at_rest_scale() {
        let mut z = ZoomState::new(2.0, Vec2::new(100.0, 100.0));
        z.apply_transform(0.5, Vec2::new(5.0, 5.0), EXTENT, ZoomLimits::default());
        assert_eq!(z.scale, 1.0);
        assert_eq!(z.offset, Vec2::ZERO);
    }

    #[test]
    fn test_zoom_out_reclamps_offset() {
        let mut z = ZoomState::new(3.0, Vec2::new(900.0, 0.0));
        z.apply_transform(0.5, Vec2::ZERO, EXTENT, ZoomLimits::default());
        assert_eq!(z.scale, 1.5);
        assert_eq!(z.offset.x, 250.0);
    }
}
