use tracing::debug;

use crate::geometry::Rect;

/// Region of the source image, in source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Where and how the edited copy is written. Edits never overwrite the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTarget {
    pub display_name: String,
    pub mime_type: &'static str,
    pub relative_path: &'static str,
    pub quality: u8,
}

impl ExportTarget {
    pub const MIME_TYPE: &'static str = "image/jpeg";
    pub const RELATIVE_PATH: &'static str = "Pictures/Glint";
    pub const QUALITY: u8 = 95;

    pub fn jpeg_at(now_ms: i64) -> Self {
        Self {
            display_name: format!("Glint_{now_ms}.jpg"),
            mime_type: Self::MIME_TYPE,
            relative_path: Self::RELATIVE_PATH,
            quality: Self::QUALITY,
        }
    }
}

/// Everything the codec needs to produce the edited copy: crop first, then
/// rotate clockwise, then flip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditPlan {
    pub crop: Option<PixelRect>,
    pub rotation_degrees: u16,
    pub flip_h: bool,
    pub flip_v: bool,
    pub output: ExportTarget,
}

/// Edit state for one opened image.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    source_width: u32,
    source_height: u32,
    /// Accumulated crop in source pixels; `None` means the full image.
    crop: Option<PixelRect>,
    rotation: u16,
    flip_h: bool,
    flip_v: bool,
    cropping: bool,
    crop_rect: Option<Rect>,
}

impl EditSession {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            source_width: width,
            source_height: height,
            crop: None,
            rotation: 0,
            flip_h: false,
            flip_v: false,
            cropping: false,
            crop_rect: None,
        }
    }

    /// Size of the image after the crops applied so far, before rotation.
    pub fn image_size(&self) -> (u32, u32) {
        match self.crop {
            Some(c) => (c.width, c.height),
            None => (self.source_width, self.source_height),
        }
    }

    /// Size of the exported image.
    pub fn output_size(&self) -> (u32, u32) {
        let (w, h) = self.image_size();
        if self.rotation % 180 == 90 {
            (h, w)
        } else {
            (w, h)
        }
    }

    pub fn rotation(&self) -> u16 {
        self.rotation
    }

    pub fn flip_h(&self) -> bool {
        self.flip_h
    }

    pub fn flip_v(&self) -> bool {
        self.flip_v
    }

    pub fn is_cropping(&self) -> bool {
        self.cropping
    }

    pub fn crop_rect(&self) -> Option<Rect> {
        self.crop_rect
    }

    pub fn crop(&self) -> Option<PixelRect> {
        self.crop
    }

    pub fn is_modified(&self) -> bool {
        self.crop.is_some() || self.rotation != 0 || self.flip_h || self.flip_v
    }

    fn rotate_by(&mut self, degrees: i32) {
        self.rotation = (i32::from(self.rotation) + degrees).rem_euclid(360) as u16;
    }

    pub fn rotate_left(&mut self) {
        self.rotate_by(-90);
    }

    pub fn rotate_right(&mut self) {
        self.rotate_by(90);
    }

    pub fn toggle_flip_h(&mut self) {
        self.flip_h = !self.flip_h;
    }

    pub fn toggle_flip_v(&mut self) {
        self.flip_v = !self.flip_v;
    }

    /// Leaving crop mode discards the pending crop rect.
    pub fn toggle_crop_mode(&mut self) {
        self.cropping = !self.cropping;
        if !self.cropping {
            self.crop_rect = None;
        }
    }

    pub fn update_crop_rect(&mut self, rect: Rect) {
        self.crop_rect = Some(rect);
    }

    /// Commits the pending crop rect.
    ///
    /// `displayed` is where the current image is drawn, in the same
    /// coordinates as the crop rect. Returns whether the image changed;
    /// crop mode is left either way.
    pub fn apply_crop(&mut self, displayed: Rect) -> bool {
        let Some(rect) = self.crop_rect.take() else {
            return false;
        };
        self.cropping = false;

        let (width, height) = self.image_size();
        if width == 0 || height == 0 || displayed.width() <= 0.0 || displayed.height() <= 0.0 {
            return false;
        }

        let scale_x = width as f32 / displayed.width();
        let scale_y = height as f32 / displayed.height();
        let (w, h) = (i64::from(width), i64::from(height));

        let x = (((rect.left - displayed.left) * scale_x) as i64).clamp(0, w - 1);
        let y = (((rect.top - displayed.top) * scale_y) as i64).clamp(0, h - 1);
        let cw = ((rect.width() * scale_x) as i64).min(w - x);
        let ch = ((rect.height() * scale_y) as i64).min(h - y);

        if cw <= 0 || ch <= 0 {
            debug!(cw, ch, "Ignoring empty crop");
            return false;
        }

        let (base_x, base_y) = self.crop.map(|c| (c.x, c.y)).unwrap_or((0, 0));
        let crop = PixelRect {
            x: base_x + x as u32,
            y: base_y + y as u32,
            width: cw as u32,
            height: ch as u32,
        };
        debug!(x = crop.x, y = crop.y, width = crop.width, height = crop.height, "Crop applied");
        self.crop = Some(crop);
        true
    }

    pub fn plan(&self, now_ms: i64) -> EditPlan {
        EditPlan {
            crop: self.crop,
            rotation_degrees: self.rotation,
            flip_h: self.flip_h,
            flip_v: self.flip_v,
            output: ExportTarget::jpeg_at(now_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_wraps() {
        let mut s = EditSession::new(400, 300);
        s.rotate_left();
        assert_eq!(s.rotation(), 270);
        assert_eq!(s.output_size(), (300, 400));
        s.rotate_right();
        s.rotate_right();
        assert_eq!(s.rotation(), 90);
        for _ in 0..3 {
            s.rotate_right();
        }
        assert_eq!(s.rotation(), 0);
        assert!(!s.is_modified());
    }

    #[test]
    fn test_flips_toggle() {
        let mut s = EditSession::new(10, 10);
        s.toggle_flip_h();
        s.toggle_flip_v();
        s.toggle_flip_v();
        assert!(s.flip_h());
        assert!(!s.flip_v());
        assert!(s.is_modified());
    }

    #[test]
    fn test_leaving_crop_mode_clears_rect() {
        let mut s = EditSession::new(100, 100);
        s.toggle_crop_mode();
        s.update_crop_rect(Rect::new(0.0, 0.0, 50.0, 50.0));
        s.toggle_crop_mode();
        assert!(!s.is_cropping());
        assert_eq!(s.crop_rect(), None);
    }

    #[test]
    fn test_apply_crop_maps_to_pixels_and_composes() {
        // 2000x1000 image drawn at half size with a 100 px left margin.
        let mut s = EditSession::new(2000, 1000);
        let displayed = Rect::new(100.0, 0.0, 1100.0, 500.0);
        s.toggle_crop_mode();
        s.update_crop_rect(Rect::new(200.0, 50.0, 600.0, 450.0));
        assert!(s.apply_crop(displayed));
        assert!(!s.is_cropping());
        assert_eq!(
            s.crop(),
            Some(PixelRect {
                x: 200,
                y: 100,
                width: 800,
                height: 800
            })
        );

        // Second crop on the 800x800 result, drawn at 400x400.
        s.toggle_crop_mode();
        s.update_crop_rect(Rect::new(100.0, 100.0, 300.0, 500.0));
        assert!(s.apply_crop(Rect::new(0.0, 0.0, 400.0, 400.0)));
        assert_eq!(
            s.crop(),
            Some(PixelRect {
                x: 400,
                y: 300,
                width: 400,
                height: 600
            })
        );
    }

    #[test]
    fn test_apply_crop_clamps_and_ignores_empty() {
        let mut s = EditSession::new(100, 100);
        s.toggle_crop_mode();
        s.update_crop_rect(Rect::new(-20.0, 90.0, 200.0, 90.0));
        assert!(!s.apply_crop(Rect::new(0.0, 0.0, 100.0, 100.0)));
        assert_eq!(s.crop(), None);
        assert!(!s.is_cropping());

        s.toggle_crop_mode();
        s.update_crop_rect(Rect::new(50.0, 50.0, 300.0, 300.0));
        assert!(s.apply_crop(Rect::new(0.0, 0.0, 100.0, 100.0)));
        assert_eq!(s.image_size(), (50, 50));

        assert!(!s.apply_crop(Rect::new(0.0, 0.0, 100.0, 100.0)));
    }

    #[test]
    fn test_plan_names_export() {
        let mut s = EditSession::new(10, 20);
        s.rotate_right();
        let plan = s.plan(1_700_000_000_123);
        assert_eq!(plan.rotation_degrees, 90);
        assert_eq!(plan.crop, None);
        assert_eq!(plan.output.display_name, "Glint_1700000000123.jpg");
        assert_eq!(plan.output.mime_type, "image/jpeg");
        assert_eq!(plan.output.relative_path, "Pictures/Glint");
        assert_eq!(plan.output.quality, 95);
    }
}
