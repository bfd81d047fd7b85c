//! Incremental multi-touch transform between two contact frames.

use crate::geometry::Vec2;

use super::Contact;

/// Pan and zoom ratio observed between two consecutive frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTransform {
    pub pan: Vec2,
    pub zoom: f32,
}

impl FrameTransform {
    pub const IDENTITY: FrameTransform = FrameTransform {
        pan: Vec2::ZERO,
        zoom: 1.0,
    };

    /// Centroid pan and spread ratio over contacts pressed in both frames.
    ///
    /// Contacts that appeared or lifted between the frames are ignored, so a
    /// finger landing mid-pinch does not register as a jump.
    pub fn between(previous: &[Contact], current: &[Contact]) -> Self {
        let pairs: Vec<(Vec2, Vec2)> = current
            .iter()
            .filter(|c| c.pressed)
            .filter_map(|c| {
                previous
                    .iter()
                    .find(|p| p.id == c.id && p.pressed)
                    .map(|p| (p.position, c.position))
            })
            .collect();

        if pairs.is_empty() {
            return Self::IDENTITY;
        }

        let n = pairs.len() as f32;
        let before = pairs.iter().fold(Vec2::ZERO, |acc, (p, _)| acc + *p) / n;
        let after = pairs.iter().fold(Vec2::ZERO, |acc, (_, c)| acc + *c) / n;
        let pan = after - before;

        if pairs.len() < 2 {
            return Self { pan, zoom: 1.0 };
        }

        let spread_before = pairs.iter().map(|(p, _)| p.distance(before)).sum::<f32>() / n;
        let spread_after = pairs.iter().map(|(_, c)| c.distance(after)).sum::<f32>() / n;
        let zoom = if spread_before > 0.0 && spread_after > 0.0 {
            spread_after / spread_before
        } else {
            1.0
        };

        Self { pan, zoom }
    }
}
