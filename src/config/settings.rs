use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, warn};

use super::PreferenceStore;
use crate::gesture::GestureConfig;

const KEY_MATERIAL_YOU: &str = "material_you";
const KEY_SCROLLER_POSITION: &str = "scroller_position";
const KEY_TOUCH_SLOP: &str = "touch_slop_px";
const KEY_DENSITY: &str = "display_density";
const KEY_DISMISS_THRESHOLD: &str = "dismiss_threshold_dp";
const KEY_DOUBLE_TAP_WINDOW: &str = "double_tap_window_ms";
const KEY_DOUBLE_TAP_SCALE: &str = "double_tap_scale";
const KEY_MAX_SCALE: &str = "max_scale";
const KEY_SCRUBBER_HIDE_DELAY: &str = "scrubber_hide_delay_ms";

/// Which edge the fast-scroll scrubber sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollerPosition {
    #[default]
    Right,
    Left,
    Off,
}

impl ScrollerPosition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Right => "right",
            Self::Left => "left",
            Self::Off => "off",
        }
    }

    /// Unknown values fall back to the right edge.
    pub fn parse_lossy(value: &str) -> Self {
        match value {
            "left" => Self::Left,
            "off" => Self::Off,
            _ => Self::Right,
        }
    }
}

impl fmt::Display for ScrollerPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-facing settings plus the interaction tuning derived from them.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub use_material_you: bool,
    pub scroller_position: ScrollerPosition,
    /// Minimum drag distance before a direction is committed, in pixels.
    pub touch_slop_px: f32,
    /// Pixels per dp.
    pub display_density: f32,
    pub dismiss_threshold_dp: f32,
    pub double_tap_window_ms: u64,
    pub double_tap_scale: f32,
    pub max_scale: f32,
    pub scrubber_hide_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            use_material_you: false,
            scroller_position: ScrollerPosition::Right,
            touch_slop_px: 18.0,
            display_density: 2.75,
            dismiss_threshold_dp: 150.0,
            double_tap_window_ms: 300,
            double_tap_scale: 2.5,
            max_scale: 5.0,
            scrubber_hide_delay_ms: 1500,
        }
    }
}

impl Settings {
    /// Reads every key from the store; missing or malformed values keep
    /// their defaults.
    pub fn load(store: &PreferenceStore) -> Result<Self> {
        let mut settings = Self::default();

        if let Some(v) = store.get(KEY_MATERIAL_YOU)? {
            settings.use_material_you = v == "true";
        }
        if let Some(v) = store.get(KEY_SCROLLER_POSITION)? {
            settings.scroller_position = ScrollerPosition::parse_lossy(&v);
        }
        read_parsed(store, KEY_TOUCH_SLOP, &mut settings.touch_slop_px)?;
        read_parsed(store, KEY_DENSITY, &mut settings.display_density)?;
        read_parsed(store, KEY_DISMISS_THRESHOLD, &mut settings.dismiss_threshold_dp)?;
        read_parsed(store, KEY_DOUBLE_TAP_WINDOW, &mut settings.double_tap_window_ms)?;
        read_parsed(store, KEY_DOUBLE_TAP_SCALE, &mut settings.double_tap_scale)?;
        read_parsed(store, KEY_MAX_SCALE, &mut settings.max_scale)?;
        read_parsed(store, KEY_SCRUBBER_HIDE_DELAY, &mut settings.scrubber_hide_delay_ms)?;

        debug!(?settings, "Loaded settings");
        Ok(settings)
    }

    pub fn save(&self, store: &mut PreferenceStore) -> Result<()> {
        store.set_many(&[
            (KEY_MATERIAL_YOU, self.use_material_you.to_string()),
            (KEY_SCROLLER_POSITION, self.scroller_position.to_string()),
            (KEY_TOUCH_SLOP, self.touch_slop_px.to_string()),
            (KEY_DENSITY, self.display_density.to_string()),
            (KEY_DISMISS_THRESHOLD, self.dismiss_threshold_dp.to_string()),
            (KEY_DOUBLE_TAP_WINDOW, self.double_tap_window_ms.to_string()),
            (KEY_DOUBLE_TAP_SCALE, self.double_tap_scale.to_string()),
            (KEY_MAX_SCALE, self.max_scale.to_string()),
            (KEY_SCRUBBER_HIDE_DELAY, self.scrubber_hide_delay_ms.to_string()),
        ])
    }

    pub fn dp_to_px(&self, dp: f32) -> f32 {
        dp * self.display_density
    }

    pub fn scrubber_hide_delay(&self) -> Duration {
        Duration::from_millis(self.scrubber_hide_delay_ms)
    }

    /// Gesture tuning in pixels for the current display.
    pub fn gesture_config(&self) -> GestureConfig {
        let max_scale = self.max_scale.max(1.0);
        GestureConfig {
            touch_slop: self.touch_slop_px.max(0.0),
            dismiss_threshold: self.dp_to_px(self.dismiss_threshold_dp).max(0.0),
            double_tap_window: Duration::from_millis(self.double_tap_window_ms),
            max_scale,
            double_tap_scale: self.double_tap_scale.clamp(1.0, max_scale),
            ..GestureConfig::default()
        }
    }
}

fn read_parsed<T: FromStr>(store: &PreferenceStore, key: &str, out: &mut T) -> Result<()> {
    if let Some(raw) = store.get(key)? {
        match raw.parse() {
            Ok(v) => *out = v,
            Err(_) => warn!(key, raw = %raw, "Ignoring malformed preference"),
        }
    }
    Ok(())
}
