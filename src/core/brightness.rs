//! Hysteretic brightness control with movie-mode and manual overrides.
//!
//! Computes a target brightness percentage from the normalized ambient light
//! level and only actuates when the target moves far enough from the current
//! level (mode-dependent threshold). Movie mode floors the target and forbids
//! auto-dimming so playback is never interrupted by a darkening screen. After
//! sunset the achievable ceiling narrows: a screen that is comfortable at
//! full ambient light is overly bright at night regardless of measured lux.
//!
//! Actuated values are quantized to a fixed clamp grid. The controller is
//! optimistic about hardware: a failed actuation is logged and the tracked
//! state kept, so the next divergence reconciles naturally.

use crate::actuator::BrightnessActuator;
use crate::config::{BrightnessPreset, Config};
use crate::constants::{BRIGHTNESS_CLAMP_GRID, BRIGHTNESS_UNSET};

/// Manual brightness level: one value for all displays, or one per display.
#[derive(Debug, Clone, PartialEq)]
pub enum ManualBrightness {
    Uniform(u8),
    PerDisplay(Vec<u8>),
}

impl From<BrightnessPreset> for ManualBrightness {
    fn from(preset: BrightnessPreset) -> Self {
        match preset {
            BrightnessPreset::Uniform(p) => ManualBrightness::Uniform(p),
            BrightnessPreset::PerDisplay(v) => ManualBrightness::PerDisplay(v),
        }
    }
}

/// State machine computing and applying brightness setpoints.
pub struct BrightnessController {
    actuator: Box<dyn BrightnessActuator>,
    displays: Vec<String>,

    auto_mode: bool,
    movie_mode: bool,
    dark_outside: bool,

    /// Active ceiling: `max` while the sun is up, `max_dark` after sunset
    ceiling: i32,
    min: i32,
    max: i32,
    max_dark: i32,
    movie_min: i32,
    threshold_sun_up: i32,
    threshold_sun_down: i32,

    /// Last target that cleared the threshold (hysteresis reference).
    /// Starts at the unset sentinel so the first qualifying reading actuates.
    current: i32,
    /// Last grid value actually sent to the displays
    actuated: i32,
}

impl BrightnessController {
    pub fn new(actuator: Box<dyn BrightnessActuator>, config: &Config) -> Self {
        Self {
            actuator,
            displays: config.displays(),
            auto_mode: true,
            movie_mode: false,
            dark_outside: false,
            ceiling: config.brightness_max() as i32,
            min: config.brightness_min() as i32,
            max: config.brightness_max() as i32,
            max_dark: config.brightness_max_dark() as i32,
            movie_min: config.brightness_movie_min() as i32,
            threshold_sun_up: config.threshold_sun_up() as i32,
            threshold_sun_down: config.threshold_sun_down() as i32,
            current: BRIGHTNESS_UNSET,
            actuated: BRIGHTNESS_UNSET,
        }
    }

    /// Level-triggered movie mode, recomputed from suppression every poll.
    pub fn set_movie_mode(&mut self, movie_mode: bool) {
        if movie_mode != self.movie_mode {
            log_block_start!(
                "{} movie mode",
                if movie_mode { "Entering" } else { "Leaving" }
            );
        }
        self.movie_mode = movie_mode;
    }

    /// Select the brightness ceiling for the current day/night phase.
    ///
    /// Both directions write the active ceiling, so the full daylight range
    /// comes back at sunrise.
    pub fn set_dark_outside(&mut self, dark_outside: bool) {
        self.dark_outside = dark_outside;
        self.ceiling = if dark_outside { self.max_dark } else { self.max };
    }

    /// Whether automatic brightness is currently in effect.
    pub fn auto_mode(&self) -> bool {
        self.auto_mode
    }

    /// Enable or disable automatic brightness.
    pub fn set_auto(&mut self, enabled: bool) {
        if enabled && !self.auto_mode {
            log_block_start!("Auto brightness re-enabled");
        }
        self.auto_mode = enabled;
    }

    /// Compute a target from the normalized light level and actuate it if it
    /// clears the hysteresis threshold. No-op while a manual override is
    /// active.
    pub fn compute_and_apply(&mut self, normalized_lux: f64) {
        if !self.auto_mode {
            return;
        }

        let raw = (normalized_lux * (self.ceiling - self.min) as f64).round() as i32;
        let target = if self.movie_mode {
            raw.max(self.movie_min)
        } else {
            raw
        };

        let threshold = if self.dark_outside {
            self.threshold_sun_down
        } else {
            self.threshold_sun_up
        };

        // Movie mode forbids auto-dimming but still allows brightening
        if (target - self.current).abs() < threshold
            || (self.movie_mode && target <= self.current)
        {
            return;
        }

        self.current = target;
        let clamped = clamp_to_grid(target) as i32;
        if clamped == self.actuated {
            // Moved within the same grid cell: remember the target for
            // hysteresis but skip the redundant hardware call
            return;
        }

        self.actuated = clamped;
        log_block_start!("Brightness {}% (target {}%)", clamped, target);
        for display in self.displays.clone() {
            self.apply_to_display(&display, clamped as u8);
        }
    }

    /// Apply a manual level and leave auto mode until re-enabled.
    ///
    /// Resets the hysteresis bookkeeping to the unset sentinel so that
    /// returning to auto mode forces a fresh actuation on the first
    /// qualifying change.
    pub fn set_manual(&mut self, level: ManualBrightness) {
        self.auto_mode = false;
        self.current = BRIGHTNESS_UNSET;
        self.actuated = BRIGHTNESS_UNSET;

        match level {
            ManualBrightness::Uniform(percent) => {
                log_block_start!("Manual brightness {}%", percent);
                for display in self.displays.clone() {
                    self.apply_to_display(&display, percent);
                }
            }
            ManualBrightness::PerDisplay(levels) => {
                log_block_start!("Manual per-display brightness");
                let pairs: Vec<(String, u8)> = self
                    .displays
                    .iter()
                    .cloned()
                    .zip(levels.iter().copied())
                    .collect();
                for (display, percent) in pairs {
                    log_indented!("Display {}: {}%", display, percent);
                    self.apply_to_display(&display, percent);
                }
            }
        }
    }

    fn apply_to_display(&mut self, display: &str, percent: u8) {
        if let Err(e) = self.actuator.set_brightness(display, percent) {
            log_warning!("Failed to set brightness on display {display}: {e}");
        }
    }
}

/// Quantize a brightness percentage to the nearest clamp grid value.
///
/// The grid is scanned in ascending order and the first-found minimum
/// absolute difference wins, so exact midpoints resolve to the lower value.
pub fn clamp_to_grid(value: i32) -> u8 {
    let mut closest = BRIGHTNESS_CLAMP_GRID[0];
    let mut closest_diff = i32::MAX;
    for step in BRIGHTNESS_CLAMP_GRID {
        let diff = (value - step as i32).abs();
        if diff < closest_diff {
            closest_diff = diff;
            closest = step;
        }
    }
    closest
}
