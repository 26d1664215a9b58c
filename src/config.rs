//! Configuration system for ambientr with validation and default generation.
//!
//! Handles the TOML-based configuration file, default value generation when no
//! file exists, and range validation with helpful error messages.
//!
//! ## Configuration structure
//!
//! ```toml
//! #[Displays]
//! displays = ["1", "2"]        # ddcutil display numbers, in hotkey order
//!
//! #[Location]
//! latitude = 55.7              # Geographic latitude (-90 to 90)
//! longitude = 13.2             # Geographic longitude (-180 to 180)
//! elevation = 20.0             # Meters over the sea
//!
//! #[Color temperature]
//! day_temp = 6500              # Kelvin while the sun is up (1000-20000)
//! night_temp = 2800            # Kelvin after the transition (1000-20000)
//! transition_minutes = 120     # Minutes after sunset to reach night_temp (5-480)
//!
//! #[Brightness]
//! brightness_min = 5           # Lowest auto brightness percent
//! brightness_max = 100         # Ceiling while the sun is up
//! brightness_max_dark = 70     # Ceiling after sunset
//! brightness_movie_min = 50    # Floor while movie mode is active
//! threshold_sun_up = 7         # Min percent change before actuating (day)
//! threshold_sun_down = 5       # Min percent change before actuating (night)
//! stability_threshold = 20.0   # Max raw sample delta accepted as stable
//!
//! #[Suppression]
//! disallowed_programs = ["mplayer", "smplayer", "vlc"]
//! camera_device = "/dev/video0"
//!
//! #[Timing]
//! poll_interval = 3            # Seconds between polls (1-300)
//! startup_delay = 0            # Seconds to wait before the first poll
//!
//! #[Manual overrides]
//! # Brightness presets selectable by an external hotkey daemon.
//! # A single value applies to all displays; an array gives one value per
//! # configured display.
//! manual_brightness = [0, [0, 15], 25, 50, 75]
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::OnceLock;

use crate::constants::*;

/// Global configuration directory, set once at startup
static CONFIG_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Set the configuration directory for the current process.
/// This can only be called once, typically at startup.
pub fn set_config_dir(dir: Option<String>) -> Result<()> {
    CONFIG_DIR
        .set(dir.map(PathBuf::from))
        .map_err(|_| anyhow::anyhow!("Configuration directory already set"))
}

/// A manual brightness preset: one percentage for all displays, or one
/// percentage per configured display.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum BrightnessPreset {
    /// Same brightness on every display
    Uniform(u8),
    /// Individual brightness per display, in `displays` order
    PerDisplay(Vec<u8>),
}

/// Main configuration structure loaded from `ambientr.toml`.
///
/// All fields are optional in the file; accessors fall back to the defaults
/// in `constants`. The struct is immutable after load and passed by reference
/// to each component.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Display identifiers passed to the brightness actuator
    pub displays: Option<Vec<String>>,

    /// Geographic latitude in degrees (-90 to 90)
    pub latitude: Option<f64>,
    /// Geographic longitude in degrees (-180 to 180)
    pub longitude: Option<f64>,
    /// Observer elevation in meters over the sea
    pub elevation: Option<f64>,

    pub day_temp: Option<u32>,
    pub night_temp: Option<u32>,
    /// Minutes after sunset over which color shifts from day to night
    pub transition_minutes: Option<u32>,

    pub brightness_min: Option<u8>,
    pub brightness_max: Option<u8>,
    pub brightness_max_dark: Option<u8>,
    pub brightness_movie_min: Option<u8>,
    pub threshold_sun_up: Option<u8>,
    pub threshold_sun_down: Option<u8>,
    /// Maximum raw sample delta accepted as a stable light reading
    pub stability_threshold: Option<f64>,

    /// Programs whose presence suppresses automatic dimming
    pub disallowed_programs: Option<Vec<String>>,
    /// Camera device used for ambient light sampling and contention checks
    pub camera_device: Option<String>,

    /// Seconds between control loop polls
    pub poll_interval: Option<u64>,
    /// Seconds to wait before the first poll
    pub startup_delay: Option<u64>,

    /// Brightness presets for external hotkey daemons (F1..Fn order)
    pub manual_brightness: Option<Vec<BrightnessPreset>>,
}

impl Config {
    /// Load configuration using automatic path detection.
    ///
    /// Creates a default configuration file if none exists.
    pub fn load() -> Result<Self> {
        let path = get_config_path()?;
        if !path.exists() {
            create_default_config(&path)?;
        }
        Self::load_from_path(&path)
    }

    /// Load and validate configuration from a specific path.
    pub fn load_from_path(path: &std::path::Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse configuration at {}", path.display()))?;
        validate_config(&config)?;
        Ok(config)
    }

    pub fn displays(&self) -> Vec<String> {
        self.displays.clone().unwrap_or_else(|| vec!["1".to_string()])
    }

    pub fn elevation(&self) -> f64 {
        self.elevation.unwrap_or(DEFAULT_ELEVATION)
    }

    pub fn day_temp(&self) -> u32 {
        self.day_temp.unwrap_or(DEFAULT_DAY_TEMP)
    }

    pub fn night_temp(&self) -> u32 {
        self.night_temp.unwrap_or(DEFAULT_NIGHT_TEMP)
    }

    pub fn transition_minutes(&self) -> u32 {
        self.transition_minutes.unwrap_or(DEFAULT_TRANSITION_MINUTES)
    }

    pub fn brightness_min(&self) -> u8 {
        self.brightness_min.unwrap_or(DEFAULT_BRIGHTNESS_MIN)
    }

    pub fn brightness_max(&self) -> u8 {
        self.brightness_max.unwrap_or(DEFAULT_BRIGHTNESS_MAX)
    }

    pub fn brightness_max_dark(&self) -> u8 {
        self.brightness_max_dark.unwrap_or(DEFAULT_BRIGHTNESS_MAX_DARK)
    }

    pub fn brightness_movie_min(&self) -> u8 {
        self.brightness_movie_min.unwrap_or(DEFAULT_BRIGHTNESS_MOVIE_MIN)
    }

    pub fn threshold_sun_up(&self) -> u8 {
        self.threshold_sun_up.unwrap_or(DEFAULT_THRESHOLD_SUN_UP)
    }

    pub fn threshold_sun_down(&self) -> u8 {
        self.threshold_sun_down.unwrap_or(DEFAULT_THRESHOLD_SUN_DOWN)
    }

    pub fn stability_threshold(&self) -> f64 {
        self.stability_threshold.unwrap_or(DEFAULT_STABILITY_THRESHOLD)
    }

    pub fn disallowed_programs(&self) -> Vec<String> {
        self.disallowed_programs.clone().unwrap_or_else(|| {
            DEFAULT_DISALLOWED_PROGRAMS
                .iter()
                .map(|s| s.to_string())
                .collect()
        })
    }

    pub fn camera_device(&self) -> String {
        self.camera_device
            .clone()
            .unwrap_or_else(|| DEFAULT_CAMERA_DEVICE.to_string())
    }

    pub fn poll_interval(&self) -> u64 {
        self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL_SECS)
    }

    pub fn startup_delay(&self) -> u64 {
        self.startup_delay.unwrap_or(DEFAULT_STARTUP_DELAY_SECS)
    }

    /// Log the loaded configuration in the structured block format.
    pub fn log_config(&self) {
        log_block_start!("Loaded configuration");
        log_indented!("Displays: {}", self.displays().join(", "));
        if let (Some(lat), Some(lon)) = (self.latitude, self.longitude) {
            log_indented!("Location: {:.4}°, {:.4}° ({}m)", lat, lon, self.elevation());
        }
        log_indented!(
            "Color temperature: {}K day → {}K night over {} min",
            self.day_temp(),
            self.night_temp(),
            self.transition_minutes()
        );
        log_indented!(
            "Brightness range: {}-{}% (dark ceiling {}%, movie floor {}%)",
            self.brightness_min(),
            self.brightness_max(),
            self.brightness_max_dark(),
            self.brightness_movie_min()
        );
        log_indented!("Poll interval: {}s", self.poll_interval());
    }
}

/// Get the path to `ambientr.toml`, honoring a custom config directory.
pub fn get_config_path() -> Result<PathBuf> {
    if let Some(Some(dir)) = CONFIG_DIR.get() {
        return Ok(dir.join("ambientr.toml"));
    }
    let base = dirs::config_dir().context("Could not determine config directory")?;
    Ok(base.join("ambientr").join("ambientr.toml"))
}

/// Write a commented default configuration file.
fn create_default_config(path: &std::path::Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
    }

    let contents = format!(
        r#"#[Displays]
displays = ["1"]          # ddcutil display numbers

#[Location]
latitude = 55.7           # Geographic latitude (-90 to 90)
longitude = 13.2          # Geographic longitude (-180 to 180)
elevation = 20.0          # Meters over the sea

#[Color temperature]
day_temp = {day_temp}           # Kelvin while the sun is up (1000-20000)
night_temp = {night_temp}         # Kelvin after the transition (1000-20000)
transition_minutes = {transition} # Minutes after sunset to reach night_temp (5-480)

#[Brightness]
brightness_min = {bmin}         # Lowest auto brightness percent
brightness_max = {bmax}       # Ceiling while the sun is up
brightness_max_dark = {bdark}   # Ceiling after sunset
brightness_movie_min = {bmovie}  # Floor while movie mode is active
threshold_sun_up = {tup}        # Min percent change before actuating (day)
threshold_sun_down = {tdown}      # Min percent change before actuating (night)
stability_threshold = {stab}  # Max raw sample delta accepted as stable

#[Suppression]
disallowed_programs = ["mplayer", "smplayer", "vlc"]
camera_device = "/dev/video0"

#[Timing]
poll_interval = {poll}         # Seconds between polls (1-300)
startup_delay = 0         # Seconds to wait before the first poll

#[Manual overrides]
manual_brightness = [0, 15, 25, 35, 50, 75]
"#,
        day_temp = DEFAULT_DAY_TEMP,
        night_temp = DEFAULT_NIGHT_TEMP,
        transition = DEFAULT_TRANSITION_MINUTES,
        bmin = DEFAULT_BRIGHTNESS_MIN,
        bmax = DEFAULT_BRIGHTNESS_MAX,
        bdark = DEFAULT_BRIGHTNESS_MAX_DARK,
        bmovie = DEFAULT_BRIGHTNESS_MOVIE_MIN,
        tup = DEFAULT_THRESHOLD_SUN_UP,
        tdown = DEFAULT_THRESHOLD_SUN_DOWN,
        stab = DEFAULT_STABILITY_THRESHOLD,
        poll = DEFAULT_POLL_INTERVAL_SECS,
    );

    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write default config to {}", path.display()))?;
    log_block_start!("Created default configuration at {}", path.display());
    Ok(())
}

/// Comprehensive configuration validation to prevent impossible or
/// problematic setups.
pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(lat) = config.latitude
        && !(-90.0..=90.0).contains(&lat)
    {
        anyhow::bail!("latitude must be between -90 and 90 degrees (got {})", lat);
    }

    if let Some(lon) = config.longitude
        && !(-180.0..=180.0).contains(&lon)
    {
        anyhow::bail!(
            "longitude must be between -180 and 180 degrees (got {})",
            lon
        );
    }

    if config.latitude.is_some() != config.longitude.is_some() {
        anyhow::bail!("latitude and longitude must both be set (or both omitted)");
    }

    for (name, value) in [("day_temp", config.day_temp()), ("night_temp", config.night_temp())] {
        if !(MINIMUM_TEMP..=MAXIMUM_TEMP).contains(&value) {
            anyhow::bail!(
                "{} ({}) must be between {} and {} Kelvin",
                name,
                value,
                MINIMUM_TEMP,
                MAXIMUM_TEMP
            );
        }
    }

    if config.night_temp() > config.day_temp() {
        anyhow::bail!(
            "night_temp ({}) must not exceed day_temp ({})",
            config.night_temp(),
            config.day_temp()
        );
    }

    let transition = config.transition_minutes();
    if !(MINIMUM_TRANSITION_MINUTES..=MAXIMUM_TRANSITION_MINUTES).contains(&transition) {
        anyhow::bail!(
            "transition_minutes ({}) must be between {} and {} minutes",
            transition,
            MINIMUM_TRANSITION_MINUTES,
            MAXIMUM_TRANSITION_MINUTES
        );
    }

    let poll = config.poll_interval();
    if !(MINIMUM_POLL_INTERVAL_SECS..=MAXIMUM_POLL_INTERVAL_SECS).contains(&poll) {
        anyhow::bail!(
            "poll_interval ({} s) must be between {} and {} seconds",
            poll,
            MINIMUM_POLL_INTERVAL_SECS,
            MAXIMUM_POLL_INTERVAL_SECS
        );
    }

    if config.displays().is_empty() {
        anyhow::bail!("displays must list at least one display identifier");
    }

    for (name, value) in [
        ("brightness_max", config.brightness_max()),
        ("brightness_max_dark", config.brightness_max_dark()),
        ("brightness_movie_min", config.brightness_movie_min()),
    ] {
        if value > 100 {
            anyhow::bail!("{} ({}) must be at most 100 percent", name, value);
        }
    }

    if config.brightness_min() >= config.brightness_max_dark()
        || config.brightness_max_dark() > config.brightness_max()
    {
        anyhow::bail!(
            "brightness limits must satisfy min < max_dark <= max (got {} / {} / {})",
            config.brightness_min(),
            config.brightness_max_dark(),
            config.brightness_max()
        );
    }

    if config.stability_threshold() <= 0.0 || config.stability_threshold() >= LIGHT_SENSOR_FULL_SCALE
    {
        anyhow::bail!(
            "stability_threshold ({}) must be between 0 and {}",
            config.stability_threshold(),
            LIGHT_SENSOR_FULL_SCALE
        );
    }

    // Per-display presets must cover every configured display
    if let Some(presets) = &config.manual_brightness {
        let display_count = config.displays().len();
        for preset in presets {
            match preset {
                BrightnessPreset::Uniform(p) if *p > 100 => {
                    anyhow::bail!("manual_brightness value {} must be at most 100", p);
                }
                BrightnessPreset::PerDisplay(values) => {
                    if values.len() != display_count {
                        anyhow::bail!(
                            "per-display manual_brightness entry has {} values but {} displays are configured",
                            values.len(),
                            display_count
                        );
                    }
                    if let Some(p) = values.iter().find(|p| **p > 100) {
                        anyhow::bail!("manual_brightness value {} must be at most 100", p);
                    }
                }
                _ => {}
            }
        }
    }

    Ok(())
}
