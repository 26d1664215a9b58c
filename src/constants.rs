//! Application-wide constants and default configuration values.
//!
//! Defaults are applied when the corresponding field is absent from
//! `ambientr.toml`; the `MINIMUM_*`/`MAXIMUM_*` pairs bound what the
//! configuration validator accepts.

/// Default color temperature while the sun is up (Kelvin)
pub const DEFAULT_DAY_TEMP: u32 = 6500;
/// Default color temperature after the night transition completes (Kelvin)
pub const DEFAULT_NIGHT_TEMP: u32 = 2800;
/// Default minutes after sunset over which color temperature shifts to night
pub const DEFAULT_TRANSITION_MINUTES: u32 = 120;
/// Minimum allowed color temperature (Kelvin)
pub const MINIMUM_TEMP: u32 = 1000;
/// Maximum allowed color temperature (Kelvin)
pub const MAXIMUM_TEMP: u32 = 20000;
/// Transition duration bounds in minutes
pub const MINIMUM_TRANSITION_MINUTES: u32 = 5;
pub const MAXIMUM_TRANSITION_MINUTES: u32 = 480;

/// Kelvin moved per fade tick (7000 K/s at the default tick interval)
pub const COLOR_STEP_KELVIN: f64 = 70.0;
/// Sleep between fade ticks in milliseconds
pub const COLOR_STEP_INTERVAL_MS: u64 = 10;

/// Default seconds between control loop polls
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 3;
pub const MINIMUM_POLL_INTERVAL_SECS: u64 = 1;
pub const MAXIMUM_POLL_INTERVAL_SECS: u64 = 300;

/// Default seconds to wait before the first poll (lets the session settle)
pub const DEFAULT_STARTUP_DELAY_SECS: u64 = 0;

/// Lowest auto brightness percentage
pub const DEFAULT_BRIGHTNESS_MIN: u8 = 5;
/// Brightness ceiling while the sun is up
pub const DEFAULT_BRIGHTNESS_MAX: u8 = 100;
/// Brightness ceiling after sunset. A screen that is comfortable at full
/// ambient light is overly bright at night regardless of measured lux.
pub const DEFAULT_BRIGHTNESS_MAX_DARK: u8 = 70;
/// Floor applied to auto brightness while movie mode is active
pub const DEFAULT_BRIGHTNESS_MOVIE_MIN: u8 = 50;
/// Minimum percent change before actuating while the sun is up
pub const DEFAULT_THRESHOLD_SUN_UP: u8 = 7;
/// Minimum percent change before actuating after sunset. Smaller: finer
/// adjustments matter more when the usable range is narrow.
pub const DEFAULT_THRESHOLD_SUN_DOWN: u8 = 5;

/// Allowed brightness percentages sent to the actuator, ascending.
/// Quantization scans this in order and keeps the first-found minimum
/// difference, so exact midpoints resolve to the lower value.
pub const BRIGHTNESS_CLAMP_GRID: [u8; 11] = [0, 10, 20, 30, 40, 50, 60, 70, 80, 90, 100];

/// Sentinel for "no brightness applied yet"; forces an initial actuation
/// on the first qualifying change after startup or a manual override.
pub const BRIGHTNESS_UNSET: i32 = -100;

/// Maximum raw delta between consecutive camera samples for the new sample
/// to be trusted (raw scale is 0-255; larger jumps are single-frame spikes
/// such as lens glare)
pub const DEFAULT_STABILITY_THRESHOLD: f64 = 20.0;
/// Raw sensor full-scale value used for normalization
pub const LIGHT_SENSOR_FULL_SCALE: f64 = 256.0;

/// Default observer elevation in meters over the sea
pub const DEFAULT_ELEVATION: f64 = 20.0;

/// Default camera device consulted for ambient light and contention checks
pub const DEFAULT_CAMERA_DEVICE: &str = "/dev/video0";

/// Programs whose presence suppresses automatic dimming
pub const DEFAULT_DISALLOWED_PROGRAMS: [&str; 3] = ["mplayer", "smplayer", "vlc"];

/// Downsample grid edge for camera frames (grid is EDGE x EDGE pixels)
pub const LIGHT_GRID_EDGE: u32 = 8;

/// Process exit code for unrecoverable startup failure
pub const EXIT_FAILURE: i32 = 1;
