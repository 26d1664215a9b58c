//! Application coordinator that manages the complete lifecycle of ambientr.
//!
//! Handles resource acquisition, initialization, and orchestration of the
//! core control loop:
//! - Optional startup delay (lets the desktop session settle)
//! - Configuration loading
//! - Sensor/actuator adapter construction
//! - Signal handler setup
//! - Control loop execution
//!
//! The `Ambientr` struct uses a builder pattern so different startup
//! contexts can tweak behavior before calling `run()`.

use anyhow::{Context, Result};
use std::time::Duration;

use crate::{
    actuator::{DdcActuator, RedshiftActuator},
    config::Config,
    constants::EXIT_FAILURE,
    core::{
        Core, CoreParams, activity::ActivityMonitor, brightness::BrightnessController,
        color::ColorTemperatureController, light::LightSampler, sun::SunTracker,
    },
    overrides::ChannelOverrideSource,
    sensor::{CameraSensor, X11Probe},
    signals::setup_signal_handler,
};

/// Builder for configuring and running the ambientr daemon.
pub struct Ambientr {
    debug_enabled: bool,
    startup_delay: Option<u64>,
    show_headers: bool,
}

impl Ambientr {
    /// Create a new runner with defaults matching a normal run.
    pub fn new(debug_enabled: bool) -> Self {
        Self {
            debug_enabled,
            startup_delay: None,
            show_headers: true,
        }
    }

    /// Override the configured startup delay (seconds).
    pub fn with_startup_delay(mut self, seconds: u64) -> Self {
        self.startup_delay = Some(seconds);
        self
    }

    /// Skip the header display (for scripted invocations).
    pub fn without_headers(mut self) -> Self {
        self.show_headers = false;
        self
    }

    /// Execute the daemon with the configured settings.
    ///
    /// Loads configuration, establishes the initial sun state (fatal on
    /// failure), wires up the component graph, and runs the control loop
    /// until an external signal stops it.
    pub fn run(self) -> Result<()> {
        if self.show_headers {
            log_version!();
        }

        let config = match Config::load() {
            Ok(config) => config,
            Err(e) => {
                log_error_exit!("Configuration failed");
                eprintln!("{e:?}");
                std::process::exit(EXIT_FAILURE);
            }
        };
        config.log_config();

        let delay = self.startup_delay.unwrap_or_else(|| config.startup_delay());
        if delay > 0 {
            log_block_start!("Waiting {}s before first poll...", delay);
            std::thread::sleep(Duration::from_secs(delay));
        }

        // The initial sun state is a startup precondition: without it the
        // process cannot reason about day and night
        let sun = SunTracker::new(&config).context("Failed to establish initial sun state")?;

        let presets = config
            .manual_brightness
            .clone()
            .unwrap_or_default()
            .into_iter()
            .map(Into::into)
            .collect();
        let (override_source, override_sender) = ChannelOverrideSource::new();
        let signal_state = setup_signal_handler(override_sender, presets, self.debug_enabled)?;

        let camera_device = config.camera_device();
        let sampler = LightSampler::new(
            Box::new(CameraSensor::new(camera_device.clone())),
            config.stability_threshold(),
        );
        let activity = ActivityMonitor::new(
            Box::new(X11Probe::new(camera_device)),
            config.disallowed_programs(),
        );
        let brightness = BrightnessController::new(Box::new(DdcActuator), &config);
        let color = ColorTemperatureController::new(Box::new(RedshiftActuator), &config);

        let core = Core::new(CoreParams {
            sun,
            sampler,
            activity,
            brightness,
            color,
            overrides: Box::new(override_source),
            signal_state,
            poll_interval: Duration::from_secs(config.poll_interval()),
            debug_enabled: self.debug_enabled,
        });

        core.execute()
    }
}
