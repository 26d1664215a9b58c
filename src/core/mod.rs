//! Core control loop and state management.
//!
//! This module encapsulates the main logic of ambientr: the continuous
//! polling loop that pulls fresh readings from the sun tracker, light
//! sampler, and activity monitor, routes them into the brightness and color
//! controllers, and forwards the resulting setpoints to the actuators. It
//! handles:
//!
//! - Manual override events (hotkey daemon / SIGUSR1)
//! - Suppression routing into movie mode
//! - Day/night ceiling selection from sunset state
//! - Loop-boundary error containment: a single failed poll never
//!   terminates the process

pub mod activity;
pub mod brightness;
pub mod color;
pub mod light;
pub mod sun;

use anyhow::Result;
use std::sync::atomic::Ordering;
use std::time::Duration;

use crate::{
    core::{
        activity::ActivityMonitor, brightness::BrightnessController,
        color::ColorTemperatureController, light::LightSampler, sun::SunTracker,
    },
    overrides::{ManualEvent, ManualOverrideSource},
    signals::SignalState,
};

/// Parameters for creating a Core instance.
///
/// Bundles all the dependencies needed to create a Core, following the
/// idiomatic pattern to avoid functions with too many parameters.
pub struct CoreParams {
    pub sun: SunTracker,
    pub sampler: LightSampler,
    pub activity: ActivityMonitor,
    pub brightness: BrightnessController,
    pub color: ColorTemperatureController,
    pub overrides: Box<dyn ManualOverrideSource>,
    pub signal_state: SignalState,
    pub poll_interval: Duration,
    pub debug_enabled: bool,
}

/// The control loop orchestrator.
///
/// Owns every piece of mutable controller state; all of it is touched only
/// from the loop thread, so no locking is needed.
pub struct Core {
    sun: SunTracker,
    sampler: LightSampler,
    activity: ActivityMonitor,
    brightness: BrightnessController,
    color: ColorTemperatureController,
    overrides: Box<dyn ManualOverrideSource>,
    signal_state: SignalState,
    poll_interval: Duration,
    debug_enabled: bool,
}

impl Core {
    pub fn new(params: CoreParams) -> Self {
        Self {
            sun: params.sun,
            sampler: params.sampler,
            activity: params.activity,
            brightness: params.brightness,
            color: params.color,
            overrides: params.overrides,
            signal_state: params.signal_state,
            poll_interval: params.poll_interval,
            debug_enabled: params.debug_enabled,
        }
    }

    /// Run the control loop until a shutdown signal arrives.
    pub fn execute(mut self) -> Result<()> {
        log_block_start!(
            "Entering control loop (poll interval: {}s)",
            self.poll_interval.as_secs()
        );
        log_indented!(
            "Sunset today at {} UTC",
            self.sun.sunset_utc().format("%H:%M:%S")
        );

        while self.signal_state.running.load(Ordering::SeqCst) {
            // Unknown errors are contained at the loop boundary; the fixed
            // poll interval is the retry cadence
            if let Err(e) = self.poll() {
                log_pipe!();
                log_error!("Poll failed: {e:#}");
            }
            self.sleep_until_next_poll();
        }

        log_block_start!("Shutting down ambientr...");
        log_end!();
        Ok(())
    }

    /// One control loop iteration.
    fn poll(&mut self) -> Result<()> {
        while let Some(event) = self.overrides.poll() {
            match event {
                ManualEvent::SetBrightness(level) => self.brightness.set_manual(level),
                ManualEvent::EnableAuto => self.brightness.set_auto(true),
            }
        }

        let activity = self.activity.poll();
        self.sampler.update(activity.sensor_busy);
        self.sun.update();

        self.brightness.set_movie_mode(activity.suppressed);
        self.brightness.set_dark_outside(self.sun.is_past_sunset());

        match self.sampler.normalized() {
            Some(lux) => {
                if self.debug_enabled {
                    log_debug!(
                        "lux={:.3} suppressed={} minutes_to_sunset={:.1}",
                        lux,
                        activity.suppressed,
                        self.sun.minutes_until_sunset()
                    );
                }
                self.brightness.compute_and_apply(lux);
            }
            // No stable reading yet: skip brightness actuation this poll
            None => {
                if self.debug_enabled {
                    log_debug!("No stable light reading yet");
                }
            }
        }

        self.color.update(self.sun.minutes_since_sunset());
        Ok(())
    }

    /// Sleep one poll interval in short slices so shutdown stays responsive.
    fn sleep_until_next_poll(&self) {
        let slice = Duration::from_millis(100);
        let mut remaining = self.poll_interval;
        while !remaining.is_zero() && self.signal_state.running.load(Ordering::SeqCst) {
            let chunk = remaining.min(slice);
            std::thread::sleep(chunk);
            remaining -= chunk;
        }
    }
}
