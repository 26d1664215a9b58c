//! Actuator collaborator interfaces and their subprocess adapters.
//!
//! Actuation is fire-and-forget: a failed hardware call is logged by the
//! caller and retried naturally on the next divergence, never rolled back.

use anyhow::{Context, Result};
use std::process::Command;

/// Sets the backlight/luminance of a single display.
pub trait BrightnessActuator {
    fn set_brightness(&mut self, display: &str, percent: u8) -> Result<()>;
}

/// Sets the whole-screen color temperature.
pub trait ColorActuator {
    fn set_temperature(&mut self, kelvin: i32) -> Result<()>;
}

/// DDC/CI brightness control via `ddcutil setvcp 10`.
pub struct DdcActuator;

impl BrightnessActuator for DdcActuator {
    fn set_brightness(&mut self, display: &str, percent: u8) -> Result<()> {
        // output() rather than status() so subprocess chatter stays out of
        // the structured log
        let output = Command::new("ddcutil")
            .args(["-d", display, "setvcp", "10", &percent.to_string()])
            .output()
            .context("failed to spawn ddcutil")?;
        if !output.status.success() {
            anyhow::bail!("ddcutil exited with {} for display {}", output.status, display);
        }
        Ok(())
    }
}

/// Color temperature control via `redshift -P -O`.
pub struct RedshiftActuator;

impl ColorActuator for RedshiftActuator {
    fn set_temperature(&mut self, kelvin: i32) -> Result<()> {
        let output = Command::new("redshift")
            .args(["-P", "-O", &kelvin.to_string()])
            .output()
            .context("failed to spawn redshift")?;
        if !output.status.success() {
            anyhow::bail!("redshift exited with {}", output.status);
        }
        Ok(())
    }
}
