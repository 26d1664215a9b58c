//! Sensor collaborator interfaces and their thin subprocess adapters.
//!
//! Two external inputs feed the control loop: an ambient light sensor
//! producing a small grayscale frame, and an activity probe answering
//! questions about running programs, the focused window, and camera
//! contention. Both are trait objects so the core components can be driven
//! by fakes in tests; the default implementations shell out to standard
//! tools and never let a subprocess failure escape as anything stronger
//! than "no reading this poll".

use anyhow::{Context, Result};
use std::process::Command;

use crate::constants::LIGHT_GRID_EDGE;

/// A downsampled grayscale frame from the light sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct LightFrame {
    pixels: Vec<u8>,
}

impl LightFrame {
    pub fn new(pixels: Vec<u8>) -> Self {
        Self { pixels }
    }

    /// Brightest pixel in the frame. The maximum (not the mean) is used so a
    /// dark letterboxed border cannot drag the reading down.
    pub fn max_intensity(&self) -> u8 {
        self.pixels.iter().copied().max().unwrap_or(0)
    }
}

/// Ambient light sensor producing one frame per call.
pub trait LightSensor {
    /// Take one sample. `Ok(None)` means the sensor produced no usable frame
    /// this poll (device busy, short read); `Err` means the capture itself
    /// could not be attempted. Both are treated as transient by the sampler.
    fn sample(&mut self) -> Result<Option<LightFrame>>;
}

/// Probe for contextual activity: process list, focused window, fullscreen
/// state, and camera contention.
pub trait ActivityProbe {
    /// Names/command lines of currently running programs.
    fn running_programs(&self) -> Result<Vec<String>>;

    /// Identifier of the currently focused window, if any.
    fn active_window(&self) -> Result<Option<String>>;

    /// Whether the given window advertises the fullscreen state. An `Err`
    /// usually means the window no longer exists.
    fn is_fullscreen(&self, window_id: &str) -> Result<bool>;

    /// Whether another process currently holds the camera device.
    fn is_camera_busy(&self) -> bool;
}

/// Light sensor backed by a one-shot ffmpeg capture from a V4L2 device.
///
/// Grabs a single frame scaled down to a small grayscale grid and reads the
/// raw bytes from stdout. Capture is deliberately outside the crate's
/// competence; this adapter only turns the subprocess output into a
/// `LightFrame`.
pub struct CameraSensor {
    device: String,
}

impl CameraSensor {
    pub fn new(device: String) -> Self {
        Self { device }
    }
}

impl LightSensor for CameraSensor {
    fn sample(&mut self) -> Result<Option<LightFrame>> {
        let edge = LIGHT_GRID_EDGE;
        let output = Command::new("ffmpeg")
            .args([
                "-loglevel",
                "error",
                "-f",
                "v4l2",
                "-i",
                &self.device,
                "-vframes",
                "1",
                "-vf",
                &format!("scale={edge}:{edge}"),
                "-pix_fmt",
                "gray",
                "-f",
                "rawvideo",
                "-",
            ])
            .output()
            .context("failed to spawn ffmpeg for camera capture")?;

        let expected = (edge * edge) as usize;
        if !output.status.success() || output.stdout.len() < expected {
            return Ok(None);
        }

        Ok(Some(LightFrame::new(output.stdout[..expected].to_vec())))
    }
}

/// Activity probe backed by `ps`, `xprop`, and `fuser`.
pub struct X11Probe {
    camera_device: String,
}

impl X11Probe {
    pub fn new(camera_device: String) -> Self {
        Self { camera_device }
    }
}

impl ActivityProbe for X11Probe {
    fn running_programs(&self) -> Result<Vec<String>> {
        let output = Command::new("ps")
            .args(["-eo", "comm="])
            .output()
            .context("failed to run ps")?;
        if !output.status.success() {
            anyhow::bail!("ps exited with {}", output.status);
        }
        let listing = String::from_utf8_lossy(&output.stdout);
        Ok(listing.lines().map(|l| l.trim().to_string()).collect())
    }

    fn active_window(&self) -> Result<Option<String>> {
        let output = Command::new("xprop")
            .args(["-root", "_NET_ACTIVE_WINDOW"])
            .output()
            .context("failed to run xprop")?;
        if !output.status.success() {
            anyhow::bail!("xprop exited with {}", output.status);
        }
        let text = String::from_utf8_lossy(&output.stdout);
        // Output looks like: _NET_ACTIVE_WINDOW(WINDOW): window id # 0x3400007
        let id = text
            .rsplit_once("# ")
            .map(|(_, id)| id.trim().to_string())
            .filter(|id| id.starts_with("0x") && id.len() > 3);
        Ok(id)
    }

    fn is_fullscreen(&self, window_id: &str) -> Result<bool> {
        let output = Command::new("xprop")
            .args(["-id", window_id, "_NET_WM_STATE"])
            .output()
            .context("failed to run xprop")?;
        if !output.status.success() {
            anyhow::bail!("window {} query failed", window_id);
        }
        let text = String::from_utf8_lossy(&output.stdout);
        Ok(text.contains("_NET_WM_STATE_FULLSCREEN"))
    }

    fn is_camera_busy(&self) -> bool {
        // fuser prints holder PIDs on stdout and exits 0 when the device is
        // open; our own capture is one-shot so any holder is another app.
        match Command::new("fuser").arg(&self.camera_device).output() {
            Ok(output) => {
                let own_pid = std::process::id().to_string();
                String::from_utf8_lossy(&output.stdout)
                    .split_whitespace()
                    .any(|pid| pid != own_pid)
            }
            // Probe failure counts as not busy: we would rather take a
            // sample than silently stop adjusting.
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_intensity_picks_brightest_pixel() {
        let frame = LightFrame::new(vec![3, 200, 17, 44]);
        assert_eq!(frame.max_intensity(), 200);
    }

    #[test]
    fn max_intensity_of_empty_frame_is_zero() {
        let frame = LightFrame::new(vec![]);
        assert_eq!(frame.max_intensity(), 0);
    }

    #[test]
    fn dark_border_does_not_drag_reading_down() {
        // A mostly dark frame with one bright region still reads bright
        let mut pixels = vec![5u8; 63];
        pixels.push(240);
        assert_eq!(LightFrame::new(pixels).max_intensity(), 240);
    }
}
