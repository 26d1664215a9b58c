//! Signal handling for graceful shutdown and manual brightness control.
//!
//! SIGINT/SIGTERM/SIGHUP clear the shared `running` flag so the control loop
//! drains and exits cleanly. SIGUSR1 re-enables automatic brightness after a
//! manual override; SIGUSR2 cycles through the configured manual presets, so
//! a hotkey daemon without a payload channel can still drive overrides.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM, SIGUSR1, SIGUSR2},
    iterator::Signals,
};
use std::{
    sync::Arc,
    sync::atomic::{AtomicBool, Ordering},
    sync::mpsc::Sender,
    thread,
};

use crate::core::brightness::ManualBrightness;
use crate::overrides::ManualEvent;

/// Signal handling state shared between threads.
pub struct SignalState {
    /// Atomic flag indicating if the application should keep running
    pub running: Arc<AtomicBool>,
}

/// Install the signal handler thread.
///
/// The returned state owns the `running` flag the control loop watches.
/// Override events triggered by signals go out through `override_sender`;
/// each SIGUSR2 sends the next entry of `presets` (wrapping around).
pub fn setup_signal_handler(
    override_sender: Sender<ManualEvent>,
    presets: Vec<ManualBrightness>,
    debug_enabled: bool,
) -> Result<SignalState> {
    let running = Arc::new(AtomicBool::new(true));

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP, SIGUSR1, SIGUSR2])
        .context("failed to register signal handlers")?;

    let running_clone = running.clone();
    thread::spawn(move || {
        let mut next_preset = 0usize;
        for sig in signals.forever() {
            match sig {
                SIGINT | SIGTERM | SIGHUP => {
                    if debug_enabled {
                        log_pipe!();
                        log_debug!("Received shutdown signal {sig}");
                    }
                    running_clone.store(false, Ordering::SeqCst);
                    break;
                }
                SIGUSR1 => {
                    if debug_enabled {
                        log_pipe!();
                        log_debug!("Received SIGUSR1, re-enabling auto brightness");
                    }
                    // Loop gone means shutdown is in progress; nothing to do
                    if override_sender.send(ManualEvent::EnableAuto).is_err() {
                        break;
                    }
                }
                SIGUSR2 => {
                    if presets.is_empty() {
                        log_warning!("SIGUSR2 received but no manual presets configured");
                        continue;
                    }
                    let preset = presets[next_preset].clone();
                    next_preset = (next_preset + 1) % presets.len();
                    if debug_enabled {
                        log_pipe!();
                        log_debug!("Received SIGUSR2, applying preset {preset:?}");
                    }
                    if override_sender
                        .send(ManualEvent::SetBrightness(preset))
                        .is_err()
                    {
                        break;
                    }
                }
                _ => unreachable!(),
            }
        }
    });

    Ok(SignalState { running })
}
