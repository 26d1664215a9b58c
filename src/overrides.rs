//! Manual brightness override events from external sources.
//!
//! Hotkey capture lives outside this process; an external daemon (or the
//! SIGUSR1 handler) feeds discrete events into the control loop through a
//! channel. Receiving a brightness event switches the brightness controller
//! to manual mode until auto mode is explicitly re-enabled.

use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};

use crate::core::brightness::ManualBrightness;

/// A discrete override event.
#[derive(Debug, Clone, PartialEq)]
pub enum ManualEvent {
    /// Apply a manual brightness level and leave auto mode
    SetBrightness(ManualBrightness),
    /// Return to automatic brightness control
    EnableAuto,
}

/// Source of manual override events, polled once per loop iteration.
pub trait ManualOverrideSource {
    /// Next pending event, if any. Must not block.
    fn poll(&mut self) -> Option<ManualEvent>;
}

/// Channel-backed override source.
///
/// The sender half is handed to whatever produces events (signal handler,
/// IPC shim for a hotkey daemon); the control loop drains the receiver at
/// the top of every poll.
pub struct ChannelOverrideSource {
    receiver: Receiver<ManualEvent>,
}

impl ChannelOverrideSource {
    pub fn new() -> (Self, Sender<ManualEvent>) {
        let (sender, receiver) = channel();
        (Self { receiver }, sender)
    }
}

impl ManualOverrideSource for ChannelOverrideSource {
    fn poll(&mut self) -> Option<ManualEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}
