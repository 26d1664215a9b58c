//! Contextual activity monitoring for suppression decisions.
//!
//! Classifies each poll as normal or suppressed. Suppression fires when a
//! disallowed program is running, when any tracked window is fullscreen, or
//! when another application holds the light sensor's camera. Probe failures
//! fail open toward "not suppressed": a broken probe should never pin the
//! screen in movie mode.

use std::collections::HashSet;

use crate::sensor::ActivityProbe;

/// Snapshot of the current activity context, recomputed every poll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Activity {
    /// Movie-mode-like behavior should be in effect
    pub suppressed: bool,
    /// Another application holds the camera; skip light sampling
    pub sensor_busy: bool,
}

/// Tracks fullscreen windows and disallowed programs across polls.
pub struct ActivityMonitor {
    probe: Box<dyn ActivityProbe>,
    disallowed_programs: Vec<String>,
    /// Window ids currently known to be fullscreen, pruned every poll
    fullscreen_windows: HashSet<String>,
}

impl ActivityMonitor {
    pub fn new(probe: Box<dyn ActivityProbe>, disallowed_programs: Vec<String>) -> Self {
        Self {
            probe,
            disallowed_programs,
            fullscreen_windows: HashSet::new(),
        }
    }

    /// Recompute the activity snapshot for this poll.
    pub fn poll(&mut self) -> Activity {
        let sensor_busy = self.probe.is_camera_busy();
        let disallowed_running = self.disallowed_program_running();
        self.track_fullscreen();

        Activity {
            suppressed: disallowed_running || !self.fullscreen_windows.is_empty() || sensor_busy,
            sensor_busy,
        }
    }

    fn disallowed_program_running(&self) -> bool {
        let programs = match self.probe.running_programs() {
            Ok(programs) => programs,
            Err(e) => {
                log_warning!("Program listing failed: {e}");
                return false;
            }
        };
        self.disallowed_programs
            .iter()
            .any(|pattern| programs.iter().any(|name| name.contains(pattern)))
    }

    /// Prune stale entries, then test the currently focused window.
    ///
    /// A tracked window whose fullscreen query fails (usually: the window
    /// closed) is dropped, so a finished movie stops suppressing within one
    /// poll.
    fn track_fullscreen(&mut self) {
        let probe = &self.probe;
        self.fullscreen_windows
            .retain(|id| probe.is_fullscreen(id).unwrap_or(false));

        let focused = match self.probe.active_window() {
            Ok(Some(id)) => id,
            // No focused window, or a malformed id: nothing to track
            Ok(None) => return,
            Err(e) => {
                log_warning!("Active window query failed: {e}");
                return;
            }
        };

        if self.probe.is_fullscreen(&focused).unwrap_or(false)
            && self.fullscreen_windows.insert(focused)
        {
            log_decorated!("Fullscreen window found");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    /// Probe fake with mutable shared state so tests can change the world
    /// between polls.
    #[derive(Default)]
    struct FakeWorld {
        programs: Vec<String>,
        focused: Option<String>,
        /// window id -> fullscreen flag; missing id means the query fails
        windows: HashMap<String, bool>,
        camera_busy: bool,
    }

    struct FakeProbe {
        world: Rc<RefCell<FakeWorld>>,
    }

    impl ActivityProbe for FakeProbe {
        fn running_programs(&self) -> Result<Vec<String>> {
            Ok(self.world.borrow().programs.clone())
        }

        fn active_window(&self) -> Result<Option<String>> {
            Ok(self.world.borrow().focused.clone())
        }

        fn is_fullscreen(&self, window_id: &str) -> Result<bool> {
            self.world
                .borrow()
                .windows
                .get(window_id)
                .copied()
                .ok_or_else(|| anyhow::anyhow!("window {} gone", window_id))
        }

        fn is_camera_busy(&self) -> bool {
            self.world.borrow().camera_busy
        }
    }

    fn monitor() -> (ActivityMonitor, Rc<RefCell<FakeWorld>>) {
        let world = Rc::new(RefCell::new(FakeWorld::default()));
        let probe = FakeProbe {
            world: world.clone(),
        };
        let monitor = ActivityMonitor::new(
            Box::new(probe),
            vec!["mplayer".to_string(), "vlc".to_string()],
        );
        (monitor, world)
    }

    #[test]
    fn idle_context_is_not_suppressed() {
        let (mut monitor, _world) = monitor();
        assert_eq!(
            monitor.poll(),
            Activity {
                suppressed: false,
                sensor_busy: false
            }
        );
    }

    #[test]
    fn disallowed_program_suppresses() {
        let (mut monitor, world) = monitor();
        world.borrow_mut().programs = vec!["bash".to_string(), "vlc".to_string()];
        assert!(monitor.poll().suppressed);
    }

    #[test]
    fn pattern_matches_inside_command_name() {
        let (mut monitor, world) = monitor();
        world.borrow_mut().programs = vec!["/usr/bin/mplayer-wrapped".to_string()];
        assert!(monitor.poll().suppressed);
    }

    #[test]
    fn fullscreen_window_suppresses_until_it_leaves_fullscreen() {
        let (mut monitor, world) = monitor();
        {
            let mut w = world.borrow_mut();
            w.focused = Some("0x3400007".to_string());
            w.windows.insert("0x3400007".to_string(), true);
        }
        assert!(monitor.poll().suppressed);

        // Window leaves fullscreen; focus moved elsewhere
        {
            let mut w = world.borrow_mut();
            w.windows.insert("0x3400007".to_string(), false);
            w.focused = None;
        }
        assert!(!monitor.poll().suppressed);
    }

    #[test]
    fn closed_window_is_pruned_from_tracking() {
        let (mut monitor, world) = monitor();
        {
            let mut w = world.borrow_mut();
            w.focused = Some("0xdead".to_string());
            w.windows.insert("0xdead".to_string(), true);
        }
        assert!(monitor.poll().suppressed);

        // Window closed between polls: the fullscreen query now fails
        {
            let mut w = world.borrow_mut();
            w.windows.remove("0xdead");
            w.focused = None;
        }
        assert!(!monitor.poll().suppressed);
    }

    #[test]
    fn tracking_outlives_focus_changes() {
        let (mut monitor, world) = monitor();
        {
            let mut w = world.borrow_mut();
            w.focused = Some("0x1".to_string());
            w.windows.insert("0x1".to_string(), true);
        }
        assert!(monitor.poll().suppressed);

        // Focus moves to a normal window while the movie keeps playing
        {
            let mut w = world.borrow_mut();
            w.focused = Some("0x2".to_string());
            w.windows.insert("0x2".to_string(), false);
        }
        assert!(monitor.poll().suppressed);
    }

    #[test]
    fn camera_contention_suppresses_and_flags_sensor_busy() {
        let (mut monitor, world) = monitor();
        world.borrow_mut().camera_busy = true;
        assert_eq!(
            monitor.poll(),
            Activity {
                suppressed: true,
                sensor_busy: true
            }
        );
    }
}
