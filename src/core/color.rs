//! Color temperature control driven by sunset proximity.
//!
//! The target temperature is a pure function of minutes since sunset: day
//! temperature before sunset, night temperature once the transition window
//! has passed, and a linear interpolation in between. Actuation never jumps:
//! the screen temperature walks toward the target in bounded per-tick steps
//! so the shift is imperceptible.
//!
//! `step_toward` is the tick operation; `fade_to` drives it to completion
//! with a sleep per tick inside the triggering call. Blocking the control
//! loop for the duration of a fade is an accepted trade-off at these
//! human-perceptible timescales.

use std::time::Duration;

use crate::actuator::ColorActuator;
use crate::config::Config;
use crate::constants::{COLOR_STEP_INTERVAL_MS, COLOR_STEP_KELVIN};

/// Stepping state machine converging the screen temperature on a target.
pub struct ColorTemperatureController {
    actuator: Box<dyn ColorActuator>,
    day_temp: f64,
    night_temp: f64,
    transition_minutes: f64,
    step_kelvin: f64,
    step_interval: Duration,

    enabled: bool,
    /// Last computed target; `enable()` resumes toward this
    target: f64,
    /// Temperature currently on screen (as far as we know)
    actual: f64,
}

impl ColorTemperatureController {
    pub fn new(actuator: Box<dyn ColorActuator>, config: &Config) -> Self {
        Self::with_stepping(
            actuator,
            config,
            COLOR_STEP_KELVIN,
            Duration::from_millis(COLOR_STEP_INTERVAL_MS),
        )
    }

    pub fn with_stepping(
        actuator: Box<dyn ColorActuator>,
        config: &Config,
        step_kelvin: f64,
        step_interval: Duration,
    ) -> Self {
        let day_temp = config.day_temp() as f64;
        // Start slightly off the day value so the first update performs a
        // short visible fade onto the real target
        let unset = day_temp - 500.0;
        Self {
            actuator,
            day_temp,
            night_temp: config.night_temp() as f64,
            transition_minutes: config.transition_minutes() as f64,
            step_kelvin,
            step_interval,
            enabled: true,
            target: unset,
            actual: unset,
        }
    }

    /// Target temperature for the given sunset proximity
    /// (negative = before sunset).
    pub fn target_for(&self, minutes_since_sunset: f64) -> f64 {
        if minutes_since_sunset < 0.0 {
            self.day_temp
        } else if minutes_since_sunset < self.transition_minutes {
            let fraction =
                (self.transition_minutes - minutes_since_sunset) / self.transition_minutes;
            self.night_temp + fraction * (self.day_temp - self.night_temp)
        } else {
            self.night_temp
        }
    }

    /// Recompute the target from sunset proximity and fade toward it.
    pub fn update(&mut self, minutes_since_sunset: f64) {
        if !self.enabled {
            return;
        }
        let target = self.target_for(minutes_since_sunset);
        self.target = target;
        self.fade_to(target);
    }

    /// One tick: move `actual` a single bounded step toward `target`,
    /// issuing one actuator call. Returns `true` while more ticks are
    /// needed; snaps exactly to the target when within one step of it.
    pub fn step_toward(&mut self, target: f64) -> bool {
        let diff = target - self.actual;
        if diff == 0.0 {
            return false;
        }
        if diff.abs() <= self.step_kelvin {
            self.apply(target);
            return false;
        }
        let step = if diff < 0.0 {
            -self.step_kelvin
        } else {
            self.step_kelvin
        };
        let next = self.actual + step;
        self.apply(next);
        true
    }

    /// Drive `step_toward` to completion, sleeping one tick interval between
    /// steps. Blocks the caller until the screen reaches the target.
    fn fade_to(&mut self, target: f64) {
        if (target - self.actual).abs() < f64::EPSILON {
            return;
        }
        log_decorated!(
            "Shifting color temperature {}K → {}K",
            self.actual.round() as i64,
            target.round() as i64
        );
        while self.step_toward(target) {
            std::thread::sleep(self.step_interval);
        }
    }

    /// Force day temperature via the same gradual path and stop following
    /// sunset updates.
    pub fn disable(&mut self) {
        self.enabled = false;
        let day = self.day_temp;
        self.fade_to(day);
    }

    /// Resume toward the last computed target.
    pub fn enable(&mut self) {
        self.enabled = true;
        let target = self.target;
        self.fade_to(target);
    }

    /// Temperature currently on screen.
    pub fn actual_kelvin(&self) -> f64 {
        self.actual
    }

    fn apply(&mut self, kelvin: f64) {
        self.actual = kelvin;
        if let Err(e) = self.actuator.set_temperature(kelvin.round() as i32) {
            log_warning!("Failed to set color temperature: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorder {
        calls: Rc<RefCell<Vec<i32>>>,
    }

    impl ColorActuator for Recorder {
        fn set_temperature(&mut self, kelvin: i32) -> Result<()> {
            self.calls.borrow_mut().push(kelvin);
            Ok(())
        }
    }

    fn controller() -> (ColorTemperatureController, Rc<RefCell<Vec<i32>>>) {
        let recorder = Recorder::default();
        let calls = recorder.calls.clone();
        let config = Config::default(); // 6500 K day, 2800 K night, 120 min
        (
            ColorTemperatureController::with_stepping(
                Box::new(recorder),
                &config,
                70.0,
                Duration::ZERO,
            ),
            calls,
        )
    }

    #[test]
    fn target_is_day_before_sunset() {
        let (ctrl, _) = controller();
        assert_eq!(ctrl.target_for(-45.0), 6500.0);
        assert_eq!(ctrl.target_for(-0.01), 6500.0);
    }

    #[test]
    fn target_is_night_after_transition() {
        let (ctrl, _) = controller();
        assert_eq!(ctrl.target_for(120.0), 2800.0);
        assert_eq!(ctrl.target_for(600.0), 2800.0);
    }

    #[test]
    fn target_at_half_transition_is_the_midpoint() {
        // 60 minutes into a 120 minute transition: exact day/night midpoint
        let (ctrl, _) = controller();
        assert_eq!(ctrl.target_for(60.0), 2800.0 + 0.5 * (6500.0 - 2800.0));
    }

    #[test]
    fn target_interpolates_linearly() {
        let (ctrl, _) = controller();
        let quarter = ctrl.target_for(30.0);
        assert_eq!(quarter, 2800.0 + 0.75 * 3700.0);
    }

    #[test]
    fn stepping_converges_without_overshoot() {
        let (mut ctrl, calls) = controller();
        // actual starts at 6000 (day - 500)
        let mut ticks = 0;
        while ctrl.step_toward(6500.0) {
            ticks += 1;
            assert!(ctrl.actual_kelvin() <= 6500.0, "overshot the target");
        }
        assert_eq!(ctrl.actual_kelvin(), 6500.0);
        // 500 K at 70 K per tick: 7 full steps plus the snap
        assert_eq!(ticks, 7);
        assert_eq!(calls.borrow().len(), 8);
        assert_eq!(*calls.borrow().last().unwrap(), 6500);
    }

    #[test]
    fn stepping_downward_is_monotonic() {
        let (mut ctrl, calls) = controller();
        while ctrl.step_toward(2800.0) {}
        assert_eq!(ctrl.actual_kelvin(), 2800.0);
        let recorded = calls.borrow();
        for pair in recorded.windows(2) {
            assert!(pair[1] <= pair[0], "fade reversed direction");
        }
    }

    #[test]
    fn update_fades_to_the_computed_target() {
        let (mut ctrl, calls) = controller();
        ctrl.update(-30.0); // day
        assert_eq!(ctrl.actual_kelvin(), 6500.0);
        assert_eq!(*calls.borrow().last().unwrap(), 6500);
    }

    #[test]
    fn update_at_exact_target_is_quiet() {
        let (mut ctrl, calls) = controller();
        ctrl.update(-30.0);
        calls.borrow_mut().clear();
        ctrl.update(-20.0); // still day, nothing to do
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn disable_forces_day_and_ignores_updates() {
        let (mut ctrl, calls) = controller();
        ctrl.update(300.0); // night
        assert_eq!(ctrl.actual_kelvin(), 2800.0);

        ctrl.disable();
        assert_eq!(ctrl.actual_kelvin(), 6500.0);
        calls.borrow_mut().clear();

        ctrl.update(300.0);
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn enable_resumes_toward_last_target() {
        let (mut ctrl, _calls) = controller();
        ctrl.update(300.0); // night target remembered
        ctrl.disable();
        assert_eq!(ctrl.actual_kelvin(), 6500.0);

        ctrl.enable();
        assert_eq!(ctrl.actual_kelvin(), 2800.0);
    }
}
