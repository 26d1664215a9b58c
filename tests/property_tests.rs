//! Property-based tests for the pure control-loop math: grid quantization,
//! sample stability filtering, and color temperature interpolation.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use ambientr::actuator::ColorActuator;
use ambientr::config::Config;
use ambientr::constants::BRIGHTNESS_CLAMP_GRID;
use ambientr::core::brightness::clamp_to_grid;
use ambientr::core::color::ColorTemperatureController;
use ambientr::core::light::LightSampler;
use ambientr::sensor::{LightFrame, LightSensor};
use anyhow::Result;
use proptest::prelude::*;

struct ScriptedSensor {
    readings: Vec<u8>,
}

impl LightSensor for ScriptedSensor {
    fn sample(&mut self) -> Result<Option<LightFrame>> {
        Ok(self.readings.pop().map(|v| LightFrame::new(vec![v])))
    }
}

#[derive(Clone, Default)]
struct RecordingColor(Rc<RefCell<Vec<i32>>>);

impl ColorActuator for RecordingColor {
    fn set_temperature(&mut self, kelvin: i32) -> Result<()> {
        self.0.borrow_mut().push(kelvin);
        Ok(())
    }
}

proptest! {
    /// Quantization always lands on the grid.
    #[test]
    fn clamp_result_is_a_grid_value(target in -150i32..150) {
        let clamped = clamp_to_grid(target);
        prop_assert!(BRIGHTNESS_CLAMP_GRID.contains(&clamped));
    }

    /// No grid value is strictly closer than the chosen one, and exact
    /// midpoints resolve to the lower neighbor.
    #[test]
    fn clamp_picks_the_nearest_grid_value(target in -150i32..150) {
        let clamped = clamp_to_grid(target);
        let chosen_distance = (target - clamped as i32).abs();
        for grid in BRIGHTNESS_CLAMP_GRID {
            let distance = (target - grid as i32).abs();
            prop_assert!(distance >= chosen_distance);
            if distance == chosen_distance {
                prop_assert!(grid >= clamped);
            }
        }
    }

    /// Quantization is monotone: a brighter target never maps to a dimmer
    /// grid value.
    #[test]
    fn clamp_is_monotone(a in -150i32..150, b in -150i32..150) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(clamp_to_grid(lo) <= clamp_to_grid(hi));
    }

    /// The stable reading only ever takes a value that appeared in two
    /// consecutive raw samples within the threshold of each other.
    #[test]
    fn stable_reading_requires_two_consistent_samples(
        readings in proptest::collection::vec(0u8..=255, 1..20),
        threshold in 1.0f64..64.0,
    ) {
        let mut script = readings.clone();
        script.reverse();
        let mut sampler = LightSampler::new(Box::new(ScriptedSensor { readings: script }), threshold);

        for _ in 0..readings.len() {
            sampler.update(false);
        }

        match sampler.normalized() {
            None => {
                // Never two consecutive samples within the threshold
                for pair in readings.windows(2) {
                    let delta = (pair[1] as f64 - pair[0] as f64).abs();
                    prop_assert!(delta > threshold);
                }
            }
            Some(normalized) => {
                let stable = normalized * 256.0;
                // The stable value is the second of some consistent pair
                let witnessed = readings.windows(2).any(|pair| {
                    let delta = (pair[1] as f64 - pair[0] as f64).abs();
                    delta <= threshold && (pair[1] as f64 - stable).abs() < 1e-9
                });
                prop_assert!(witnessed);
            }
        }
    }

    /// The interpolated color target always lies between the night and day
    /// endpoints, and never warms as the evening progresses.
    #[test]
    fn color_target_is_bounded_and_monotone(
        earlier in -600.0f64..600.0,
        later in -600.0f64..600.0,
    ) {
        let config = Config::default();
        let color = ColorTemperatureController::with_stepping(
            Box::new(RecordingColor::default()),
            &config,
            70.0,
            Duration::ZERO,
        );

        let (lo, hi) = if earlier <= later { (earlier, later) } else { (later, earlier) };
        let target_lo = color.target_for(lo);
        let target_hi = color.target_for(hi);

        prop_assert!(target_lo >= config.night_temp() as f64);
        prop_assert!(target_lo <= config.day_temp() as f64);
        prop_assert!(target_hi <= target_lo);
    }

    /// A fade from any starting point reaches the target in at most
    /// ceil(distance / step) + 1 actuator calls, with the last call exact.
    #[test]
    fn fade_converges_within_the_step_bound(minutes in 0.0f64..480.0) {
        let recorder = RecordingColor::default();
        let config = Config::default();
        let mut color = ColorTemperatureController::with_stepping(
            Box::new(recorder.clone()),
            &config,
            70.0,
            Duration::ZERO,
        );

        let start = color.actual_kelvin();
        let target = color.target_for(minutes);
        color.update(minutes);

        let calls = recorder.0.borrow();
        let bound = ((start - target).abs() / 70.0).ceil() as usize + 1;
        prop_assert!(calls.len() <= bound);
        if let Some(&last) = calls.last() {
            prop_assert_eq!(last, target.round() as i32);
        }
    }
}
