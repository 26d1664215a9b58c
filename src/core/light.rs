//! Noise-filtered ambient light sampling.
//!
//! Wraps the external light sensor and publishes a stable, normalized
//! reading. Raw samples are the maximum intensity over the sensor's
//! downsample grid; a new raw value is only promoted to the published
//! reading when it sits within the stability threshold of the previous raw
//! sample, which rejects single-frame spikes like lens glare or a hand
//! passing over the camera.

use crate::constants::LIGHT_SENSOR_FULL_SCALE;
use crate::sensor::LightSensor;

/// Smoothed ambient light reading in the raw 0-255 domain.
pub struct LightSampler {
    sensor: Box<dyn LightSensor>,
    stability_threshold: f64,
    /// Raw value of the previous sample, stable or not
    last_raw: Option<f64>,
    /// Last reading that passed spike rejection
    stable: Option<f64>,
}

impl LightSampler {
    pub fn new(sensor: Box<dyn LightSensor>, stability_threshold: f64) -> Self {
        Self {
            sensor,
            stability_threshold,
            last_raw: None,
            stable: None,
        }
    }

    /// Take one sample and fold it into the stable reading.
    ///
    /// A no-op while `sensor_busy` is set (another application holds the
    /// camera; we yield rather than contend). Sensor failures leave the
    /// stable value untouched and are logged as warnings only.
    pub fn update(&mut self, sensor_busy: bool) {
        if sensor_busy {
            return;
        }

        let frame = match self.sensor.sample() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                log_warning!("Light sensor produced no frame, keeping previous reading");
                return;
            }
            Err(e) => {
                log_warning!("Light sensor read failed: {e}");
                return;
            }
        };

        let raw = frame.max_intensity() as f64;
        if let Some(previous) = self.last_raw {
            if (raw - previous).abs() <= self.stability_threshold {
                self.stable = Some(raw);
            }
            // Outside the threshold: transient spike, discard. The raw value
            // still becomes the comparison baseline so a real lighting change
            // settles in after one more consistent sample.
        }
        self.last_raw = Some(raw);
    }

    /// Stable ambient light level in [0, 1], or `None` before the first
    /// stable sample exists. Callers must skip actuation on `None`.
    pub fn normalized(&self) -> Option<f64> {
        self.stable.map(|s| s / LIGHT_SENSOR_FULL_SCALE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::LightFrame;
    use anyhow::Result;

    /// Sensor fake replaying a scripted sequence of outcomes.
    struct ScriptedSensor {
        script: Vec<Result<Option<LightFrame>>>,
    }

    impl ScriptedSensor {
        fn with_values(values: &[u8]) -> Self {
            Self {
                script: values
                    .iter()
                    .rev()
                    .map(|v| Ok(Some(LightFrame::new(vec![*v]))))
                    .collect(),
            }
        }
    }

    impl LightSensor for ScriptedSensor {
        fn sample(&mut self) -> Result<Option<LightFrame>> {
            self.script.pop().unwrap_or(Ok(None))
        }
    }

    fn sampler(values: &[u8]) -> LightSampler {
        LightSampler::new(Box::new(ScriptedSensor::with_values(values)), 20.0)
    }

    #[test]
    fn no_reading_before_first_stable_sample() {
        let mut sampler = sampler(&[128]);
        assert_eq!(sampler.normalized(), None);
        sampler.update(false);
        // A single sample only seeds the baseline
        assert_eq!(sampler.normalized(), None);
    }

    #[test]
    fn two_consistent_samples_produce_a_reading() {
        let mut sampler = sampler(&[128, 130]);
        sampler.update(false);
        sampler.update(false);
        assert_eq!(sampler.normalized(), Some(130.0 / 256.0));
    }

    #[test]
    fn delta_within_threshold_updates_stable_value() {
        let mut sampler = sampler(&[100, 100, 119]);
        sampler.update(false);
        sampler.update(false);
        sampler.update(false);
        // 119 is within 20 of 100, so it is promoted
        assert_eq!(sampler.normalized(), Some(119.0 / 256.0));
    }

    #[test]
    fn spike_beyond_threshold_is_discarded() {
        let mut sampler = sampler(&[100, 100, 250]);
        sampler.update(false);
        sampler.update(false);
        sampler.update(false);
        // The 250 spike is rejected; previous stable reading stands
        assert_eq!(sampler.normalized(), Some(100.0 / 256.0));
    }

    #[test]
    fn sustained_change_settles_after_one_extra_sample() {
        let mut sampler = sampler(&[100, 100, 250, 248]);
        for _ in 0..4 {
            sampler.update(false);
        }
        // The second bright sample is within threshold of the first, so the
        // real lighting change takes effect one poll late
        assert_eq!(sampler.normalized(), Some(248.0 / 256.0));
    }

    #[test]
    fn busy_sensor_keeps_previous_reading() {
        let mut sampler = sampler(&[100, 100, 0]);
        sampler.update(false);
        sampler.update(false);
        // Camera contended: the queued dark frame is not even sampled
        sampler.update(true);
        assert_eq!(sampler.normalized(), Some(100.0 / 256.0));
    }

    #[test]
    fn read_failure_keeps_previous_reading() {
        let mut sampler = LightSampler::new(
            Box::new(ScriptedSensor {
                script: vec![
                    Err(anyhow::anyhow!("device unplugged")),
                    Ok(Some(LightFrame::new(vec![100]))),
                    Ok(Some(LightFrame::new(vec![100]))),
                ],
            }),
            20.0,
        );
        sampler.update(false);
        sampler.update(false);
        sampler.update(false);
        assert_eq!(sampler.normalized(), Some(100.0 / 256.0));
    }
}
