//! Sunset time tracking for a fixed observer location.
//!
//! Computes the visual sunset instant (civil dusk, sun 6° below the horizon)
//! once per UTC calendar day and answers "how many minutes until sunset" as a
//! signed value. Recomputation happens lazily in `update()` when the calendar
//! day rolls over; within a day the tracker is idempotent.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sunrise::{Coordinates, DawnType, SolarDay, SolarEvent};

use crate::config::Config;

/// Tracks today's sunset instant for a fixed geographic location.
pub struct SunTracker {
    coordinates: Coordinates,
    elevation: f64,
    /// UTC calendar day the cached times were computed for
    current_date: NaiveDate,
    /// Start of the current UTC day, the reference for minute arithmetic
    midnight_utc: DateTime<Utc>,
    /// Civil dusk instant for `current_date`
    sunset_utc: DateTime<Utc>,
}

impl SunTracker {
    /// Create a tracker and compute the initial sun state.
    ///
    /// Fails when coordinates are missing or invalid. The process cannot
    /// reason about day/night without a sun state, so callers treat this as
    /// a fatal startup error.
    pub fn new(config: &Config) -> Result<Self> {
        let (latitude, longitude) = config
            .latitude
            .zip(config.longitude)
            .context("latitude and longitude must be configured for sunset tracking")?;
        let coordinates = Coordinates::new(latitude, longitude)
            .with_context(|| format!("invalid observer coordinates: {latitude}, {longitude}"))?;

        let now = Utc::now();
        Ok(Self::at(coordinates, config.elevation(), now))
    }

    fn at(coordinates: Coordinates, elevation: f64, now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        Self {
            coordinates,
            elevation,
            current_date: today,
            midnight_utc: midnight_of(today),
            sunset_utc: compute_sunset(coordinates, elevation, today),
        }
    }

    /// Refresh the cached sun state. Idempotent within a calendar day;
    /// recomputes the sunset instant at most once per day rollover.
    pub fn update(&mut self) {
        self.update_at(Utc::now());
    }

    fn update_at(&mut self, now: DateTime<Utc>) {
        let today = now.date_naive();
        if today == self.current_date {
            return;
        }
        self.current_date = today;
        self.midnight_utc = midnight_of(today);
        self.sunset_utc = compute_sunset(self.coordinates, self.elevation, today);
        log_block_start!(
            "Sunset for {} at {} UTC",
            today,
            self.sunset_utc.format("%H:%M:%S")
        );
    }

    /// Signed minutes until today's sunset: positive while the sun has not
    /// set, negative (magnitude = minutes elapsed) afterwards.
    pub fn minutes_until_sunset(&self) -> f64 {
        self.minutes_until_sunset_at(Utc::now())
    }

    fn minutes_until_sunset_at(&self, now: DateTime<Utc>) -> f64 {
        let now_secs = (now - self.midnight_utc).num_milliseconds() as f64 / 1000.0;
        let sunset_secs = (self.sunset_utc - self.midnight_utc).num_milliseconds() as f64 / 1000.0;
        (sunset_secs - now_secs) / 60.0
    }

    /// Minutes elapsed since sunset (negative before sunset).
    pub fn minutes_since_sunset(&self) -> f64 {
        -self.minutes_until_sunset()
    }

    pub fn is_past_sunset(&self) -> bool {
        self.minutes_until_sunset() <= 0.0
    }

    /// Today's sunset instant, for startup logging.
    pub fn sunset_utc(&self) -> DateTime<Utc> {
        self.sunset_utc
    }
}

fn midnight_of(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .expect("midnight is always a valid time")
        .and_utc()
}

/// Visual sunset for the given day: civil dusk (sun 6° below the horizon)
/// rather than the geometric horizon crossing, adjusted for observer
/// elevation.
fn compute_sunset(coordinates: Coordinates, elevation: f64, date: NaiveDate) -> DateTime<Utc> {
    SolarDay::new(coordinates, date)
        .with_altitude(elevation)
        .event_time(SolarEvent::Dusk(DawnType::Civil))
}
