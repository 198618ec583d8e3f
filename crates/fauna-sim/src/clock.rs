use std::f64::consts::TAU;

use fauna_core::WorldClock;

/// Fraction of the day the clock starts at; shortly after dawn.
const START_FRACTION: f64 = 0.3;

/// Tracks in-world time as a continuous day cycle.
///
/// Darkness follows a cosine over the day: 1.0 at midnight, 0.0 at noon,
/// crossing 0.5 at dawn and dusk. The clock starts in the morning so a fresh
/// simulation opens with daytime behavior.
#[derive(Debug, Clone)]
pub struct DayClock {
    elapsed: f64,
    seconds_per_day: f64,
    tick_seconds: f64,
}

impl DayClock {
    /// Create a clock with the given day length and tick duration, in seconds.
    pub fn new(seconds_per_day: f64, tick_seconds: f64) -> Self {
        Self {
            elapsed: START_FRACTION * seconds_per_day,
            seconds_per_day,
            tick_seconds,
        }
    }

    /// Advance the clock by one tick.
    pub fn advance(&mut self) {
        self.elapsed += self.tick_seconds;
    }

    /// Total elapsed in-world seconds since simulation start.
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed - START_FRACTION * self.seconds_per_day
    }

    /// Position within the current day, 0.0 = midnight through 1.0.
    pub fn day_fraction(&self) -> f64 {
        (self.elapsed / self.seconds_per_day).fract()
    }

    /// Number of whole in-world days completed.
    pub fn day_count(&self) -> u64 {
        (self.elapsed / self.seconds_per_day) as u64
    }
}

impl WorldClock for DayClock {
    fn darkness(&self) -> f32 {
        (((TAU * self.day_fraction()).cos() + 1.0) / 2.0) as f32
    }

    fn delta_seconds(&self) -> f32 {
        self.tick_seconds as f32
    }

    fn seconds_per_day(&self) -> f32 {
        self.seconds_per_day as f32
    }
}
