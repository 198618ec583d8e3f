use crate::error::{SimError, SimResult};

/// Configuration for a simulation run.
///
/// Defaults describe a small world: a 128-actor pool ticking at 10 Hz with a
/// ten-minute day. Every knob is public; builders exist for the ones that
/// change between runs.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// RNG seed for deterministic simulation.
    pub seed: u64,
    /// Maximum number of simultaneously active actors.
    pub pool_capacity: usize,
    /// Maximum number of standing reservations.
    pub reservation_capacity: usize,
    /// Maximum event log size (oldest events dropped when exceeded). 0 = unlimited.
    pub max_events: usize,
    /// Length of one in-world day in seconds.
    pub seconds_per_day: f64,
    /// Simulated seconds per tick.
    pub tick_seconds: f64,
    /// Added to the focus view radius to get the activation radius.
    pub activation_padding: f32,
    /// Added to the focus view radius to get the deactivation radius.
    /// Must exceed `activation_padding` so actors do not flicker at the edge.
    pub deactivation_padding: f32,
    /// Fraction of max hunger below which an actor counts as hungry.
    pub hunger_alert_fraction: f32,
    /// Hunger at or below this value starves the actor.
    pub starvation_threshold: f32,
    /// Hunger decay per second for undead actors (living decay scales with
    /// species max hunger over the day length).
    pub undead_hunger_rate: f32,
    /// Prey search radius for hunters.
    pub hunt_radius: f32,
    /// Extra search radius granted to enraged hunters.
    pub enraged_hunt_radius_bonus: f32,
    /// Seconds between prey searches after a failed one.
    pub hunt_retry_cooldown: f32,
    /// Forage search radius for gatherers.
    pub gather_radius: f32,
    /// Partner search radius for reproduction.
    pub mating_radius: f32,
    /// Seconds an actor waits after mating before courting again.
    pub mating_cooldown: f32,
    /// Seconds a courting pair stands together before resolving.
    pub affection_seconds: f32,
    /// Chance that a resolved courtship produces offspring.
    pub offspring_chance: f32,
    /// Maximum distance offspring are jittered from the pair midpoint.
    pub offspring_jitter: f32,
    /// Distance at which a target (prey, forage, partner) counts as reached.
    pub reach_distance: f32,
    /// Speeds below this count as standing still.
    pub idle_speed: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            pool_capacity: 128,
            reservation_capacity: 4096,
            max_events: 256,
            seconds_per_day: 600.0,
            tick_seconds: 0.1,
            activation_padding: 8.0,
            deactivation_padding: 16.0,
            hunger_alert_fraction: 0.3,
            starvation_threshold: 1.0,
            undead_hunger_rate: 0.08,
            hunt_radius: 12.0,
            enraged_hunt_radius_bonus: 6.0,
            hunt_retry_cooldown: 2.0,
            gather_radius: 10.0,
            mating_radius: 6.0,
            mating_cooldown: 30.0,
            affection_seconds: 3.0,
            offspring_chance: 0.25,
            offspring_jitter: 0.75,
            reach_distance: 0.8,
            idle_speed: 0.05,
        }
    }
}

impl SimConfig {
    /// Set the RNG seed for deterministic simulation.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the maximum number of simultaneously active actors.
    pub fn with_pool_capacity(mut self, capacity: usize) -> Self {
        self.pool_capacity = capacity;
        self
    }

    /// Set the maximum number of standing reservations.
    pub fn with_reservation_capacity(mut self, capacity: usize) -> Self {
        self.reservation_capacity = capacity;
        self
    }

    /// Set the maximum event log size (0 = unlimited).
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// Set the length of one in-world day in seconds.
    pub fn with_seconds_per_day(mut self, seconds: f64) -> Self {
        self.seconds_per_day = seconds;
        self
    }

    /// Set the simulated seconds per tick.
    pub fn with_tick_seconds(mut self, seconds: f64) -> Self {
        self.tick_seconds = seconds;
        self
    }

    /// Set the activation and deactivation paddings around the focus radius.
    pub fn with_paddings(mut self, activation: f32, deactivation: f32) -> Self {
        self.activation_padding = activation;
        self.deactivation_padding = deactivation;
        self
    }

    /// Check the configuration for values the simulation cannot run with.
    pub fn validate(&self) -> SimResult<()> {
        if self.pool_capacity == 0 {
            return Err(SimError::InvalidConfig("pool_capacity must be > 0".into()));
        }
        if self.reservation_capacity == 0 {
            return Err(SimError::InvalidConfig(
                "reservation_capacity must be > 0".into(),
            ));
        }
        if self.tick_seconds <= 0.0 || !self.tick_seconds.is_finite() {
            return Err(SimError::InvalidConfig(format!(
                "tick_seconds must be positive, got {}",
                self.tick_seconds
            )));
        }
        if self.seconds_per_day <= 0.0 || !self.seconds_per_day.is_finite() {
            return Err(SimError::InvalidConfig(format!(
                "seconds_per_day must be positive, got {}",
                self.seconds_per_day
            )));
        }
        if self.activation_padding < 0.0 {
            return Err(SimError::InvalidConfig(
                "activation_padding must not be negative".into(),
            ));
        }
        if self.deactivation_padding <= self.activation_padding {
            return Err(SimError::InvalidConfig(format!(
                "deactivation_padding ({}) must exceed activation_padding ({})",
                self.deactivation_padding, self.activation_padding
            )));
        }
        if !(0.0..=1.0).contains(&self.hunger_alert_fraction) {
            return Err(SimError::InvalidConfig(
                "hunger_alert_fraction must be within [0, 1]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.offspring_chance) {
            return Err(SimError::InvalidConfig(
                "offspring_chance must be within [0, 1]".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let config = SimConfig::default();
        assert_eq!(config.seed, 42);
        assert_eq!(config.pool_capacity, 128);
        assert_eq!(config.reservation_capacity, 4096);
        assert!((config.tick_seconds - 0.1).abs() < f64::EPSILON);
        assert!(config.activation_padding < config.deactivation_padding);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_builder_chain() {
        let config = SimConfig::default()
            .with_seed(123)
            .with_pool_capacity(16)
            .with_max_events(500)
            .with_tick_seconds(0.5);
        assert_eq!(config.seed, 123);
        assert_eq!(config.pool_capacity, 16);
        assert_eq!(config.max_events, 500);
        assert!((config.tick_seconds - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn config_rejects_inverted_hysteresis() {
        let config = SimConfig::default().with_paddings(10.0, 10.0);
        assert!(matches!(
            config.validate(),
            Err(SimError::InvalidConfig(_))
        ));
    }

    #[test]
    fn config_rejects_zero_pool() {
        let config = SimConfig::default().with_pool_capacity(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_rejects_bad_tick_length() {
        let config = SimConfig::default().with_tick_seconds(0.0);
        assert!(config.validate().is_err());
    }
}
