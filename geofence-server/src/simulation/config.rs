//! Simulation parameters.

use std::time::Duration;

/// Default simulated time step per movement tick.
pub const DEFAULT_TICK: Duration = Duration::from_secs(5);

/// Default cap on events per random-events request.
pub const DEFAULT_MAX_RANDOM_EVENTS: usize = 100;

/// Configuration parameters for the simulator.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Simulated time covered by one movement tick.
    pub tick: Duration,

    /// Total width of the random heading change applied to trains that are
    /// not on a journey, in degrees. Trains turn by up to half of this
    /// either way.
    pub heading_jitter_deg: f64,

    /// Bounds of the displacement used by random theft events (km).
    pub random_theft_min_km: f64,
    pub random_theft_max_km: f64,

    /// Largest `count` accepted by a single random-events request.
    pub max_random_events: usize,

    /// Fixed RNG seed for reproducible runs. Seeded from entropy when unset.
    pub rng_seed: Option<u64>,
}

impl SimulationConfig {
    /// Create a new configuration with the given tick and default
    /// randomness.
    pub fn new(tick: Duration) -> Self {
        Self {
            tick,
            ..Self::default()
        }
    }

    /// Use a fixed RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Tick length in hours, for km/h arithmetic.
    pub fn tick_hours(&self) -> f64 {
        self.tick.as_secs_f64() / 3600.0
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick: DEFAULT_TICK,
            heading_jitter_deg: 10.0,
            random_theft_min_km: 0.05,
            random_theft_max_km: 0.25,
            max_random_events: DEFAULT_MAX_RANDOM_EVENTS,
            rng_seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SimulationConfig::default();
        assert_eq!(config.tick, Duration::from_secs(5));
        assert_eq!(config.heading_jitter_deg, 10.0);
        assert_eq!(config.random_theft_min_km, 0.05);
        assert_eq!(config.random_theft_max_km, 0.25);
        assert_eq!(config.max_random_events, 100);
        assert_eq!(config.rng_seed, None);
    }

    #[test]
    fn custom_config() {
        let config = SimulationConfig::new(Duration::from_secs(60)).with_seed(7);
        assert_eq!(config.tick, Duration::from_secs(60));
        assert_eq!(config.rng_seed, Some(7));
        assert!((config.tick_hours() - 1.0 / 60.0).abs() < 1e-12);
    }
}
