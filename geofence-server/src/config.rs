//! Server configuration from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `GEOFENCE_BIND_ADDR` | `127.0.0.1:8000` |
//! | `GEOFENCE_SEED_FILE` | built-in demo network |
//! | `STATION_PROXIMITY_RADIUS` | 1.0 km |
//! | `DEFAULT_COACH_GEOFENCE_RADIUS` | 0.05 km |
//! | `GEOFENCE_EVAL_INTERVAL_SECS` | 5 |
//! | `GEOFENCE_SIM_TICK_SECS` | 5 |
//! | `GEOFENCE_SIM_SEED` | from entropy |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::evaluator::GeofenceConfig;
use crate::monitor::MonitorConfig;
use crate::simulation::SimulationConfig;

/// Default listen address.
pub const DEFAULT_BIND_ADDR: SocketAddr =
    SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST), 8000);

/// Errors from reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}: cannot parse {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("{var}: must be positive, got {value:?}")]
    NotPositive { var: &'static str, value: String },
}

/// Everything the server binary needs to start.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Seed file to load instead of the built-in network.
    pub seed_file: Option<PathBuf>,
    pub geofence: GeofenceConfig,
    pub simulation: SimulationConfig,
    pub monitor: MonitorConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR,
            seed_file: None,
            geofence: GeofenceConfig::default(),
            simulation: SimulationConfig::default(),
            monitor: MonitorConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to
    /// its value. Unset and empty variables take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(v) = get("GEOFENCE_BIND_ADDR") {
            config.bind_addr = parse("GEOFENCE_BIND_ADDR", &v)?;
        }
        if let Some(v) = get("GEOFENCE_SEED_FILE") {
            config.seed_file = Some(PathBuf::from(v));
        }
        if let Some(v) = get("STATION_PROXIMITY_RADIUS") {
            config.geofence.proximity_radius_km = positive("STATION_PROXIMITY_RADIUS", &v)?;
        }
        if let Some(v) = get("DEFAULT_COACH_GEOFENCE_RADIUS") {
            config.geofence.default_coach_radius_km =
                positive("DEFAULT_COACH_GEOFENCE_RADIUS", &v)?;
        }
        if let Some(v) = get("GEOFENCE_EVAL_INTERVAL_SECS") {
            config.monitor.interval = seconds("GEOFENCE_EVAL_INTERVAL_SECS", &v)?;
        }
        if let Some(v) = get("GEOFENCE_SIM_TICK_SECS") {
            config.simulation.tick = seconds("GEOFENCE_SIM_TICK_SECS", &v)?;
        }
        if let Some(v) = get("GEOFENCE_SIM_SEED") {
            config.simulation.rng_seed = Some(parse("GEOFENCE_SIM_SEED", &v)?);
        }

        Ok(config)
    }
}

fn parse<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn positive(var: &'static str, value: &str) -> Result<f64, ConfigError> {
    let n: f64 = parse(var, value)?;
    if !(n.is_finite() && n > 0.0) {
        return Err(ConfigError::NotPositive {
            var,
            value: value.to_string(),
        });
    }
    Ok(n)
}

fn seconds(var: &'static str, value: &str) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(positive(var, value)?).map_err(|e| ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}
