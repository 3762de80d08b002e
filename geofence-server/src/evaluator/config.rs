//! Geofence thresholds.

/// Default radius around a station that counts as "approaching" (km).
pub const DEFAULT_PROXIMITY_RADIUS_KM: f64 = 1.0;

/// Default coach geofence radius when a coach does not specify one (km).
pub const DEFAULT_COACH_RADIUS_KM: f64 = 0.05;

/// Configuration parameters for geofence evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct GeofenceConfig {
    /// A train within this distance of a station raises a proximity alert.
    pub proximity_radius_km: f64,

    /// Geofence radius given to coaches created without one.
    pub default_coach_radius_km: f64,
}

impl GeofenceConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(proximity_radius_km: f64, default_coach_radius_km: f64) -> Self {
        Self {
            proximity_radius_km,
            default_coach_radius_km,
        }
    }
}

impl Default for GeofenceConfig {
    fn default() -> Self {
        Self {
            proximity_radius_km: DEFAULT_PROXIMITY_RADIUS_KM,
            default_coach_radius_km: DEFAULT_COACH_RADIUS_KM,
        }
    }
}
