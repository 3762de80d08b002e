//! Alerts raised by geofence evaluation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::object::ObjectId;
use super::station::StationCode;
use super::train::{CoachId, TrainNumber};

/// Unique alert identifier, assigned in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlertId(u64);

impl AlertId {
    pub const fn new(id: u64) -> Self {
        AlertId(id)
    }

    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AlertId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(AlertId)
    }
}

/// Error returned when parsing an unknown alert kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown alert type: {0} (expected 'station_proximity' or 'theft')")]
pub struct InvalidAlertKind(String);

/// The two geofence conditions that raise alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
    /// A train came within the proximity radius of a station.
    StationProximity,
    /// An object left its coach's geofence.
    Theft,
}

impl AlertKind {
    /// The wire name: `station_proximity` or `theft`.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::StationProximity => "station_proximity",
            AlertKind::Theft => "theft",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertKind {
    type Err = InvalidAlertKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "station_proximity" => Ok(AlertKind::StationProximity),
            "theft" => Ok(AlertKind::Theft),
            other => Err(InvalidAlertKind(other.to_string())),
        }
    }
}

/// A train near a station.
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityAlert {
    pub train_number: TrainNumber,
    pub train_name: String,
    pub station_code: StationCode,
    pub station_name: String,
    /// Last measured train-to-station distance.
    pub distance_km: f64,
}

/// An object away from its coach.
#[derive(Debug, Clone, PartialEq)]
pub struct TheftAlert {
    pub object_id: ObjectId,
    pub object_type: String,
    pub owner_id: String,
    pub coach_id: CoachId,
    pub train_number: TrainNumber,
    pub train_name: String,
    /// Last measured object-to-train distance.
    pub distance_km: f64,
}

/// Kind-specific alert payload.
#[derive(Debug, Clone, PartialEq)]
pub enum AlertDetails {
    StationProximity(ProximityAlert),
    Theft(TheftAlert),
}

/// What an unresolved alert is deduplicated on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AlertKey {
    /// One open alert per (train, station) pair.
    Proximity(TrainNumber, StationCode),
    /// One open alert per object.
    Theft(ObjectId),
}

impl AlertDetails {
    pub fn kind(&self) -> AlertKind {
        match self {
            AlertDetails::StationProximity(_) => AlertKind::StationProximity,
            AlertDetails::Theft(_) => AlertKind::Theft,
        }
    }

    pub fn key(&self) -> AlertKey {
        match self {
            AlertDetails::StationProximity(p) => {
                AlertKey::Proximity(p.train_number.clone(), p.station_code.clone())
            }
            AlertDetails::Theft(t) => AlertKey::Theft(t.object_id.clone()),
        }
    }

    pub fn train_number(&self) -> &TrainNumber {
        match self {
            AlertDetails::StationProximity(p) => &p.train_number,
            AlertDetails::Theft(t) => &t.train_number,
        }
    }

    pub fn train_name(&self) -> &str {
        match self {
            AlertDetails::StationProximity(p) => &p.train_name,
            AlertDetails::Theft(t) => &t.train_name,
        }
    }

    pub fn distance_km(&self) -> f64 {
        match self {
            AlertDetails::StationProximity(p) => p.distance_km,
            AlertDetails::Theft(t) => t.distance_km,
        }
    }

    pub fn station_code(&self) -> Option<&StationCode> {
        match self {
            AlertDetails::StationProximity(p) => Some(&p.station_code),
            AlertDetails::Theft(_) => None,
        }
    }

    pub fn object_id(&self) -> Option<&ObjectId> {
        match self {
            AlertDetails::StationProximity(_) => None,
            AlertDetails::Theft(t) => Some(&t.object_id),
        }
    }

    fn set_distance_km(&mut self, distance_km: f64) {
        match self {
            AlertDetails::StationProximity(p) => p.distance_km = distance_km,
            AlertDetails::Theft(t) => t.distance_km = distance_km,
        }
    }
}

/// An alert and its lifecycle state.
///
/// Only the alert store mutates alerts: it refreshes the measured distance
/// of open alerts and flips `resolved`, which never goes back to false.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    id: AlertId,
    details: AlertDetails,
    detected_at: DateTime<Utc>,
    resolved: bool,
}

impl Alert {
    pub(crate) fn new(id: AlertId, details: AlertDetails, detected_at: DateTime<Utc>) -> Self {
        Self {
            id,
            details,
            detected_at,
            resolved: false,
        }
    }

    pub fn id(&self) -> AlertId {
        self.id
    }

    pub fn details(&self) -> &AlertDetails {
        &self.details
    }

    pub fn kind(&self) -> AlertKind {
        self.details.kind()
    }

    /// When the condition was first detected.
    pub fn detected_at(&self) -> DateTime<Utc> {
        self.detected_at
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Mark resolved. Returns whether the state changed.
    pub(crate) fn resolve(&mut self) -> bool {
        let changed = !self.resolved;
        self.resolved = true;
        changed
    }

    pub(crate) fn update_distance_km(&mut self, distance_km: f64) {
        self.details.set_distance_km(distance_km);
    }
}
