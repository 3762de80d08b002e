//! Domain error types.
//!
//! These errors are invariant violations caught when entities are
//! constructed or registered. An entity that fails these checks never
//! enters the live model.

use crate::geo::Position;

use super::ident::InvalidIdentifier;
use super::{CoachId, ObjectId, TrainNumber};

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// An identifier failed to parse
    #[error(transparent)]
    InvalidIdentifier(#[from] InvalidIdentifier),

    /// Coach geofence radius must be positive
    #[error("coach {coach}: geofence radius must be positive, got {radius_km}")]
    NonPositiveRadius { coach: CoachId, radius_km: f64 },

    /// A train must have at least one coach
    #[error("train {0} must have at least one coach")]
    NoCoaches(TrainNumber),

    /// Coach ids must be unique within a train
    #[error("train {train} has duplicate coach {coach}")]
    DuplicateCoach { train: TrainNumber, coach: CoachId },

    /// Speed must be finite and non-negative
    #[error("train {train}: speed must be a non-negative number, got {speed_kmh}")]
    InvalidSpeed { train: TrainNumber, speed_kmh: f64 },

    /// Bearing must be finite
    #[error("train {train}: bearing must be a finite number, got {bearing_deg}")]
    InvalidBearing { train: TrainNumber, bearing_deg: f64 },

    /// Coordinates out of range or not finite
    #[error("{entity}: invalid position {position}")]
    InvalidPosition { entity: String, position: Position },

    /// Object assigned to a train that does not exist
    #[error("object {object} references unknown train {train}")]
    UnknownTrain { object: ObjectId, train: TrainNumber },

    /// Object assigned to a coach not on its train
    #[error("object {object} references unknown coach {coach} on train {train}")]
    UnknownCoach {
        object: ObjectId,
        train: TrainNumber,
        coach: CoachId,
    },

    /// An entity with this identifier is already registered
    #[error("{entity} {id} already exists")]
    Duplicate { entity: &'static str, id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let coach = CoachId::parse("A1").unwrap();
        let err = DomainError::NonPositiveRadius {
            coach,
            radius_km: 0.0,
        };
        assert_eq!(
            err.to_string(),
            "coach A1: geofence radius must be positive, got 0"
        );

        let train = TrainNumber::parse("12301").unwrap();
        let err = DomainError::NoCoaches(train.clone());
        assert_eq!(err.to_string(), "train 12301 must have at least one coach");

        let err = DomainError::UnknownCoach {
            object: ObjectId::parse("OBJ001").unwrap(),
            train,
            coach: CoachId::parse("Z9").unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "object OBJ001 references unknown coach Z9 on train 12301"
        );

        let err = DomainError::Duplicate {
            entity: "train",
            id: "12301".to_string(),
        };
        assert_eq!(err.to_string(), "train 12301 already exists");
    }

    #[test]
    fn identifier_errors_pass_through() {
        let err: DomainError = TrainNumber::parse("").unwrap_err().into();
        assert_eq!(err.to_string(), "invalid train number: must not be empty");
    }
}
