//! Trains and their coaches.

use std::collections::HashSet;
use std::fmt;

use crate::geo::{self, Position};

use super::error::DomainError;
use super::ident::{self, InvalidIdentifier};
use super::station::StationCode;

/// A train number such as `12301`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrainNumber(String);

impl TrainNumber {
    pub fn parse(s: &str) -> Result<Self, InvalidIdentifier> {
        ident::check("train number", s)?;
        Ok(TrainNumber(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TrainNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TrainNumber({})", self.0)
    }
}

impl fmt::Display for TrainNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A coach identifier, unique within its train (e.g. `A1`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoachId(String);

impl CoachId {
    pub fn parse(s: &str) -> Result<Self, InvalidIdentifier> {
        ident::check("coach id", s)?;
        Ok(CoachId(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CoachId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CoachId({})", self.0)
    }
}

impl fmt::Display for CoachId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A coach and the geofence it keeps around its objects.
#[derive(Debug, Clone, PartialEq)]
pub struct Coach {
    id: CoachId,
    geofence_radius_km: f64,
}

impl Coach {
    /// Create a coach. The radius must be positive and finite.
    pub fn new(id: CoachId, geofence_radius_km: f64) -> Result<Self, DomainError> {
        if !(geofence_radius_km.is_finite() && geofence_radius_km > 0.0) {
            return Err(DomainError::NonPositiveRadius {
                coach: id,
                radius_km: geofence_radius_km,
            });
        }
        Ok(Self {
            id,
            geofence_radius_km,
        })
    }

    pub fn id(&self) -> &CoachId {
        &self.id
    }

    /// Maximum permitted distance between the coach and its objects.
    pub fn geofence_radius_km(&self) -> f64 {
        self.geofence_radius_km
    }
}

/// A journey in progress towards a station.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveJourney {
    /// Destination station.
    pub destination: StationCode,
    /// Where the destination station is.
    pub target: Position,
}

/// A train with its coaches.
///
/// Coaches are fixed at construction. Position, speed and bearing change as
/// the train moves.
#[derive(Debug, Clone, PartialEq)]
pub struct Train {
    number: TrainNumber,
    name: String,
    position: Position,
    speed_kmh: f64,
    bearing_deg: f64,
    coaches: Vec<Coach>,
    journey: Option<ActiveJourney>,
}

impl Train {
    /// Create a train.
    ///
    /// Rejects an empty or duplicated coach list, a negative or non-finite
    /// speed and an invalid position. The bearing is normalized into [0, 360).
    pub fn new(
        number: TrainNumber,
        name: impl Into<String>,
        position: Position,
        speed_kmh: f64,
        bearing_deg: f64,
        coaches: Vec<Coach>,
    ) -> Result<Self, DomainError> {
        if coaches.is_empty() {
            return Err(DomainError::NoCoaches(number));
        }

        let mut seen = HashSet::new();
        for coach in &coaches {
            if !seen.insert(coach.id()) {
                return Err(DomainError::DuplicateCoach {
                    train: number,
                    coach: coach.id().clone(),
                });
            }
        }

        if !position.is_valid() {
            return Err(DomainError::InvalidPosition {
                entity: format!("train {number}"),
                position,
            });
        }
        check_speed(&number, speed_kmh)?;
        if !bearing_deg.is_finite() {
            return Err(DomainError::InvalidBearing {
                train: number,
                bearing_deg,
            });
        }

        Ok(Self {
            number,
            name: name.into(),
            position,
            speed_kmh,
            bearing_deg: geo::normalize_bearing(bearing_deg),
            coaches,
            journey: None,
        })
    }

    pub fn number(&self) -> &TrainNumber {
        &self.number
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Current speed in km/h.
    pub fn speed_kmh(&self) -> f64 {
        self.speed_kmh
    }

    /// Current bearing in degrees clockwise from north.
    pub fn bearing_deg(&self) -> f64 {
        self.bearing_deg
    }

    pub fn coaches(&self) -> &[Coach] {
        &self.coaches
    }

    /// Look up a coach by id.
    pub fn coach(&self, id: &CoachId) -> Option<&Coach> {
        self.coaches.iter().find(|c| c.id() == id)
    }

    pub fn journey(&self) -> Option<&ActiveJourney> {
        self.journey.as_ref()
    }

    /// Move the train. Validity is checked by callers that take untrusted
    /// input; the evaluator skips trains with invalid positions.
    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn set_speed(&mut self, speed_kmh: f64) -> Result<(), DomainError> {
        check_speed(&self.number, speed_kmh)?;
        self.speed_kmh = speed_kmh;
        Ok(())
    }

    pub fn set_bearing(&mut self, bearing_deg: f64) -> Result<(), DomainError> {
        if !bearing_deg.is_finite() {
            return Err(DomainError::InvalidBearing {
                train: self.number.clone(),
                bearing_deg,
            });
        }
        self.bearing_deg = geo::normalize_bearing(bearing_deg);
        Ok(())
    }

    /// Turn to `bearing_deg`. Non-finite headings leave the bearing unchanged.
    pub(crate) fn steer(&mut self, bearing_deg: f64) {
        if bearing_deg.is_finite() {
            self.bearing_deg = geo::normalize_bearing(bearing_deg);
        }
    }

    /// Head for `destination`. Replaces any journey already in progress.
    pub fn start_journey(&mut self, journey: ActiveJourney) {
        self.bearing_deg = geo::bearing_deg(self.position, journey.target);
        self.journey = Some(journey);
    }

    /// Stop journeying, returning the journey that was in progress.
    pub fn end_journey(&mut self) -> Option<ActiveJourney> {
        self.journey.take()
    }
}

fn check_speed(train: &TrainNumber, speed_kmh: f64) -> Result<(), DomainError> {
    if !(speed_kmh.is_finite() && speed_kmh >= 0.0) {
        return Err(DomainError::InvalidSpeed {
            train: train.clone(),
            speed_kmh,
        });
    }
    Ok(())
}
