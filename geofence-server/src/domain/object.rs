//! Objects carried on coaches and tracked for theft.

use std::fmt;

use crate::geo::Position;

use super::error::DomainError;
use super::ident::{self, InvalidIdentifier};
use super::train::{CoachId, Train, TrainNumber};

/// Identifier of a tracked object (e.g. `OBJ001`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn parse(s: &str) -> Result<Self, InvalidIdentifier> {
        ident::check("object id", s)?;
        Ok(ObjectId(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An object (luggage, laptop bag, ...) assigned to a coach.
///
/// The train and coach assignment never changes after construction. While
/// the object is not displaced it rides with its train; once displaced its
/// position drifts independently and theft detection measures how far.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedObject {
    id: ObjectId,
    object_type: String,
    owner_id: String,
    train_number: TrainNumber,
    coach_id: CoachId,
    position: Position,
    displaced: bool,
}

impl TrackedObject {
    /// Create an object assigned to `coach_id` on `train`.
    ///
    /// Fails if the coach does not belong to the train.
    pub fn new(
        id: ObjectId,
        object_type: impl Into<String>,
        owner_id: impl Into<String>,
        train: &Train,
        coach_id: CoachId,
        position: Position,
    ) -> Result<Self, DomainError> {
        if train.coach(&coach_id).is_none() {
            return Err(DomainError::UnknownCoach {
                object: id,
                train: train.number().clone(),
                coach: coach_id,
            });
        }
        if !position.is_valid() {
            return Err(DomainError::InvalidPosition {
                entity: format!("object {id}"),
                position,
            });
        }
        Ok(Self {
            id,
            object_type: object_type.into(),
            owner_id: owner_id.into(),
            train_number: train.number().clone(),
            coach_id,
            position,
            displaced: false,
        })
    }

    pub fn id(&self) -> &ObjectId {
        &self.id
    }

    /// Free-text category, e.g. "Luggage".
    pub fn object_type(&self) -> &str {
        &self.object_type
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn train_number(&self) -> &TrainNumber {
        &self.train_number
    }

    pub fn coach_id(&self) -> &CoachId {
        &self.coach_id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Whether the object has left its train's position.
    pub fn is_displaced(&self) -> bool {
        self.displaced
    }

    /// Carry the object along with its train. No-op once displaced.
    pub fn follow_train(&mut self, train_position: Position) {
        if !self.displaced {
            self.position = train_position;
        }
    }

    /// Move the object independently of its train.
    pub fn displace_to(&mut self, position: Position) {
        self.position = position;
        self.displaced = true;
    }
}
