//! Entity model for geofence tracking.
//!
//! Stations, trains with their coaches, tracked objects and alerts. All
//! types enforce their invariants at construction time, so code that
//! receives them can trust their validity.

mod alert;
mod error;
mod ident;
mod object;
mod station;
mod train;

pub use alert::{
    Alert, AlertDetails, AlertId, AlertKey, AlertKind, InvalidAlertKind, ProximityAlert, TheftAlert,
};
pub use error::DomainError;
pub use ident::InvalidIdentifier;
pub use object::{ObjectId, TrackedObject};
pub use station::{Station, StationCode};
pub use train::{ActiveJourney, Coach, CoachId, Train, TrainNumber};
