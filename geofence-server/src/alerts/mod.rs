//! Alert lifecycle store.
//!
//! Alerts are created by the geofence evaluator, queried by the outer
//! layers, and resolved by operators. They are never deleted.

mod error;
mod filter;
mod stats;
mod store;

pub use error::AlertError;
pub use filter::AlertFilter;
pub use stats::{AlertStats, KindCounts, StatusCounts, TrainAlertCount};
pub use store::{AlertStore, Recorded};
