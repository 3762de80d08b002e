//! Alert store error types.

use crate::domain::AlertId;

/// Errors from alert lookups and transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlertError {
    /// No alert with this id exists
    #[error("alert {0} not found")]
    NotFound(AlertId),

    /// The statistics window reaches past the representable date range
    #[error("a statistics period of {0} days is out of range")]
    PeriodOutOfRange(u32),
}
