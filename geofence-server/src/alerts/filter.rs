//! Alert query predicates.

use chrono::{DateTime, Utc};

use crate::domain::{Alert, AlertKind, ObjectId, StationCode, TrainNumber};

/// Optional predicates over alerts, combined with logical AND.
///
/// The default filter matches every alert.
///
/// # Examples
///
/// ```
/// use geofence_server::alerts::AlertFilter;
/// use geofence_server::domain::AlertKind;
///
/// let open_thefts = AlertFilter::new()
///     .with_kind(AlertKind::Theft)
///     .with_resolved(false);
/// assert_eq!(open_thefts.kind, Some(AlertKind::Theft));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertFilter {
    pub kind: Option<AlertKind>,
    pub resolved: Option<bool>,
    pub train_number: Option<TrainNumber>,
    pub object_id: Option<ObjectId>,
    pub station_code: Option<StationCode>,
    /// Only alerts detected at or after this instant.
    pub since: Option<DateTime<Utc>>,
}

impl AlertFilter {
    /// A filter that matches everything.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kind(mut self, kind: AlertKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_resolved(mut self, resolved: bool) -> Self {
        self.resolved = Some(resolved);
        self
    }

    pub fn with_train(mut self, train_number: TrainNumber) -> Self {
        self.train_number = Some(train_number);
        self
    }

    pub fn with_object(mut self, object_id: ObjectId) -> Self {
        self.object_id = Some(object_id);
        self
    }

    pub fn with_station(mut self, station_code: StationCode) -> Self {
        self.station_code = Some(station_code);
        self
    }

    pub fn with_since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    /// Whether `alert` satisfies every predicate that is set.
    pub fn matches(&self, alert: &Alert) -> bool {
        let details = alert.details();

        self.kind.is_none_or(|k| alert.kind() == k)
            && self.resolved.is_none_or(|r| alert.is_resolved() == r)
            && self
                .train_number
                .as_ref()
                .is_none_or(|t| details.train_number() == t)
            && self
                .object_id
                .as_ref()
                .is_none_or(|o| details.object_id() == Some(o))
            && self
                .station_code
                .as_ref()
                .is_none_or(|s| details.station_code() == Some(s))
            && self.since.is_none_or(|t| alert.detected_at() >= t)
    }
}
