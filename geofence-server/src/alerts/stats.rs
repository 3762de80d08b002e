//! Alert statistics.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::domain::{Alert, AlertKind, TrainNumber};

/// Alert counts by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KindCounts {
    pub station_proximity: usize,
    pub theft: usize,
}

/// Alert counts by resolution status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub resolved: usize,
    pub unresolved: usize,
}

/// Number of alerts raised for one train.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainAlertCount {
    pub train_number: TrainNumber,
    pub train_name: String,
    pub alert_count: usize,
}

/// Summary of the alerts detected since some instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertStats {
    pub since: DateTime<Utc>,
    pub total: usize,
    pub by_kind: KindCounts,
    pub by_status: StatusCounts,
    /// Trains with at least one alert, most alerts first.
    pub by_train: Vec<TrainAlertCount>,
}

impl AlertStats {
    /// Summarize the alerts detected at or after `since`.
    pub fn compute<'a>(alerts: impl IntoIterator<Item = &'a Alert>, since: DateTime<Utc>) -> Self {
        let mut by_kind = KindCounts::default();
        let mut by_status = StatusCounts::default();
        let mut per_train: HashMap<TrainNumber, TrainAlertCount> = HashMap::new();
        let mut total = 0;

        for alert in alerts.into_iter().filter(|a| a.detected_at() >= since) {
            total += 1;

            match alert.kind() {
                AlertKind::StationProximity => by_kind.station_proximity += 1,
                AlertKind::Theft => by_kind.theft += 1,
            }

            if alert.is_resolved() {
                by_status.resolved += 1;
            } else {
                by_status.unresolved += 1;
            }

            let details = alert.details();
            per_train
                .entry(details.train_number().clone())
                .or_insert_with(|| TrainAlertCount {
                    train_number: details.train_number().clone(),
                    train_name: details.train_name().to_string(),
                    alert_count: 0,
                })
                .alert_count += 1;
        }

        let mut by_train: Vec<_> = per_train.into_values().collect();
        by_train.sort_by(|a, b| {
            b.alert_count
                .cmp(&a.alert_count)
                .then_with(|| a.train_number.cmp(&b.train_number))
        });

        Self {
            since,
            total,
            by_kind,
            by_status,
            by_train,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        AlertDetails, AlertId, CoachId, ObjectId, ProximityAlert, StationCode, TheftAlert,
    };
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, hour, 0, 0).unwrap()
    }

    fn proximity(id: u64, train: &str, hour: u32) -> Alert {
        Alert::new(
            AlertId::new(id),
            AlertDetails::StationProximity(ProximityAlert {
                train_number: TrainNumber::parse(train).unwrap(),
                train_name: format!("Train {train}"),
                station_code: StationCode::parse("NDLS").unwrap(),
                station_name: "New Delhi".to_string(),
                distance_km: 0.5,
            }),
            at(hour),
        )
    }

    fn theft(id: u64, train: &str, hour: u32) -> Alert {
        Alert::new(
            AlertId::new(id),
            AlertDetails::Theft(TheftAlert {
                object_id: ObjectId::parse("OBJ001").unwrap(),
                object_type: "Luggage".to_string(),
                owner_id: "Rahul Sharma".to_string(),
                coach_id: CoachId::parse("A1").unwrap(),
                train_number: TrainNumber::parse(train).unwrap(),
                train_name: format!("Train {train}"),
                distance_km: 0.1,
            }),
            at(hour),
        )
    }

    #[test]
    fn empty() {
        let alerts: Vec<Alert> = Vec::new();
        let stats = AlertStats::compute(&alerts, at(0));
        assert_eq!(stats.total, 0);
        assert!(stats.by_train.is_empty());
    }

    #[test]
    fn counts_by_kind_status_and_train() {
        let mut resolved = theft(3, "12002", 10);
        resolved.resolve();
        let alerts = vec![
            proximity(1, "12301", 10),
            proximity(2, "12301", 11),
            resolved,
            theft(4, "12301", 12),
        ];

        let stats = AlertStats::compute(&alerts, at(0));

        assert_eq!(stats.total, 4);
        assert_eq!(
            stats.by_kind,
            KindCounts {
                station_proximity: 2,
                theft: 2
            }
        );
        assert_eq!(
            stats.by_status,
            StatusCounts {
                resolved: 1,
                unresolved: 3
            }
        );
        assert_eq!(stats.by_train.len(), 2);
        assert_eq!(stats.by_train[0].train_number.as_str(), "12301");
        assert_eq!(stats.by_train[0].alert_count, 3);
        assert_eq!(stats.by_train[0].train_name, "Train 12301");
        assert_eq!(stats.by_train[1].alert_count, 1);
    }

    #[test]
    fn excludes_alerts_before_since() {
        let alerts = vec![proximity(1, "12301", 8), proximity(2, "12301", 12)];
        let stats = AlertStats::compute(&alerts, at(10));
        assert_eq!(stats.total, 1);
        assert_eq!(stats.by_train[0].alert_count, 1);
    }
}
