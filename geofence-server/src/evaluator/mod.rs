//! Geofence evaluation.
//!
//! One evaluation pass turns the current positions in the registry into
//! alert state:
//!
//! 1. every train is measured against every station, and a train inside the
//!    proximity radius opens (or refreshes) a proximity alert for that pair;
//! 2. every tracked object is measured against its train, and an object
//!    outside its coach's radius opens (or refreshes) a theft alert.
//!
//! Coaches are not separately geolocated, so an object's distance from its
//! coach is measured to the train's position.
//!
//! Passes never resolve alerts; that is an operator decision. They are
//! idempotent apart from refreshing measured distances, and a malformed
//! entity is skipped rather than aborting the pass.

mod config;

pub use config::{DEFAULT_COACH_RADIUS_KM, DEFAULT_PROXIMITY_RADIUS_KM, GeofenceConfig};

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::alerts::{AlertStore, Recorded};
use crate::domain::{AlertDetails, ProximityAlert, Station, TheftAlert};
use crate::geo::distance_km;
use crate::registry::{ObjectHandle, Registry, TrainHandle};

/// Counts from one evaluation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationReport {
    pub trains_checked: usize,
    pub objects_checked: usize,
    pub proximity_created: usize,
    pub proximity_updated: usize,
    pub theft_created: usize,
    pub theft_updated: usize,
    /// Entities that could not be evaluated.
    pub skipped: usize,
}

impl EvaluationReport {
    /// Alerts opened by this pass.
    pub fn created(&self) -> usize {
        self.proximity_created + self.theft_created
    }
}

/// Runs evaluation passes with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    config: GeofenceConfig,
}

impl Evaluator {
    pub fn new(config: GeofenceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeofenceConfig {
        &self.config
    }

    /// Run one pass, stamping new alerts with the current time.
    pub async fn evaluate(&self, registry: &Registry, alerts: &AlertStore) -> EvaluationReport {
        self.evaluate_at(registry, alerts, Utc::now()).await
    }

    /// Run one pass, stamping new alerts with `now`.
    pub async fn evaluate_at(
        &self,
        registry: &Registry,
        alerts: &AlertStore,
        now: DateTime<Utc>,
    ) -> EvaluationReport {
        let mut report = EvaluationReport::default();

        let stations = registry.stations().await;
        for train in registry.train_handles().await {
            self.check_station_proximity(&train, &stations, alerts, now, &mut report)
                .await;
        }

        for object in registry.object_handles().await {
            self.check_object_theft(registry, &object, alerts, now, &mut report)
                .await;
        }

        debug!(
            trains = report.trains_checked,
            objects = report.objects_checked,
            created = report.created(),
            skipped = report.skipped,
            "Evaluation pass complete"
        );

        report
    }

    async fn check_station_proximity(
        &self,
        handle: &TrainHandle,
        stations: &[Arc<Station>],
        alerts: &AlertStore,
        now: DateTime<Utc>,
        report: &mut EvaluationReport,
    ) {
        let (number, name, position) = {
            let train = handle.lock().await;
            (
                train.number().clone(),
                train.name().to_string(),
                train.position(),
            )
        };

        if !position.is_valid() {
            warn!(train = %number, position = %position, "Skipping train with invalid position");
            report.skipped += 1;
            return;
        }
        report.trains_checked += 1;

        for station in stations {
            let distance = distance_km(position, station.position());
            if distance > self.config.proximity_radius_km {
                continue;
            }

            let details = AlertDetails::StationProximity(ProximityAlert {
                train_number: number.clone(),
                train_name: name.clone(),
                station_code: station.code().clone(),
                station_name: station.name().to_string(),
                distance_km: distance,
            });

            match alerts.record(details, now).await {
                Recorded::Created(id) => {
                    report.proximity_created += 1;
                    info!(
                        alert = %id,
                        train = %number,
                        station = %station.code(),
                        distance_km = distance,
                        "Train {} is entering {} ({:.2} km away)",
                        name,
                        station.name(),
                        distance
                    );
                }
                Recorded::Updated(_) => report.proximity_updated += 1,
            }
        }
    }

    async fn check_object_theft(
        &self,
        registry: &Registry,
        handle: &ObjectHandle,
        alerts: &AlertStore,
        now: DateTime<Utc>,
        report: &mut EvaluationReport,
    ) {
        let (object_id, train_number) = {
            let object = handle.lock().await;
            (object.id().clone(), object.train_number().clone())
        };

        let Some(train_handle) = registry.train(&train_number).await else {
            warn!(object = %object_id, train = %train_number, "Skipping object on unknown train");
            report.skipped += 1;
            return;
        };

        // Train before object, and both held while the pair is read.
        let (details, radius_km) = {
            let train = train_handle.lock().await;
            let object = handle.lock().await;

            let Some(coach) = train.coach(object.coach_id()) else {
                warn!(
                    object = %object_id,
                    train = %train_number,
                    coach = %object.coach_id(),
                    "Skipping object on unknown coach"
                );
                report.skipped += 1;
                return;
            };

            if !(object.position().is_valid() && train.position().is_valid()) {
                warn!(object = %object_id, "Skipping object with invalid position");
                report.skipped += 1;
                return;
            }

            let details = TheftAlert {
                object_id: object_id.clone(),
                object_type: object.object_type().to_string(),
                owner_id: object.owner_id().to_string(),
                coach_id: object.coach_id().clone(),
                train_number: train_number.clone(),
                train_name: train.name().to_string(),
                distance_km: distance_km(object.position(), train.position()),
            };
            (details, coach.geofence_radius_km())
        };
        report.objects_checked += 1;

        if details.distance_km <= radius_km {
            return;
        }

        let distance = details.distance_km;
        let object_type = details.object_type.clone();
        let coach_id = details.coach_id.clone();
        let train_name = details.train_name.clone();

        match alerts.record(AlertDetails::Theft(details), now).await {
            Recorded::Created(id) => {
                report.theft_created += 1;
                info!(
                    alert = %id,
                    object = %object_id,
                    train = %train_number,
                    coach = %coach_id,
                    distance_km = distance,
                    "Object {} ({}) has moved {:.2} meters outside train {}, coach {}",
                    object_id,
                    object_type,
                    distance * 1000.0,
                    train_name,
                    coach_id
                );
            }
            Recorded::Updated(_) => report.theft_updated += 1,
        }
    }
}
