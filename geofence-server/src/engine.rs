//! The geofence engine.
//!
//! Bundles the registry, the alert store, the evaluator and the simulator
//! behind one handle. Every mutation is followed by an evaluation pass so
//! the alert store reflects the new positions before the call returns.

use chrono::{TimeDelta, Utc};
use tracing::debug;

use crate::alerts::{AlertError, AlertFilter, AlertStats, AlertStore};
use crate::domain::{
    Alert, AlertId, DomainError, ObjectId, Station, StationCode, TrackedObject, Train, TrainNumber,
};
use crate::evaluator::{EvaluationReport, Evaluator, GeofenceConfig};
use crate::geo::Position;
use crate::registry::{NewObject, Registry, RegistryError};
use crate::simulation::{
    JourneyPlan, MovementOutcome, MovementRequest, SimulatedEvent, SimulationConfig,
    SimulationError, Simulator, TheftOutcome,
};

/// Default period covered by alert statistics.
pub const DEFAULT_STATS_DAYS: u32 = 7;

/// The result of a mutation together with the evaluation pass that
/// followed it.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluated<T> {
    pub outcome: T,
    pub evaluation: EvaluationReport,
}

/// A position report for a train. Speed and bearing are optional.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainReport {
    pub position: Position,
    pub speed_kmh: Option<f64>,
    pub bearing_deg: Option<f64>,
}

impl TrainReport {
    pub fn at(position: Position) -> Self {
        Self {
            position,
            speed_kmh: None,
            bearing_deg: None,
        }
    }
}

/// Live geofence state and the operations on it.
pub struct GeofenceEngine {
    registry: Registry,
    alerts: AlertStore,
    evaluator: Evaluator,
    simulator: Simulator,
}

impl GeofenceEngine {
    /// Create an engine with an empty registry.
    pub fn new(geofence: GeofenceConfig, simulation: SimulationConfig) -> Self {
        Self {
            registry: Registry::new(),
            alerts: AlertStore::new(),
            evaluator: Evaluator::new(geofence),
            simulator: Simulator::new(simulation),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn alert_store(&self) -> &AlertStore {
        &self.alerts
    }

    pub fn geofence_config(&self) -> &GeofenceConfig {
        self.evaluator.config()
    }

    /// Run one evaluation pass.
    pub async fn evaluate(&self) -> EvaluationReport {
        self.evaluator.evaluate(&self.registry, &self.alerts).await
    }

    async fn evaluated<T>(&self, outcome: T) -> Evaluated<T> {
        let evaluation = self.evaluate().await;
        Evaluated {
            outcome,
            evaluation,
        }
    }

    // Registration

    pub async fn add_station(&self, station: Station) -> Result<(), DomainError> {
        self.registry.add_station(station).await?;
        self.evaluate().await;
        Ok(())
    }

    pub async fn register_train(&self, train: Train) -> Result<Train, DomainError> {
        self.registry.add_train(train.clone()).await?;
        self.evaluate().await;
        Ok(train)
    }

    pub async fn register_object(&self, object: NewObject) -> Result<TrackedObject, DomainError> {
        let object = self.registry.add_object(object).await?;
        self.evaluate().await;
        Ok(object)
    }

    // Telemetry

    /// Apply a train position report. The report is validated as a whole
    /// before any of it is applied.
    pub async fn report_train_position(
        &self,
        number: &TrainNumber,
        report: TrainReport,
    ) -> Result<Evaluated<Train>, RegistryError> {
        if !report.position.is_valid() {
            return Err(DomainError::InvalidPosition {
                entity: format!("train {number}"),
                position: report.position,
            }
            .into());
        }

        let handle = self.registry.require_train(number).await?;
        let objects = self.registry.objects_on(number).await;

        let train = {
            let mut train = handle.lock().await;
            let mut updated = train.clone();
            if let Some(speed) = report.speed_kmh {
                updated.set_speed(speed)?;
            }
            if let Some(bearing) = report.bearing_deg {
                updated.set_bearing(bearing)?;
            }
            updated.set_position(report.position);
            *train = updated;

            for object in &objects {
                object.lock().await.follow_train(report.position);
            }
            train.clone()
        };

        debug!(train = %number, position = %report.position, "Train position reported");
        Ok(self.evaluated(train).await)
    }

    /// Apply an object position report. A reported object no longer rides
    /// with its train.
    pub async fn report_object_position(
        &self,
        id: &ObjectId,
        position: Position,
    ) -> Result<Evaluated<TrackedObject>, RegistryError> {
        if !position.is_valid() {
            return Err(DomainError::InvalidPosition {
                entity: format!("object {id}"),
                position,
            }
            .into());
        }

        let handle = self.registry.require_object(id).await?;
        let object = {
            let mut object = handle.lock().await;
            object.displace_to(position);
            object.clone()
        };

        debug!(object = %id, position = %position, "Object position reported");
        Ok(self.evaluated(object).await)
    }

    // Queries

    pub async fn stations(&self) -> Vec<Station> {
        self.registry
            .stations()
            .await
            .iter()
            .map(|s| Station::clone(s))
            .collect()
    }

    pub async fn station(&self, code: &StationCode) -> Result<Station, RegistryError> {
        Ok(Station::clone(&*self.registry.require_station(code).await?))
    }

    pub async fn trains(&self) -> Vec<Train> {
        self.registry.trains().await
    }

    pub async fn train(&self, number: &TrainNumber) -> Result<Train, RegistryError> {
        let handle = self.registry.require_train(number).await?;
        let train = handle.lock().await.clone();
        Ok(train)
    }

    pub async fn objects(&self) -> Vec<TrackedObject> {
        self.registry.objects().await
    }

    pub async fn object(&self, id: &ObjectId) -> Result<TrackedObject, RegistryError> {
        let handle = self.registry.require_object(id).await?;
        let object = handle.lock().await.clone();
        Ok(object)
    }

    // Alerts

    pub async fn alerts(&self, filter: &AlertFilter) -> Vec<Alert> {
        self.alerts.query(filter).await
    }

    pub async fn alert(&self, id: AlertId) -> Result<Alert, AlertError> {
        self.alerts.get(id).await
    }

    pub async fn resolve_alert(&self, id: AlertId) -> Result<Alert, AlertError> {
        self.alerts.resolve(id).await
    }

    /// Alert statistics over the last `days` days.
    pub async fn alert_stats(&self, days: u32) -> Result<AlertStats, AlertError> {
        let since = TimeDelta::try_days(i64::from(days))
            .and_then(|period| Utc::now().checked_sub_signed(period))
            .ok_or(AlertError::PeriodOutOfRange(days))?;
        Ok(self.alerts.stats(since).await)
    }

    // Simulation

    pub async fn simulate_movement(
        &self,
        request: MovementRequest,
    ) -> Result<Evaluated<MovementOutcome>, SimulationError> {
        let outcome = self
            .simulator
            .simulate_movement(&self.registry, request)
            .await?;
        Ok(self.evaluated(outcome).await)
    }

    pub async fn simulate_theft(
        &self,
        object_id: &ObjectId,
        target_km: f64,
    ) -> Result<Evaluated<TheftOutcome>, SimulationError> {
        let outcome = self
            .simulator
            .simulate_theft(&self.registry, object_id, target_km)
            .await?;
        Ok(self.evaluated(outcome).await)
    }

    pub async fn simulate_journey(
        &self,
        train_number: &TrainNumber,
        station_code: &StationCode,
    ) -> Result<Evaluated<JourneyPlan>, SimulationError> {
        let plan = self
            .simulator
            .simulate_journey(&self.registry, train_number, station_code)
            .await?;
        Ok(self.evaluated(plan).await)
    }

    pub async fn simulate_random_events(
        &self,
        theft_probability: f64,
        count: usize,
    ) -> Result<Evaluated<Vec<SimulatedEvent>>, SimulationError> {
        let events = self
            .simulator
            .simulate_random_events(&self.registry, theft_probability, count)
            .await?;
        Ok(self.evaluated(events).await)
    }
}

impl Default for GeofenceEngine {
    fn default() -> Self {
        Self::new(GeofenceConfig::default(), SimulationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AlertKind;
    use crate::geo::{destination_point, distance_km};
    use crate::testing::{NEW_DELHI, add_object, add_station, add_train};

    async fn engine() -> GeofenceEngine {
        let engine = GeofenceEngine::new(
            GeofenceConfig::default(),
            SimulationConfig::default().with_seed(11),
        );
        add_station(engine.registry(), "NDLS", "New Delhi", NEW_DELHI).await;
        let start = destination_point(NEW_DELHI, 180.0, 30.0);
        add_train(engine.registry(), "12301", start, 60.0, &[("A1", 0.05)]).await;
        add_object(engine.registry(), "OBJ001", "12301", "A1").await;
        engine
    }

    fn number() -> TrainNumber {
        TrainNumber::parse("12301").unwrap()
    }

    #[tokio::test]
    async fn theft_alert_records_actual_distance() {
        let engine = engine().await;
        let id = ObjectId::parse("OBJ001").unwrap();

        let result = engine.simulate_theft(&id, 0.1).await.unwrap();
        assert_eq!(result.evaluation.theft_created, 1);

        let alerts = engine
            .alerts(&AlertFilter::new().with_kind(AlertKind::Theft))
            .await;
        assert_eq!(alerts.len(), 1);
        assert_eq!(
            alerts[0].details().distance_km(),
            result.outcome.actual_distance_km
        );
    }

    #[tokio::test]
    async fn train_report_raises_proximity_alert() {
        let engine = engine().await;
        let near = destination_point(NEW_DELHI, 90.0, 0.5);

        let result = engine
            .report_train_position(&number(), TrainReport::at(near))
            .await
            .unwrap();
        assert_eq!(result.evaluation.proximity_created, 1);
        assert_eq!(result.outcome.position(), near);

        // Riding objects follow the report
        let object = engine
            .object(&ObjectId::parse("OBJ001").unwrap())
            .await
            .unwrap();
        assert_eq!(object.position(), near);
        assert_eq!(result.evaluation.theft_created, 0);
    }

    #[tokio::test]
    async fn invalid_train_report_changes_nothing() {
        let engine = engine().await;
        let before = engine.train(&number()).await.unwrap();

        let report = TrainReport {
            position: NEW_DELHI,
            speed_kmh: Some(90.0),
            bearing_deg: Some(f64::NAN),
        };
        let err = engine
            .report_train_position(&number(), report)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Domain(DomainError::InvalidBearing { .. })
        ));
        assert_eq!(engine.train(&number()).await.unwrap(), before);
    }

    #[tokio::test]
    async fn object_report_displaces() {
        let engine = engine().await;
        let id = ObjectId::parse("OBJ001").unwrap();
        let train = engine.train(&number()).await.unwrap();
        let away = destination_point(train.position(), 0.0, 0.2);

        let result = engine.report_object_position(&id, away).await.unwrap();
        assert!(result.outcome.is_displaced());
        assert_eq!(result.evaluation.theft_created, 1);
    }

    #[tokio::test]
    async fn journey_reaches_station_and_alerts() {
        let engine = engine().await;
        let plan = engine
            .simulate_journey(&number(), &StationCode::parse("NDLS").unwrap())
            .await
            .unwrap()
            .outcome;
        assert!((plan.duration_minutes - 30.0).abs() < 1e-6);

        let mut arrived = false;
        for _ in 0..plan.expected_ticks + 1 {
            let tick = engine
                .simulate_movement(MovementRequest::all())
                .await
                .unwrap();
            if !tick.outcome.arrived.is_empty() {
                arrived = true;
                break;
            }
        }
        assert!(arrived);

        let train = engine.train(&number()).await.unwrap();
        assert!(distance_km(train.position(), NEW_DELHI) < 1e-9);
        let proximity = engine
            .alerts(
                &AlertFilter::new()
                    .with_kind(AlertKind::StationProximity)
                    .with_resolved(false),
            )
            .await;
        assert_eq!(proximity.len(), 1);
    }

    #[tokio::test]
    async fn resolve_and_stats() {
        let engine = engine().await;
        let id = ObjectId::parse("OBJ001").unwrap();
        engine.simulate_theft(&id, 0.1).await.unwrap();

        let alert = engine.alerts(&AlertFilter::new()).await.remove(0);
        let resolved = engine.resolve_alert(alert.id()).await.unwrap();
        assert!(resolved.is_resolved());

        let stats = engine.alert_stats(DEFAULT_STATS_DAYS).await.unwrap();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.by_status.resolved, 1);
        assert_eq!(stats.by_kind.theft, 1);

        // Still displaced, so the next pass opens a fresh alert
        let report = engine.evaluate().await;
        assert_eq!(report.theft_created, 1);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let engine = engine().await;
        assert!(engine.alert(AlertId::new(42)).await.is_err());
        assert!(matches!(
            engine
                .train(&TrainNumber::parse("00000").unwrap())
                .await
                .unwrap_err(),
            RegistryError::TrainNotFound(_)
        ));
        assert!(matches!(
            engine
                .simulate_theft(&ObjectId::parse("NOPE").unwrap(), 0.1)
                .await
                .unwrap_err(),
            SimulationError::Registry(RegistryError::ObjectNotFound(_))
        ));
    }
}
