//! Data transfer objects for web requests and responses.
//!
//! Entity and alert records use camelCase field names and GeoJSON points.
//! Simulation and statistics responses use snake_case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::alerts::AlertStats;
use crate::domain::{Alert, AlertDetails, Station, TrackedObject, Train};
use crate::engine::DEFAULT_STATS_DAYS;
use crate::evaluator::EvaluationReport;
use crate::geo::{GeoPoint, Position};
use crate::simulation::{JourneyPlan, MovementOutcome, SimulatedEvent, TheftOutcome};

/// A station.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationResult {
    pub code: String,
    pub name: String,
    pub location: GeoPoint,
}

/// A coach and its geofence radius in km.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachResult {
    pub id: String,
    pub geofence_radius: f64,
}

/// A train with its coaches.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainResult {
    pub number: String,
    pub name: String,
    pub location: GeoPoint,

    /// Speed in km/h
    pub speed: f64,

    /// Bearing in degrees clockwise from north
    pub direction: f64,

    pub coaches: Vec<CoachResult>,

    /// Station the train is journeying to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_station: Option<String>,
}

/// A tracked object.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectResult {
    pub id: String,
    #[serde(rename = "type")]
    pub object_type: String,
    pub owner_id: String,
    pub train_number: String,
    pub coach_id: String,
    pub location: GeoPoint,

    /// Whether the object has left its train
    pub displaced: bool,
}

/// An alert. Fields that do not apply to the alert's type are omitted.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertResult {
    pub id: u64,

    /// `station_proximity` or `theft`
    #[serde(rename = "type")]
    pub kind: &'static str,

    pub train_number: String,
    pub train_name: String,

    /// Distance in km: train to station, or object to train
    pub distance: f64,

    pub timestamp: DateTime<Utc>,
    pub resolved: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coach_id: Option<String>,
}

/// Query parameters for listing alerts. All filters are combined.
#[derive(Debug, Default, Deserialize)]
pub struct AlertQuery {
    /// `station_proximity` or `theft`
    pub alert_type: Option<String>,
    pub resolved: Option<bool>,
    pub train_number: Option<String>,
    pub object_id: Option<String>,
    pub station_code: Option<String>,

    /// Only alerts detected at or after this instant (RFC 3339)
    pub since: Option<DateTime<Utc>>,
}

/// Query parameters for alert statistics.
#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    #[serde(default = "default_stats_days")]
    pub days: u32,
}

fn default_stats_days() -> u32 {
    DEFAULT_STATS_DAYS
}

/// Per-train alert count.
#[derive(Debug, Serialize)]
pub struct TrainCountResult {
    pub train_number: String,
    pub train_name: String,
    pub alert_count: usize,
}

/// Alert counts by type.
#[derive(Debug, Serialize)]
pub struct KindCountResult {
    pub station_proximity: usize,
    pub theft: usize,
}

/// Alert counts by resolution status.
#[derive(Debug, Serialize)]
pub struct StatusCountResult {
    pub resolved: usize,
    pub unresolved: usize,
}

/// Alert statistics over a period.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total: usize,
    pub by_type: KindCountResult,
    pub by_status: StatusCountResult,
    pub by_train: Vec<TrainCountResult>,
    pub period_days: u32,
    pub since: DateTime<Utc>,
}

/// Response to resolving an alert.
#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub message: String,
    pub alert: AlertResult,
}

/// A train position report.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainPositionRequest {
    pub location: GeoPoint,
    pub speed: Option<f64>,
    pub direction: Option<f64>,
}

/// An object position report.
#[derive(Debug, Deserialize)]
pub struct ObjectPositionRequest {
    pub location: GeoPoint,
}

/// Query parameters for a movement tick.
#[derive(Debug, Default, Deserialize)]
pub struct MovementQuery {
    /// Move only this train
    pub train_number: Option<String>,

    /// Move this far instead of by speed
    pub distance_km: Option<f64>,
}

/// Query parameters for a simulated theft.
#[derive(Debug, Deserialize)]
pub struct TheftQuery {
    /// How far to move the object, in km
    #[serde(default = "default_theft_distance")]
    pub distance: f64,
}

fn default_theft_distance() -> f64 {
    0.1
}

/// Query parameters for a simulated journey.
#[derive(Debug, Deserialize)]
pub struct JourneyQuery {
    pub destination_station: String,
}

/// Query parameters for random events.
#[derive(Debug, Deserialize)]
pub struct RandomEventsQuery {
    #[serde(default = "default_theft_probability")]
    pub theft_probability: f64,
    #[serde(default = "default_event_count")]
    pub count: usize,
}

fn default_theft_probability() -> f64 {
    0.2
}

fn default_event_count() -> usize {
    1
}

/// A train that reached its destination.
#[derive(Debug, Serialize)]
pub struct ArrivalResult {
    pub train_number: String,
    pub station_code: String,
}

/// Response to a movement tick.
#[derive(Debug, Serialize)]
pub struct MovementResponse {
    pub message: String,
    pub trains_updated: usize,
    pub arrived: Vec<ArrivalResult>,
    pub alerts_created: usize,
}

/// Response to a simulated theft.
#[derive(Debug, Serialize)]
pub struct TheftResponse {
    pub message: String,
    pub object_id: String,
    pub train_number: String,
    pub requested_distance_km: f64,
    pub actual_distance_km: f64,
    pub new_coordinates: Position,
    pub alerts_created: usize,
}

/// Response to starting a journey.
#[derive(Debug, Serialize)]
pub struct JourneyResponse {
    pub message: String,
    pub train_number: String,
    pub train_name: String,
    pub destination_station: String,
    pub destination_name: String,
    pub distance_km: f64,
    pub duration_minutes: f64,
    pub speed_kmh: f64,
    pub direction_degrees: f64,

    /// Movement ticks until arrival
    pub updates_count: u64,
}

/// One random event.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventResult {
    TheftSimulation {
        object_id: String,
        distance_km: f64,
        actual_distance_km: f64,
    },
    TrainMovement {
        train_number: String,
        new_coordinates: Position,
        arrived: bool,
    },
}

/// Response to generating random events.
#[derive(Debug, Serialize)]
pub struct RandomEventsResponse {
    pub message: String,
    pub events: Vec<EventResult>,
    pub alerts_created: usize,
}

/// Monitor state after a start or stop request.
#[derive(Debug, Serialize)]
pub struct MonitorResponse {
    pub message: String,
    pub running: bool,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

// Conversion implementations

impl StationResult {
    pub fn from_station(station: &Station) -> Self {
        Self {
            code: station.code().to_string(),
            name: station.name().to_string(),
            location: station.position().into(),
        }
    }
}

impl TrainResult {
    pub fn from_train(train: &Train) -> Self {
        Self {
            number: train.number().to_string(),
            name: train.name().to_string(),
            location: train.position().into(),
            speed: train.speed_kmh(),
            direction: train.bearing_deg(),
            coaches: train
                .coaches()
                .iter()
                .map(|c| CoachResult {
                    id: c.id().to_string(),
                    geofence_radius: c.geofence_radius_km(),
                })
                .collect(),
            destination_station: train.journey().map(|j| j.destination.to_string()),
        }
    }
}

impl ObjectResult {
    pub fn from_object(object: &TrackedObject) -> Self {
        Self {
            id: object.id().to_string(),
            object_type: object.object_type().to_string(),
            owner_id: object.owner_id().to_string(),
            train_number: object.train_number().to_string(),
            coach_id: object.coach_id().to_string(),
            location: object.position().into(),
            displaced: object.is_displaced(),
        }
    }
}

impl AlertResult {
    pub fn from_alert(alert: &Alert) -> Self {
        let details = alert.details();
        let mut result = Self {
            id: alert.id().get(),
            kind: alert.kind().as_str(),
            train_number: details.train_number().to_string(),
            train_name: details.train_name().to_string(),
            distance: details.distance_km(),
            timestamp: alert.detected_at(),
            resolved: alert.is_resolved(),
            station_code: None,
            station_name: None,
            object_id: None,
            object_type: None,
            owner_id: None,
            coach_id: None,
        };

        match details {
            AlertDetails::StationProximity(p) => {
                result.station_code = Some(p.station_code.to_string());
                result.station_name = Some(p.station_name.clone());
            }
            AlertDetails::Theft(t) => {
                result.object_id = Some(t.object_id.to_string());
                result.object_type = Some(t.object_type.clone());
                result.owner_id = Some(t.owner_id.clone());
                result.coach_id = Some(t.coach_id.to_string());
            }
        }

        result
    }
}

impl StatsResponse {
    pub fn from_stats(stats: &AlertStats, period_days: u32) -> Self {
        Self {
            total: stats.total,
            by_type: KindCountResult {
                station_proximity: stats.by_kind.station_proximity,
                theft: stats.by_kind.theft,
            },
            by_status: StatusCountResult {
                resolved: stats.by_status.resolved,
                unresolved: stats.by_status.unresolved,
            },
            by_train: stats
                .by_train
                .iter()
                .map(|t| TrainCountResult {
                    train_number: t.train_number.to_string(),
                    train_name: t.train_name.clone(),
                    alert_count: t.alert_count,
                })
                .collect(),
            period_days,
            since: stats.since,
        }
    }
}

impl MovementResponse {
    pub fn from_outcome(outcome: &MovementOutcome, evaluation: &EvaluationReport) -> Self {
        Self {
            message: format!("Updated positions for {} trains", outcome.trains_updated),
            trains_updated: outcome.trains_updated,
            arrived: outcome
                .arrived
                .iter()
                .map(|a| ArrivalResult {
                    train_number: a.train.to_string(),
                    station_code: a.station.to_string(),
                })
                .collect(),
            alerts_created: evaluation.created(),
        }
    }
}

impl TheftResponse {
    pub fn from_outcome(outcome: &TheftOutcome, evaluation: &EvaluationReport) -> Self {
        Self {
            message: format!(
                "Object {} moved {:.0} meters from its train",
                outcome.object_id,
                outcome.actual_distance_km * 1000.0
            ),
            object_id: outcome.object_id.to_string(),
            train_number: outcome.train_number.to_string(),
            requested_distance_km: outcome.requested_distance_km,
            actual_distance_km: outcome.actual_distance_km,
            new_coordinates: outcome.position,
            alerts_created: evaluation.created(),
        }
    }
}

impl JourneyResponse {
    pub fn from_plan(plan: &JourneyPlan) -> Self {
        Self {
            message: format!(
                "Journey simulation started for train {} to {}",
                plan.train_name, plan.destination_name
            ),
            train_number: plan.train_number.to_string(),
            train_name: plan.train_name.clone(),
            destination_station: plan.destination_code.to_string(),
            destination_name: plan.destination_name.clone(),
            distance_km: plan.distance_km,
            duration_minutes: plan.duration_minutes,
            speed_kmh: plan.speed_kmh,
            direction_degrees: plan.bearing_deg,
            updates_count: plan.expected_ticks,
        }
    }
}

impl EventResult {
    pub fn from_event(event: &SimulatedEvent) -> Self {
        match event {
            SimulatedEvent::Theft(t) => EventResult::TheftSimulation {
                object_id: t.object_id.to_string(),
                distance_km: t.requested_distance_km,
                actual_distance_km: t.actual_distance_km,
            },
            SimulatedEvent::Movement {
                train_number,
                position,
                arrived,
            } => EventResult::TrainMovement {
                train_number: train_number.to_string(),
                new_coordinates: *position,
                arrived: *arrived,
            },
        }
    }
}
