//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::alerts::{AlertError, AlertFilter};
use crate::domain::{
    AlertId, AlertKind, DomainError, InvalidAlertKind, InvalidIdentifier, ObjectId, StationCode,
    TrainNumber,
};
use crate::engine::TrainReport;
use crate::registry::RegistryError;
use crate::seed::{ObjectRecord, TrainRecord};
use crate::simulation::{MovementRequest, SimulationError};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/stations", get(list_stations))
        .route("/api/trains", get(list_trains).post(register_train))
        .route("/api/trains/:number", get(get_train))
        .route("/api/trains/:number/position", put(report_train_position))
        .route("/api/objects", get(list_objects).post(register_object))
        .route("/api/objects/:id", get(get_object))
        .route("/api/objects/:id/position", put(report_object_position))
        .route("/api/alerts", get(list_alerts))
        .route("/api/alerts/stats/summary", get(alert_stats))
        .route("/api/alerts/:id", get(get_alert))
        .route("/api/alerts/:id/resolve", put(resolve_alert))
        .route("/api/simulate/train-movement", post(simulate_movement))
        .route("/api/simulate/object-theft/:id", post(simulate_theft))
        .route("/api/simulate/full-journey/:number", post(simulate_journey))
        .route("/api/simulate/random-events", post(simulate_random_events))
        .route("/api/monitor/start", post(start_monitor))
        .route("/api/monitor/stop", post(stop_monitor))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

async fn list_stations(State(state): State<AppState>) -> Json<Vec<StationResult>> {
    let stations = state.engine.stations().await;
    Json(stations.iter().map(StationResult::from_station).collect())
}

async fn list_trains(State(state): State<AppState>) -> Json<Vec<TrainResult>> {
    let trains = state.engine.trains().await;
    Json(trains.iter().map(TrainResult::from_train).collect())
}

async fn get_train(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<TrainResult>, AppError> {
    let number = TrainNumber::parse(&number)?;
    let train = state.engine.train(&number).await?;
    Ok(Json(TrainResult::from_train(&train)))
}

/// Register a new train.
async fn register_train(
    State(state): State<AppState>,
    Json(record): Json<TrainRecord>,
) -> Result<impl IntoResponse, AppError> {
    let default_radius = state.engine.geofence_config().default_coach_radius_km;
    let train = record.to_train(default_radius)?;
    let train = state.engine.register_train(train).await?;
    Ok((StatusCode::CREATED, Json(TrainResult::from_train(&train))))
}

/// Apply a position report for a train.
async fn report_train_position(
    State(state): State<AppState>,
    Path(number): Path<String>,
    Json(req): Json<TrainPositionRequest>,
) -> Result<Json<TrainResult>, AppError> {
    let number = TrainNumber::parse(&number)?;
    let report = TrainReport {
        position: req.location.coordinates,
        speed_kmh: req.speed,
        bearing_deg: req.direction,
    };
    let result = state.engine.report_train_position(&number, report).await?;
    Ok(Json(TrainResult::from_train(&result.outcome)))
}

async fn list_objects(State(state): State<AppState>) -> Json<Vec<ObjectResult>> {
    let objects = state.engine.objects().await;
    Json(objects.iter().map(ObjectResult::from_object).collect())
}

async fn get_object(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ObjectResult>, AppError> {
    let id = ObjectId::parse(&id)?;
    let object = state.engine.object(&id).await?;
    Ok(Json(ObjectResult::from_object(&object)))
}

/// Register a new tracked object.
async fn register_object(
    State(state): State<AppState>,
    Json(record): Json<ObjectRecord>,
) -> Result<impl IntoResponse, AppError> {
    let object = state
        .engine
        .register_object(record.to_new_object()?)
        .await?;
    Ok((StatusCode::CREATED, Json(ObjectResult::from_object(&object))))
}

/// Apply a position report for an object.
async fn report_object_position(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ObjectPositionRequest>,
) -> Result<Json<ObjectResult>, AppError> {
    let id = ObjectId::parse(&id)?;
    let result = state
        .engine
        .report_object_position(&id, req.location.coordinates)
        .await?;
    Ok(Json(ObjectResult::from_object(&result.outcome)))
}

/// List alerts matching the query filters.
async fn list_alerts(
    State(state): State<AppState>,
    Query(req): Query<AlertQuery>,
) -> Result<Json<Vec<AlertResult>>, AppError> {
    let filter = alert_filter(&req)?;
    let alerts = state.engine.alerts(&filter).await;
    Ok(Json(alerts.iter().map(AlertResult::from_alert).collect()))
}

fn alert_filter(req: &AlertQuery) -> Result<AlertFilter, AppError> {
    let mut filter = AlertFilter::new();

    if let Some(kind) = &req.alert_type {
        filter = filter.with_kind(kind.parse::<AlertKind>()?);
    }
    if let Some(resolved) = req.resolved {
        filter = filter.with_resolved(resolved);
    }
    if let Some(number) = &req.train_number {
        filter = filter.with_train(TrainNumber::parse(number)?);
    }
    if let Some(id) = &req.object_id {
        filter = filter.with_object(ObjectId::parse(id)?);
    }
    if let Some(code) = &req.station_code {
        filter = filter.with_station(StationCode::parse_normalized(code)?);
    }
    if let Some(since) = req.since {
        filter = filter.with_since(since);
    }

    Ok(filter)
}

fn parse_alert_id(id: &str) -> Result<AlertId, AppError> {
    id.parse().map_err(|_| AppError::BadRequest {
        message: format!("Invalid alert ID format: {id}"),
    })
}

async fn get_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AlertResult>, AppError> {
    let alert = state.engine.alert(parse_alert_id(&id)?).await?;
    Ok(Json(AlertResult::from_alert(&alert)))
}

/// Mark an alert resolved. Resolving twice is harmless.
async fn resolve_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ResolveResponse>, AppError> {
    let alert = state.engine.resolve_alert(parse_alert_id(&id)?).await?;
    Ok(Json(ResolveResponse {
        message: "Alert resolved successfully".to_string(),
        alert: AlertResult::from_alert(&alert),
    }))
}

async fn alert_stats(
    State(state): State<AppState>,
    Query(req): Query<StatsQuery>,
) -> Result<Json<StatsResponse>, AppError> {
    let stats = state.engine.alert_stats(req.days).await?;
    Ok(Json(StatsResponse::from_stats(&stats, req.days)))
}

/// Advance one or all trains by one tick.
async fn simulate_movement(
    State(state): State<AppState>,
    Query(req): Query<MovementQuery>,
) -> Result<Json<MovementResponse>, AppError> {
    let request = MovementRequest {
        train: req
            .train_number
            .as_deref()
            .map(TrainNumber::parse)
            .transpose()?,
        distance_km: req.distance_km,
    };
    let result = state.engine.simulate_movement(request).await?;
    Ok(Json(MovementResponse::from_outcome(
        &result.outcome,
        &result.evaluation,
    )))
}

/// Move an object away from its train.
async fn simulate_theft(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(req): Query<TheftQuery>,
) -> Result<Json<TheftResponse>, AppError> {
    let id = ObjectId::parse(&id)?;
    let result = state.engine.simulate_theft(&id, req.distance).await?;
    Ok(Json(TheftResponse::from_outcome(
        &result.outcome,
        &result.evaluation,
    )))
}

/// Send a train towards a station.
async fn simulate_journey(
    State(state): State<AppState>,
    Path(number): Path<String>,
    Query(req): Query<JourneyQuery>,
) -> Result<Json<JourneyResponse>, AppError> {
    let number = TrainNumber::parse(&number)?;
    let destination = StationCode::parse_normalized(&req.destination_station)?;
    let result = state.engine.simulate_journey(&number, &destination).await?;
    Ok(Json(JourneyResponse::from_plan(&result.outcome)))
}

async fn simulate_random_events(
    State(state): State<AppState>,
    Query(req): Query<RandomEventsQuery>,
) -> Result<Json<RandomEventsResponse>, AppError> {
    let result = state
        .engine
        .simulate_random_events(req.theft_probability, req.count)
        .await?;
    let events: Vec<_> = result.outcome.iter().map(EventResult::from_event).collect();
    Ok(Json(RandomEventsResponse {
        message: format!("Generated {} random events", events.len()),
        events,
        alerts_created: result.evaluation.created(),
    }))
}

async fn start_monitor(State(state): State<AppState>) -> Json<MonitorResponse> {
    let message = if state.monitor.start() {
        "Monitor started"
    } else {
        "Monitor already running"
    };
    Json(MonitorResponse {
        message: message.to_string(),
        running: state.monitor.is_running(),
    })
}

async fn stop_monitor(State(state): State<AppState>) -> Json<MonitorResponse> {
    let message = if state.monitor.stop() {
        "Monitor stopped"
    } else {
        "Monitor not running"
    };
    Json(MonitorResponse {
        message: message.to_string(),
        running: state.monitor.is_running(),
    })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
}

impl From<InvalidIdentifier> for AppError {
    fn from(e: InvalidIdentifier) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<InvalidAlertKind> for AppError {
    fn from(e: InvalidAlertKind) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<RegistryError> for AppError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::Domain(e) => e.into(),
            RegistryError::StationNotFound(_)
            | RegistryError::TrainNotFound(_)
            | RegistryError::ObjectNotFound(_) => AppError::NotFound {
                message: e.to_string(),
            },
        }
    }
}

impl From<AlertError> for AppError {
    fn from(e: AlertError) -> Self {
        match e {
            AlertError::NotFound(_) => AppError::NotFound {
                message: e.to_string(),
            },
            AlertError::PeriodOutOfRange(_) => AppError::BadRequest {
                message: e.to_string(),
            },
        }
    }
}

impl From<SimulationError> for AppError {
    fn from(e: SimulationError) -> Self {
        match e {
            SimulationError::Registry(e) => e.into(),
            SimulationError::InvalidSpeed { .. }
            | SimulationError::InvalidDistance(_)
            | SimulationError::InvalidProbability(_)
            | SimulationError::TooManyEvents { .. } => AppError::BadRequest {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
        };

        warn!(status = %status, error = %message, "Request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
