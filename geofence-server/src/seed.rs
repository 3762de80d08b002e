//! Seed data for the registry.
//!
//! A seed is a JSON document listing stations, trains and tracked objects,
//! in the same record shapes the HTTP API accepts:
//!
//! ```json
//! {
//!   "stations": [{"code": "NDLS", "name": "New Delhi",
//!                 "location": {"type": "Point", "coordinates": [77.2207, 28.6425]}}],
//!   "trains": [{"number": "12301", "name": "Rajdhani Express",
//!               "location": {"type": "Point", "coordinates": [77.1, 28.55]},
//!               "speed": 80, "direction": 0,
//!               "coaches": [{"id": "A1", "geofenceRadius": 0.05}]}],
//!   "objects": [{"id": "OBJ001", "type": "Luggage", "ownerId": "Rahul Sharma",
//!                "trainNumber": "12301", "coachId": "A1"}]
//! }
//! ```
//!
//! Coaches without a `geofenceRadius` get the configured default radius.
//! Objects without a `location` start at their train's position.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{
    Coach, CoachId, DomainError, ObjectId, Station, StationCode, Train, TrainNumber,
};
use crate::evaluator::GeofenceConfig;
use crate::geo::{GeoPoint, Position};
use crate::registry::{NewObject, Registry};

/// Errors from loading or applying seed data.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid seed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid seed data: {0}")]
    Domain(#[from] DomainError),
}

/// A station record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationRecord {
    pub code: String,
    pub name: String,
    pub location: GeoPoint,
}

impl StationRecord {
    pub fn to_station(&self) -> Result<Station, DomainError> {
        Station::new(
            StationCode::parse(&self.code)?,
            self.name.clone(),
            self.location.coordinates,
        )
    }
}

/// A coach record. The radius is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geofence_radius: Option<f64>,
}

/// A train record. `speed` is in km/h and `direction` is a bearing in
/// degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainRecord {
    pub number: String,
    pub name: String,
    pub location: GeoPoint,
    pub speed: f64,
    #[serde(default)]
    pub direction: f64,
    pub coaches: Vec<CoachRecord>,
}

impl TrainRecord {
    /// Build a validated train. Coaches without a radius get
    /// `default_coach_radius_km`.
    pub fn to_train(&self, default_coach_radius_km: f64) -> Result<Train, DomainError> {
        let coaches = self
            .coaches
            .iter()
            .map(|c| {
                Coach::new(
                    CoachId::parse(&c.id)?,
                    c.geofence_radius.unwrap_or(default_coach_radius_km),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        Train::new(
            TrainNumber::parse(&self.number)?,
            self.name.clone(),
            self.location.coordinates,
            self.speed,
            self.direction,
            coaches,
        )
    }
}

/// A tracked object record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub object_type: String,
    pub owner_id: String,
    pub train_number: String,
    pub coach_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

impl ObjectRecord {
    pub fn to_new_object(&self) -> Result<NewObject, DomainError> {
        Ok(NewObject {
            id: ObjectId::parse(&self.id)?,
            object_type: self.object_type.clone(),
            owner_id: self.owner_id.clone(),
            train_number: TrainNumber::parse(&self.train_number)?,
            coach_id: CoachId::parse(&self.coach_id)?,
            position: self.location.map(|l| l.coordinates),
        })
    }
}

/// Counts of entities registered from a seed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub stations: usize,
    pub trains: usize,
    pub objects: usize,
}

/// A full seed document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub stations: Vec<StationRecord>,
    #[serde(default)]
    pub trains: Vec<TrainRecord>,
    #[serde(default)]
    pub objects: Vec<ObjectRecord>,
}

impl SeedData {
    /// Parse a seed document.
    pub fn from_json(json: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a seed document from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Register everything in the seed, stations first, then trains, then
    /// objects. Stops at the first invalid or duplicate record; records
    /// before it stay registered.
    pub async fn apply(
        &self,
        registry: &Registry,
        config: &GeofenceConfig,
    ) -> Result<SeedSummary, SeedError> {
        for record in &self.stations {
            registry.add_station(record.to_station()?).await?;
        }
        for record in &self.trains {
            registry
                .add_train(record.to_train(config.default_coach_radius_km)?)
                .await?;
        }
        for record in &self.objects {
            registry.add_object(record.to_new_object()?).await?;
        }

        let summary = SeedSummary {
            stations: self.stations.len(),
            trains: self.trains.len(),
            objects: self.objects.len(),
        };
        info!(
            stations = summary.stations,
            trains = summary.trains,
            objects = summary.objects,
            "Seed data applied"
        );
        Ok(summary)
    }

    /// The demo network: eight Indian main-line stations, four trains near
    /// Delhi, Mumbai and Chennai, and six items of passenger luggage.
    pub fn builtin() -> Self {
        let stations = vec![
            station("NDLS", "New Delhi Railway Station", 77.2207, 28.6425),
            station("BCT", "Mumbai Central", 72.8213, 18.9712),
            station("MAS", "Chennai Central", 80.2707, 13.0827),
            station("HWH", "Howrah Junction", 88.3426, 22.5839),
            station("SBC", "Bengaluru City Junction", 77.5738, 12.9784),
            station("ADI", "Ahmedabad Junction", 72.5714, 23.0225),
            station("PUNE", "Pune Junction", 73.8744, 18.5284),
            station("JP", "Jaipur Junction", 75.7873, 26.9124),
        ];

        let trains = vec![
            train("12301", "Rajdhani Express", (77.1000, 28.5500), 80.0, 0.0, &["A1", "A2", "B1"]),
            train("12002", "Shatabdi Express", (77.3000, 28.6000), 90.0, 180.0, &["C1", "C2", "D1"]),
            train(
                "12213",
                "Duronto Express",
                (72.8500, 19.0500),
                85.0,
                45.0,
                &["A1", "A2", "B1", "S1"],
            ),
            train("12909", "Garib Rath", (80.2500, 13.0500), 75.0, 270.0, &["G1", "G2", "G3"]),
        ];

        let objects = vec![
            object("OBJ001", "Luggage", "Rahul Sharma", "12301", "A1"),
            object("OBJ002", "Laptop Bag", "Rahul Sharma", "12301", "A1"),
            object("OBJ003", "Suitcase", "Priya Patel", "12002", "C2"),
            object("OBJ004", "Backpack", "Amit Kumar", "12213", "A2"),
            object("OBJ005", "Camera Bag", "Amit Kumar", "12213", "A2"),
            object("OBJ006", "Travel Bag", "Sneha Gupta", "12909", "G1"),
        ];

        Self {
            stations,
            trains,
            objects,
        }
    }
}

fn point(lon: f64, lat: f64) -> GeoPoint {
    GeoPoint::from(Position::from_lon_lat(lon, lat))
}

fn station(code: &str, name: &str, lon: f64, lat: f64) -> StationRecord {
    StationRecord {
        code: code.to_string(),
        name: name.to_string(),
        location: point(lon, lat),
    }
}

fn train(
    number: &str,
    name: &str,
    (lon, lat): (f64, f64),
    speed: f64,
    direction: f64,
    coaches: &[&str],
) -> TrainRecord {
    TrainRecord {
        number: number.to_string(),
        name: name.to_string(),
        location: point(lon, lat),
        speed,
        direction,
        coaches: coaches
            .iter()
            .map(|id| CoachRecord {
                id: id.to_string(),
                geofence_radius: Some(0.05),
            })
            .collect(),
    }
}

fn object(id: &str, object_type: &str, owner: &str, train: &str, coach: &str) -> ObjectRecord {
    ObjectRecord {
        id: id.to_string(),
        object_type: object_type.to_string(),
        owner_id: owner.to_string(),
        train_number: train.to_string(),
        coach_id: coach.to_string(),
        location: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn builtin_seed_applies_cleanly() {
        let registry = Registry::new();
        let summary = SeedData::builtin()
            .apply(&registry, &GeofenceConfig::default())
            .await
            .unwrap();

        assert_eq!(
            summary,
            SeedSummary {
                stations: 8,
                trains: 4,
                objects: 6
            }
        );
        assert_eq!(registry.station_count().await, 8);
        let on_duronto = registry
            .objects_on(&TrainNumber::parse("12213").unwrap())
            .await;
        assert_eq!(on_duronto.len(), 2);
    }

    #[tokio::test]
    async fn objects_start_on_their_train() {
        let registry = Registry::new();
        SeedData::builtin()
            .apply(&registry, &GeofenceConfig::default())
            .await
            .unwrap();

        let object = registry
            .object(&ObjectId::parse("OBJ006").unwrap())
            .await
            .unwrap();
        let object = object.lock().await.clone();
        assert_eq!(object.position(), Position::from_lon_lat(80.25, 13.05));
        assert!(!object.is_displaced());
    }

    #[test]
    fn parses_camel_case_record_shape() {
        let json = r#"{
            "trains": [{
                "name": "Rajdhani Express",
                "number": "12301",
                "location": {"type": "Point", "coordinates": [77.1, 28.55]},
                "speed": 80,
                "direction": 0,
                "coaches": [{"id": "A1", "geofenceRadius": 0.05}, {"id": "A2"}]
            }]
        }"#;
        let seed = SeedData::from_json(json).unwrap();
        assert!(seed.stations.is_empty());

        let train = seed.trains[0].to_train(0.08).unwrap();
        assert_eq!(train.position(), Position::new(28.55, 77.1));
        assert_eq!(train.coaches()[0].geofence_radius_km(), 0.05);
        assert_eq!(train.coaches()[1].geofence_radius_km(), 0.08);
    }

    #[test]
    fn builtin_round_trips_through_json() {
        let seed = SeedData::builtin();
        let json = serde_json::to_string(&seed).unwrap();
        assert!(json.contains(r#""geofenceRadius":0.05"#));
        assert!(json.contains(r#""ownerId":"Rahul Sharma""#));
        assert_eq!(SeedData::from_json(&json).unwrap(), seed);
    }

    #[tokio::test]
    async fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::to_string(&SeedData::builtin()).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let seed = SeedData::load(file.path()).unwrap();
        assert_eq!(seed.stations.len(), 8);
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SeedData::load(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, SeedError::Io { .. }));
        assert!(err.to_string().contains("missing.json"));
    }

    #[tokio::test]
    async fn invalid_record_is_rejected() {
        let mut seed = SeedData::builtin();
        seed.objects.push(object("OBJ007", "Bag", "Nobody", "12301", "Z9"));

        let registry = Registry::new();
        let err = seed
            .apply(&registry, &GeofenceConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SeedError::Domain(DomainError::UnknownCoach { .. })
        ));
    }

    #[test]
    fn malformed_json() {
        assert!(matches!(
            SeedData::from_json("{\"stations\": 3}"),
            Err(SeedError::Json(_))
        ));
    }
}
