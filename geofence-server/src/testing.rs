//! Fixtures shared by unit tests.

use crate::domain::{Coach, CoachId, ObjectId, Station, StationCode, Train, TrainNumber};
use crate::geo::Position;
use crate::registry::{NewObject, Registry};

/// New Delhi, lon 77.2090, lat 28.6139.
pub const NEW_DELHI: Position = Position::from_lon_lat(77.2090, 28.6139);

/// Mumbai Central, lon 72.8194, lat 18.9696.
pub const MUMBAI: Position = Position::from_lon_lat(72.8194, 18.9696);

pub async fn add_station(registry: &Registry, code: &str, name: &str, position: Position) {
    let station = Station::new(StationCode::parse(code).unwrap(), name, position).unwrap();
    registry.add_station(station).await.unwrap();
}

pub fn train(number: &str, position: Position, speed_kmh: f64, coaches: &[(&str, f64)]) -> Train {
    Train::new(
        TrainNumber::parse(number).unwrap(),
        format!("Express {number}"),
        position,
        speed_kmh,
        0.0,
        coaches
            .iter()
            .map(|(id, radius)| Coach::new(CoachId::parse(id).unwrap(), *radius).unwrap())
            .collect(),
    )
    .unwrap()
}

pub async fn add_train(
    registry: &Registry,
    number: &str,
    position: Position,
    speed_kmh: f64,
    coaches: &[(&str, f64)],
) {
    registry
        .add_train(train(number, position, speed_kmh, coaches))
        .await
        .unwrap();
}

pub async fn add_object(registry: &Registry, id: &str, train: &str, coach: &str) {
    registry
        .add_object(NewObject {
            id: ObjectId::parse(id).unwrap(),
            object_type: "Luggage".to_string(),
            owner_id: "Rahul Sharma".to_string(),
            train_number: TrainNumber::parse(train).unwrap(),
            coach_id: CoachId::parse(coach).unwrap(),
            position: None,
        })
        .await
        .unwrap();
}
