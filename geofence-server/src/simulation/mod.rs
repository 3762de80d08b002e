//! Synthetic telemetry.
//!
//! The simulator moves trains and displaces objects in the registry so the
//! geofence evaluator has something to alert on without real telemetry. It
//! only mutates positions; evaluation is the caller's business (see
//! [`crate::engine::GeofenceEngine`], which evaluates after every call).
//!
//! Randomness comes from a seedable ChaCha generator, so a fixed
//! [`SimulationConfig::rng_seed`] replays the same headings and thefts.

mod config;

pub use config::{DEFAULT_MAX_RANDOM_EVENTS, DEFAULT_TICK, SimulationConfig};

use std::sync::{Mutex, PoisonError};

use futures::future::join_all;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::domain::{ActiveJourney, ObjectId, StationCode, TrainNumber};
use crate::geo::{Position, bearing_deg, destination_point, distance_km};
use crate::registry::{Registry, RegistryError, TrainHandle};

/// Errors from simulation requests.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A journey needs a moving train
    #[error("train {train} has speed {speed_kmh} km/h; a journey needs a positive speed")]
    InvalidSpeed { train: TrainNumber, speed_kmh: f64 },

    #[error("distance must be a non-negative number of km, got {0}")]
    InvalidDistance(f64),

    #[error("probability must be between 0 and 1, got {0}")]
    InvalidProbability(f64),

    #[error("cannot generate {requested} events in one request; the limit is {max}")]
    TooManyEvents { requested: usize, max: usize },
}

/// Which trains a movement tick moves, and how far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovementRequest {
    /// Move only this train. All trains move when unset.
    pub train: Option<TrainNumber>,
    /// Move this far instead of `speed × tick`.
    pub distance_km: Option<f64>,
}

impl MovementRequest {
    /// Move every train by its own speed.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn train(number: TrainNumber) -> Self {
        Self {
            train: Some(number),
            distance_km: None,
        }
    }

    pub fn with_distance_km(mut self, distance_km: f64) -> Self {
        self.distance_km = Some(distance_km);
        self
    }
}

/// A train that reached its journey destination during a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Arrival {
    pub train: TrainNumber,
    pub station: StationCode,
}

/// Result of a movement tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovementOutcome {
    pub trains_updated: usize,
    pub arrived: Vec<Arrival>,
}

/// Result of displacing an object.
#[derive(Debug, Clone, PartialEq)]
pub struct TheftOutcome {
    pub object_id: ObjectId,
    pub train_number: TrainNumber,
    pub requested_distance_km: f64,
    /// Distance between the object's new position and its train. This is
    /// what the evaluator alerts on.
    pub actual_distance_km: f64,
    pub position: Position,
}

/// A journey that has been set up and will progress with movement ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct JourneyPlan {
    pub train_number: TrainNumber,
    pub train_name: String,
    pub destination_code: StationCode,
    pub destination_name: String,
    pub distance_km: f64,
    pub duration_minutes: f64,
    pub speed_kmh: f64,
    pub bearing_deg: f64,
    /// Movement ticks needed to arrive at the current speed.
    pub expected_ticks: u64,
}

/// One event generated by [`Simulator::simulate_random_events`].
#[derive(Debug, Clone, PartialEq)]
pub enum SimulatedEvent {
    Theft(TheftOutcome),
    Movement {
        train_number: TrainNumber,
        position: Position,
        arrived: bool,
    },
}

/// Drives synthetic movement through a registry.
pub struct Simulator {
    config: SimulationConfig,
    // Never held across an await.
    rng: Mutex<ChaCha8Rng>,
}

impl Simulator {
    pub fn new(config: SimulationConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            config,
            rng: Mutex::new(rng),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut ChaCha8Rng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }

    fn heading_jitter(&self) -> f64 {
        let half = self.config.heading_jitter_deg / 2.0;
        if half > 0.0 {
            self.with_rng(|rng| rng.gen_range(-half..=half))
        } else {
            0.0
        }
    }

    fn random_bearing(&self) -> f64 {
        self.with_rng(|rng| rng.gen_range(0.0..360.0))
    }

    /// Advance trains by one tick.
    ///
    /// Trains move concurrently. A train on a journey steers towards its
    /// destination and stops exactly there when the remaining distance is
    /// within one step; other trains wander by a small random heading
    /// change. Objects that have not been displaced move with their train.
    pub async fn simulate_movement(
        &self,
        registry: &Registry,
        request: MovementRequest,
    ) -> Result<MovementOutcome, SimulationError> {
        if let Some(d) = request.distance_km {
            check_distance(d)?;
        }

        let handles = match &request.train {
            Some(number) => vec![registry.require_train(number).await?],
            None => registry.train_handles().await,
        };

        let moves = handles
            .iter()
            .map(|handle| self.move_train(registry, handle, request.distance_km));
        let results = join_all(moves).await;

        let mut outcome = MovementOutcome {
            trains_updated: results.len(),
            arrived: Vec::new(),
        };
        for (_, arrival) in results {
            outcome.arrived.extend(arrival);
        }

        debug!(
            trains = outcome.trains_updated,
            arrived = outcome.arrived.len(),
            "Movement tick complete"
        );
        Ok(outcome)
    }

    /// Move one train and the objects riding on it. Returns the train's new
    /// position and its arrival, if it arrived.
    async fn move_train(
        &self,
        registry: &Registry,
        handle: &TrainHandle,
        fixed_step_km: Option<f64>,
    ) -> (Position, Option<Arrival>) {
        let number = handle.lock().await.number().clone();
        let objects = registry.objects_on(&number).await;
        let jitter = self.heading_jitter();
        let tick_hours = self.config.tick_hours();

        let mut train = handle.lock().await;
        let step = fixed_step_km.unwrap_or(train.speed_kmh() * tick_hours);
        let from = train.position();

        let mut arrival = None;
        let to = match train.journey().cloned() {
            Some(journey) if distance_km(from, journey.target) <= step => {
                train.end_journey();
                info!(train = %number, station = %journey.destination, "Train arrived at destination");
                arrival = Some(Arrival {
                    train: number.clone(),
                    station: journey.destination,
                });
                journey.target
            }
            Some(journey) => {
                let heading = bearing_deg(from, journey.target);
                train.steer(heading);
                destination_point(from, heading, step)
            }
            None => {
                let heading = train.bearing_deg() + jitter;
                train.steer(heading);
                destination_point(from, train.bearing_deg(), step)
            }
        };
        train.set_position(to);

        for object in &objects {
            object.lock().await.follow_train(to);
        }

        (to, arrival)
    }

    /// Move an object `target_km` from where it is along a random bearing
    /// and mark it displaced.
    pub async fn simulate_theft(
        &self,
        registry: &Registry,
        object_id: &ObjectId,
        target_km: f64,
    ) -> Result<TheftOutcome, SimulationError> {
        check_distance(target_km)?;

        let object_handle = registry.require_object(object_id).await?;
        let train_number = object_handle.lock().await.train_number().clone();
        let train_handle = registry.require_train(&train_number).await?;
        let bearing = self.random_bearing();

        let train = train_handle.lock().await;
        let mut object = object_handle.lock().await;

        let position = destination_point(object.position(), bearing, target_km);
        object.displace_to(position);
        let actual_distance_km = distance_km(position, train.position());

        info!(
            object = %object_id,
            train = %train_number,
            requested_km = target_km,
            actual_km = actual_distance_km,
            "Simulated theft"
        );

        Ok(TheftOutcome {
            object_id: object_id.clone(),
            train_number,
            requested_distance_km: target_km,
            actual_distance_km,
            position,
        })
    }

    /// Send a train towards a station.
    ///
    /// Points the train at the station and records the journey; subsequent
    /// movement ticks carry it there.
    pub async fn simulate_journey(
        &self,
        registry: &Registry,
        train_number: &TrainNumber,
        station_code: &StationCode,
    ) -> Result<JourneyPlan, SimulationError> {
        let handle = registry.require_train(train_number).await?;
        let station = registry.require_station(station_code).await?;

        let mut train = handle.lock().await;
        let speed_kmh = train.speed_kmh();
        if speed_kmh <= 0.0 {
            return Err(SimulationError::InvalidSpeed {
                train: train_number.clone(),
                speed_kmh,
            });
        }

        let distance = distance_km(train.position(), station.position());
        train.start_journey(ActiveJourney {
            destination: station.code().clone(),
            target: station.position(),
        });

        let step = speed_kmh * self.config.tick_hours();
        let expected_ticks = if step > 0.0 {
            (distance / step).ceil() as u64
        } else {
            0
        };

        let plan = JourneyPlan {
            train_number: train_number.clone(),
            train_name: train.name().to_string(),
            destination_code: station.code().clone(),
            destination_name: station.name().to_string(),
            distance_km: distance,
            duration_minutes: distance / speed_kmh * 60.0,
            speed_kmh,
            bearing_deg: train.bearing_deg(),
            expected_ticks,
        };

        info!(
            train = %train_number,
            destination = %station_code,
            distance_km = plan.distance_km,
            duration_minutes = plan.duration_minutes,
            "Journey started"
        );
        Ok(plan)
    }

    /// Generate `count` random events. Each is a theft of a random object
    /// with probability `theft_probability`, otherwise a movement tick of a
    /// random train. Events that find nothing to act on are skipped.
    pub async fn simulate_random_events(
        &self,
        registry: &Registry,
        theft_probability: f64,
        count: usize,
    ) -> Result<Vec<SimulatedEvent>, SimulationError> {
        if !(0.0..=1.0).contains(&theft_probability) {
            return Err(SimulationError::InvalidProbability(theft_probability));
        }
        if count > self.config.max_random_events {
            return Err(SimulationError::TooManyEvents {
                requested: count,
                max: self.config.max_random_events,
            });
        }

        let mut events = Vec::new();
        for _ in 0..count {
            let theft = self.with_rng(|rng| rng.gen_bool(theft_probability));

            if theft {
                let objects = registry.objects().await;
                let Some(index) = self.pick(objects.len()) else {
                    continue;
                };
                let (min, max) = (
                    self.config.random_theft_min_km,
                    self.config.random_theft_max_km,
                );
                let distance = if max > min {
                    self.with_rng(|rng| rng.gen_range(min..max))
                } else {
                    min
                };
                let outcome = self
                    .simulate_theft(registry, objects[index].id(), distance)
                    .await?;
                events.push(SimulatedEvent::Theft(outcome));
            } else {
                let handles = registry.train_handles().await;
                let Some(index) = self.pick(handles.len()) else {
                    continue;
                };
                let (position, arrival) = self.move_train(registry, &handles[index], None).await;
                let train_number = handles[index].lock().await.number().clone();
                events.push(SimulatedEvent::Movement {
                    train_number,
                    position,
                    arrived: arrival.is_some(),
                });
            }
        }

        Ok(events)
    }

    fn pick(&self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.with_rng(|rng| rng.gen_range(0..len)))
    }
}

fn check_distance(distance_km: f64) -> Result<(), SimulationError> {
    if !(distance_km.is_finite() && distance_km >= 0.0) {
        return Err(SimulationError::InvalidDistance(distance_km));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TrackedObject;
    use crate::testing::{MUMBAI, NEW_DELHI, add_object, add_station, add_train};
    use std::sync::Arc;
    use std::time::Duration;

    fn simulator() -> Simulator {
        Simulator::new(SimulationConfig::default().with_seed(42))
    }

    fn number(s: &str) -> TrainNumber {
        TrainNumber::parse(s).unwrap()
    }

    async fn object(registry: &Registry, id: &str) -> TrackedObject {
        let handle = registry.object(&ObjectId::parse(id).unwrap()).await.unwrap();
        let object = handle.lock().await.clone();
        object
    }

    #[tokio::test]
    async fn journey_duration_follows_speed() {
        let registry = Registry::new();
        add_station(&registry, "NDLS", "New Delhi", NEW_DELHI).await;
        let start = destination_point(NEW_DELHI, 180.0, 30.0);
        add_train(&registry, "12301", start, 60.0, &[("A1", 0.05)]).await;

        let plan = simulator()
            .simulate_journey(&registry, &number("12301"), &StationCode::parse("NDLS").unwrap())
            .await
            .unwrap();

        assert!((plan.distance_km - 30.0).abs() < 1e-6);
        assert!((plan.duration_minutes - 30.0).abs() < 1e-6);
        assert!(plan.bearing_deg.abs() < 1e-6 || (plan.bearing_deg - 360.0).abs() < 1e-6);
        // 60 km/h for 5 s is 1/12 km per tick
        assert!((360..=361).contains(&plan.expected_ticks));
    }

    #[tokio::test]
    async fn journey_rejects_stationary_train() {
        let registry = Registry::new();
        add_station(&registry, "NDLS", "New Delhi", NEW_DELHI).await;
        add_train(&registry, "12301", MUMBAI, 0.0, &[("A1", 0.05)]).await;

        let err = simulator()
            .simulate_journey(&registry, &number("12301"), &StationCode::parse("NDLS").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, SimulationError::InvalidSpeed { .. }));
    }

    #[tokio::test]
    async fn journey_unknown_station() {
        let registry = Registry::new();
        add_train(&registry, "12301", MUMBAI, 60.0, &[("A1", 0.05)]).await;

        let err = simulator()
            .simulate_journey(&registry, &number("12301"), &StationCode::parse("XXX").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Registry(RegistryError::StationNotFound(_))
        ));
    }

    #[tokio::test]
    async fn journey_terminates_at_destination() {
        let registry = Registry::new();
        add_station(&registry, "NDLS", "New Delhi", NEW_DELHI).await;
        let start = destination_point(NEW_DELHI, 135.0, 9.0);
        add_train(&registry, "12301", start, 60.0, &[("A1", 0.05)]).await;
        add_object(&registry, "OBJ001", "12301", "A1").await;

        let sim = Simulator::new(SimulationConfig::new(Duration::from_secs(120)).with_seed(1));
        let plan = sim
            .simulate_journey(&registry, &number("12301"), &StationCode::parse("NDLS").unwrap())
            .await
            .unwrap();
        assert_eq!(plan.expected_ticks, 5);

        let mut arrived = Vec::new();
        for _ in 0..plan.expected_ticks {
            let outcome = sim
                .simulate_movement(&registry, MovementRequest::all())
                .await
                .unwrap();
            arrived.extend(outcome.arrived);
        }

        assert_eq!(arrived.len(), 1);
        assert_eq!(arrived[0].station.as_str(), "NDLS");

        let train = registry.trains().await.remove(0);
        assert_eq!(train.position(), NEW_DELHI);
        assert!(train.journey().is_none());
        assert_eq!(object(&registry, "OBJ001").await.position(), NEW_DELHI);
    }

    #[tokio::test]
    async fn movement_steps_by_speed() {
        let registry = Registry::new();
        add_train(&registry, "12301", NEW_DELHI, 60.0, &[("A1", 0.05)]).await;

        let sim = Simulator::new(SimulationConfig::new(Duration::from_secs(60)).with_seed(3));
        let outcome = sim
            .simulate_movement(&registry, MovementRequest::all())
            .await
            .unwrap();
        assert_eq!(outcome.trains_updated, 1);

        let train = registry.trains().await.remove(0);
        assert!((distance_km(NEW_DELHI, train.position()) - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn heading_jitter_stays_within_bounds() {
        let registry = Registry::new();
        add_train(&registry, "12301", NEW_DELHI, 60.0, &[("A1", 0.05)]).await;
        let sim = simulator();

        for _ in 0..50 {
            let before = registry.trains().await[0].bearing_deg();
            sim.simulate_movement(&registry, MovementRequest::all())
                .await
                .unwrap();
            let after = registry.trains().await[0].bearing_deg();
            let turn = (after - before + 540.0).rem_euclid(360.0) - 180.0;
            assert!(turn.abs() <= 5.0 + 1e-9, "turned {turn}");
        }
    }

    #[tokio::test]
    async fn movement_of_single_train_leaves_others() {
        let registry = Registry::new();
        add_train(&registry, "12301", NEW_DELHI, 60.0, &[("A1", 0.05)]).await;
        add_train(&registry, "12951", MUMBAI, 60.0, &[("B1", 0.05)]).await;

        let outcome = simulator()
            .simulate_movement(
                &registry,
                MovementRequest::train(number("12301")).with_distance_km(2.0),
            )
            .await
            .unwrap();
        assert_eq!(outcome.trains_updated, 1);

        let trains = registry.trains().await;
        let moved = trains.iter().find(|t| t.number().as_str() == "12301").unwrap();
        let still = trains.iter().find(|t| t.number().as_str() == "12951").unwrap();
        assert!((distance_km(NEW_DELHI, moved.position()) - 2.0).abs() < 1e-6);
        assert_eq!(still.position(), MUMBAI);
    }

    #[tokio::test]
    async fn movement_unknown_train_is_not_found() {
        let registry = Registry::new();
        let err = simulator()
            .simulate_movement(&registry, MovementRequest::train(number("99999")))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Registry(RegistryError::TrainNotFound(_))
        ));
    }

    #[tokio::test]
    async fn objects_ride_along_until_displaced() {
        let registry = Registry::new();
        add_train(&registry, "12301", NEW_DELHI, 60.0, &[("A1", 0.05)]).await;
        add_object(&registry, "OBJ001", "12301", "A1").await;
        add_object(&registry, "OBJ002", "12301", "A1").await;
        let sim = simulator();

        let theft = sim
            .simulate_theft(&registry, &ObjectId::parse("OBJ002").unwrap(), 0.1)
            .await
            .unwrap();
        sim.simulate_movement(&registry, MovementRequest::all().with_distance_km(1.0))
            .await
            .unwrap();

        let train = registry.trains().await.remove(0);
        assert_eq!(object(&registry, "OBJ001").await.position(), train.position());
        let stolen = object(&registry, "OBJ002").await;
        assert!(stolen.is_displaced());
        assert_eq!(stolen.position(), theft.position);
    }

    #[tokio::test]
    async fn theft_reports_actual_distance() {
        let registry = Registry::new();
        add_train(&registry, "12301", NEW_DELHI, 60.0, &[("A1", 0.05)]).await;
        add_object(&registry, "OBJ001", "12301", "A1").await;

        let outcome = simulator()
            .simulate_theft(&registry, &ObjectId::parse("OBJ001").unwrap(), 0.1)
            .await
            .unwrap();

        assert_eq!(outcome.requested_distance_km, 0.1);
        assert!((outcome.actual_distance_km - 0.1).abs() < 1e-6);
        assert!(
            (distance_km(outcome.position, NEW_DELHI) - outcome.actual_distance_km).abs() < 1e-12
        );
    }

    #[tokio::test]
    async fn theft_rejects_bad_input() {
        let registry = Registry::new();
        let sim = simulator();
        let missing = ObjectId::parse("NOPE").unwrap();

        assert!(matches!(
            sim.simulate_theft(&registry, &missing, 0.1).await,
            Err(SimulationError::Registry(RegistryError::ObjectNotFound(_)))
        ));
        assert_eq!(
            sim.simulate_theft(&registry, &missing, -1.0).await,
            Err(SimulationError::InvalidDistance(-1.0))
        );
    }

    #[tokio::test]
    async fn seeded_simulators_agree() {
        let a = Registry::new();
        let b = Registry::new();
        for registry in [&a, &b] {
            add_train(registry, "12301", NEW_DELHI, 60.0, &[("A1", 0.05)]).await;
            add_object(registry, "OBJ001", "12301", "A1").await;
        }

        let id = ObjectId::parse("OBJ001").unwrap();
        let first = simulator().simulate_theft(&a, &id, 0.2).await.unwrap();
        let second = simulator().simulate_theft(&b, &id, 0.2).await.unwrap();
        assert_eq!(first.position, second.position);
    }

    #[tokio::test]
    async fn random_events_respect_probability() {
        let registry = Registry::new();
        add_train(&registry, "12301", NEW_DELHI, 60.0, &[("A1", 0.05)]).await;
        add_object(&registry, "OBJ001", "12301", "A1").await;
        let sim = simulator();

        let thefts = sim.simulate_random_events(&registry, 1.0, 5).await.unwrap();
        assert_eq!(thefts.len(), 5);
        for event in &thefts {
            let SimulatedEvent::Theft(outcome) = event else {
                panic!("expected theft, got {event:?}");
            };
            assert!((0.05..0.25).contains(&outcome.requested_distance_km));
        }

        let moves = sim.simulate_random_events(&registry, 0.0, 3).await.unwrap();
        assert_eq!(moves.len(), 3);
        assert!(
            moves
                .iter()
                .all(|e| matches!(e, SimulatedEvent::Movement { .. }))
        );
    }

    #[tokio::test]
    async fn random_events_skip_empty_registry() {
        let registry = Registry::new();
        let events = simulator()
            .simulate_random_events(&registry, 0.5, 10)
            .await
            .unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn random_events_reject_bad_probability() {
        let registry = Registry::new();
        let sim = simulator();
        assert_eq!(
            sim.simulate_random_events(&registry, 1.5, 1).await,
            Err(SimulationError::InvalidProbability(1.5))
        );
        assert!(sim.simulate_random_events(&registry, f64::NAN, 1).await.is_err());
    }

    #[tokio::test]
    async fn random_events_reject_oversized_count() {
        let registry = Registry::new();
        let sim = simulator();
        assert_eq!(
            sim.simulate_random_events(&registry, 0.5, usize::MAX).await,
            Err(SimulationError::TooManyEvents {
                requested: usize::MAX,
                max: DEFAULT_MAX_RANDOM_EVENTS,
            })
        );
        assert!(
            sim.simulate_random_events(&registry, 0.5, DEFAULT_MAX_RANDOM_EVENTS)
                .await
                .is_ok()
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_movement_and_theft_stay_consistent() {
        const TICKS: usize = 40;

        let registry = Arc::new(Registry::new());
        add_train(&registry, "12301", NEW_DELHI, 60.0, &[("A1", 0.05)]).await;
        add_train(&registry, "12951", MUMBAI, 60.0, &[("B1", 0.05)]).await;
        add_object(&registry, "OBJ001", "12301", "A1").await;
        add_object(&registry, "OBJ002", "12301", "A1").await;

        // 1 km per tick due north, no wander
        let config = SimulationConfig {
            heading_jitter_deg: 0.0,
            ..SimulationConfig::new(Duration::from_secs(60)).with_seed(7)
        };
        let sim = Arc::new(Simulator::new(config));
        let stolen = ObjectId::parse("OBJ001").unwrap();

        let movement = tokio::spawn({
            let (registry, sim) = (registry.clone(), sim.clone());
            async move {
                for _ in 0..TICKS {
                    let outcome = sim
                        .simulate_movement(&registry, MovementRequest::all())
                        .await
                        .unwrap();
                    assert_eq!(outcome.trains_updated, 2);
                    tokio::task::yield_now().await;
                }
            }
        });
        let thefts = tokio::spawn({
            let (registry, sim, stolen) = (registry.clone(), sim.clone(), stolen.clone());
            async move {
                let mut outcomes = Vec::new();
                for _ in 0..TICKS {
                    outcomes.push(sim.simulate_theft(&registry, &stolen, 0.1).await.unwrap());
                    tokio::task::yield_now().await;
                }
                outcomes
            }
        });
        let (movement, thefts) = tokio::join!(movement, thefts);
        movement.unwrap();
        let thefts = thefts.unwrap();

        // Each theft was measured against a position the train really held
        let track: Vec<Position> = (0..=TICKS)
            .map(|k| destination_point(NEW_DELHI, 0.0, k as f64))
            .collect();
        for theft in &thefts {
            assert!(
                track
                    .iter()
                    .any(|p| (distance_km(theft.position, *p) - theft.actual_distance_km).abs() < 1e-6),
                "theft distance {} matches no train position",
                theft.actual_distance_km
            );
        }

        let handle = registry.train(&number("12301")).await.unwrap();
        let train = handle.lock().await.clone();
        assert!((distance_km(NEW_DELHI, train.position()) - TICKS as f64).abs() < 1e-6);

        let handle = registry.train(&number("12951")).await.unwrap();
        let other = handle.lock().await.clone();
        assert!((distance_km(MUMBAI, other.position()) - TICKS as f64).abs() < 1e-6);

        // Ticks never drag the stolen object back to its train
        let displaced = object(&registry, "OBJ001").await;
        assert!(displaced.is_displaced());
        assert_eq!(displaced.position(), thefts.last().unwrap().position);

        let rider = object(&registry, "OBJ002").await;
        assert!(!rider.is_displaced());
        assert_eq!(rider.position(), train.position());

        let outcome = sim.simulate_theft(&registry, &stolen, 0.1).await.unwrap();
        let after = object(&registry, "OBJ001").await;
        assert_eq!(
            distance_km(after.position(), train.position()),
            outcome.actual_distance_km
        );
    }
}
