//! Owned entity collections with per-entity locking.
//!
//! Stations are immutable and shared behind `Arc`. Each train and each
//! tracked object sits behind its own async mutex, so work on different
//! entities proceeds in parallel while two writers to the same entity are
//! serialized.
//!
//! Lock discipline:
//! - the collection lock is never acquired while an entity lock is held
//!   (callers fetch handles first, then lock them);
//! - when both a train and an object are locked, the train is locked first.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::domain::{
    CoachId, DomainError, ObjectId, Station, StationCode, TrackedObject, Train, TrainNumber,
};
use crate::geo::Position;

/// Shared, lockable handle to a train.
pub type TrainHandle = Arc<Mutex<Train>>;

/// Shared, lockable handle to a tracked object.
pub type ObjectHandle = Arc<Mutex<TrackedObject>>;

/// Errors from registry lookups and registration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("station {0} not found")]
    StationNotFound(StationCode),

    #[error("train {0} not found")]
    TrainNotFound(TrainNumber),

    #[error("object {0} not found")]
    ObjectNotFound(ObjectId),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Request to register a new tracked object.
#[derive(Debug, Clone)]
pub struct NewObject {
    pub id: ObjectId,
    pub object_type: String,
    pub owner_id: String,
    pub train_number: TrainNumber,
    pub coach_id: CoachId,
    /// Initial position; defaults to the train's position.
    pub position: Option<Position>,
}

#[derive(Default)]
struct Collections {
    stations: BTreeMap<StationCode, Arc<Station>>,
    trains: BTreeMap<TrainNumber, TrainHandle>,
    objects: BTreeMap<ObjectId, ObjectHandle>,
    /// Object ids per train, in registration order.
    by_train: HashMap<TrainNumber, Vec<ObjectId>>,
}

/// The live entity model.
#[derive(Default)]
pub struct Registry {
    inner: RwLock<Collections>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a station. Codes must be unique.
    pub async fn add_station(&self, station: Station) -> Result<(), DomainError> {
        let mut inner = self.inner.write().await;
        if inner.stations.contains_key(station.code()) {
            return Err(DomainError::Duplicate {
                entity: "station",
                id: station.code().to_string(),
            });
        }
        inner
            .stations
            .insert(station.code().clone(), Arc::new(station));
        Ok(())
    }

    /// Register a train. Numbers must be unique.
    pub async fn add_train(&self, train: Train) -> Result<(), DomainError> {
        let mut inner = self.inner.write().await;
        if inner.trains.contains_key(train.number()) {
            return Err(DomainError::Duplicate {
                entity: "train",
                id: train.number().to_string(),
            });
        }
        inner
            .trains
            .insert(train.number().clone(), Arc::new(Mutex::new(train)));
        Ok(())
    }

    /// Register a tracked object on an existing train and coach.
    pub async fn add_object(&self, new: NewObject) -> Result<TrackedObject, DomainError> {
        let Some(handle) = self.train(&new.train_number).await else {
            return Err(DomainError::UnknownTrain {
                object: new.id,
                train: new.train_number,
            });
        };

        let object = {
            let train = handle.lock().await;
            let position = new.position.unwrap_or_else(|| train.position());
            TrackedObject::new(
                new.id,
                new.object_type,
                new.owner_id,
                &train,
                new.coach_id,
                position,
            )?
        };

        let mut inner = self.inner.write().await;
        if inner.objects.contains_key(object.id()) {
            return Err(DomainError::Duplicate {
                entity: "object",
                id: object.id().to_string(),
            });
        }
        inner
            .by_train
            .entry(object.train_number().clone())
            .or_default()
            .push(object.id().clone());
        inner
            .objects
            .insert(object.id().clone(), Arc::new(Mutex::new(object.clone())));
        Ok(object)
    }

    pub async fn station(&self, code: &StationCode) -> Option<Arc<Station>> {
        self.inner.read().await.stations.get(code).cloned()
    }

    /// Like [`Registry::station`] but failing with `StationNotFound`.
    pub async fn require_station(&self, code: &StationCode) -> Result<Arc<Station>, RegistryError> {
        self.station(code)
            .await
            .ok_or_else(|| RegistryError::StationNotFound(code.clone()))
    }

    /// All stations, ordered by code.
    pub async fn stations(&self) -> Vec<Arc<Station>> {
        self.inner.read().await.stations.values().cloned().collect()
    }

    pub async fn train(&self, number: &TrainNumber) -> Option<TrainHandle> {
        self.inner.read().await.trains.get(number).cloned()
    }

    pub async fn require_train(&self, number: &TrainNumber) -> Result<TrainHandle, RegistryError> {
        self.train(number)
            .await
            .ok_or_else(|| RegistryError::TrainNotFound(number.clone()))
    }

    /// Handles to every train, ordered by number.
    pub async fn train_handles(&self) -> Vec<TrainHandle> {
        self.inner.read().await.trains.values().cloned().collect()
    }

    /// A point-in-time copy of every train.
    pub async fn trains(&self) -> Vec<Train> {
        let handles = self.train_handles().await;
        let mut trains = Vec::with_capacity(handles.len());
        for handle in handles {
            trains.push(handle.lock().await.clone());
        }
        trains
    }

    pub async fn object(&self, id: &ObjectId) -> Option<ObjectHandle> {
        self.inner.read().await.objects.get(id).cloned()
    }

    pub async fn require_object(&self, id: &ObjectId) -> Result<ObjectHandle, RegistryError> {
        self.object(id)
            .await
            .ok_or_else(|| RegistryError::ObjectNotFound(id.clone()))
    }

    /// Handles to every object, ordered by id.
    pub async fn object_handles(&self) -> Vec<ObjectHandle> {
        self.inner.read().await.objects.values().cloned().collect()
    }

    /// A point-in-time copy of every object.
    pub async fn objects(&self) -> Vec<TrackedObject> {
        let handles = self.object_handles().await;
        let mut objects = Vec::with_capacity(handles.len());
        for handle in handles {
            objects.push(handle.lock().await.clone());
        }
        objects
    }

    /// Handles to the objects assigned to a train.
    pub async fn objects_on(&self, number: &TrainNumber) -> Vec<ObjectHandle> {
        let inner = self.inner.read().await;
        inner
            .by_train
            .get(number)
            .into_iter()
            .flatten()
            .filter_map(|id| inner.objects.get(id).cloned())
            .collect()
    }

    pub async fn station_count(&self) -> usize {
        self.inner.read().await.stations.len()
    }

    pub async fn train_count(&self) -> usize {
        self.inner.read().await.trains.len()
    }

    pub async fn object_count(&self) -> usize {
        self.inner.read().await.objects.len()
    }
}
