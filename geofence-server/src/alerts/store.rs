//! In-memory alert log.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::{Alert, AlertDetails, AlertId, AlertKey};

use super::error::AlertError;
use super::filter::AlertFilter;
use super::stats::AlertStats;

/// Outcome of recording a geofence condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recorded {
    /// No open alert existed for the condition; a new one was created.
    Created(AlertId),
    /// An open alert already existed; its distance was refreshed.
    Updated(AlertId),
}

impl Recorded {
    pub fn id(&self) -> AlertId {
        match self {
            Recorded::Created(id) | Recorded::Updated(id) => *id,
        }
    }
}

#[derive(Default)]
struct AlertLog {
    /// Every alert ever created, in creation order.
    alerts: Vec<Alert>,
    /// Position in `alerts` by id.
    by_id: HashMap<AlertId, usize>,
    /// Position in `alerts` of the unresolved alert for each key.
    open: HashMap<AlertKey, usize>,
    next_id: u64,
}

impl AlertLog {
    fn insert(&mut self, details: AlertDetails, detected_at: DateTime<Utc>) -> AlertId {
        self.next_id += 1;
        let id = AlertId::new(self.next_id);
        let idx = self.alerts.len();
        let key = details.key();

        self.alerts.push(Alert::new(id, details, detected_at));
        self.by_id.insert(id, idx);
        self.open.entry(key).or_insert(idx);
        id
    }
}

/// Thread-safe store of alerts.
///
/// Query results come back in creation order.
#[derive(Default)]
pub struct AlertStore {
    inner: RwLock<AlertLog>,
}

impl AlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new alert unconditionally, returning its id.
    pub async fn create(&self, details: AlertDetails, detected_at: DateTime<Utc>) -> AlertId {
        self.inner.write().await.insert(details, detected_at)
    }

    /// Create an alert for the condition in `details` unless an unresolved
    /// alert with the same key exists, in which case refresh its distance.
    ///
    /// The lookup and the insert happen under one write lock, so concurrent
    /// evaluation passes cannot open duplicate alerts.
    pub async fn record(&self, details: AlertDetails, detected_at: DateTime<Utc>) -> Recorded {
        let mut log = self.inner.write().await;

        if let Some(&idx) = log.open.get(&details.key()) {
            let alert = &mut log.alerts[idx];
            alert.update_distance_km(details.distance_km());
            return Recorded::Updated(alert.id());
        }

        Recorded::Created(log.insert(details, detected_at))
    }

    pub async fn get(&self, id: AlertId) -> Result<Alert, AlertError> {
        let log = self.inner.read().await;
        log.by_id
            .get(&id)
            .map(|&idx| log.alerts[idx].clone())
            .ok_or(AlertError::NotFound(id))
    }

    /// All alerts matching `filter`, in creation order.
    pub async fn query(&self, filter: &AlertFilter) -> Vec<Alert> {
        self.inner
            .read()
            .await
            .alerts
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect()
    }

    /// Mark an alert resolved and return it.
    ///
    /// Resolving an already-resolved alert is a no-op.
    pub async fn resolve(&self, id: AlertId) -> Result<Alert, AlertError> {
        let mut log = self.inner.write().await;
        let idx = *log.by_id.get(&id).ok_or(AlertError::NotFound(id))?;

        if log.alerts[idx].resolve() {
            let key = log.alerts[idx].details().key();
            if log.open.get(&key) == Some(&idx) {
                log.open.remove(&key);
            }
        }

        Ok(log.alerts[idx].clone())
    }

    /// Statistics over alerts detected at or after `since`.
    pub async fn stats(&self, since: DateTime<Utc>) -> AlertStats {
        AlertStats::compute(&self.inner.read().await.alerts, since)
    }

    /// Total number of alerts, resolved or not.
    pub async fn len(&self) -> usize {
        self.inner.read().await.alerts.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.alerts.is_empty()
    }

    /// Number of alerts still open.
    pub async fn unresolved_count(&self) -> usize {
        self.inner
            .read()
            .await
            .alerts
            .iter()
            .filter(|a| !a.is_resolved())
            .count()
    }
}
