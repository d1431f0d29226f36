use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{info, warn};
use serde::{Serialize, Deserialize};

use crate::error::{NetError, Result};
use crate::network::{network::Network, snapshot::WeightSnapshot};
use crate::train::report::TrainReport;

/// Lifecycle of a named model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelStatus {
    NotReady,
    Training,
    Ready,
    Failed,
}

/// Where model readiness lives. Implemented by [`ModelRegistry`]; callers
/// depend on this trait so another store can be injected.
pub trait StatusStore: Send + Sync {
    /// Unknown models are `NotReady`.
    fn status(&self, model: &str) -> ModelStatus;
    fn set_status(&self, model: &str, status: ModelStatus);
    /// Forgets every model, e.g. on logout.
    fn reset(&self);
}

#[derive(Debug, Clone)]
struct Entry {
    status: ModelStatus,
    snapshot: Option<WeightSnapshot>,
    report: Option<TrainReport>,
}

impl Entry {
    fn new(status: ModelStatus) -> Entry {
        Entry { status, snapshot: None, report: None }
    }
}

/// In-process registry of model status and the weights of ready models.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    entries: Mutex<BTreeMap<String, Entry>>,
}

pub type SharedRegistry = Arc<ModelRegistry>;

impl ModelRegistry {
    pub fn new() -> ModelRegistry {
        ModelRegistry::default()
    }

    pub fn shared() -> SharedRegistry {
        Arc::new(ModelRegistry::new())
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds `model` as `NotReady` unless it is already known.
    pub fn register(&self, model: &str) {
        self.lock().entry(model.to_owned()).or_insert_with(|| Entry::new(ModelStatus::NotReady));
    }

    pub fn mark_training(&self, model: &str) {
        self.set_status(model, ModelStatus::Training);
    }

    /// Publishes trained weights and marks the model ready.
    pub fn mark_ready(&self, model: &str, snapshot: WeightSnapshot, report: Option<TrainReport>) {
        info!("model '{model}' is ready");
        let mut entries = self.lock();
        let entry = entries.entry(model.to_owned()).or_insert_with(|| Entry::new(ModelStatus::Ready));
        entry.status = ModelStatus::Ready;
        entry.snapshot = Some(snapshot);
        entry.report = report;
    }

    pub fn mark_failed(&self, model: &str) {
        self.set_status(model, ModelStatus::Failed);
    }

    pub fn report(&self, model: &str) -> Option<TrainReport> {
        self.lock().get(model).and_then(|e| e.report.clone())
    }

    pub fn snapshot(&self, model: &str) -> Option<WeightSnapshot> {
        self.lock().get(model).and_then(|e| e.snapshot.clone())
    }

    /// Rebuilds a ready network from the published snapshot.
    pub fn restore(&self, model: &str) -> Result<Network> {
        match self.snapshot(model) {
            Some(snapshot) => Network::from_snapshot(&snapshot),
            None => Err(NetError::NotReady),
        }
    }

    /// True when at least one model is registered and every one is ready.
    pub fn all_ready(&self) -> bool {
        let entries = self.lock();
        !entries.is_empty() && entries.values().all(|e| e.status == ModelStatus::Ready)
    }

    /// `(model, status)` pairs in name order.
    pub fn models(&self) -> Vec<(String, ModelStatus)> {
        self.lock().iter().map(|(k, e)| (k.clone(), e.status)).collect()
    }
}

impl StatusStore for ModelRegistry {
    fn status(&self, model: &str) -> ModelStatus {
        self.lock().get(model).map(|e| e.status).unwrap_or(ModelStatus::NotReady)
    }

    /// `Ready` only sticks when a snapshot has been published through
    /// [`ModelRegistry::mark_ready`]; otherwise the status is left unchanged.
    fn set_status(&self, model: &str, status: ModelStatus) {
        let mut entries = self.lock();
        let entry = entries.entry(model.to_owned()).or_insert_with(|| Entry::new(ModelStatus::NotReady));
        if status == ModelStatus::Ready && entry.snapshot.is_none() {
            warn!("model '{model}' has no published weights; keeping {:?}", entry.status);
            return;
        }
        info!("model '{model}' -> {status:?}");
        entry.status = status;
        if status != ModelStatus::Ready {
            entry.snapshot = None;
        }
    }

    fn reset(&self) {
        info!("resetting model registry");
        self.lock().clear();
    }
}
