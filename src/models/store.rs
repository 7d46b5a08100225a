//! Model store capability and the client the loader talks to.
//!
//! `Ok(None)` means no model exists for the query. `Err(StoreError)` means the
//! store could not be asked; the two are never conflated.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use tracing::{debug, warn};

use super::identity::{Model, ModelId, ModelKey};
use crate::telemetry;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Model store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence layer holding trained models.
#[async_trait::async_trait]
pub trait ModelStore: Send + Sync {
    /// Most recently finished model for the key, if any.
    async fn get_latest_model(&self, key: &ModelKey) -> Result<Option<Model>, StoreError>;

    /// Exact lookup by full identifier.
    async fn get_model(&self, id: &ModelId) -> Result<Option<Model>, StoreError>;
}

/// Pick the latest model: `finished_at` descending, ties by content hash.
pub fn select_latest<'a, I>(models: I) -> Option<&'a Model>
where
    I: IntoIterator<Item = &'a Model>,
{
    models.into_iter().max_by(|a, b| {
        a.finished_at
            .cmp(&b.finished_at)
            .then_with(|| a.id.content_hash.cmp(&b.id.content_hash))
    })
}

/// Thin query layer over a `ModelStore` with logging and metrics.
#[derive(Clone)]
pub struct StoreClient {
    store: Arc<dyn ModelStore>,
}

impl StoreClient {
    pub fn new(store: Arc<dyn ModelStore>) -> Self {
        Self { store }
    }

    /// Fetch the latest persisted model matching `key`.
    pub async fn fetch_latest(&self, key: &ModelKey) -> Result<Option<Model>, StoreError> {
        match self.store.get_latest_model(key).await {
            Ok(found) => {
                debug!(key = %key, found = found.is_some(), "store lookup");
                telemetry::record_store_fetch(found.is_some());
                Ok(found)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "store lookup failed");
                telemetry::record_store_outage();
                Err(e)
            }
        }
    }

    /// Point lookup for diagnostics. Not used by the cascade.
    pub async fn fetch_exact(&self, id: &ModelId) -> Result<Option<Model>, StoreError> {
        self.store.get_model(id).await
    }
}

/// Number of recent `get_latest_model` keys a `MemoryModelStore` keeps.
pub const LOOKUP_HISTORY: usize = 1024;

/// In-process model store.
///
/// Counts every lookup, remembers the most recent latest-model keys and can be
/// switched offline, which makes it the store of choice for demos, benches
/// and tests.
pub struct MemoryModelStore {
    models: RwLock<Vec<Model>>,
    available: AtomicBool,
    latency: Option<Duration>,
    recent_lookups: Mutex<VecDeque<ModelKey>>,
    latest_lookups: AtomicUsize,
    exact_lookups: AtomicUsize,
}

impl MemoryModelStore {
    pub fn new() -> Self {
        Self {
            models: RwLock::new(Vec::new()),
            available: AtomicBool::new(true),
            latency: None,
            recent_lookups: Mutex::new(VecDeque::with_capacity(LOOKUP_HISTORY)),
            latest_lookups: AtomicUsize::new(0),
            exact_lookups: AtomicUsize::new(0),
        }
    }

    /// Delay every lookup, simulating a remote store.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn insert(&self, model: Model) {
        self.models.write().push(model);
    }

    /// Toggle outage mode. While unavailable every lookup fails.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// The last `LOOKUP_HISTORY` keys passed to `get_latest_model`, oldest first.
    pub fn latest_lookups(&self) -> Vec<ModelKey> {
        self.recent_lookups.lock().iter().cloned().collect()
    }

    /// Total `get_latest_model` calls, including those evicted from the history.
    pub fn latest_lookup_count(&self) -> usize {
        self.latest_lookups.load(Ordering::SeqCst)
    }

    /// Reset lookup counters and history.
    pub fn clear_lookups(&self) {
        self.recent_lookups.lock().clear();
        self.latest_lookups.store(0, Ordering::SeqCst);
        self.exact_lookups.store(0, Ordering::SeqCst);
    }

    pub fn exact_lookup_count(&self) -> usize {
        self.exact_lookups.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.models.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.read().is_empty()
    }

    async fn simulate_io(&self) -> Result<(), StoreError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if !self.available.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store offline".into()));
        }
        Ok(())
    }
}

impl Default for MemoryModelStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ModelStore for MemoryModelStore {
    async fn get_latest_model(&self, key: &ModelKey) -> Result<Option<Model>, StoreError> {
        self.latest_lookups.fetch_add(1, Ordering::SeqCst);
        {
            let mut recent = self.recent_lookups.lock();
            if recent.len() == LOOKUP_HISTORY {
                recent.pop_front();
            }
            recent.push_back(key.clone());
        }
        self.simulate_io().await?;

        let models = self.models.read();
        Ok(select_latest(models.iter().filter(|m| key.matches(&m.id))).cloned())
    }

    async fn get_model(&self, id: &ModelId) -> Result<Option<Model>, StoreError> {
        self.exact_lookups.fetch_add(1, Ordering::SeqCst);
        self.simulate_io().await?;

        let models = self.models.read();
        Ok(models.iter().find(|m| &m.id == id).cloned())
    }
}
