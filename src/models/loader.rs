//! Lazy model loading with single-flight coordination.
//!
//! For a given `ModelKey` at most one fetch+install runs at a time. Callers
//! arriving while a load is in flight join it and observe the same outcome.
//! Each load is driven by its own tokio task, so it runs to completion even
//! when every caller waiting on it has been cancelled.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use thiserror::Error;
use tracing::{debug, error, info};

use super::availability::ModelAvailability;
use super::identity::{LanguageCode, ModelId, ModelKey};
use super::registry::ModelRegistry;
use super::store::{StoreClient, StoreError};
use crate::engine::ServingEngine;
use crate::telemetry;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("No model found for {0}")]
    NotFound(ModelKey),

    #[error("Model store unavailable while fetching {key}: {reason}")]
    StoreUnavailable { key: ModelKey, reason: String },

    #[error("Engine rejected model {id} for {key}: {reason}")]
    Rejected {
        key: ModelKey,
        id: ModelId,
        reason: String,
    },

    #[error("Model load for {0} panicked")]
    Panicked(ModelKey),
}

impl LoadError {
    pub fn key(&self) -> &ModelKey {
        match self {
            Self::NotFound(key) => key,
            Self::StoreUnavailable { key, .. } => key,
            Self::Rejected { key, .. } => key,
            Self::Panicked(key) => key,
        }
    }
}

/// Successful outcome of `ensure_loaded`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The model was already resident; the store was not touched.
    AlreadyLoaded,
    /// The model was fetched and installed.
    Installed(ModelId),
}

type LoadResult = Result<LoadOutcome, LoadError>;
type InFlightLoad = Shared<BoxFuture<'static, LoadResult>>;

struct LoaderInner {
    availability: ModelAvailability,
    store: StoreClient,
    engine: Arc<dyn ServingEngine>,
    registry: Arc<ModelRegistry>,
    in_flight: DashMap<ModelKey, InFlightLoad>,
}

/// Ensures a model for a key is resident before prediction.
#[derive(Clone)]
pub struct ModelLoader {
    inner: Arc<LoaderInner>,
}

impl ModelLoader {
    pub fn new(
        availability: ModelAvailability,
        store: StoreClient,
        engine: Arc<dyn ServingEngine>,
        registry: Arc<ModelRegistry>,
    ) -> Self {
        Self {
            inner: Arc::new(LoaderInner {
                availability,
                store,
                engine,
                registry,
                in_flight: DashMap::new(),
            }),
        }
    }

    pub fn is_loaded(&self, key: &ModelKey) -> bool {
        self.inner.availability.is_loaded(key)
    }

    /// Make sure a model for `key` is loaded.
    ///
    /// Availability is always checked first; the store is only queried on a miss.
    pub async fn ensure_loaded(&self, key: &ModelKey) -> LoadResult {
        if self.inner.availability.is_loaded(key) {
            debug!(key = %key, "model already loaded");
            return Ok(LoadOutcome::AlreadyLoaded);
        }
        self.join_or_start(key).await
    }

    /// Number of loads currently in flight.
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.len()
    }

    /// Model installed by this loader for a language, if any.
    pub fn active_model(&self, language: &LanguageCode) -> Option<ModelId> {
        self.inner.registry.active(language)
    }

    fn join_or_start(&self, key: &ModelKey) -> InFlightLoad {
        let flight = match self.inner.in_flight.entry(key.clone()) {
            Entry::Occupied(entry) => {
                debug!(key = %key, "joining in-flight load");
                telemetry::record_flight_joined();
                return entry.get().clone();
            }
            Entry::Vacant(entry) => {
                let inner = self.inner.clone();
                let task_key = key.clone();
                let flight = async move {
                    let _cleanup = FlightCleanup {
                        inner: inner.clone(),
                        key: task_key.clone(),
                    };
                    let result = AssertUnwindSafe(inner.fetch_and_install(&task_key))
                        .catch_unwind()
                        .await
                        .unwrap_or_else(|_| {
                            error!(key = %task_key, "model load panicked");
                            Err(LoadError::Panicked(task_key.clone()))
                        });
                    result
                }
                .boxed()
                .shared();
                entry.insert(flight.clone());
                flight
            }
        };

        // Drive the load independently of the callers awaiting it.
        tokio::spawn(flight.clone());
        flight
    }
}

/// Drops the in-flight entry when a flight ends, including on unwind, so the
/// next caller starts a fresh load.
struct FlightCleanup {
    inner: Arc<LoaderInner>,
    key: ModelKey,
}

impl Drop for FlightCleanup {
    fn drop(&mut self) {
        self.inner.in_flight.remove(&self.key);
    }
}

impl LoaderInner {
    async fn fetch_and_install(&self, key: &ModelKey) -> LoadResult {
        // A load for this key may have finished between the caller's check and now.
        if self.availability.is_loaded(key) {
            return Ok(LoadOutcome::AlreadyLoaded);
        }

        let model = match self.store.fetch_latest(key).await {
            Ok(Some(model)) => model,
            Ok(None) => return Err(LoadError::NotFound(key.clone())),
            Err(StoreError::Unavailable(reason)) => {
                return Err(LoadError::StoreUnavailable {
                    key: key.clone(),
                    reason,
                })
            }
        };

        let id = ModelId::of(&model);
        if !key.matches(&id) {
            return Err(LoadError::Rejected {
                key: key.clone(),
                id,
                reason: "store returned a model for another slot".into(),
            });
        }

        self.engine
            .load_model(Arc::new(model))
            .await
            .map_err(|e| LoadError::Rejected {
                key: key.clone(),
                id: id.clone(),
                reason: e.to_string(),
            })?;

        let superseded = self.registry.install(id.clone());
        telemetry::record_install(&key.language);
        info!(
            key = %key,
            model_id = %id,
            superseded = superseded.as_ref().map(|s| s.to_string()).unwrap_or_default(),
            "model installed"
        );

        Ok(LoadOutcome::Installed(id))
    }
}
