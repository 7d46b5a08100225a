//! Per-request language resolution and prediction.
//!
//! For every request: detect the language, order the candidates, then walk
//! them strictly in sequence until one has a resident (or loadable) model.
//! A missing model moves the cascade to the next candidate; a store outage or
//! an engine rejection aborts it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Instrument, Span};
use uuid::Uuid;

use super::candidates;
use super::error::PredictionError;
use crate::engine::{LanguageDetector, Predictions, ServingEngine};
use crate::models::{
    key_of, LanguageCode, LoadError, LoadOutcome, Model, ModelAvailability, ModelId, ModelKey,
    ModelLoader, ModelPreloader, ModelRegistry, ModelSpecification, ModelStore, PreloadReport,
    StoreClient, StoreError,
};
use crate::telemetry::{self, RequestSpan, SpanExt};

/// Text to classify plus the caller's language hint.
#[derive(Debug, Clone)]
pub struct PredictionRequest {
    pub text: String,
    pub anticipated_language: LanguageCode,
    pub request_id: Option<String>,
}

impl PredictionRequest {
    pub fn new(text: impl Into<String>, anticipated_language: impl Into<LanguageCode>) -> Self {
        Self {
            text: text.into(),
            anticipated_language: anticipated_language.into(),
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

/// Outcome of a successful cascade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    /// Language whose model produced the predictions.
    pub language: LanguageCode,
    /// Raw detector output. May differ from `language` after a fallback.
    pub detected_language: LanguageCode,
    /// Languages tried, in order, ending with `language`.
    pub attempted: Vec<LanguageCode>,
    /// Model installed by this service for `language`, when known.
    pub model_id: Option<ModelId>,
    pub spell_checked: String,
    pub predictions: Predictions,
}

/// Orchestrator settings.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Name of the scope (bot, tenant) this orchestrator serves, for logs.
    pub scope: String,
    /// Fallback of last resort.
    pub default_language: LanguageCode,
    /// Only models trained under this specification are used.
    pub specification: ModelSpecification,
    /// Upper bound on a whole request. `None` waits indefinitely.
    pub predict_timeout: Option<Duration>,
}

/// Top-level entry point of the prediction service.
pub struct PredictionOrchestrator {
    config: OrchestratorConfig,
    detector: Arc<dyn LanguageDetector>,
    engine: Arc<dyn ServingEngine>,
    store: StoreClient,
    registry: Arc<ModelRegistry>,
    loader: ModelLoader,
}

impl PredictionOrchestrator {
    pub fn new(
        config: OrchestratorConfig,
        detector: Arc<dyn LanguageDetector>,
        engine: Arc<dyn ServingEngine>,
        store: Arc<dyn ModelStore>,
    ) -> Self {
        let store = StoreClient::new(store);
        let registry = Arc::new(ModelRegistry::new());
        let availability = ModelAvailability::new(engine.clone(), config.specification.clone());
        let loader = ModelLoader::new(availability, store.clone(), engine.clone(), registry.clone());

        Self {
            config,
            detector,
            engine,
            store,
            registry,
            loader,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn loader(&self) -> &ModelLoader {
        &self.loader
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// Lookup key for a language under the active specification.
    pub fn key_for(&self, language: &LanguageCode) -> ModelKey {
        key_of(language, &self.config.specification)
    }

    /// Load the models for `languages` ahead of traffic.
    pub async fn preload(&self, languages: &[LanguageCode]) -> Result<PreloadReport, LoadError> {
        ModelPreloader::new(self.loader.clone(), self.config.specification.clone())
            .preload(languages)
            .await
    }

    /// Exact model lookup for diagnostics. Never used by the cascade.
    pub async fn model_info(&self, id: &ModelId) -> Result<Option<Model>, StoreError> {
        self.store.fetch_exact(id).await
    }

    /// Resolve a language, make sure its model is loaded, and predict.
    pub async fn predict(
        &self,
        request: PredictionRequest,
    ) -> Result<PredictionResult, PredictionError> {
        match self.config.predict_timeout {
            Some(limit) => tokio::time::timeout(limit, self.run(request))
                .await
                .map_err(|_| PredictionError::Timeout(limit.as_millis() as u64))?,
            None => self.run(request).await,
        }
    }

    /// Like `predict`, but stops waiting when `cancel` fires.
    ///
    /// A shared model load the request was waiting on keeps running for the
    /// benefit of other callers.
    pub async fn predict_with_cancel(
        &self,
        request: PredictionRequest,
        cancel: CancellationToken,
    ) -> Result<PredictionResult, PredictionError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(PredictionError::Cancelled),
            result = self.predict(request) => result,
        }
    }

    async fn run(&self, request: PredictionRequest) -> Result<PredictionResult, PredictionError> {
        let request_id = request
            .request_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let span = RequestSpan::new(&request_id, &self.config.scope);
        let started = Instant::now();

        let result = self.cascade(&request, &span).instrument(span.clone()).await;

        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
        span.record("latency_ms", latency_ms);
        span.record_result(&result);
        match &result {
            Ok(_) => telemetry::record_prediction_latency(latency_ms),
            Err(e) if e.is_warning() => {
                warn!(parent: &span, error = %e, "prediction failed")
            }
            Err(PredictionError::Engine(e)) if e.is_programming_error() => tracing::error!(
                parent: &span,
                error = %e,
                "engine lost the model the cascade resolved"
            ),
            Err(e) => tracing::error!(parent: &span, error = %e, "prediction failed"),
        }
        result
    }

    async fn cascade(
        &self,
        request: &PredictionRequest,
        span: &Span,
    ) -> Result<PredictionResult, PredictionError> {
        let detected = self.detect(&request.text).await;
        span.record("detected_language", detected.as_str());

        let candidates = candidates::order(
            &detected,
            &request.anticipated_language,
            &self.config.default_language,
        );
        debug!(candidates = ?candidates, "resolving language");

        let (language, attempted) = self.resolve(&candidates).await?;
        span.record("language", language.as_str());

        let key = self.key_for(&language);
        let spell_checked = self.engine.spell_check(&request.text, &key).await?;
        let predictions = self.engine.predict(&request.text, &key).await?;

        Ok(PredictionResult {
            model_id: self.loader.active_model(&language),
            language,
            detected_language: detected,
            attempted,
            spell_checked,
            predictions,
        })
    }

    /// Detection failures count as "unknown".
    async fn detect(&self, text: &str) -> LanguageCode {
        match self.detector.detect_language(text).await {
            Ok(language) => language,
            Err(e) => {
                warn!(error = %e, "language detection failed, treating as unknown");
                LanguageCode::unknown()
            }
        }
    }

    /// Walk the candidates in order. Candidate n+1 is only tried once
    /// candidate n is known to have no model.
    async fn resolve(
        &self,
        candidates: &[LanguageCode],
    ) -> Result<(LanguageCode, Vec<LanguageCode>), PredictionError> {
        let mut attempted = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            attempted.push(candidate.clone());
            let key = self.key_for(candidate);

            match self.loader.ensure_loaded(&key).await {
                Ok(outcome) => {
                    if let LoadOutcome::Installed(id) = &outcome {
                        info!(language = %candidate, model_id = %id, "model loaded on demand");
                    }
                    telemetry::record_resolution(candidate, attempted.len() - 1);
                    return Ok((candidate.clone(), attempted));
                }
                Err(LoadError::NotFound(_)) => {
                    debug!(language = %candidate, "no model for candidate, falling back");
                }
                Err(LoadError::StoreUnavailable { key, reason }) => {
                    return Err(PredictionError::StoreUnavailable { key, reason });
                }
                Err(LoadError::Rejected { key, reason, .. }) => {
                    return Err(PredictionError::LoadFailure { key, reason });
                }
                Err(e @ LoadError::Panicked(_)) => {
                    return Err(PredictionError::LoadFailure {
                        key: e.key().clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        telemetry::record_exhausted();
        Err(PredictionError::NoModelAvailable { attempted })
    }
}
