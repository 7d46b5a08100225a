//! Polyglot CORE
//!
//! Language resolution and lazy model loading for a multilingual NLU
//! prediction service. For every request the runtime decides which language
//! model to use and guarantees that model is resident before prediction.
//!
//! # Cascade
//!
//! - **Detect**: ask the language detector; failures mean "unknown".
//! - **Order**: detected, anticipated, default; unknown and duplicate entries dropped.
//! - **Resolve**: per candidate, check the engine, then the store, then load.
//!   A missing model falls through to the next candidate; an outage aborts.
//! - **Predict**: with the resolved language's model.
//!
//! Detection, the serving engine and the model store are capabilities
//! supplied by the caller (see [`engine`] and [`models::ModelStore`]).

pub mod cli;
pub mod config;
pub mod engine;
pub mod models;
pub mod predict;
pub mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use engine::{LanguageDetector, ServingEngine};
use models::{LanguageCode, LoadError, ModelSpecification, ModelStore, PreloadReport, Specifications};
use predict::{OrchestratorConfig, PredictionOrchestrator};

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub scope: String,
    pub default_language: LanguageCode,
    pub specifications: Specifications,
    pub predict_timeout: Option<Duration>,
    pub preload_languages: Vec<LanguageCode>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            scope: "default".to_string(),
            default_language: LanguageCode::new("en"),
            specifications: Specifications::default(),
            predict_timeout: None,
            preload_languages: Vec::new(),
        }
    }
}

impl RuntimeConfig {
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            scope: self.scope.clone(),
            default_language: self.default_language.clone(),
            specification: ModelSpecification::of(&self.specifications),
            predict_timeout: self.predict_timeout,
        }
    }
}

/// The prediction runtime instance.
pub struct Runtime {
    pub config: RuntimeConfig,
    pub orchestrator: Arc<PredictionOrchestrator>,
}

impl Runtime {
    /// Create a runtime over the supplied capabilities.
    pub fn new(
        config: RuntimeConfig,
        detector: Arc<dyn LanguageDetector>,
        engine: Arc<dyn ServingEngine>,
        store: Arc<dyn ModelStore>,
    ) -> Self {
        let orchestrator = Arc::new(PredictionOrchestrator::new(
            config.orchestrator_config(),
            detector,
            engine,
            store,
        ));
        Self { config, orchestrator }
    }

    /// Preload the configured languages. The default language is always included.
    pub async fn warm_up(&self) -> Result<PreloadReport, LoadError> {
        let mut languages = vec![self.config.default_language.clone()];
        for language in &self.config.preload_languages {
            if !languages.contains(language) {
                languages.push(language.clone());
            }
        }
        self.orchestrator.preload(&languages).await
    }
}
