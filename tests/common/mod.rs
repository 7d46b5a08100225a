//! Shared test doubles for the prediction cascade.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};

use polyglot_core::engine::{
    DetectionError, EngineError, IntentScore, LanguageDetector, Predictions, ServingEngine,
};
use polyglot_core::models::{
    LanguageCode, MemoryModelStore, Model, ModelId, ModelKey, ModelSpecification, Specifications,
};
use polyglot_core::predict::{OrchestratorConfig, PredictionOrchestrator};

pub const FRENCH_UTT: &str = "DONNE MOI UNE BANANE";
pub const ENGLISH_UTT: &str = "GIVE ME A BANANA";
pub const GERMAN_UTT: &str = "GIB MIR EINE BANANE";
pub const GIBBERISH_UTT: &str = "XQZT PLORK";

pub const DEFAULT_LANGUAGE: &str = "en";
pub const ANTICIPATED_LANGUAGE: &str = "fr";

pub fn spec() -> ModelSpecification {
    ModelSpecification::of(&Specifications::default())
}

pub fn model_id(lang: &str, spec: &ModelSpecification) -> ModelId {
    ModelId {
        content_hash: format!("hash-{}", lang),
        specification: spec.clone(),
        seed: 42,
        language: LanguageCode::new(lang),
    }
}

pub fn model(lang: &str) -> Model {
    Model {
        id: model_id(lang, &spec()),
        started_at: Utc::now(),
        finished_at: Utc::now(),
        data: lang.as_bytes().to_vec(),
    }
}

pub fn store_with(langs: &[&str]) -> MemoryModelStore {
    let store = MemoryModelStore::new();
    for lang in langs {
        store.insert(model(lang));
    }
    store
}

pub fn languages(keys: &[ModelKey]) -> Vec<String> {
    keys.iter().map(|k| k.language.to_string()).collect()
}

/// Detector recognising the three banana utterances.
pub struct StubDetector;

#[async_trait::async_trait]
impl LanguageDetector for StubDetector {
    async fn detect_language(&self, text: &str) -> Result<LanguageCode, DetectionError> {
        let code = match text {
            FRENCH_UTT => "fr",
            ENGLISH_UTT => "en",
            GERMAN_UTT => "de",
            _ => "",
        };
        Ok(LanguageCode::new(code))
    }
}

/// Detector that always errors.
pub struct FailingDetector;

#[async_trait::async_trait]
impl LanguageDetector for FailingDetector {
    async fn detect_language(&self, _text: &str) -> Result<LanguageCode, DetectionError> {
        Err(DetectionError::Failed("detector offline".into()))
    }
}

/// Serving engine that records every call.
pub struct RecordingEngine {
    loaded: RwLock<HashMap<LanguageCode, ModelId>>,
    load_calls: Mutex<Vec<ModelId>>,
    predict_calls: Mutex<Vec<ModelKey>>,
    reject_loads: AtomicBool,
    fail_spell_check: AtomicBool,
    load_latency: Option<Duration>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self {
            loaded: RwLock::new(HashMap::new()),
            load_calls: Mutex::new(Vec::new()),
            predict_calls: Mutex::new(Vec::new()),
            reject_loads: AtomicBool::new(false),
            fail_spell_check: AtomicBool::new(false),
            load_latency: None,
        }
    }

    /// Engine with models for `langs` already resident under the active specification.
    pub fn with_loaded(langs: &[&str]) -> Self {
        let engine = Self::new();
        for lang in langs {
            engine.preinstall(model_id(lang, &spec()));
        }
        engine
    }

    pub fn with_load_latency(mut self, latency: Duration) -> Self {
        self.load_latency = Some(latency);
        self
    }

    pub fn preinstall(&self, id: ModelId) {
        self.loaded.write().insert(id.language.clone(), id);
    }

    pub fn reject_loads(&self) {
        self.reject_loads.store(true, Ordering::SeqCst);
    }

    pub fn fail_spell_check(&self) {
        self.fail_spell_check.store(true, Ordering::SeqCst);
    }

    pub fn load_count(&self) -> usize {
        self.load_calls.lock().len()
    }

    pub fn loaded_languages(&self) -> Vec<String> {
        let mut langs: Vec<String> = self.loaded.read().keys().map(|l| l.to_string()).collect();
        langs.sort();
        langs
    }

    pub fn predicted_languages(&self) -> Vec<String> {
        languages(&self.predict_calls.lock())
    }
}

#[async_trait::async_trait]
impl ServingEngine for RecordingEngine {
    fn has_model(&self, key: &ModelKey) -> bool {
        self.loaded
            .read()
            .get(&key.language)
            .map(|id| key.matches(id))
            .unwrap_or(false)
    }

    async fn load_model(&self, model: Arc<Model>) -> Result<(), EngineError> {
        self.load_calls.lock().push(model.id.clone());
        if let Some(latency) = self.load_latency {
            tokio::time::sleep(latency).await;
        }
        if self.reject_loads.load(Ordering::SeqCst) {
            return Err(EngineError::LoadFailed("corrupt artifact".into()));
        }
        self.preinstall(model.id.clone());
        Ok(())
    }

    async fn predict(&self, text: &str, key: &ModelKey) -> Result<Predictions, EngineError> {
        self.predict_calls.lock().push(key.clone());
        if !self.has_model(key) {
            return Err(EngineError::NotLoaded(key.clone()));
        }
        Ok(Predictions {
            intents: vec![IntentScore {
                name: format!("order_fruit_{}", key.language),
                confidence: if text.is_empty() { 0.0 } else { 0.9 },
            }],
            entities: Vec::new(),
        })
    }

    async fn spell_check(&self, text: &str, _key: &ModelKey) -> Result<String, EngineError> {
        if self.fail_spell_check.load(Ordering::SeqCst) {
            return Err(EngineError::Prediction("vocabulary unavailable".into()));
        }
        Ok(text.to_lowercase())
    }
}

pub struct Harness {
    pub orchestrator: Arc<PredictionOrchestrator>,
    pub engine: Arc<RecordingEngine>,
    pub store: Arc<MemoryModelStore>,
}

pub fn config(timeout: Option<Duration>) -> OrchestratorConfig {
    OrchestratorConfig {
        scope: "test-bot".to_string(),
        default_language: LanguageCode::new(DEFAULT_LANGUAGE),
        specification: spec(),
        predict_timeout: timeout,
    }
}

pub fn build(
    detector: Arc<dyn LanguageDetector>,
    engine: RecordingEngine,
    store: MemoryModelStore,
    timeout: Option<Duration>,
) -> Harness {
    let engine = Arc::new(engine);
    let store = Arc::new(store);
    let orchestrator = Arc::new(PredictionOrchestrator::new(
        config(timeout),
        detector,
        engine.clone(),
        store.clone(),
    ));
    Harness {
        orchestrator,
        engine,
        store,
    }
}

/// Orchestrator with `in_engine` resident and `in_store` persisted.
pub fn harness(in_engine: &[&str], in_store: &[&str]) -> Harness {
    build(
        Arc::new(StubDetector),
        RecordingEngine::with_loaded(in_engine),
        store_with(in_store),
        None,
    )
}

impl Harness {
    pub fn fetched_languages(&self) -> Vec<String> {
        languages(&self.store.latest_lookups())
    }
}
