//! Capabilities consumed from the NLU engine.
//!
//! The prediction core depends only on these traits: language detection and a
//! serving engine that holds loaded models and runs predictions.

pub mod error;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use error::{DetectionError, EngineError};

use crate::models::{LanguageCode, Model, ModelKey};

/// Scored intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentScore {
    pub name: String,
    pub confidence: f32,
}

/// Entity extracted from the input text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMatch {
    pub name: String,
    pub value: String,
    pub source: String,
    pub confidence: f32,
}

/// Output of a single prediction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Predictions {
    pub intents: Vec<IntentScore>,
    pub entities: Vec<EntityMatch>,
}

/// Guesses the language of a text. An empty code means "unknown".
#[async_trait::async_trait]
pub trait LanguageDetector: Send + Sync {
    async fn detect_language(&self, text: &str) -> Result<LanguageCode, DetectionError>;
}

/// Serving engine holding at most one loaded model per language.
#[async_trait::async_trait]
pub trait ServingEngine: Send + Sync {
    /// Whether a model for `key` is resident. Must not block on I/O.
    fn has_model(&self, key: &ModelKey) -> bool;

    /// Install a model, superseding any model loaded for the same language.
    /// Readers must never observe a half-installed model.
    async fn load_model(&self, model: Arc<Model>) -> Result<(), EngineError>;

    /// Predict with the model loaded for `key`.
    async fn predict(&self, text: &str, key: &ModelKey) -> Result<Predictions, EngineError>;

    /// Spell check `text` against the vocabulary of the model for `key`.
    async fn spell_check(&self, text: &str, _key: &ModelKey) -> Result<String, EngineError> {
        Ok(text.to_string())
    }
}
