//! Errors surfaced by `PredictionOrchestrator::predict`.
//!
//! A candidate whose model is missing never shows up here; the cascade
//! resolves it by moving on. Everything below aborts the request.

use thiserror::Error;

use crate::engine::EngineError;
use crate::models::{LanguageCode, ModelKey};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PredictionError {
    #[error("Model store unavailable while resolving {key}: {reason}")]
    StoreUnavailable { key: ModelKey, reason: String },

    #[error("Engine failed to load model for {key}: {reason}")]
    LoadFailure { key: ModelKey, reason: String },

    #[error("No model available for languages [{}]", join_languages(.attempted))]
    NoModelAvailable { attempted: Vec<LanguageCode> },

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Prediction cancelled")]
    Cancelled,

    #[error("Prediction timed out after {0}ms")]
    Timeout(u64),
}

impl PredictionError {
    /// Returns true if this error should be logged as a warning.
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Timeout(_) | Self::NoModelAvailable { .. })
    }

    /// Returns true if the model store could not be reached.
    pub fn is_outage(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. })
    }
}

fn join_languages(languages: &[LanguageCode]) -> String {
    languages
        .iter()
        .map(LanguageCode::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
