//! Error types reported by the serving engine and the language detector.

use thiserror::Error;

use crate::models::ModelKey;

/// Errors raised by a `ServingEngine`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Model not loaded: {0}")]
    NotLoaded(ModelKey),

    #[error("Model load failed: {0}")]
    LoadFailed(String),

    #[error("Incompatible model specification: {0}")]
    IncompatibleSpecification(String),

    #[error("Prediction failed: {0}")]
    Prediction(String),
}

impl EngineError {
    /// Returns true if the engine was asked to predict with no model resident.
    /// The cascade always loads first, so this indicates a bug.
    pub fn is_programming_error(&self) -> bool {
        matches!(self, Self::NotLoaded(_))
    }
}

/// Errors raised by a `LanguageDetector`. Always treated as "unknown language".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DetectionError {
    #[error("Language detection failed: {0}")]
    Failed(String),

    #[error("Language detection timed out")]
    Timeout,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LanguageCode, ModelSpecification};

    #[test]
    fn test_only_not_loaded_is_a_programming_error() {
        let key = ModelKey::new(LanguageCode::new("de"), ModelSpecification::from_hash("abc"));
        assert!(EngineError::NotLoaded(key).is_programming_error());
        assert!(!EngineError::LoadFailed("bad magic".into()).is_programming_error());
        assert!(!EngineError::Prediction("oom".into()).is_programming_error());
    }
}
