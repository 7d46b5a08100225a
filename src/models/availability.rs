//! Resident-model check against the serving engine.

use std::sync::Arc;

use crate::engine::ServingEngine;

use super::identity::{ModelKey, ModelSpecification};

/// Answers "is a model for this key already in engine memory".
///
/// A key under a specification other than the active one is never loaded.
#[derive(Clone)]
pub struct ModelAvailability {
    engine: Arc<dyn ServingEngine>,
    specification: ModelSpecification,
}

impl ModelAvailability {
    pub fn new(engine: Arc<dyn ServingEngine>, specification: ModelSpecification) -> Self {
        Self { engine, specification }
    }

    pub fn is_loaded(&self, key: &ModelKey) -> bool {
        if key.specification != self.specification {
            return false;
        }
        self.engine.has_model(key)
    }

    pub fn specification(&self) -> &ModelSpecification {
        &self.specification
    }
}
