//! Registry of the models this service has installed, one per language.
//!
//! Installing a model for a language atomically replaces the previous one.
//! Reads are synchronous so availability checks never suspend.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::identity::{LanguageCode, ModelId, ModelKey};

/// Thread-safe language → active model table.
pub struct ModelRegistry {
    active: RwLock<HashMap<LanguageCode, ModelId>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self {
            active: RwLock::new(HashMap::new()),
        }
    }

    /// Atomically make `id` the active model for its language.
    /// Returns the superseded id, if any.
    pub fn install(&self, id: ModelId) -> Option<ModelId> {
        self.active.write().insert(id.language.clone(), id)
    }

    /// Active model for a language.
    pub fn active(&self, language: &LanguageCode) -> Option<ModelId> {
        self.active.read().get(language).cloned()
    }

    /// True if the active model for `key.language` belongs to `key`.
    pub fn contains(&self, key: &ModelKey) -> bool {
        self.active
            .read()
            .get(&key.language)
            .map(|id| key.matches(id))
            .unwrap_or(false)
    }

    pub fn remove(&self, language: &LanguageCode) -> Option<ModelId> {
        self.active.write().remove(language)
    }

    /// All active models, ordered by language.
    pub fn list(&self) -> Vec<(LanguageCode, ModelId)> {
        let mut entries: Vec<_> = self
            .active
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    pub fn count(&self) -> usize {
        self.active.read().len()
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
