//! Startup warm-up: load the models for a set of languages before traffic.

use serde::Serialize;
use tracing::{info, warn};

use super::identity::{key_of, LanguageCode, ModelSpecification};
use super::loader::{LoadError, LoadOutcome, ModelLoader};

/// What happened to each requested language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreloadReport {
    pub installed: Vec<LanguageCode>,
    pub already_loaded: Vec<LanguageCode>,
    pub missing: Vec<LanguageCode>,
}

impl PreloadReport {
    /// Languages that have a resident model after the preload.
    pub fn ready(&self) -> Vec<LanguageCode> {
        self.installed
            .iter()
            .chain(self.already_loaded.iter())
            .cloned()
            .collect()
    }
}

/// Loads models for a list of languages through the regular loader.
pub struct ModelPreloader {
    loader: ModelLoader,
    specification: ModelSpecification,
}

impl ModelPreloader {
    pub fn new(loader: ModelLoader, specification: ModelSpecification) -> Self {
        Self { loader, specification }
    }

    /// Preload every language in order.
    ///
    /// A missing model is recorded and skipped. Store outages and engine
    /// rejections abort the preload.
    pub async fn preload(&self, languages: &[LanguageCode]) -> Result<PreloadReport, LoadError> {
        let mut report = PreloadReport::default();

        for language in languages.iter().filter(|l| !l.is_unknown()) {
            let key = key_of(language, &self.specification);
            match self.loader.ensure_loaded(&key).await {
                Ok(LoadOutcome::Installed(_)) => report.installed.push(language.clone()),
                Ok(LoadOutcome::AlreadyLoaded) => report.already_loaded.push(language.clone()),
                Err(LoadError::NotFound(_)) => {
                    warn!(language = %language, "no model to preload");
                    report.missing.push(language.clone());
                }
                Err(e) => return Err(e),
            }
        }

        let ready: Vec<String> = report.ready().iter().map(|l| l.to_string()).collect();
        info!(
            ready = %ready.join(","),
            installed = report.installed.len(),
            missing = report.missing.len(),
            "preload complete"
        );
        Ok(report)
    }
}
