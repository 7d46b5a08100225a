//! Runtime configuration loading.
//!
//! Values come from an optional TOML file named by `POLYGLOT_CONFIG_FILE`,
//! then from `POLYGLOT_*` environment variables, which win. Invalid values
//! fall back to defaults without crashing.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `POLYGLOT_CONFIG_FILE` | unset | Optional TOML config file |
//! | `POLYGLOT_SCOPE` | default | Scope name used in logs |
//! | `POLYGLOT_DEFAULT_LANGUAGE` | en | Fallback language of last resort |
//! | `POLYGLOT_NLU_VERSION` | 2.0.0 | Engine version in the model specification |
//! | `POLYGLOT_LANG_DIMENSIONS` | 300 | Language server embedding dimensions |
//! | `POLYGLOT_LANG_DOMAIN` | bp | Language server domain |
//! | `POLYGLOT_LANG_VERSION` | 1.0.0 | Language server version |
//! | `POLYGLOT_PREDICT_TIMEOUT_MS` | 0 | Per-request timeout (0 = none) |
//! | `POLYGLOT_PRELOAD_LANGUAGES` | empty | Comma-separated languages to warm up |
//! | `POLYGLOT_LOG_LEVEL` | info | Log filter |
//! | `POLYGLOT_LOG_FORMAT` | json | `json` or `pretty` |

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{LanguageCode, LanguageServerSpec, ModelSpecification, Specifications};
use crate::telemetry::{LogConfig, LogFormat};
use crate::RuntimeConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Optional settings read from a TOML file. Every field may be omitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub scope: Option<String>,
    pub default_language: Option<String>,
    pub nlu_version: Option<String>,
    pub lang_dimensions: Option<u32>,
    pub lang_domain: Option<String>,
    pub lang_version: Option<String>,
    pub predict_timeout_ms: Option<u64>,
    pub preload_languages: Option<Vec<String>>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
}

/// Read and parse a TOML config file.
pub fn load_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Effective configuration summary (serializable).
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub scope: String,
    pub default_language: String,
    pub nlu_version: String,
    pub lang_dimensions: u32,
    pub lang_domain: String,
    pub lang_version: String,
    pub specification: String,
    pub predict_timeout_ms: u64,
    pub preload_languages: Vec<String>,
    pub log_level: String,
    pub log_format: String,
}

/// All configuration, after file and environment overlays.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub scope: String,
    pub default_language: LanguageCode,
    pub specifications: Specifications,
    pub predict_timeout: Option<Duration>,
    pub preload_languages: Vec<LanguageCode>,
    pub log: LogConfig,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            scope: "default".to_string(),
            default_language: LanguageCode::new("en"),
            specifications: Specifications::default(),
            predict_timeout: None,
            preload_languages: Vec::new(),
            log: LogConfig::default(),
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a numeric env var, returning `None` on missing or invalid.
fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|v| v.parse::<T>().ok())
}

/// Split a comma-separated language list, dropping blanks and duplicates.
fn parse_languages<I, S>(items: I) -> Vec<LanguageCode>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut languages: Vec<LanguageCode> = Vec::new();
    for item in items {
        let language = LanguageCode::new(item);
        if !language.is_unknown() && !languages.contains(&language) {
            languages.push(language);
        }
    }
    languages
}

fn timeout_from_ms(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

impl EnvConfig {
    /// Apply a file overlay on top of the current values.
    pub fn apply_file(&mut self, file: &FileConfig) {
        if let Some(scope) = file.scope.as_deref().filter(|s| !s.trim().is_empty()) {
            self.scope = scope.trim().to_string();
        }
        if let Some(language) = file.default_language.as_deref() {
            let language = LanguageCode::new(language);
            if !language.is_unknown() {
                self.default_language = language;
            }
        }
        if let Some(version) = &file.nlu_version {
            self.specifications.nlu_version = version.clone();
        }
        if let Some(dimensions) = file.lang_dimensions.filter(|d| *d > 0) {
            self.specifications.language_server.dimensions = dimensions;
        }
        if let Some(domain) = &file.lang_domain {
            self.specifications.language_server.domain = domain.clone();
        }
        if let Some(version) = &file.lang_version {
            self.specifications.language_server.version = version.clone();
        }
        if let Some(ms) = file.predict_timeout_ms {
            self.predict_timeout = timeout_from_ms(ms);
        }
        if let Some(languages) = &file.preload_languages {
            self.preload_languages = parse_languages(languages);
        }
        if let Some(level) = &file.log_level {
            self.log.level = level.clone();
        }
        if let Some(format) = file.log_format.as_deref().and_then(|f| f.parse::<LogFormat>().ok()) {
            self.log.format = format;
        }
    }

    /// Apply `POLYGLOT_*` environment overrides.
    pub fn apply_env(&mut self) {
        if let Some(scope) = env_string("POLYGLOT_SCOPE") {
            self.scope = scope;
        }
        if let Some(language) = env_string("POLYGLOT_DEFAULT_LANGUAGE") {
            self.default_language = LanguageCode::new(language);
        }
        if let Some(version) = env_string("POLYGLOT_NLU_VERSION") {
            self.specifications.nlu_version = version;
        }
        if let Some(dimensions) = env_parse::<u32>("POLYGLOT_LANG_DIMENSIONS").filter(|d| *d > 0) {
            self.specifications.language_server.dimensions = dimensions;
        }
        if let Some(domain) = env_string("POLYGLOT_LANG_DOMAIN") {
            self.specifications.language_server.domain = domain;
        }
        if let Some(version) = env_string("POLYGLOT_LANG_VERSION") {
            self.specifications.language_server.version = version;
        }
        if let Some(ms) = env_parse::<u64>("POLYGLOT_PREDICT_TIMEOUT_MS") {
            self.predict_timeout = timeout_from_ms(ms);
        }
        if let Some(list) = env_string("POLYGLOT_PRELOAD_LANGUAGES") {
            self.preload_languages = parse_languages(list.split(','));
        }
        if let Some(level) = env_string("POLYGLOT_LOG_LEVEL") {
            self.log.level = level;
        }
        if let Some(format) = env_string("POLYGLOT_LOG_FORMAT").and_then(|f| f.parse().ok()) {
            self.log.format = format;
        }
    }

    /// Model specification hash derived from the configured descriptor.
    pub fn specification(&self) -> ModelSpecification {
        ModelSpecification::of(&self.specifications)
    }

    /// Runtime settings for `Runtime::new`.
    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            scope: self.scope.clone(),
            default_language: self.default_language.clone(),
            specifications: self.specifications.clone(),
            predict_timeout: self.predict_timeout,
            preload_languages: self.preload_languages.clone(),
        }
    }

    /// Return a serializable summary of all effective values.
    pub fn effective_config(&self) -> EffectiveConfig {
        let LanguageServerSpec {
            dimensions,
            domain,
            version,
        } = &self.specifications.language_server;

        EffectiveConfig {
            scope: self.scope.clone(),
            default_language: self.default_language.to_string(),
            nlu_version: self.specifications.nlu_version.clone(),
            lang_dimensions: *dimensions,
            lang_domain: domain.clone(),
            lang_version: version.clone(),
            specification: self.specification().to_string(),
            predict_timeout_ms: self.predict_timeout.map(|t| t.as_millis() as u64).unwrap_or(0),
            preload_languages: self.preload_languages.iter().map(|l| l.to_string()).collect(),
            log_level: self.log.level.clone(),
            log_format: self.log.format.as_str().to_string(),
        }
    }
}

/// Load configuration: defaults, then the optional file, then environment.
///
/// An unreadable or invalid file is reported on stderr and ignored.
pub fn load() -> EnvConfig {
    let mut config = EnvConfig::default();

    if let Some(path) = env_string("POLYGLOT_CONFIG_FILE") {
        match load_file(Path::new(&path)) {
            Ok(file) => config.apply_file(&file),
            Err(e) => eprintln!("Ignoring config file: {}", e),
        }
    }

    config.apply_env();
    config
}
