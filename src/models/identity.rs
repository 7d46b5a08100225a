//! Model identity: language codes, specifications, lookup keys and full ids.
//!
//! A `ModelKey` names a language slot (language + engine specification) and is
//! used for every lookup. A `ModelId` pins one trained artifact within that slot.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Malformed model id: {0}")]
    MalformedId(String),

    #[error("Invalid seed in model id: {0}")]
    InvalidSeed(String),
}

/// Short language identifier ("en", "fr"). Empty means unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_ascii_lowercase())
    }

    /// The "detection failed" value.
    pub fn unknown() -> Self {
        Self(String::new())
    }

    pub fn is_unknown(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LanguageCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for LanguageCode {
    fn from(code: String) -> Self {
        Self::new(code)
    }
}

/// Language server settings that shape the features a model was trained on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LanguageServerSpec {
    pub dimensions: u32,
    pub domain: String,
    pub version: String,
}

/// Engine configuration descriptor. Models trained under different
/// specifications are never interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Specifications {
    pub nlu_version: String,
    pub language_server: LanguageServerSpec,
}

impl Default for Specifications {
    fn default() -> Self {
        Self {
            nlu_version: "2.0.0".to_string(),
            language_server: LanguageServerSpec {
                dimensions: 300,
                domain: "bp".to_string(),
                version: "1.0.0".to_string(),
            },
        }
    }
}

/// Stable hash of a `Specifications` value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelSpecification(String);

impl ModelSpecification {
    /// Hash a specification descriptor field by field.
    pub fn of(specs: &Specifications) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(specs.nlu_version.as_bytes());
        hasher.update([0u8]);
        hasher.update(specs.language_server.dimensions.to_le_bytes());
        hasher.update(specs.language_server.domain.as_bytes());
        hasher.update([0u8]);
        hasher.update(specs.language_server.version.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Wrap an already computed specification hash.
    pub fn from_hash(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, for log lines.
    pub fn short(&self) -> &str {
        self.0
            .char_indices()
            .nth(8)
            .map_or(&self.0[..], |(end, _)| &self.0[..end])
    }
}

impl fmt::Display for ModelSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Partial identifier: one language slot under one specification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelKey {
    pub language: LanguageCode,
    pub specification: ModelSpecification,
}

impl ModelKey {
    pub fn new(language: LanguageCode, specification: ModelSpecification) -> Self {
        Self { language, specification }
    }

    /// True if `id` names a model of this slot.
    pub fn matches(&self, id: &ModelId) -> bool {
        self.language == id.language && self.specification == id.specification
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.language, self.specification.short())
    }
}

/// Full identifier of one trained artifact.
///
/// The canonical string form is `contentHash.specificationHash.seed.languageCode`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelId {
    pub content_hash: String,
    pub specification: ModelSpecification,
    pub seed: u32,
    pub language: LanguageCode,
}

impl ModelId {
    pub fn key(&self) -> ModelKey {
        ModelKey::new(self.language.clone(), self.specification.clone())
    }

    /// Extract the full identifier of a fetched model.
    pub fn of(model: &Model) -> Self {
        model.id.clone()
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.content_hash, self.specification, self.seed, self.language
        )
    }
}

impl FromStr for ModelId {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        let [content_hash, specification, seed, language] = parts.as_slice() else {
            return Err(IdentityError::MalformedId(s.to_string()));
        };
        let language = LanguageCode::new(language);
        if content_hash.is_empty() || specification.is_empty() || language.is_unknown() {
            return Err(IdentityError::MalformedId(s.to_string()));
        }
        let seed = seed
            .parse::<u32>()
            .map_err(|_| IdentityError::InvalidSeed(seed.to_string()))?;

        Ok(Self {
            content_hash: content_hash.to_string(),
            specification: ModelSpecification::from_hash(*specification),
            seed,
            language,
        })
    }
}

/// A trained model as returned by the store. Immutable once finished.
#[derive(Debug, Clone)]
pub struct Model {
    pub id: ModelId,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub data: Vec<u8>,
}

/// Prediction-time query used to derive a lookup key.
#[derive(Debug, Clone)]
pub struct ModelQuery {
    pub language: LanguageCode,
    pub specifications: Specifications,
}

/// `keyOf`: canonical lookup key for a language under a specification.
pub fn key_of(language: &LanguageCode, specification: &ModelSpecification) -> ModelKey {
    ModelKey::new(language.clone(), specification.clone())
}

/// `idOf`: full identifier of a fetched model.
pub fn id_of(model: &Model) -> ModelId {
    ModelId::of(model)
}

/// `briefId`: lookup key for a prediction-time query.
pub fn brief_id(query: &ModelQuery) -> ModelKey {
    key_of(&query.language, &ModelSpecification::of(&query.specifications))
}
