//! Model management for the prediction service.
//!
//! Handles model identity, resident-model checks, store lookups, single-flight
//! loading and startup preloading.

pub mod identity;

mod availability;
mod loader;
mod preload;
mod registry;
mod store;

pub use availability::ModelAvailability;
pub use identity::{
    brief_id, id_of, key_of, IdentityError, LanguageCode, LanguageServerSpec, Model, ModelId,
    ModelKey, ModelQuery, ModelSpecification, Specifications,
};
pub use loader::{LoadError, LoadOutcome, ModelLoader};
pub use preload::{ModelPreloader, PreloadReport};
pub use registry::ModelRegistry;
pub use store::{
    select_latest, MemoryModelStore, ModelStore, StoreClient, StoreError, LOOKUP_HISTORY,
};
