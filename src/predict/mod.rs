//! Prediction cascade: candidate ordering and the request orchestrator.

pub mod candidates;
pub mod error;

mod orchestrator;

pub use candidates::order;
pub use error::PredictionError;
pub use orchestrator::{
    OrchestratorConfig, PredictionOrchestrator, PredictionRequest, PredictionResult,
};
