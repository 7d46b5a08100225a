//! Telemetry: structured logging, request spans and metrics.

mod logging;
mod metrics;
mod spans;

pub use logging::{init_logging, LogConfig, LogError, LogFormat};
pub use self::metrics::{
    record_exhausted, record_flight_joined, record_install, record_prediction_latency,
    record_resolution, record_store_fetch, record_store_outage,
};
pub use spans::{RequestSpan, SpanExt};
