//! The `prediction_request` span and helpers to fill it in.

use tracing::{info_span, Span};

/// Writes the outcome of a request into its span.
pub trait SpanExt {
    /// Sets `status` to `ok` or `error`, plus `error.message` on failure.
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display;
}

impl SpanExt for Span {
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display,
    {
        if let Err(e) = result {
            self.record("status", "error");
            self.record("error.message", e.to_string().as_str());
        } else {
            self.record("status", "ok");
        }
    }
}

pub struct RequestSpan;

impl RequestSpan {
    /// Opens a span for one prediction request in `scope`.
    ///
    /// `detected_language` and `language` are recorded by the cascade as it
    /// goes. The caller records `latency_ms` and, through `SpanExt`, `status`.
    pub fn new(request_id: &str, scope: &str) -> Span {
        info_span!(
            "prediction_request",
            request_id = %request_id,
            scope = %scope,
            detected_language = tracing::field::Empty,
            language = tracing::field::Empty,
            latency_ms = tracing::field::Empty,
            status = tracing::field::Empty,
            error.message = tracing::field::Empty,
        )
    }
}
