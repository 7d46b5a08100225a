//! Metrics facade calls for the prediction cascade.
//!
//! Without an installed recorder these are no-ops.

use metrics::{counter, histogram};

use crate::models::LanguageCode;

/// A cascade resolved to `language` after `fallback_depth` misses.
pub fn record_resolution(language: &LanguageCode, fallback_depth: usize) {
    counter!("polyglot_cascade_resolved_total", "language" => language.to_string()).increment(1);
    histogram!("polyglot_cascade_fallback_depth").record(fallback_depth as f64);
}

/// Every candidate was missing from engine and store.
pub fn record_exhausted() {
    counter!("polyglot_cascade_exhausted_total").increment(1);
}

pub fn record_store_fetch(hit: bool) {
    let outcome = if hit { "hit" } else { "miss" };
    counter!("polyglot_store_fetch_total", "outcome" => outcome).increment(1);
}

pub fn record_store_outage() {
    counter!("polyglot_store_outage_total").increment(1);
}

pub fn record_install(language: &LanguageCode) {
    counter!("polyglot_model_install_total", "language" => language.to_string()).increment(1);
}

/// A caller joined a load that was already in flight.
pub fn record_flight_joined() {
    counter!("polyglot_load_joined_total").increment(1);
}

pub fn record_prediction_latency(latency_ms: f64) {
    histogram!("polyglot_prediction_latency_ms").record(latency_ms);
}
