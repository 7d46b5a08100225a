//! Cascade latency benchmarks.
//!
//! Measures per-request overhead of language resolution when the model is
//! resident, and when the cascade has to fall back past missing models.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use parking_lot::RwLock;

use polyglot_core::engine::{DetectionError, EngineError, LanguageDetector, Predictions, ServingEngine};
use polyglot_core::models::{
    LanguageCode, MemoryModelStore, Model, ModelId, ModelKey, ModelSpecification, Specifications,
};
use polyglot_core::predict::{OrchestratorConfig, PredictionOrchestrator, PredictionRequest};

struct FixedDetector(&'static str);

#[async_trait::async_trait]
impl LanguageDetector for FixedDetector {
    async fn detect_language(&self, _text: &str) -> Result<LanguageCode, DetectionError> {
        Ok(LanguageCode::new(self.0))
    }
}

#[derive(Default)]
struct BenchEngine {
    loaded: RwLock<HashSet<ModelKey>>,
}

#[async_trait::async_trait]
impl ServingEngine for BenchEngine {
    fn has_model(&self, key: &ModelKey) -> bool {
        self.loaded.read().contains(key)
    }

    async fn load_model(&self, model: Arc<Model>) -> Result<(), EngineError> {
        self.loaded.write().insert(model.id.key());
        Ok(())
    }

    async fn predict(&self, _text: &str, key: &ModelKey) -> Result<Predictions, EngineError> {
        if !self.has_model(key) {
            return Err(EngineError::NotLoaded(key.clone()));
        }
        Ok(Predictions::default())
    }
}

fn model(lang: &str, spec: &ModelSpecification) -> Model {
    Model {
        id: ModelId {
            content_hash: format!("bench-{}", lang),
            specification: spec.clone(),
            seed: 1,
            language: LanguageCode::new(lang),
        },
        started_at: Utc::now(),
        finished_at: Utc::now(),
        data: Vec::new(),
    }
}

fn orchestrator(detected: &'static str, in_store: &[&str]) -> PredictionOrchestrator {
    let spec = ModelSpecification::of(&Specifications::default());
    let store = MemoryModelStore::new();
    for lang in in_store {
        store.insert(model(lang, &spec));
    }
    PredictionOrchestrator::new(
        OrchestratorConfig {
            scope: "bench".to_string(),
            default_language: LanguageCode::new("en"),
            specification: spec,
            predict_timeout: None,
        },
        Arc::new(FixedDetector(detected)),
        Arc::new(BenchEngine::default()),
        Arc::new(store),
    )
}

fn bench_resolution_depth(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("cascade_resolution");
    group.throughput(Throughput::Elements(1));

    // Detected, anticipated, default.
    for (name, store_langs) in [
        ("detected", &["de", "fr", "en"][..]),
        ("anticipated", &["fr", "en"][..]),
        ("default", &["en"][..]),
    ] {
        let orchestrator = orchestrator("de", store_langs);
        rt.block_on(async {
            let _ = orchestrator
                .predict(PredictionRequest::new("warm", "fr"))
                .await;
        });

        group.bench_function(BenchmarkId::new("resolved_at", name), |b| {
            b.to_async(&rt).iter(|| async {
                let result = orchestrator
                    .predict(PredictionRequest::new(black_box("GIB MIR EINE BANANE"), "fr"))
                    .await;
                black_box(result)
            })
        });
    }

    group.finish();
}

fn bench_exhausted_cascade(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let orchestrator = orchestrator("de", &[]);

    c.bench_function("cascade_exhausted", |b| {
        b.to_async(&rt).iter(|| async {
            let result = orchestrator
                .predict(PredictionRequest::new(black_box("GIB MIR EINE BANANE"), "fr"))
                .await;
            black_box(result)
        })
    });
}

criterion_group!(benches, bench_resolution_depth, bench_exhausted_cascade);
criterion_main!(benches);
