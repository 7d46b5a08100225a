//! Tests for ModelRegistry - atomic language → active model table.

mod common;

use std::sync::Arc;

use common::{model_id, spec};
use polyglot_core::models::{key_of, LanguageCode, ModelId, ModelRegistry, ModelSpecification};

fn retrained(lang: &str, hash: &str) -> ModelId {
    ModelId {
        content_hash: hash.to_string(),
        ..model_id(lang, &spec())
    }
}

#[test]
fn test_install_then_active() {
    let registry = ModelRegistry::new();
    let id = model_id("de", &spec());

    assert_eq!(registry.install(id.clone()), None);
    assert_eq!(registry.active(&LanguageCode::new("de")), Some(id));
}

#[test]
fn test_install_swaps_previous_model() {
    let registry = ModelRegistry::new();
    let old = retrained("de", "old");
    let new = retrained("de", "new");

    registry.install(old.clone());
    let superseded = registry.install(new.clone());

    assert_eq!(superseded, Some(old));
    assert_eq!(registry.active(&LanguageCode::new("de")), Some(new));
    assert_eq!(registry.count(), 1);
}

#[test]
fn test_contains_respects_specification() {
    let registry = ModelRegistry::new();
    let de = LanguageCode::new("de");
    registry.install(model_id("de", &spec()));

    assert!(registry.contains(&key_of(&de, &spec())));
    assert!(!registry.contains(&key_of(&de, &ModelSpecification::from_hash("other"))));
    assert!(!registry.contains(&key_of(&LanguageCode::new("fr"), &spec())));
}

#[test]
fn test_remove() {
    let registry = ModelRegistry::new();
    let id = model_id("fr", &spec());
    registry.install(id.clone());

    assert_eq!(registry.remove(&LanguageCode::new("fr")), Some(id));
    assert_eq!(registry.active(&LanguageCode::new("fr")), None);
    assert_eq!(registry.remove(&LanguageCode::new("fr")), None);
}

#[test]
fn test_list_is_sorted_by_language() {
    let registry = ModelRegistry::new();
    for lang in ["fr", "en", "de"] {
        registry.install(model_id(lang, &spec()));
    }

    let languages: Vec<String> = registry
        .list()
        .into_iter()
        .map(|(lang, _)| lang.to_string())
        .collect();
    assert_eq!(languages, vec!["de", "en", "fr"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_installs_and_reads() {
    let registry = Arc::new(ModelRegistry::new());
    let mut handles = Vec::new();

    for i in 0..32 {
        let registry = registry.clone();
        handles.push(tokio::spawn(async move {
            let lang = if i % 2 == 0 { "en" } else { "fr" };
            registry.install(retrained(lang, &format!("hash-{}", i)));
            registry.active(&LanguageCode::new(lang))
        }));
    }

    for handle in handles {
        assert!(handle.await.unwrap().is_some());
    }
    assert_eq!(registry.count(), 2);
}
