// Copyright 2024-2026 Polyglot CORE Contributors
// SPDX-License-Identifier: Apache-2.0

//! Config CLI subcommands: show, defaults, validate.

use std::path::Path;

use crate::config::{self, EffectiveConfig, EnvConfig};
use crate::telemetry::LogConfig;

/// Print effective config as key-value pairs, or JSON with `json`.
pub fn run_show(json: bool) -> i32 {
    let cfg = config::load().effective_config();
    if json {
        match serde_json::to_string_pretty(&cfg) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Failed to serialize config: {}", e);
                return 1;
            }
        }
    } else {
        print_config(&cfg);
    }
    0
}

/// Print default config values (no file or env overrides).
pub fn run_defaults() {
    print_config(&EnvConfig::default().effective_config());
}

/// Validate configuration for obvious misconfigurations.
///
/// Returns 0 if valid, 1 if any warnings are found, 2 if the config file is unusable.
pub fn run_validate() -> i32 {
    if let Ok(path) = std::env::var("POLYGLOT_CONFIG_FILE") {
        if let Err(e) = config::load_file(Path::new(&path)) {
            eprintln!("ERROR: {}", e);
            return i32::from(super::EXIT_CONFIG_ERROR);
        }
    }

    let warnings = validate(&config::load());
    for warning in &warnings {
        eprintln!("WARNING: {}", warning);
    }

    if warnings.is_empty() {
        println!("Configuration is valid.");
        0
    } else {
        1
    }
}

/// Collect human-readable warnings for a loaded configuration.
pub fn validate(cfg: &EnvConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if cfg.default_language.as_str().len() > 8 {
        warnings.push(format!(
            "POLYGLOT_DEFAULT_LANGUAGE '{}' does not look like a language code",
            cfg.default_language
        ));
    }

    if cfg.specifications.nlu_version.is_empty() {
        warnings.push("POLYGLOT_NLU_VERSION is empty".to_string());
    }

    if let Some(timeout) = cfg.predict_timeout {
        if timeout.as_millis() < 10 {
            warnings.push(format!(
                "POLYGLOT_PREDICT_TIMEOUT_MS ({}) is too short for any model load",
                timeout.as_millis()
            ));
        }
    }

    if !cfg.preload_languages.is_empty() && !cfg.preload_languages.contains(&cfg.default_language)
    {
        warnings.push(format!(
            "default language '{}' is not in POLYGLOT_PRELOAD_LANGUAGES; it will be preloaded anyway",
            cfg.default_language
        ));
    }

    if tracing_subscriber::EnvFilter::try_new(&cfg.log.level).is_err() {
        warnings.push(format!("POLYGLOT_LOG_LEVEL '{}' is not a valid filter", cfg.log.level));
    }

    warnings
}

fn print_config(cfg: &EffectiveConfig) {
    println!("POLYGLOT_SCOPE={}", cfg.scope);
    println!("POLYGLOT_DEFAULT_LANGUAGE={}", cfg.default_language);
    println!("POLYGLOT_NLU_VERSION={}", cfg.nlu_version);
    println!("POLYGLOT_LANG_DIMENSIONS={}", cfg.lang_dimensions);
    println!("POLYGLOT_LANG_DOMAIN={}", cfg.lang_domain);
    println!("POLYGLOT_LANG_VERSION={}", cfg.lang_version);
    println!("POLYGLOT_PREDICT_TIMEOUT_MS={}", cfg.predict_timeout_ms);
    println!("POLYGLOT_PRELOAD_LANGUAGES={}", cfg.preload_languages.join(","));
    println!("POLYGLOT_LOG_LEVEL={}", cfg.log_level);
    println!("POLYGLOT_LOG_FORMAT={}", cfg.log_format);
    println!("# specification={}", cfg.specification);
}

/// Logging settings for the CLI process itself.
pub fn log_config() -> LogConfig {
    config::load().log
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LanguageCode;
    use std::time::Duration;

    #[test]
    fn test_defaults_validate_cleanly() {
        assert!(validate(&EnvConfig::default()).is_empty());
    }

    #[test]
    fn test_short_timeout_warns() {
        let cfg = EnvConfig {
            predict_timeout: Some(Duration::from_millis(1)),
            ..Default::default()
        };
        assert_eq!(validate(&cfg).len(), 1);
    }

    #[test]
    fn test_preload_without_default_warns() {
        let cfg = EnvConfig {
            preload_languages: vec![LanguageCode::new("fr")],
            ..Default::default()
        };
        let warnings = validate(&cfg);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("'en'"));
    }

    #[test]
    fn test_bad_log_level_warns() {
        let mut cfg = EnvConfig::default();
        cfg.log.level = "polyglot_core=loud".to_string();
        assert_eq!(validate(&cfg).len(), 1);
    }

    #[test]
    fn test_print_defaults_does_not_panic() {
        run_defaults();
    }
}
