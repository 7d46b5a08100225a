//! Polyglot CORE command-line entry point.
//!
//! ## CLI Subcommands
//!
//! - `polyglot-core-cli config show [--json]` - Effective configuration
//! - `polyglot-core-cli config defaults` - Documented defaults
//! - `polyglot-core-cli config validate` - Validate configuration (exit 0/1/2)
//! - `polyglot-core-cli version` - Show version

use std::process::ExitCode;

use polyglot_core::cli::{config_cmd, EXIT_CONFIG_ERROR};
use polyglot_core::telemetry;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    if let Err(e) = telemetry::init_logging(&config_cmd::log_config()) {
        eprintln!("Logging disabled: {}", e);
    }

    match command {
        "config" => {
            let subcommand = args.get(2).map(|s| s.as_str()).unwrap_or("show");
            match subcommand {
                "show" => {
                    let json = args.get(3).map(|s| s.as_str()) == Some("--json");
                    ExitCode::from(config_cmd::run_show(json) as u8)
                }
                "defaults" => {
                    config_cmd::run_defaults();
                    ExitCode::SUCCESS
                }
                "validate" => ExitCode::from(config_cmd::run_validate() as u8),
                _ => {
                    eprintln!("Unknown config subcommand: {}", subcommand);
                    print_usage();
                    ExitCode::from(EXIT_CONFIG_ERROR)
                }
            }
        }
        "help" | "--help" | "-h" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "version" | "--version" | "-V" => {
            println!("polyglot-core {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        "polyglot-core - language resolution and model loading for NLU prediction v{}

USAGE:
    polyglot-core-cli [COMMAND] [OPTIONS]

COMMANDS:
    config show [--json]   Show effective configuration
    config defaults        Show default configuration
    config validate        Validate configuration
    version                Show version information
    help                   Show this help message

ENVIRONMENT:
    POLYGLOT_CONFIG_FILE         Optional TOML config file
    POLYGLOT_DEFAULT_LANGUAGE    Fallback language (default: en)
    POLYGLOT_PREDICT_TIMEOUT_MS  Per-request timeout, 0 = none
    POLYGLOT_PRELOAD_LANGUAGES   Languages to warm up at startup
    POLYGLOT_LOG_LEVEL           Log filter (default: info)
    POLYGLOT_LOG_FORMAT          json or pretty

EXIT CODES:
    0  Success / Valid
    1  Failure / Warnings found
    2  Configuration error
",
        version
    );
}
