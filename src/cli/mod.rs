// Copyright 2024-2026 Polyglot CORE Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI module for Polyglot CORE commands.
//!
//! The prediction cascade has no command-line surface of its own; the CLI
//! only inspects and validates configuration.
//!
//! ## Usage
//!
//! ```bash
//! polyglot-core-cli config show       # Effective configuration
//! polyglot-core-cli config defaults   # Documented defaults
//! polyglot-core-cli config validate   # Exit 0 if valid
//! ```

pub mod config_cmd;

/// Exit code for a configuration error.
pub const EXIT_CONFIG_ERROR: u8 = 2;
