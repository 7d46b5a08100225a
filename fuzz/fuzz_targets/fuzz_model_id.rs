//! Fuzz target for model id parsing.
//!
//! Arbitrary strings must parse or fail cleanly, and every id that parses
//! must survive a Display round trip. Short forms of arbitrary specification
//! hashes must never split a character.

#![no_main]

use std::str::FromStr;

use libfuzzer_sys::fuzz_target;
use polyglot_core::models::{ModelId, ModelSpecification};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(id) = ModelId::from_str(text) {
        let reparsed = ModelId::from_str(&id.to_string());
        assert_eq!(reparsed.as_ref(), Ok(&id));
        let _ = id.key().to_string();
    }
    let _ = ModelSpecification::from_hash(text).short();
});
