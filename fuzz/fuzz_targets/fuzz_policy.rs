//! Fuzz target for policy.json parsing and validation.
//!
//! Arbitrary input must be rejected with an error, never a panic, and any
//! policy that validates must build an engine.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sar_config::validate_policy;
use sar_redact::{KeyMaterial, RedactionEngine, RedactionPolicy};

fuzz_target!(|data: &[u8]| {
    let Ok(policy) = serde_json::from_slice::<RedactionPolicy>(data) else {
        return;
    };
    if validate_policy(&policy).is_ok() {
        let key = KeyMaterial::from_bytes(b"fuzz-secret".to_vec()).expect("key");
        assert!(RedactionEngine::new(&key, &policy).is_ok());
    }
});
