//! Fuzz target for safe payload building.
//!
//! Arbitrary input must always yield a JSON object, and scrubbing must be
//! idempotent on whatever text the input carries.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sar_redact::{KeyMaterial, RedactionEngine, RedactionPolicy};
use std::sync::OnceLock;

static ENGINE: OnceLock<RedactionEngine> = OnceLock::new();

fn engine() -> &'static RedactionEngine {
    ENGINE.get_or_init(|| {
        let key = KeyMaterial::from_bytes(b"fuzz-secret".to_vec()).expect("key");
        RedactionEngine::new(&key, &RedactionPolicy::reference()).expect("engine")
    })
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let engine = engine();

    let payload = engine.build_safe_payload(text);
    assert!(payload.to_value().is_object());

    let once = engine.scrub(text);
    assert_eq!(engine.scrub(&once), once);
});
