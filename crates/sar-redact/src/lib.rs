//! Redaction and allowlisting engine for SAR case payloads.
//!
//! This crate turns an arbitrary case/transaction record into a "safe payload":
//! a field-filtered, PII-free JSON document that can be handed to an external
//! language model and written to durable storage.
//!
//! # Pipeline
//!
//! 1. **Allowlist**: only permitted top-level fields survive; everything else
//!    is dropped before any content inspection.
//! 2. **Walk**: every string leaf of the remaining tree is scrubbed, structure
//!    and key order are preserved.
//! 3. **Scrub**: an ordered pattern library (email, SSN, card, account, IP,
//!    URL, domain) replaces each match with a keyed token `[KIND:digest]`.
//! 4. **Serialize**: the result is emitted as compact JSON.
//!
//! Tokens are HMAC-SHA256 digests of the matched text, so the same value maps
//! to the same token under one key and cannot be reversed without it.
//!
//! # Example
//!
//! ```no_run
//! use sar_redact::{KeyMaterial, RedactionEngine, RedactionPolicy};
//!
//! let key = KeyMaterial::from_bytes(b"process-secret".to_vec()).unwrap();
//! let policy = RedactionPolicy::new(["case_id", "summary"]);
//! let engine = RedactionEngine::new(&key, &policy).unwrap();
//!
//! let payload = engine.build_safe_payload(r#"{"case_id":"C-1","summary":"mail bob@example.com"}"#);
//! assert!(!payload.as_str().contains("bob@example.com"));
//! ```

pub mod allowlist;
pub mod engine;
pub mod error;
pub mod hash;
pub mod patterns;
pub mod payload;
pub mod policy;
pub mod scrub;
pub mod walk;

pub use allowlist::{allowlist, AllowedFieldSet, REFERENCE_ALLOWED_FIELDS};
pub use engine::RedactionEngine;
pub use error::{RedactionError, Result};
pub use hash::{KeyMaterial, Token, Tokenizer};
pub use patterns::{library, PatternKind, SensitivePattern};
pub use payload::{build_safe_payload, PayloadSummary, RawInput, SafePayload};
pub use policy::{
    RedactionPolicy, DEFAULT_DIGEST_LEN, MAX_DIGEST_LEN, MIN_DIGEST_LEN, POLICY_SCHEMA_VERSION,
};
pub use scrub::{ScrubReport, Scrubber};
pub use walk::walk;
