//! Main redaction engine.
//!
//! The RedactionEngine bundles the immutable inputs of the pipeline (key,
//! digest length, allowed fields) and exposes the safe payload builder. It is
//! built once at startup and shared by reference; reconfiguring means
//! building a new engine.

use crate::payload::{build_with_summary, PayloadSummary, RawInput, SafePayload};
use crate::{
    allowlist, AllowedFieldSet, KeyMaterial, PatternKind, RedactionPolicy, Result, ScrubReport,
    Scrubber, Token, Tokenizer,
};
use serde_json::{Map, Value};

/// The main redaction engine.
#[derive(Debug, Clone)]
pub struct RedactionEngine {
    /// Scrubber over the standard pattern library.
    scrubber: Scrubber,

    /// Permitted top-level fields.
    allowed: AllowedFieldSet,
}

impl RedactionEngine {
    /// Create an engine from a key and a policy.
    pub fn new(key: &KeyMaterial, policy: &RedactionPolicy) -> Result<Self> {
        let tokenizer = Tokenizer::new(key, policy.digest_len)?;
        Ok(Self {
            scrubber: Scrubber::new(tokenizer)?,
            allowed: policy.allowed_field_set(),
        })
    }

    /// Create an engine with an explicit allowed set and the default digest length.
    pub fn with_allowed(key: &KeyMaterial, allowed: AllowedFieldSet) -> Result<Self> {
        let tokenizer = Tokenizer::new(key, crate::DEFAULT_DIGEST_LEN)?;
        Ok(Self {
            scrubber: Scrubber::new(tokenizer)?,
            allowed,
        })
    }

    /// Permitted top-level fields.
    pub fn allowed_fields(&self) -> &AllowedFieldSet {
        &self.allowed
    }

    /// Hex characters per token digest.
    pub fn digest_len(&self) -> usize {
        self.scrubber.tokenizer().digest_len()
    }

    /// Tokenize a single value as `kind`.
    pub fn tokenize(&self, kind: PatternKind, text: &str) -> Token {
        self.scrubber.tokenizer().tokenize(kind, text)
    }

    /// Scrub free text.
    pub fn scrub(&self, text: &str) -> String {
        self.scrubber.scrub(text)
    }

    /// Scrub free text and report replacement counts.
    pub fn scrub_with_report(&self, text: &str) -> (String, ScrubReport) {
        self.scrubber.scrub_with_report(text)
    }

    /// Scrub every string leaf of a JSON tree.
    pub fn walk(&self, value: Value) -> Value {
        crate::walk(value, &self.scrubber)
    }

    /// Restrict a record to the allowed top-level fields.
    pub fn allowlist(&self, record: Value) -> Map<String, Value> {
        allowlist(record, &self.allowed)
    }

    /// Build the safe payload for a raw case record.
    ///
    /// Never fails: unparseable text and non-object input yield `{}`.
    pub fn build_safe_payload<'a>(&self, raw: impl Into<RawInput<'a>>) -> SafePayload {
        self.build_with_summary(raw).0
    }

    /// Build the safe payload and return the counts describing it.
    pub fn build_with_summary<'a>(
        &self,
        raw: impl Into<RawInput<'a>>,
    ) -> (SafePayload, PayloadSummary) {
        let (payload, summary) = build_with_summary(raw, &self.allowed, &self.scrubber);

        if !summary.parsed {
            tracing::warn!(
                target: "sar_redact::payload",
                "input is not valid JSON; emitting empty record"
            );
        } else if !summary.was_object {
            tracing::warn!(
                target: "sar_redact::payload",
                "input is not a JSON object; emitting empty record"
            );
        }
        tracing::debug!(
            target: "sar_redact::payload",
            input_fields = summary.input_fields,
            kept_fields = summary.kept_fields,
            dropped_fields = summary.dropped_fields(),
            matches = summary.matches.total(),
            kinds = %summary.matches,
            "built safe payload"
        );

        (payload, summary)
    }
}
