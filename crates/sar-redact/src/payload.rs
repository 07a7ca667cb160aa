//! Safe payload builder: allowlist, walk, serialize.
//!
//! The only way field content reaches the serialized output is through the
//! allowlist and the walker. Input that cannot be parsed becomes an empty
//! record rather than an error, so raw text is never passed on.

use crate::allowlist::{allowlist, AllowedFieldSet};
use crate::scrub::{ScrubReport, Scrubber};
use crate::walk::walk_counting;
use serde::Serialize;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fmt;

/// Input to the payload builder: JSON text or an already parsed record.
#[derive(Debug, Clone)]
pub enum RawInput<'a> {
    /// Unparsed JSON text.
    Text(&'a str),
    /// A parsed record.
    Record(Cow<'a, Value>),
}

impl<'a> From<&'a str> for RawInput<'a> {
    fn from(text: &'a str) -> Self {
        RawInput::Text(text)
    }
}

impl<'a> From<&'a String> for RawInput<'a> {
    fn from(text: &'a String) -> Self {
        RawInput::Text(text.as_str())
    }
}

impl<'a> From<&'a Value> for RawInput<'a> {
    fn from(record: &'a Value) -> Self {
        RawInput::Record(Cow::Borrowed(record))
    }
}

impl From<Value> for RawInput<'static> {
    fn from(record: Value) -> Self {
        RawInput::Record(Cow::Owned(record))
    }
}

impl RawInput<'_> {
    /// Resolve to a record. Returns the record and whether parsing succeeded.
    fn into_record(self) -> (Value, bool) {
        match self {
            RawInput::Text(text) => match serde_json::from_str(text) {
                Ok(value) => (value, true),
                Err(_) => (Value::Object(Map::new()), false),
            },
            RawInput::Record(record) => (record.into_owned(), true),
        }
    }
}

/// Serialized, field-filtered, scrubbed record.
///
/// Serializes as its JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SafePayload(String);

impl SafePayload {
    /// The payload as JSON text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the JSON text.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Parse the payload back into a JSON value.
    pub fn to_value(&self) -> Value {
        serde_json::from_str(&self.0).unwrap_or_else(|_| Value::Object(Map::new()))
    }
}

impl fmt::Display for SafePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SafePayload {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<SafePayload> for String {
    fn from(payload: SafePayload) -> Self {
        payload.0
    }
}

/// Counts describing how a payload was built. Never carries field content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PayloadSummary {
    /// Whether text input parsed as JSON (always true for records).
    pub parsed: bool,
    /// Whether the parsed input was a JSON object.
    pub was_object: bool,
    /// Top-level fields in the input.
    pub input_fields: usize,
    /// Top-level fields kept by the allowlist.
    pub kept_fields: usize,
    /// Replacements made by the scrubber.
    pub matches: ScrubReport,
}

impl PayloadSummary {
    /// Top-level fields dropped by the allowlist.
    pub fn dropped_fields(&self) -> usize {
        self.input_fields - self.kept_fields
    }
}

/// Build a safe payload.
pub fn build_safe_payload<'a>(
    raw: impl Into<RawInput<'a>>,
    allowed: &AllowedFieldSet,
    scrubber: &Scrubber,
) -> SafePayload {
    build_with_summary(raw, allowed, scrubber).0
}

/// Build a safe payload and describe what happened.
pub fn build_with_summary<'a>(
    raw: impl Into<RawInput<'a>>,
    allowed: &AllowedFieldSet,
    scrubber: &Scrubber,
) -> (SafePayload, PayloadSummary) {
    let (record, parsed) = raw.into().into_record();
    let mut summary = PayloadSummary {
        parsed,
        was_object: record.is_object(),
        input_fields: record.as_object().map_or(0, Map::len),
        ..PayloadSummary::default()
    };

    let kept = allowlist(record, allowed);
    summary.kept_fields = kept.len();

    let scrubbed = walk_counting(Value::Object(kept), scrubber, &mut summary.matches);
    // Fall back to an empty record rather than emitting anything unserialized.
    let text = serde_json::to_string(&scrubbed).unwrap_or_else(|_| "{}".to_string());
    (SafePayload(text), summary)
}
