//! Top-level field allowlisting.
//!
//! Unexpected fields are dropped, not scrubbed. The filter only looks at the
//! top level of a record; nested objects inside allowed fields are kept whole
//! and left to the walker.

use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Field names of the reference SAR case schema.
pub const REFERENCE_ALLOWED_FIELDS: &[&str] = &[
    "case_id",
    "summary",
    "timeline",
    "indicators",
    "amount_usd",
    "detected_by",
    "actions_taken",
    "date",
];

/// Immutable set of permitted top-level field names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedFieldSet {
    names: BTreeSet<String>,
}

impl AllowedFieldSet {
    /// Build a set from field names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// The reference SAR case field set.
    pub fn reference() -> Self {
        Self::new(REFERENCE_ALLOWED_FIELDS.iter().copied())
    }

    /// Whether `name` is permitted.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of permitted names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no field is permitted.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Permitted names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for AllowedFieldSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Restrict a record to the allowed top-level fields.
///
/// Kept fields stay in input order. Anything that is not a JSON object is
/// treated as an empty record.
pub fn allowlist(record: Value, allowed: &AllowedFieldSet) -> Map<String, Value> {
    match record {
        Value::Object(map) => map
            .into_iter()
            .filter(|(name, _)| allowed.contains(name))
            .collect(),
        _ => Map::new(),
    }
}
