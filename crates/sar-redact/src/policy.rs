//! Redaction policy file.
//!
//! The policy carries the inputs of the engine that are not secret: the
//! allowed top-level fields and the token digest length.

use crate::allowlist::{AllowedFieldSet, REFERENCE_ALLOWED_FIELDS};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Schema version for the policy file.
pub const POLICY_SCHEMA_VERSION: &str = "1.0.0";

/// Default number of hex characters in a token digest.
pub const DEFAULT_DIGEST_LEN: usize = 6;

/// Shortest accepted digest.
pub const MIN_DIGEST_LEN: usize = 4;

/// Longest accepted digest (full SHA-256 output).
///
/// Text that is already shaped like a token is never scanned, so a
/// caller can pass digits through as `[CARD:4111111111111111]` once the
/// digest length reaches 16. Keep `digest_len` short when input is not
/// trusted to avoid token syntax.
pub const MAX_DIGEST_LEN: usize = 64;

/// Redaction policy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionPolicy {
    /// Schema version.
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Permitted top-level field names.
    #[serde(default)]
    pub allowed_fields: Vec<String>,

    /// Hex characters kept from each HMAC digest.
    #[serde(default = "default_digest_len")]
    pub digest_len: usize,
}

fn default_schema_version() -> String {
    POLICY_SCHEMA_VERSION.to_string()
}

fn default_digest_len() -> usize {
    DEFAULT_DIGEST_LEN
}

impl RedactionPolicy {
    /// Create a policy permitting `allowed_fields`.
    pub fn new<I, S>(allowed_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_fields: allowed_fields.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Policy for the reference SAR case schema.
    pub fn reference() -> Self {
        Self::new(REFERENCE_ALLOWED_FIELDS.iter().copied())
    }

    /// Set the digest length.
    pub fn with_digest_len(mut self, digest_len: usize) -> Self {
        self.digest_len = digest_len;
        self
    }

    /// Parse a policy from JSON text.
    pub fn from_json(content: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load policy from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Save policy to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The allowed fields as a lookup set.
    pub fn allowed_field_set(&self) -> AllowedFieldSet {
        AllowedFieldSet::new(self.allowed_fields.iter().map(|name| name.trim()))
    }
}

impl Default for RedactionPolicy {
    fn default() -> Self {
        Self {
            schema_version: POLICY_SCHEMA_VERSION.to_string(),
            allowed_fields: Vec::new(),
            digest_len: DEFAULT_DIGEST_LEN,
        }
    }
}
