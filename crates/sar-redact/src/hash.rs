//! Keyed tokenization of sensitive substrings.
//!
//! Uses HMAC-SHA256 with truncated hex output to provide stable,
//! non-reversible tokens. The same matched text always yields the same token
//! under one key, so downstream readers can correlate mentions of a value
//! without ever seeing it.

use crate::error::{RedactionError, Result};
use crate::patterns::PatternKind;
use crate::policy::{MAX_DIGEST_LEN, MIN_DIGEST_LEN};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

/// Secret key material for the tokenizer.
///
/// The bytes are never printed: `Debug` only reports the key length.
#[derive(Clone)]
pub struct KeyMaterial {
    key: Vec<u8>,
}

impl KeyMaterial {
    /// Create new key material with `len` random bytes.
    pub fn generate(len: usize) -> Result<Self> {
        if len == 0 {
            return Err(RedactionError::KeyError(
                "generated key must be at least one byte".to_string(),
            ));
        }
        let mut key = vec![0u8; len];
        getrandom::getrandom(&mut key).map_err(|e| {
            RedactionError::KeyError(format!("failed to generate random key: {}", e))
        })?;
        Ok(Self { key })
    }

    /// Create key material from raw bytes. Empty keys are refused.
    pub fn from_bytes(key: impl Into<Vec<u8>>) -> Result<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(RedactionError::KeyError("secret key is empty".to_string()));
        }
        Ok(Self { key })
    }

    /// Create key material from a base64-encoded string.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        use base64::Engine;
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| RedactionError::KeyError(format!("invalid base64: {}", e)))?;
        Self::from_bytes(decoded)
    }

    /// Export key material as base64.
    pub fn to_base64(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&self.key)
    }

    /// Length of the key in bytes.
    pub fn len(&self) -> usize {
        self.key.len()
    }

    /// Always false for constructed key material.
    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyMaterial([redacted; {} bytes])", self.key.len())
    }
}

/// Pseudonym emitted in place of a sensitive substring.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    /// Which detector produced the match.
    pub kind: PatternKind,
    /// Truncated lowercase hex HMAC of the matched text.
    pub digest: String,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}]", self.kind.label(), self.digest)
    }
}

/// Turns matched text into [`Token`]s with a fixed key and digest length.
///
/// The keyed MAC state is computed once and cloned per call, so tokenizing is
/// pure and can run from many threads at once.
#[derive(Clone)]
pub struct Tokenizer {
    mac: HmacSha256,
    digest_len: usize,
}

impl Tokenizer {
    /// Build a tokenizer emitting `digest_len` hex characters per token.
    pub fn new(key: &KeyMaterial, digest_len: usize) -> Result<Self> {
        if !(MIN_DIGEST_LEN..=MAX_DIGEST_LEN).contains(&digest_len) {
            return Err(RedactionError::PolicyError(format!(
                "digest_len must be between {} and {}, got {}",
                MIN_DIGEST_LEN, MAX_DIGEST_LEN, digest_len
            )));
        }
        if key.is_empty() {
            return Err(RedactionError::KeyError("secret key is empty".to_string()));
        }
        let mac = HmacSha256::new_from_slice(&key.key)
            .map_err(|_| RedactionError::KeyError("unusable HMAC key".to_string()))?;
        Ok(Self { mac, digest_len })
    }

    /// Number of hex characters in each digest.
    pub fn digest_len(&self) -> usize {
        self.digest_len
    }

    /// Compute the truncated hex digest of `text`.
    pub fn digest(&self, text: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(text.as_bytes());
        let mut hex = hex::encode(mac.finalize().into_bytes());
        hex.truncate(self.digest_len);
        hex
    }

    /// Tokenize a matched substring.
    pub fn tokenize(&self, kind: PatternKind, text: &str) -> Token {
        Token {
            kind,
            digest: self.digest(text),
        }
    }
}

impl fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tokenizer")
            .field("digest_len", &self.digest_len)
            .finish_non_exhaustive()
    }
}
