//! Error types for the redaction engine.
//!
//! Errors are only raised while the engine is being configured. Once built,
//! every per-record operation is total.

use thiserror::Error;

/// Result type for redaction operations.
pub type Result<T> = std::result::Result<T, RedactionError>;

/// Errors that can occur while setting up redaction.
#[derive(Error, Debug)]
pub enum RedactionError {
    /// Failed to load or interpret the redaction policy.
    #[error("policy error: {0}")]
    PolicyError(String),

    /// Key material is missing or unusable.
    #[error("key error: {0}")]
    KeyError(String),

    /// Failed to compile a regex pattern.
    #[error("pattern error: {0}")]
    PatternError(String),

    /// I/O error during policy file operations.
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
}
