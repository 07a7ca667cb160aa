//! Errors raised while loading configuration.
//!
//! Messages name the failing file, variable or field. They never carry the
//! secret or any value read from it.

use crate::validate::ValidationError;
use sar_redact::RedactionError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Policy file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Invalid JSON in policy file {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error reading {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Policy validation failed: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("No allowed field list configured (use --allow, SAR_ALLOWED_FIELDS or a policy file)")]
    MissingAllowedFields,

    #[error(
        "No redaction secret configured (use --secret-file, SAR_SECRET_FILE or REDACTION_SECRET)"
    )]
    MissingSecret,

    #[error("Redaction secret from {origin} is empty")]
    EmptySecret { origin: String },

    #[error("Failed to read secret file {path}: {source}")]
    SecretIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Engine setup failed: {0}")]
    Engine(#[from] RedactionError),
}
