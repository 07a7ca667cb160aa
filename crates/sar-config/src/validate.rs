//! Configuration validation errors and semantic validation.

use sar_redact::{RedactionPolicy, MAX_DIGEST_LEN, MIN_DIGEST_LEN, POLICY_SCHEMA_VERSION};
use std::collections::BTreeSet;
use thiserror::Error;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::SemanticError(_) => 63,
            ValidationError::MissingField(_) => 64,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

/// Validate a redaction policy semantically.
pub fn validate_policy(policy: &RedactionPolicy) -> ValidationResult<()> {
    if policy.schema_version != POLICY_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: POLICY_SCHEMA_VERSION.to_string(),
            actual: policy.schema_version.clone(),
        });
    }

    validate_field_list(&policy.allowed_fields)?;
    validate_digest_len(policy.digest_len)?;

    Ok(())
}

/// Validate an allowed field list.
///
/// Names are compared after trimming; blank names and duplicates are rejected.
pub fn validate_field_list(fields: &[String]) -> ValidationResult<()> {
    if fields.is_empty() {
        return Err(ValidationError::MissingField("allowed_fields".to_string()));
    }

    let mut seen = BTreeSet::new();
    for (index, name) in fields.iter().enumerate() {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: format!("allowed_fields[{}]", index),
                message: "Field name is blank".to_string(),
            });
        }
        if !seen.insert(name) {
            return Err(ValidationError::SemanticError(format!(
                "allowed_fields lists '{}' more than once",
                name
            )));
        }
    }

    Ok(())
}

/// Validate the token digest length.
pub fn validate_digest_len(digest_len: usize) -> ValidationResult<()> {
    if !(MIN_DIGEST_LEN..=MAX_DIGEST_LEN).contains(&digest_len) {
        return Err(ValidationError::InvalidValue {
            field: "digest_len".to_string(),
            message: format!(
                "Must be in [{}, {}], got {}",
                MIN_DIGEST_LEN, MAX_DIGEST_LEN, digest_len
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_policy_valid() {
        validate_policy(&RedactionPolicy::reference()).unwrap();
    }

    #[test]
    fn test_version_mismatch() {
        let mut policy = RedactionPolicy::reference();
        policy.schema_version = "2.0.0".to_string();
        let err = validate_policy(&policy).unwrap_err();
        assert!(matches!(err, ValidationError::VersionMismatch { .. }));
        assert_eq!(err.code(), 66);
    }

    #[test]
    fn test_empty_list_is_missing() {
        let err = validate_policy(&RedactionPolicy::default()).unwrap_err();
        assert!(matches!(err, ValidationError::MissingField(_)));
        assert_eq!(err.code(), 64);
    }

    #[test]
    fn test_blank_name_rejected() {
        let policy = RedactionPolicy::new(["case_id", "  "]);
        let err = validate_policy(&policy).unwrap_err();
        match err {
            ValidationError::InvalidValue { field, .. } => assert_eq!(field, "allowed_fields[1]"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_after_trim_rejected() {
        let policy = RedactionPolicy::new(["case_id", " case_id"]);
        let err = validate_policy(&policy).unwrap_err();
        assert_eq!(err.code(), 63);
    }

    #[test]
    fn test_digest_bounds() {
        assert!(validate_digest_len(MIN_DIGEST_LEN).is_ok());
        assert!(validate_digest_len(MAX_DIGEST_LEN).is_ok());
        assert!(validate_digest_len(MIN_DIGEST_LEN - 1).is_err());
        assert!(validate_digest_len(MAX_DIGEST_LEN + 1).is_err());
    }
}
