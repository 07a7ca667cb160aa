//! Configuration loading.
//!
//! Merges the policy file, allowed field overrides and the secret into a
//! validated [`LoadedConfig`] from which the engine is built.

use crate::error::ConfigError;
use crate::resolve::{resolve_policy_path, PolicyLocation};
use crate::secret::{resolve_secret, SecretSource};
use crate::validate::validate_policy;
use sar_redact::{KeyMaterial, RedactionEngine, RedactionPolicy};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Environment variable holding a comma-separated allowed field list.
pub const ENV_ALLOWED_FIELDS: &str = "SAR_ALLOWED_FIELDS";

/// Configuration resolution options, usually taken from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct ConfigOptions {
    /// Explicit policy file path.
    pub policy_path: Option<PathBuf>,
    /// Explicit secret file path.
    pub secret_file: Option<PathBuf>,
    /// Allowed field override (highest priority).
    pub allowed_fields: Option<Vec<String>>,
    /// Digest length override.
    pub digest_len: Option<usize>,
}

/// Where the effective allowed field list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    CliArgument,
    Environment,
    PolicyFile,
}

impl std::fmt::Display for FieldSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldSource::CliArgument => write!(f, "CLI argument"),
            FieldSource::Environment => write!(f, "environment variable"),
            FieldSource::PolicyFile => write!(f, "policy file"),
        }
    }
}

/// Validated configuration with provenance information.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Effective policy after overrides, with trimmed field names.
    pub policy: RedactionPolicy,
    /// Where the policy file was found.
    pub policy_location: PolicyLocation,
    /// Where the allowed field list came from.
    pub field_source: FieldSource,
    /// Where the secret came from.
    pub secret_source: SecretSource,
    key: KeyMaterial,
}

/// Printable description of a loaded configuration. Holds no key material.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub policy_path: Option<PathBuf>,
    pub policy_source: String,
    pub schema_version: String,
    pub allowed_fields: Vec<String>,
    pub field_source: FieldSource,
    pub digest_len: usize,
    pub secret_source: String,
    pub key_bytes: usize,
}

impl LoadedConfig {
    /// Build the redaction engine.
    pub fn build_engine(&self) -> Result<RedactionEngine, ConfigError> {
        Ok(RedactionEngine::new(&self.key, &self.policy)?)
    }

    /// Describe the configuration without exposing the key.
    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            policy_path: self.policy_location.path.clone(),
            policy_source: self.policy_location.source.to_string(),
            schema_version: self.policy.schema_version.clone(),
            allowed_fields: self.policy.allowed_fields.clone(),
            field_source: self.field_source,
            digest_len: self.policy.digest_len,
            secret_source: self.secret_source.to_string(),
            key_bytes: self.key.len(),
        }
    }
}

/// Split a comma-separated field list, trimming names and skipping blanks.
pub fn parse_field_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Load configuration with the standard resolution order.
///
/// Allowed fields: `options.allowed_fields` → SAR_ALLOWED_FIELDS → policy file.
/// The secret is resolved by [`resolve_secret`]. Either one missing is fatal.
pub fn load_config(options: &ConfigOptions) -> Result<LoadedConfig, ConfigError> {
    let policy_location = resolve_policy_path(options.policy_path.as_deref());
    let file_policy = match &policy_location.path {
        Some(path) => Some(load_policy_file(path)?),
        None => None,
    };

    let env_fields = std::env::var(ENV_ALLOWED_FIELDS)
        .ok()
        .filter(|raw| !raw.trim().is_empty());

    let (fields, field_source) = if let Some(fields) = &options.allowed_fields {
        (fields.clone(), FieldSource::CliArgument)
    } else if let Some(raw) = env_fields {
        (parse_field_list(&raw), FieldSource::Environment)
    } else {
        match &file_policy {
            Some(policy) if !policy.allowed_fields.is_empty() => {
                (policy.allowed_fields.clone(), FieldSource::PolicyFile)
            }
            _ => return Err(ConfigError::MissingAllowedFields),
        }
    };

    let mut policy = file_policy.unwrap_or_default();
    policy.allowed_fields = fields;
    if let Some(digest_len) = options.digest_len {
        policy.digest_len = digest_len;
    }
    validate_policy(&policy)?;
    policy.allowed_fields = policy
        .allowed_fields
        .iter()
        .map(|name| name.trim().to_string())
        .collect();

    let (key, secret_source) = resolve_secret(options.secret_file.as_deref())?;

    tracing::debug!(
        policy_source = %policy_location.source,
        field_source = %field_source,
        allowed_fields = policy.allowed_fields.len(),
        digest_len = policy.digest_len,
        secret_source = %secret_source,
        "configuration loaded"
    );

    Ok(LoadedConfig {
        policy,
        policy_location,
        field_source,
        secret_source,
        key,
    })
}

fn load_policy_file(path: &Path) -> Result<RedactionPolicy, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_json::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_secret(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("secret");
        std::fs::write(&path, "project-secret\n").unwrap();
        path
    }

    #[test]
    fn test_parse_field_list() {
        assert_eq!(
            parse_field_list(" case_id, summary,,date "),
            vec!["case_id", "summary", "date"]
        );
        assert!(parse_field_list(" , ").is_empty());
    }

    #[test]
    fn test_load_with_explicit_options() {
        let dir = TempDir::new().unwrap();
        let policy_path = dir.path().join("policy.json");
        RedactionPolicy::new(["case_id", "summary", "date"])
            .save(&policy_path)
            .unwrap();

        let options = ConfigOptions {
            policy_path: Some(policy_path.clone()),
            secret_file: Some(write_secret(&dir)),
            allowed_fields: Some(vec!["case_id".to_string(), " summary ".to_string()]),
            digest_len: Some(8),
        };
        let config = load_config(&options).unwrap();

        assert_eq!(config.field_source, FieldSource::CliArgument);
        assert_eq!(config.policy.allowed_fields, vec!["case_id", "summary"]);
        assert_eq!(config.policy.digest_len, 8);
        assert_eq!(config.policy_location.path, Some(policy_path));

        let engine = config.build_engine().unwrap();
        assert_eq!(engine.digest_len(), 8);
        assert_eq!(engine.allowed_fields().len(), 2);
    }

    #[test]
    fn test_missing_policy_path_is_not_found() {
        let dir = TempDir::new().unwrap();
        let options = ConfigOptions {
            policy_path: Some(dir.path().join("absent.json")),
            secret_file: Some(write_secret(&dir)),
            allowed_fields: Some(vec!["case_id".to_string()]),
            digest_len: None,
        };
        let err = load_config(&options).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn test_malformed_policy_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let policy_path = dir.path().join("policy.json");
        std::fs::write(&policy_path, "{\"allowed_fields\": [").unwrap();

        let options = ConfigOptions {
            policy_path: Some(policy_path),
            secret_file: Some(write_secret(&dir)),
            allowed_fields: None,
            digest_len: None,
        };
        let err = load_config(&options).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_bad_digest_override_rejected() {
        let dir = TempDir::new().unwrap();
        let options = ConfigOptions {
            policy_path: None,
            secret_file: Some(write_secret(&dir)),
            allowed_fields: Some(vec!["case_id".to_string()]),
            digest_len: Some(2),
        };
        let err = load_config(&options).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_summary_has_no_key() {
        let dir = TempDir::new().unwrap();
        let options = ConfigOptions {
            policy_path: None,
            secret_file: Some(write_secret(&dir)),
            allowed_fields: Some(vec!["case_id".to_string()]),
            digest_len: None,
        };
        let config = load_config(&options).unwrap();
        let summary = config.summary();
        assert_eq!(summary.key_bytes, "project-secret".len());

        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("project-secret"));
        assert!(!format!("{:?}", config).contains("project-secret"));
    }
}
