//! Secret key resolution.
//!
//! There is no built-in key. The secret comes from a file (CLI flag, then
//! SAR_SECRET_FILE) or from the raw bytes of REDACTION_SECRET.

use crate::error::ConfigError;
use crate::resolve::env_path;
use sar_redact::KeyMaterial;
use std::path::{Path, PathBuf};

/// Environment variable naming a file holding the secret.
pub const ENV_SECRET_FILE: &str = "SAR_SECRET_FILE";

/// Environment variable holding the secret itself.
pub const ENV_SECRET: &str = "REDACTION_SECRET";

/// Where the secret was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    /// File given with `--secret-file`.
    CliFile(PathBuf),

    /// File named by SAR_SECRET_FILE.
    EnvFile(PathBuf),

    /// Value of REDACTION_SECRET.
    Environment,
}

impl std::fmt::Display for SecretSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretSource::CliFile(path) => write!(f, "file {} (CLI argument)", path.display()),
            SecretSource::EnvFile(path) => {
                write!(f, "file {} ({})", path.display(), ENV_SECRET_FILE)
            }
            SecretSource::Environment => write!(f, "environment variable {}", ENV_SECRET),
        }
    }
}

/// Resolve the secret key.
pub fn resolve_secret(cli_file: Option<&Path>) -> Result<(KeyMaterial, SecretSource), ConfigError> {
    if let Some(path) = cli_file {
        let source = SecretSource::CliFile(path.to_path_buf());
        return Ok((read_secret_file(path, &source)?, source));
    }

    if let Some(path) = env_path(ENV_SECRET_FILE) {
        let source = SecretSource::EnvFile(path.clone());
        return Ok((read_secret_file(&path, &source)?, source));
    }

    match std::env::var_os(ENV_SECRET) {
        Some(value) => {
            let source = SecretSource::Environment;
            Ok((key_from_bytes(value.into_encoded_bytes(), &source)?, source))
        }
        None => Err(ConfigError::MissingSecret),
    }
}

fn read_secret_file(path: &Path, source: &SecretSource) -> Result<KeyMaterial, ConfigError> {
    let mut bytes = std::fs::read(path).map_err(|e| ConfigError::SecretIo {
        path: path.to_path_buf(),
        source: e,
    })?;

    // Editors and `echo` append a line ending that is not part of the key.
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
        if bytes.last() == Some(&b'\r') {
            bytes.pop();
        }
    }
    key_from_bytes(bytes, source)
}

fn key_from_bytes(bytes: Vec<u8>, source: &SecretSource) -> Result<KeyMaterial, ConfigError> {
    if bytes.is_empty() {
        return Err(ConfigError::EmptySecret {
            origin: source.to_string(),
        });
    }
    Ok(KeyMaterial::from_bytes(bytes)?)
}
