//! Policy file discovery.
//!
//! Resolution order: CLI argument → environment variables → XDG paths → /etc.

use std::path::{Path, PathBuf};

/// Where the policy file was found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Found in /etc/sar-redact/.
    SystemConfig,

    /// No policy file.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::SystemConfig => write!(f, "system config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// A resolved policy path and its provenance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyLocation {
    /// Path to policy.json (None if no file applies).
    pub path: Option<PathBuf>,

    /// Source of the path (for diagnostics).
    pub source: ConfigSource,
}

/// Environment variable naming the policy file directly.
pub const ENV_POLICY_PATH: &str = "SAR_REDACT_POLICY";

/// Environment variable naming a directory holding policy.json.
pub const ENV_CONFIG_DIR: &str = "SAR_REDACT_CONFIG_DIR";

const POLICY_FILENAME: &str = "policy.json";

/// Application name for XDG and system directories.
const APP_NAME: &str = "sar-redact";

/// Resolve the policy file path.
///
/// Resolution order:
/// 1. Explicit CLI path
/// 2. SAR_REDACT_POLICY
/// 3. SAR_REDACT_CONFIG_DIR + policy.json
/// 4. XDG config directory (~/.config/sar-redact/policy.json)
/// 5. System config (/etc/sar-redact/policy.json)
/// 6. None
///
/// Paths named explicitly (steps 1 and 2) are returned even if missing, so a
/// typo fails at load time instead of silently falling through to another
/// file. Discovered locations (steps 3-5) are only used when the file exists.
pub fn resolve_policy_path(cli_path: Option<&Path>) -> PolicyLocation {
    // 1. CLI argument
    if let Some(path) = cli_path {
        return PolicyLocation {
            path: Some(path.to_path_buf()),
            source: ConfigSource::CliArgument,
        };
    }

    // 2. Environment variable (direct path)
    if let Some(path) = env_path(ENV_POLICY_PATH) {
        return PolicyLocation {
            path: Some(path),
            source: ConfigSource::Environment,
        };
    }

    // 3. Environment variable (config dir)
    if let Some(dir) = env_path(ENV_CONFIG_DIR) {
        let path = dir.join(POLICY_FILENAME);
        if path.exists() {
            return PolicyLocation {
                path: Some(path),
                source: ConfigSource::Environment,
            };
        }
    }

    // 4. XDG config directory
    if let Some(dir) = xdg_config_dir() {
        let path = dir.join(POLICY_FILENAME);
        if path.exists() {
            return PolicyLocation {
                path: Some(path),
                source: ConfigSource::XdgConfig,
            };
        }
    }

    // 5. System config
    let path = system_config_dir().join(POLICY_FILENAME);
    if path.exists() {
        return PolicyLocation {
            path: Some(path),
            source: ConfigSource::SystemConfig,
        };
    }

    PolicyLocation::default()
}

/// Read a non-empty path from an environment variable.
pub(crate) fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Get the XDG config directory for sar-redact.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Get the system config directory.
pub fn system_config_dir() -> PathBuf {
    PathBuf::from("/etc").join(APP_NAME)
}
