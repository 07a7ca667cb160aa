//! SAR redaction configuration loading and validation.
//!
//! This crate provides:
//! - Policy file resolution (CLI → env → config dir → XDG → /etc)
//! - Allowed field layering (CLI → env → policy file)
//! - Secret key resolution (file → env), with no built-in key
//! - Semantic validation of the effective policy
//!
//! Loading fails when either the secret or the allowed field list is missing,
//! so an engine is never built from partial configuration.

pub mod error;
pub mod load;
pub mod resolve;
pub mod secret;
pub mod validate;

pub use error::ConfigError;
pub use load::{
    load_config, parse_field_list, ConfigOptions, ConfigSummary, FieldSource, LoadedConfig,
};
pub use resolve::{resolve_policy_path, ConfigSource, PolicyLocation};
pub use secret::{resolve_secret, SecretSource};
pub use validate::{validate_policy, ValidationError, ValidationResult};
