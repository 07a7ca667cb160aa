//! SAR case redaction front end.
//!
//! Wraps the `sar-redact` engine for command-line use:
//! - Request envelope handling (event body, case id, output key)
//! - Structured logging on stderr
//! - Stable exit codes

pub mod envelope;
pub mod exit_codes;
pub mod logging;
