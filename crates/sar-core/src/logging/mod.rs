//! Structured logging for the `sar` CLI.
//!
//! - stdout is reserved for command payloads
//! - stderr receives all log output (human or JSON lines)
//! - events carry counts, kinds and sources; never record text or key material

pub mod config;

pub use config::{LogConfig, LogFormat, LogLevel};

use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Crates whose events are shown by default.
const LOG_TARGETS: &[&str] = &["sar_core", "sar_config", "sar_redact"];

/// Filter directive applying `level` to the `sar` crates only.
pub fn default_directive(level: LogLevel) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Filter for `config`: its `RUST_LOG` directive when one was kept and
/// parses, otherwise the level applied to the `sar` crates.
pub fn build_filter(config: &LogConfig) -> EnvFilter {
    config
        .directive
        .as_deref()
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| EnvFilter::new(default_directive(config.level)))
}

/// Initialize the logging subsystem.
///
/// Call once at startup. A second call leaves the first subscriber in place.
pub fn init_logging(config: &LogConfig) {
    let filter = build_filter(config);

    let result = match config.format {
        LogFormat::Human => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_ansi(std::io::stderr().is_terminal()),
            )
            .try_init(),
        LogFormat::Jsonl => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true)
                    .flatten_event(true),
            )
            .try_init(),
    };

    if result.is_err() {
        tracing::debug!("logging already initialized");
    }
}

/// Generate a unique run ID for this invocation.
pub fn generate_run_id() -> String {
    let uuid = uuid::Uuid::new_v4().simple().to_string();
    format!("run-{}", &uuid[..12])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_run_id_shape() {
        let id = generate_run_id();
        assert!(id.starts_with("run-"));
        assert_eq!(id.len(), 16);
        assert!(id[4..].chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, generate_run_id());
    }

    #[test]
    fn test_default_directive_covers_all_crates() {
        assert_eq!(
            default_directive(LogLevel::Debug),
            "sar_core=debug,sar_config=debug,sar_redact=debug"
        );
    }

    #[test]
    fn test_explicit_level_ignores_rust_log() {
        let config = LogConfig::resolve(
            |name| (name == config::ENV_RUST_LOG).then(|| "debug".to_string()),
            Some(LogLevel::Error),
            None,
        );
        assert_eq!(
            build_filter(&config).max_level_hint(),
            Some(LevelFilter::ERROR)
        );
    }

    #[test]
    fn test_rust_log_directive_applies_without_explicit_level() {
        let config = LogConfig {
            directive: Some("debug".to_string()),
            ..LogConfig::default()
        };
        assert_eq!(
            build_filter(&config).max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
    }

    #[test]
    fn test_malformed_directive_falls_back_to_level() {
        let config = LogConfig {
            level: LogLevel::Info,
            directive: Some("sar_core=loudest".to_string()),
            ..LogConfig::default()
        };
        assert_eq!(
            build_filter(&config).max_level_hint(),
            Some(LevelFilter::from(LogLevel::Info))
        );
    }

    #[test]
    fn test_init_twice_is_harmless() {
        let config = LogConfig {
            level: LogLevel::Off,
            ..LogConfig::default()
        };
        init_logging(&config);
        init_logging(&config);
    }
}
