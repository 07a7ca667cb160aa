//! Logging configuration for the `sar` CLI.
//!
//! The level is taken from the first of these that is set:
//! 1. `-q` / `-v` on the command line
//! 2. `SAR_LOG` (a single level name)
//! 3. `RUST_LOG` (any `EnvFilter` directive, used as given)
//! 4. `warn`
//!
//! The format is `--log-format`, else `SAR_LOG_FORMAT`, else human.

use serde::{Deserialize, Serialize};

/// Level override for the `sar` crates.
pub const ENV_LOG: &str = "SAR_LOG";

/// Output format override.
pub const ENV_LOG_FORMAT: &str = "SAR_LOG_FORMAT";

/// Raw filter directive, honoured only when no level was chosen explicitly.
pub const ENV_RUST_LOG: &str = "RUST_LOG";

/// Log output format on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Human,
    /// One JSON object per event.
    Jsonl,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" | "text" => Ok(LogFormat::Human),
            "jsonl" | "json" => Ok(LogFormat::Jsonl),
            other => Err(format!("unknown log format '{}' (expected human or jsonl)", other)),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            LogFormat::Human => "human",
            LogFormat::Jsonl => "jsonl",
        })
    }
}

/// Minimum level shown for the `sar` crates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    /// Problems only; payload commands print nothing else on stderr.
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Level for a `-v` count: `-v` info, `-vv` debug, `-vvv` trace.
    pub fn from_verbosity(verbose: u8) -> Self {
        match verbose {
            0 => LogLevel::Warn,
            1 => LogLevel::Info,
            2 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    /// Directive keyword understood by `EnvFilter`.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(LogLevel::Off),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<LogLevel> for tracing_subscriber::filter::LevelFilter {
    fn from(level: LogLevel) -> Self {
        use tracing_subscriber::filter::LevelFilter;
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Resolved logging settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogConfig {
    pub format: LogFormat,
    /// Level for the `sar` crates when `directive` is `None`.
    pub level: LogLevel,
    /// `RUST_LOG` text, kept only when neither a flag nor `SAR_LOG` set the level.
    pub directive: Option<String>,
}

impl LogConfig {
    /// Resolve from the process environment and CLI flags.
    pub fn from_env(cli_level: Option<LogLevel>, cli_format: Option<LogFormat>) -> Self {
        Self::resolve(|name| std::env::var(name).ok(), cli_level, cli_format)
    }

    /// Resolve with `lookup` standing in for the environment.
    ///
    /// Unparseable `SAR_LOG` and `SAR_LOG_FORMAT` values are ignored.
    pub fn resolve<F>(
        lookup: F,
        cli_level: Option<LogLevel>,
        cli_format: Option<LogFormat>,
    ) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let explicit = cli_level.or_else(|| lookup(ENV_LOG).and_then(|v| v.parse().ok()));
        let (level, directive) = match explicit {
            Some(level) => (level, None),
            None => (
                LogLevel::default(),
                lookup(ENV_RUST_LOG).filter(|d| !d.trim().is_empty()),
            ),
        };

        let format = cli_format
            .or_else(|| lookup(ENV_LOG_FORMAT).and_then(|v| v.parse().ok()))
            .unwrap_or_default();

        LogConfig {
            format,
            level,
            directive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn resolve(
        vars: &[(&str, &str)],
        cli_level: Option<LogLevel>,
        cli_format: Option<LogFormat>,
    ) -> LogConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        LogConfig::resolve(|name| vars.get(name).cloned(), cli_level, cli_format)
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!("human".parse::<LogFormat>().unwrap(), LogFormat::Human);
        assert_eq!(" JSON ".parse::<LogFormat>().unwrap(), LogFormat::Jsonl);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!("Warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("off".parse::<LogLevel>().unwrap(), LogLevel::Off);
        assert!("loud".parse::<LogLevel>().is_err());
        assert!(LogLevel::Error < LogLevel::Debug);
    }

    #[test]
    fn test_verbosity_ladder() {
        assert_eq!(LogLevel::from_verbosity(0), LogLevel::Warn);
        assert_eq!(LogLevel::from_verbosity(1), LogLevel::Info);
        assert_eq!(LogLevel::from_verbosity(2), LogLevel::Debug);
        assert_eq!(LogLevel::from_verbosity(9), LogLevel::Trace);
    }

    #[test]
    fn test_nothing_set_is_warn_human() {
        assert_eq!(resolve(&[], None, None), LogConfig::default());
        assert_eq!(LogConfig::default().level, LogLevel::Warn);
    }

    #[test]
    fn test_flag_beats_every_variable() {
        let config = resolve(
            &[("SAR_LOG", "trace"), ("RUST_LOG", "debug")],
            Some(LogLevel::Error),
            None,
        );
        assert_eq!(config.level, LogLevel::Error);
        assert_eq!(config.directive, None);
    }

    #[test]
    fn test_sar_log_beats_rust_log() {
        let config = resolve(&[("SAR_LOG", "error"), ("RUST_LOG", "debug")], None, None);
        assert_eq!(config.level, LogLevel::Error);
        assert_eq!(config.directive, None);
    }

    #[test]
    fn test_rust_log_kept_verbatim_when_nothing_explicit() {
        let config = resolve(&[("RUST_LOG", "sar_redact=trace,warn")], None, None);
        assert_eq!(config.level, LogLevel::Warn);
        assert_eq!(config.directive.as_deref(), Some("sar_redact=trace,warn"));

        let blank = resolve(&[("RUST_LOG", "  ")], None, None);
        assert_eq!(blank.directive, None);
    }

    #[test]
    fn test_invalid_sar_log_is_ignored() {
        let config = resolve(&[("SAR_LOG", "loud"), ("RUST_LOG", "info")], None, None);
        assert_eq!(config.directive.as_deref(), Some("info"));
    }

    #[test]
    fn test_format_flag_beats_variable() {
        let env = [("SAR_LOG_FORMAT", "jsonl")];
        assert_eq!(resolve(&env, None, None).format, LogFormat::Jsonl);
        assert_eq!(
            resolve(&env, None, Some(LogFormat::Human)).format,
            LogFormat::Human
        );
        assert_eq!(
            resolve(&[("SAR_LOG_FORMAT", "yaml")], None, None).format,
            LogFormat::Human
        );
    }
}
