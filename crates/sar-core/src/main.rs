//! SAR case redaction CLI.
//!
//! Turns raw case records into safe payloads:
//! - `payload`: allowlist and scrub a case record
//! - `scrub`: scrub free text
//! - `prepare`: read an inbound request event and derive case id, output key
//!   and safe payload
//! - `keygen`: generate a secret key
//! - `config`: show the effective configuration

use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand};
use sar_config::{load_config, parse_field_list, ConfigError, ConfigOptions};
use sar_core::envelope::{self, CaseRequest};
use sar_core::exit_codes::ExitCode;
use sar_core::logging::{generate_run_id, init_logging, LogConfig, LogFormat, LogLevel};
use sar_redact::{KeyMaterial, RedactionEngine};
use std::io::Read;
use std::path::{Path, PathBuf};

/// SAR case redaction - allowlist fields and tokenize PII before text leaves the boundary
#[derive(Parser)]
#[command(name = "sar")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Policy file (falls back to SAR_REDACT_POLICY, then the config dirs)
    #[arg(long, global = true, value_name = "FILE")]
    policy: Option<PathBuf>,

    /// File holding the redaction secret (falls back to SAR_SECRET_FILE, then REDACTION_SECRET)
    #[arg(long, global = true, value_name = "FILE")]
    secret_file: Option<PathBuf>,

    /// Allowed top-level fields, comma separated; repeatable
    #[arg(long = "allow", global = true, value_name = "FIELDS")]
    allow: Vec<String>,

    /// Token digest length in hex characters
    #[arg(long, global = true)]
    digest_len: Option<usize>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log format on stderr (human or jsonl)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the safe payload for a case record
    Payload(InputArgs),

    /// Scrub free text
    Scrub(ScrubArgs),

    /// Prepare an inbound request event for narrative generation
    Prepare(InputArgs),

    /// Generate a random secret key (base64)
    Keygen(KeygenArgs),

    /// Load and validate configuration, then print a summary
    Config,
}

// ============================================================================
// Command argument structs
// ============================================================================

#[derive(Args, Debug)]
struct InputArgs {
    /// Read from FILE instead of stdin
    #[arg(long, short = 'i', value_name = "FILE")]
    input: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ScrubArgs {
    /// Text to scrub (stdin when omitted)
    text: Option<String>,
}

#[derive(Args, Debug)]
struct KeygenArgs {
    /// Key length in bytes
    #[arg(long, default_value_t = 32, value_parser = clap::value_parser!(u16).range(16..=1024))]
    bytes: u16,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::Clean,
                _ => ExitCode::ArgsError,
            };
            let _ = err.print();
            std::process::exit(code.as_i32());
        }
    };

    let cli_level = if cli.global.quiet {
        Some(LogLevel::Error)
    } else if cli.global.verbose > 0 {
        Some(LogLevel::from_verbosity(cli.global.verbose))
    } else {
        None
    };
    init_logging(&LogConfig::from_env(cli_level, cli.global.log_format));

    let run_id = generate_run_id();
    let span = tracing::info_span!("run", run_id = %run_id);
    let _enter = span.enter();

    let exit_code = match &cli.command {
        Commands::Payload(args) => run_payload(&cli.global, args),
        Commands::Scrub(args) => run_scrub(&cli.global, args),
        Commands::Prepare(args) => run_prepare(&cli.global, args),
        Commands::Keygen(args) => run_keygen(args),
        Commands::Config => run_config(&cli.global),
    };

    tracing::debug!(exit_code = exit_code.as_i32(), "run finished");
    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Command implementations
// ============================================================================

fn run_payload(global: &GlobalOpts, args: &InputArgs) -> ExitCode {
    let engine = match load_engine(global) {
        Ok(engine) => engine,
        Err(code) => return code,
    };
    let raw = match read_input(args.input.as_deref()) {
        Ok(raw) => raw,
        Err(code) => return code,
    };

    let (payload, summary) = engine.build_with_summary(raw.as_str());
    tracing::info!(
        parsed = summary.parsed,
        kept_fields = summary.kept_fields,
        dropped_fields = summary.dropped_fields(),
        matches = summary.matches.total(),
        "payload built"
    );

    println!("{}", payload);
    ExitCode::Clean
}

fn run_scrub(global: &GlobalOpts, args: &ScrubArgs) -> ExitCode {
    let engine = match load_engine(global) {
        Ok(engine) => engine,
        Err(code) => return code,
    };
    let text = match &args.text {
        Some(text) => text.clone(),
        None => match read_input(None) {
            Ok(raw) => strip_line_ending(raw),
            Err(code) => return code,
        },
    };

    let (scrubbed, report) = engine.scrub_with_report(&text);
    tracing::info!(matches = report.total(), "text scrubbed");

    println!("{}", scrubbed);
    ExitCode::Clean
}

fn run_prepare(global: &GlobalOpts, args: &InputArgs) -> ExitCode {
    let engine = match load_engine(global) {
        Ok(engine) => engine,
        Err(code) => return code,
    };
    let raw = match read_input(args.input.as_deref()) {
        Ok(raw) => raw,
        Err(code) => return code,
    };

    let event: serde_json::Value = match serde_json::from_str(&raw) {
        Ok(event) => event,
        Err(e) => {
            return output_error(
                ExitCode::InputError,
                &format!("request event is not valid JSON: {}", e),
            )
        }
    };
    let request = match CaseRequest::from_event(&event) {
        Ok(request) => request,
        Err(e) => return output_error(ExitCode::InputError, &e.to_string()),
    };

    let prepared = envelope::prepare(&engine, &request, chrono::Utc::now());
    match serde_json::to_string_pretty(&prepared) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::Clean
        }
        Err(e) => output_error(
            ExitCode::InternalError,
            &format!("failed to serialize prepared case: {}", e),
        ),
    }
}

fn run_keygen(args: &KeygenArgs) -> ExitCode {
    match KeyMaterial::generate(usize::from(args.bytes)) {
        Ok(key) => {
            tracing::info!(bytes = args.bytes, "key generated");
            println!("{}", key.to_base64());
            ExitCode::Clean
        }
        Err(e) => output_error(ExitCode::InternalError, &e.to_string()),
    }
}

fn run_config(global: &GlobalOpts) -> ExitCode {
    let config = match load_config(&config_options(global)) {
        Ok(config) => config,
        Err(e) => return output_config_error(&e),
    };
    if let Err(e) = config.build_engine() {
        return output_config_error(&e);
    }

    match serde_json::to_string_pretty(&config.summary()) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::Clean
        }
        Err(e) => output_error(
            ExitCode::InternalError,
            &format!("failed to serialize config summary: {}", e),
        ),
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn config_options(global: &GlobalOpts) -> ConfigOptions {
    let allowed_fields = if global.allow.is_empty() {
        None
    } else {
        Some(
            global
                .allow
                .iter()
                .flat_map(|raw| parse_field_list(raw))
                .collect(),
        )
    };

    ConfigOptions {
        policy_path: global.policy.clone(),
        secret_file: global.secret_file.clone(),
        allowed_fields,
        digest_len: global.digest_len,
    }
}

fn load_engine(global: &GlobalOpts) -> Result<RedactionEngine, ExitCode> {
    let config = load_config(&config_options(global)).map_err(|e| output_config_error(&e))?;
    tracing::debug!(
        field_source = %config.field_source,
        secret_source = %config.secret_source,
        "configuration ready"
    );
    config.build_engine().map_err(|e| output_config_error(&e))
}

fn read_input(path: Option<&Path>) -> Result<String, ExitCode> {
    let result = match path {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {}", path.display(), e)),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map(|_| buf)
                .map_err(|e| format!("failed to read stdin: {}", e))
        }
    };
    result.map_err(|message| output_error(ExitCode::IoError, &message))
}

fn strip_line_ending(mut text: String) -> String {
    if text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    }
    text
}

/// Output a config error and return its exit code.
fn output_config_error(error: &ConfigError) -> ExitCode {
    output_error(ExitCode::from(error), &error.to_string())
}

/// Print a JSON error object on stderr.
fn output_error(code: ExitCode, message: &str) -> ExitCode {
    let response = serde_json::json!({
        "status": "error",
        "error": {
            "code": code.code_name(),
            "exit_code": code.as_i32(),
            "message": message,
        }
    });
    eprintln!("{}", response);
    code
}
