//! Structured logging and security-focused trace utilities.
//!
//! This module configures the `tracing` ecosystem for the client and the
//! command line tool, and provides helpers that keep bearer tokens out of
//! log output.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::config::LoggingConfig;
use crate::error::{Result, TranslatorError};
use regex::Regex;
use std::fs::OpenOptions;
use std::sync::{Mutex, OnceLock};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static BEARER_REGEX: OnceLock<Regex> = OnceLock::new();
static ACCESS_TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();

fn bearer_regex() -> &'static Regex {
    BEARER_REGEX.get_or_init(|| Regex::new(r"Bearer\s+[^\s\x22']+").expect("Invalid regex pattern"))
}

fn access_token_regex() -> &'static Regex {
    ACCESS_TOKEN_REGEX.get_or_init(|| {
        Regex::new(r#""access_token"\s*:\s*"[^"]*""#).expect("Invalid regex pattern")
    })
}

/// Initializes the global tracing subscriber.
///
/// Supports three output formats:
/// - `json`: Structured JSON logs.
/// - `pretty`: Human-readable multi-line output.
/// - `compact` (default): One line per event.
///
/// Events go to stderr, or are appended to `logging.file` when set.
/// `RUST_LOG` takes precedence over the configured level. A subscriber that is
/// already installed is left in place.
///
/// # Errors
///
/// Returns `TranslatorError::Configuration` when the log file cannot be opened.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let writer = make_writer(config)?;
    let ansi = config.file.is_none();
    let registry = tracing_subscriber::registry().with(env_filter);

    let _ = match config.format.as_str() {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .try_init(),
        "pretty" => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_ansi(ansi)
                    .with_writer(writer),
            )
            .try_init(),
        _ => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_ansi(ansi)
                    .with_writer(writer),
            )
            .try_init(),
    };

    Ok(())
}

/// Destination of log lines: the configured file opened for append, else stderr.
pub fn make_writer(config: &LoggingConfig) -> Result<BoxMakeWriter> {
    let Some(path) = &config.file else {
        return Ok(BoxMakeWriter::new(std::io::stderr));
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            TranslatorError::Configuration(format!(
                "Unable to open log file {}: {}",
                path.display(),
                e
            ))
        })?;

    Ok(BoxMakeWriter::new(Mutex::new(file)))
}

/// Replaces bearer tokens and `access_token` JSON values with placeholders.
pub fn sanitize(input: &str) -> String {
    let redacted = bearer_regex().replace_all(input, "Bearer [REDACTED]");
    access_token_regex()
        .replace_all(&redacted, r#""access_token":"[REDACTED]""#)
        .into_owned()
}

/// Keeps a short prefix of a token for correlation in debug logs.
pub fn mask_token(token: &str) -> String {
    let prefix: String = token.chars().take(10).collect();
    format!("{}...", prefix)
}
