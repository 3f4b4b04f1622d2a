//! Logging setup: stdout plus daily-rotated text and JSON files.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Keeps the background log writers alive; drop it only at process exit.
pub struct LoggingGuards {
    _text: WorkerGuard,
    _json: WorkerGuard,
}

/// Initialize the tracing subscriber with multi-layer setup.
///
/// Creates two log outputs in `log_dir`:
/// 1. `scraper.log` - Human-readable text format with ANSI colors disabled
/// 2. `scraper.json.log` - Structured JSON format for parsing/analysis
///
/// # Environment Variables
/// * `RUST_LOG` - Controls log level filtering (default: "info"), e.g.
///   `RUST_LOG=rust_scraper=debug` to see every page decision.
pub fn init_logging<P: AsRef<Path>>(log_dir: P) -> Result<LoggingGuards, Box<dyn std::error::Error>> {
    let log_path = log_dir.as_ref();
    std::fs::create_dir_all(log_path)?;

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    let text_file_appender = tracing_appender::rolling::daily(log_path, "scraper.log");
    let (text_writer, text_guard) = tracing_appender::non_blocking(text_file_appender);

    let json_file_appender = tracing_appender::rolling::daily(log_path, "scraper.json.log");
    let (json_writer, json_guard) = tracing_appender::non_blocking(json_file_appender);

    let text_layer = fmt::layer()
        .with_writer(text_writer)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_ansi(false)
        .compact()
        .with_filter(env_filter.clone());

    let json_layer = fmt::layer()
        .json()
        .with_writer(json_writer)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_current_span(true)
        .with_filter(env_filter.clone());

    let stdout_layer = fmt::layer()
        .with_target(false)
        .compact()
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(text_layer)
        .with(json_layer)
        .with(stdout_layer)
        .try_init()?;

    tracing::debug!("Logs: {}/scraper.log, {}/scraper.json.log", log_path.display(), log_path.display());

    Ok(LoggingGuards {
        _text: text_guard,
        _json: json_guard,
    })
}
