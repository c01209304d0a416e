//! Structured logging infrastructure for MotionBot

use crate::error::{MotionError, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "motion_sticky=trace")
    pub level: String,
    /// Whether to emit JSON lines instead of human-readable text
    pub json_format: bool,
    /// Optional directory for a daily rolling log file
    pub log_dir: Option<PathBuf>,
    /// Whether to include target module information
    pub include_targets: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            log_dir: None,
            include_targets: true,
        }
    }
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `config.level`; an unparsable filter falls
/// back to `info`. When a log directory is configured the returned guard must
/// be kept alive for buffered lines to reach the file.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let mut layers = Vec::new();

    let console = fmt::layer().with_target(config.include_targets);
    if config.json_format {
        layers.push(console.json().boxed());
    } else {
        layers.push(console.boxed());
    }

    let guard = config.log_dir.as_ref().map(|dir| {
        let appender = tracing_appender::rolling::daily(dir, "motionbot.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        layers.push(
            fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(writer)
                .boxed(),
        );
        guard
    });

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .map_err(|e| MotionError::with_source("Failed to install tracing subscriber", e))?;

    Ok(guard)
}

/// Initialize logging for development (debug level, console only)
///
/// # Errors
///
/// See [`init_logging`].
pub fn init_dev_logging() -> Result<Option<WorkerGuard>> {
    init_logging(&LoggingConfig {
        level: "debug".to_string(),
        ..LoggingConfig::default()
    })
}
