//! Logging system initialization
//!
//! Sets up `tracing` according to the `[logging]` section of the
//! configuration: console or file output, daily rotation, text or JSON.

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;

use crate::config::LoggingConfig;

/// Initialize logging system based on configuration
///
/// **Note**: call this once during startup, after the configuration has
/// been loaded. The returned guard must stay alive for the duration of the
/// program so that buffered log lines are flushed.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let log_file = config.file.as_deref().filter(|f| !f.is_empty());

    let writer: Box<dyn std::io::Write + Send + Sync> = match log_file {
        Some(log_file) if config.enable_rotation => {
            let path = std::path::Path::new(log_file);
            let dir = path.parent().unwrap_or(std::path::Path::new("."));
            let filename = path
                .file_name()
                .and_then(|f| f.to_str())
                .unwrap_or("limsmeta.log");
            let appender = rolling::Builder::new()
                .rotation(rolling::Rotation::DAILY)
                .filename_prefix(filename.trim_end_matches(".log"))
                .filename_suffix("log")
                .max_log_files(config.max_backups as usize)
                .build(dir)
                .context("Failed to create rolling log appender")?;
            Box::new(appender)
        }
        Some(log_file) => {
            // Non-rotating, append to file
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file)
                .with_context(|| format!("Failed to open log file {}", log_file))?;
            Box::new(file)
        }
        None => Box::new(std::io::stdout()),
    };

    let (non_blocking_writer, guard) = tracing_appender::non_blocking(writer);
    let filter = tracing_subscriber::EnvFilter::try_new(&config.level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let subscriber_builder = tracing_subscriber::fmt()
        .with_writer(non_blocking_writer)
        .with_env_filter(filter)
        .with_level(true)
        .with_ansi(log_file.is_none());

    let result = if config.format == "json" {
        subscriber_builder.json().try_init()
    } else {
        subscriber_builder.try_init()
    };
    result.map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    Ok(guard)
}
