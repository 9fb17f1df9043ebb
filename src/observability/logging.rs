use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter for a verbosity level (`-v` count). `RUST_LOG` always wins.
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "event_mapper=warn,warn",
        1 => "event_mapper=info,warn",
        _ => "event_mapper=debug,info",
    }
}

/// Initializes the logging system.
///
/// Console output goes to stderr because stdout carries the mapped JSON.
/// When `log_dir` is set, a daily-rotated JSON log file is written there as well.
/// An unusable `log_dir` is an error, not a panic.
pub fn init_logging(verbosity: u8, log_dir: Option<&Path>) -> Result<()> {
    let file_layer = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log directory {}", dir.display()))?;

            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("event_mapper.log")
                .build(dir)
                .with_context(|| format!("failed to open log file in {}", dir.display()))?;
            let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

            // We need to keep the guard alive for the whole run so logs are flushed on exit
            std::mem::forget(guard);

            Some(fmt::layer().json().with_writer(non_blocking_writer))
        }
        None => None,
    };

    let console_layer = fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .with_writer(std::io::stderr);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    // Set the global default subscriber
    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("failed to install the log subscriber")?;

    Ok(())
}
