//! Logging configuration using tracing

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

/// Environment variable controlling the log filter
pub const LOG_ENV: &str = "DESKHOST_LOG";

const LOG_FILE_NAME: &str = "deskhost.log";

/// Initialize the logging subsystem
///
/// Logs are written to `<data_local_dir>/deskhost/logs/` and mirrored to stderr.
/// Log level is controlled by `DESKHOST_LOG` environment variable.
///
/// # Examples
/// ```bash
/// DESKHOST_LOG=debug deskhost run
/// DESKHOST_LOG=deskhost_backend=trace deskhost run
/// ```
pub fn init() -> Result<()> {
    let log_dir = get_log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_NAME);

    // Default to info for our crates, allow override via DESKHOST_LOG
    let env_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new("deskhost=info,deskhost_core=info,deskhost_backend=info,deskhost_app=info,warn")
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .with(
            fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    tracing::info!("═══════════════════════════════════════════════════════");
    tracing::info!("deskhost starting");
    tracing::info!("Log directory: {}", log_dir.display());
    tracing::info!("═══════════════════════════════════════════════════════");

    Ok(())
}

/// Get the log directory path
fn get_log_directory() -> Result<PathBuf> {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    Ok(base.join("deskhost").join("logs"))
}

/// Get the log file path for the current day
pub fn get_current_log_file() -> Result<PathBuf> {
    let dir = get_log_directory()?;
    Ok(dir.join(LOG_FILE_NAME))
}
