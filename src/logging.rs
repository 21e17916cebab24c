//! Tracing subscriber setup.
//!
//! `RUST_LOG` controls the filter (default `warn`). The text report logs to
//! stderr; the dashboard owns the terminal, so it only logs to a file.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Environment variable naming the dashboard log file.
pub const LOG_FILE_ENV: &str = "SALES_DASH_LOG";

const DEFAULT_FILTER: &str = "warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Log to stderr.
pub fn init_stderr() {
    // A second init (e.g. from tests) is harmless; keep the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Log to `path`, or stay silent when no path is given.
pub fn init_file(path: Option<&Path>) -> Result<(), AppError> {
    let Some(path) = path else {
        return Ok(());
    };

    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create log file '{}'", path.display()), e))?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}
