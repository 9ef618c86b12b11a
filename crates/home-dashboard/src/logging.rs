//! Logging initialization for the dashboard.
//!
//! Configures the `tracing` subscriber with level filtering via the
//! `HOMEDASH_LOG` environment variable, falling back to the configured
//! `logging.level` when the variable is unset or invalid.
//!
//! # Usage
//!
//! ```bash
//! # Configured level
//! homedash
//!
//! # Debug level for this crate only
//! HOMEDASH_LOG=home_dashboard=debug,warn homedash refresh
//! ```
//!
//! The TUI owns the terminal, so it logs to a file. One-shot commands log to
//! stderr.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::schema::LogLevel;
use crate::config::xdg;

/// Environment variable holding filter directives.
pub const LOG_ENV: &str = "HOMEDASH_LOG";

/// Builds the filter from `HOMEDASH_LOG`, or from `fallback` when unset.
pub fn filter(fallback: LogLevel) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback.as_directive()))
}

/// Initialize a subscriber writing to stderr.
///
/// A second initialization in the same process is ignored.
pub fn init_stderr(level: LogLevel) {
    let _ = fmt()
        .with_env_filter(filter(level))
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

/// Initialize a subscriber appending to `path`, creating parent directories.
pub fn init_file(level: LogLevel, path: &Path) -> io::Result<()> {
    let file = open_log_file(path)?;
    let _ = fmt()
        .with_env_filter(filter(level))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            xdg::ensure_dir(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}
