//! File-backed `tracing` setup.
//!
//! Prompts own the terminal, so log output never goes to stdout/stderr.

use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::{EnvConfig, DEFAULT_LOG_FILTER};

/// Install a global subscriber appending to `config.log_path`.
///
/// Returns `Ok(false)` when no log path is configured or a subscriber is already installed.
pub fn init_file_logging(config: &EnvConfig) -> io::Result<bool> {
    let Some(path) = config.log_path.as_deref() else {
        return Ok(false);
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|err| {
        eprintln!("invalid log filter {:?}: {err}", config.log_filter);
        EnvFilter::new(DEFAULT_LOG_FILTER)
    });
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .is_ok();
    if installed {
        tracing::info!(path, "file logging initialized");
    }
    Ok(installed)
}
