//! Tracing subscriber setup.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding the filter directive (e.g. `sks_core=debug`).
pub const LOG_ENV: &str = "SKS_LOG";

/// Filter used when `SKS_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "warn";

/// HTTP/TLS internals stay quiet even under a verbose filter.
const NOISY_CRATES: &str = "hyper=warn,h2=warn,reqwest=warn,rustls=warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber: a stderr layer and, when `log_file` is
/// given, an appending file layer without ANSI colors.
///
/// Keep the returned guard alive until exit; dropping it flushes the file.
///
/// # Errors
/// Returns an error if the log file cannot be opened or a global subscriber
/// is already installed.
pub fn init(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(io::stderr)
        .with_filter(env_filter());

    let Some(path) = log_file else {
        tracing_subscriber::registry()
            .with(stderr_layer)
            .try_init()
            .context("Failed to install tracing subscriber")?;
        return Ok(None);
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log dir {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let file_filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(format!("debug,{NOISY_CRATES}")));
    let file_layer = fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .with_writer(writer)
        .with_filter(file_filter);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(Some(guard))
}
