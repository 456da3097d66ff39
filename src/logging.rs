//! Logging setup
//!
//! Installs the global `tracing` subscriber from the `[logging]` config
//! section. `RUST_LOG`, when set, takes precedence over the configured level.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines for development
    Pretty,
    /// One JSON object per line
    Json,
}

impl LogFormat {
    /// Unknown names fall back to `Pretty`
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Invalid log filter {directive:?}: {error}")]
    Filter { directive: String, error: String },

    #[error("Failed to open log file {path:?}: {error}")]
    File { path: PathBuf, error: String },

    #[error("Failed to install subscriber: {0}")]
    Init(String),
}

/// Filter directives for a configured level
pub fn default_directives(level: &str) -> String {
    format!("credit_risk={level},tower_http={level}", level = level.trim())
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let directive = default_directives(&config.level);
    EnvFilter::try_new(&directive).map_err(|e| LoggingError::Filter {
        directive,
        error: e.to_string(),
    })
}

/// Open (or create) the log file in append mode
pub fn open_log_file(path: &Path) -> Result<File, LoggingError> {
    let to_error = |e: std::io::Error| LoggingError::File {
        path: path.to_path_buf(),
        error: e.to_string(),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(to_error)?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(to_error)
}

/// Install the global subscriber
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = build_filter(config)?;
    let format = LogFormat::parse(&config.format);
    let file = match &config.file {
        Some(path) => Some(Mutex::new(open_log_file(Path::new(path))?)),
        None => None,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = match (format, file) {
        (LogFormat::Json, Some(writer)) => registry
            .with(fmt::layer().json().with_ansi(false).with_writer(writer))
            .try_init(),
        (LogFormat::Json, None) => registry.with(fmt::layer().json()).try_init(),
        (LogFormat::Pretty, Some(writer)) => registry
            .with(fmt::layer().with_ansi(false).with_writer(writer))
            .try_init(),
        (LogFormat::Pretty, None) => registry.with(fmt::layer()).try_init(),
    };

    result.map_err(|e| LoggingError::Init(e.to_string()))
}
