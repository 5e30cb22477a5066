//! Tracing subscriber setup.
//!
//! Logs go to stderr in compact form. When a log file is configured, a
//! second layer writes the same events without ANSI colors to a daily
//! rotating file next to it. `RUST_LOG` takes precedence over the
//! configured level.

use std::path::{Path, PathBuf};

use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when neither the config nor `RUST_LOG` sets one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Filter directive, e.g. `info` or `modelres=debug`.
    pub level: String,
    /// Optional log file; rotated daily.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

impl LogConfig {
    /// Override the filter directive.
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Also write logs to `path`.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }
}

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("invalid log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("failed to create log directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid log file path: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error("tracing subscriber already initialized")]
    AlreadyInitialized,
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be kept
/// alive for the lifetime of the program.
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>, LogError> {
    let filter = build_filter(&config.level)?;
    let registry = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_timer(LocalTime::new(Rfc3339))
            .compact(),
    );

    match &config.file {
        Some(path) => {
            let (directory, prefix) = split_log_path(path)?;
            std::fs::create_dir_all(directory).map_err(|source| LogError::Directory {
                path: directory.to_path_buf(),
                source,
            })?;
            let appender = tracing_appender::rolling::daily(directory, prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(
                    fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false)
                        .with_timer(LocalTime::new(Rfc3339)),
                )
                .try_init()
                .map_err(|_| LogError::AlreadyInitialized)?;
            Ok(Some(guard))
        }
        None => {
            registry
                .try_init()
                .map_err(|_| LogError::AlreadyInitialized)?;
            Ok(None)
        }
    }
}

fn build_filter(level: &str) -> Result<EnvFilter, LogError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level).map_err(|e| LogError::InvalidFilter {
        filter: level.to_string(),
        reason: e.to_string(),
    })
}

fn split_log_path(path: &Path) -> Result<(&Path, &str), LogError> {
    let prefix = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| LogError::InvalidPath(path.to_path_buf()))?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok((directory, prefix))
}
