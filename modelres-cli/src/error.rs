//! CLI error type.

use modelres::config::ConfigError;
use modelres::logging::LogError;
use modelres::model::CoordinateParseError;
use modelres::version::VersionError;
use modelres::ResolverError;
use thiserror::Error;

/// Errors reported to the user before exiting with status 1.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Logging setup failed: {0}")]
    Logging(#[from] LogError),

    #[error("{0}")]
    Resolver(#[from] ResolverError),

    #[error("Invalid coordinate: {0}")]
    Coordinate(#[from] CoordinateParseError),

    #[error("Invalid version: {0}")]
    Version(#[from] VersionError),

    #[error("Could not resolve {0}")]
    Unresolved(String),

    #[error("No model archive for {0}")]
    NoMatch(String),
}
