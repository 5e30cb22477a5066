//! Error types for version parsing and range construction.

use thiserror::Error;

/// Result type for version operations.
pub type VersionResult<T> = Result<T, VersionError>;

/// Errors raised while parsing versions or building ranges.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    /// The string is not a version.
    #[error("invalid version: '{0}'")]
    InvalidVersion(String),

    /// The string is not a `[min,max]` style range.
    #[error("invalid version range: '{0}'")]
    InvalidRange(String),

    /// The lower bound lies above the upper bound.
    #[error("malformed version range: lower bound {min} is above upper bound {max}")]
    InvertedBounds { min: String, max: String },
}
