//! Error types for remote artifact resolution.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors raised while fetching a single resource.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The resource does not exist in the repository.
    #[error("not found: {url}")]
    NotFound { url: String },

    /// The server answered with an unexpected status.
    #[error("request for {url} failed with status {status}")]
    Status { url: String, status: u16 },

    /// The connection failed or was interrupted.
    #[error("connection to {url} failed: {reason}")]
    Connection { url: String, reason: String },

    /// The request did not complete in time.
    #[error("request for {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    /// Writing the received bytes failed.
    #[error("failed to store {url}: {source}")]
    Write { url: String, source: io::Error },

    /// The repository or proxy URL is not usable.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The HTTP client could not be built.
    #[error("failed to create HTTP client: {0}")]
    Client(String),
}

impl TransportError {
    /// Whether the resource is simply absent, as opposed to unreachable.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors raised by the resolution pipeline.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Fetching a resource failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The resource did not match its published checksum.
    #[error("checksum mismatch for {resource}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        resource: String,
        expected: String,
        actual: String,
    },

    /// Neither a SHA-1 nor an MD5 checksum is published for the resource.
    #[error("no checksum published for {resource}")]
    ChecksumMissing { resource: String },

    /// The snapshot metadata could not be parsed.
    #[error("invalid metadata {resource}: {reason}")]
    Metadata { resource: String, reason: String },

    /// Local filesystem operation failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
}

impl RepositoryError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }

    /// Whether the failure means the resource cannot be trusted or does not
    /// exist, rather than that the repository could not be reached.
    pub fn is_unverifiable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_not_found(),
            Self::ChecksumMismatch { .. } | Self::ChecksumMissing { .. } => true,
            Self::Metadata { .. } => true,
            Self::Io { .. } => false,
        }
    }
}
