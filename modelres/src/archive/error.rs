//! Error types for model archives and the archive store.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for archive operations.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Errors that can occur while opening, writing or registering archives.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Filesystem operation failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    /// The file is not a readable zip container.
    #[error("failed to read archive {}: {source}", path.display())]
    Zip {
        path: PathBuf,
        source: zip::result::ZipError,
    },

    /// The archive has no manifest entry.
    #[error("archive {} has no manifest", path.display())]
    MissingManifest { path: PathBuf },

    /// The manifest could not be parsed or failed validation.
    #[error("invalid manifest in {}: {reason}", path.display())]
    InvalidManifest { path: PathBuf, reason: String },

    /// An archive with the same identifier is already in the store.
    #[error("archive '{identifier}' is already registered at {}", path.display())]
    AlreadyRegistered { identifier: String, path: PathBuf },

    /// The file at a canonical path carries a different identifier.
    #[error("archive {} declares identifier '{actual}', expected '{expected}'", path.display())]
    IdentifierMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },
}

impl ArchiveError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }

    pub(crate) fn zip(path: impl Into<PathBuf>) -> impl FnOnce(zip::result::ZipError) -> Self {
        let path = path.into();
        move |source| Self::Zip { path, source }
    }
}
