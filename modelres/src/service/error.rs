//! Errors surfaced by the resolver facade.

use thiserror::Error;

use crate::archive::ArchiveError;
use crate::repository::TransportError;

/// Result type for resolver operations.
pub type ResolverResult<T> = Result<T, ResolverError>;

/// Errors from any layer beneath [`ModelResolver`](super::ModelResolver).
#[derive(Debug, Error)]
pub enum ResolverError {
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
