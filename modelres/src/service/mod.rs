//! Resolver facade used by collaborators.
//!
//! [`ModelResolver`] owns one [`ModelIndex`](crate::index::ModelIndex), the
//! [`ArchiveStore`](crate::archive::ArchiveStore) publishing to it and the
//! [`ArtifactRepository`](crate::repository::ArtifactRepository) that
//! downloads archives the store does not hold yet.

mod error;
mod resolver;

pub use error::{ResolverError, ResolverResult};
pub use resolver::ModelResolver;
