//! Remote artifact repository.
//!
//! Resolves [`ModelCoordinate`](crate::model::ModelCoordinate)s against a
//! Maven snapshot repository:
//!
//! 1. Fetch and verify `maven-metadata.xml` to learn the timestamped file
//!    name; fall back to the literal `-SNAPSHOT` name if the metadata is
//!    missing or cannot be verified.
//! 2. Fetch the archive and verify it against its `.sha1` (or `.md5`)
//!    checksum, retrying once on mismatch.
//! 3. Move the verified file into the local repository.
//!
//! Checksum files are never written to disk.

mod artifact_repository;
pub mod checksum;
mod error;
pub mod layout;
mod listener;
pub mod metadata;
mod transport;

pub use artifact_repository::ArtifactRepository;
pub use checksum::ChecksumAlgorithm;
pub use error::{RepositoryError, RepositoryResult, TransportError, TransportResult};
pub use listener::{NoopTransferListener, TransferListener};
pub use transport::{
    transport_for_url, FileTransport, HttpTransport, Transport, DEFAULT_TIMEOUT_SECS,
};
