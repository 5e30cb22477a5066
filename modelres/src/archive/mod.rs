//! Model archives and the store that owns them.
//!
//! A model archive is a zip container with a `manifest.json` entry naming
//! the library and version range the contained models were built for.
//! [`ArchiveStore`] keeps at most one archive per manifest identifier and
//! publishes each one to the [`ModelIndex`](crate::index::ModelIndex).

mod error;
mod model_archive;
mod store;

pub use error::{ArchiveError, ArchiveResult};
pub use model_archive::ModelArchive;
pub use store::{ArchiveStore, DEFAULT_EXTENSION};
