//! modelres - model archive resolution
//!
//! Maps a library (name and version) to the best pre-built model archive
//! available locally, and fetches missing archives from a Maven-layout
//! repository with checksum verification.
//!
//! # Example
//!
//! ```no_run
//! use modelres::config::ResolverConfig;
//! use modelres::model::{LibraryIdentifier, ModelCoordinate};
//! use modelres::service::ModelResolver;
//! use modelres::version::Version;
//!
//! let resolver = ModelResolver::from_config(ResolverConfig::default())?;
//!
//! let library = LibraryIdentifier::new("org.eclipse.jface", Version::new(3, 6, 2));
//! if resolver.find_model_archive(&library).is_none() {
//!     let coordinate: ModelCoordinate = "org.eclipse.jface:jface:zip:call:3.6.0".parse()?;
//!     resolver.install(&coordinate, false)?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod archive;
pub mod config;
pub mod index;
pub mod logging;
pub mod model;
pub mod repository;
pub mod service;
pub mod version;

pub use archive::{ArchiveError, ArchiveStore, ModelArchive};
pub use index::{ArchiveMatcher, ModelIndex};
pub use model::{LibraryIdentifier, Manifest, ModelCoordinate};
pub use repository::ArtifactRepository;
pub use service::{ModelResolver, ResolverError, ResolverResult};
pub use version::{Version, VersionRange};
