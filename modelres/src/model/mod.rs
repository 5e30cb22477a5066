//! Value types shared by the index, the archive store and the repository.
//!
//! - [`LibraryIdentifier`]: what a caller asks for (name + version)
//! - [`Manifest`]: what an archive contains and which versions it covers
//! - [`ModelCoordinate`]: where an archive lives in a remote repository
//!
//! All three are immutable values with structural equality, safe to use as
//! keys in concurrent maps.

mod coordinate;
mod identifier;
mod manifest;

pub use coordinate::{CoordinateParseError, ModelCoordinate};
pub use identifier::LibraryIdentifier;
pub use manifest::{Manifest, ManifestError, MANIFEST_ENTRY};
