//! Archive manifest describing which library versions a model archive covers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::version::VersionRange;

/// Name of the manifest entry inside every model archive.
pub const MANIFEST_ENTRY: &str = "manifest.json";

/// Problems found when validating a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifestError {
    /// The identifier is empty.
    #[error("manifest identifier is empty")]
    EmptyIdentifier,

    /// The identifier cannot be used as a file name in the archive store.
    #[error("manifest identifier '{0}' is not a valid file name")]
    InvalidIdentifier(String),

    /// The library name is empty.
    #[error("manifest '{0}' has an empty library name")]
    EmptyName(String),
}

/// Describes the contents of one model archive.
///
/// Serialized as `manifest.json`:
///
/// ```json
/// {
///   "identifier": "org.eclipse.jface-3.6-calls",
///   "name": "org.eclipse.jface",
///   "versionRange": "[3.6.0,3.7.0)",
///   "timestamp": "2012-10-12T12:00:00Z"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    identifier: String,
    name: String,
    version_range: VersionRange,
    timestamp: DateTime<Utc>,
}

impl Manifest {
    /// Create a manifest.
    ///
    /// # Errors
    ///
    /// Returns a [`ManifestError`] when the identifier or name is unusable.
    pub fn new(
        identifier: impl Into<String>,
        name: impl Into<String>,
        version_range: VersionRange,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, ManifestError> {
        let manifest = Self {
            identifier: identifier.into(),
            name: name.into(),
            version_range,
            timestamp,
        };
        manifest.validate()?;
        Ok(manifest)
    }

    /// Check the invariants a deserialized manifest must satisfy.
    ///
    /// The range is already well-formed by construction; this covers the
    /// identifier (used verbatim as a file name) and the name.
    pub fn validate(&self) -> Result<(), ManifestError> {
        let id = self.identifier.as_str();
        if id.is_empty() {
            return Err(ManifestError::EmptyIdentifier);
        }
        if id == "." || id == ".." || id.contains(|c| matches!(c, '/' | '\\' | '\0')) {
            return Err(ManifestError::InvalidIdentifier(id.to_string()));
        }
        if self.name.is_empty() {
            return Err(ManifestError::EmptyName(id.to_string()));
        }
        Ok(())
    }

    /// Unique identifier of the archive.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Name of the library the models were built for.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Library versions the archive is valid for.
    pub fn version_range(&self) -> &VersionRange {
        &self.version_range
    }

    /// When the archive was built.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
