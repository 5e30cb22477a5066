//! Library identity used as the lookup key of the model index.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::version::Version;

/// Name and version of a library for which a model is requested.
///
/// # Example
///
/// ```
/// use modelres::model::LibraryIdentifier;
/// use modelres::version::Version;
///
/// let id = LibraryIdentifier::new("org.eclipse.jface", Version::new(3, 6, 0));
/// assert_eq!(id.to_string(), "org.eclipse.jface:3.6.0");
/// assert!(!id.is_unknown());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LibraryIdentifier {
    name: String,
    version: Version,
}

impl LibraryIdentifier {
    /// Identifier of a library that could not be identified. Never matches
    /// any archive.
    pub const UNKNOWN: LibraryIdentifier = LibraryIdentifier {
        name: String::new(),
        version: Version::UNKNOWN,
    };

    /// Create a new identifier.
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }

    /// Library name, compared against [`Manifest::name`](super::Manifest::name).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Library version.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Whether this is [`LibraryIdentifier::UNKNOWN`].
    pub fn is_unknown(&self) -> bool {
        self == &Self::UNKNOWN
    }
}

impl fmt::Display for LibraryIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            return f.write_str("<unknown library>");
        }
        write!(f, "{}:{}", self.name, self.version)
    }
}
