//! Versions and version ranges used to match libraries against model archives.
//!
//! A [`Version`] is an ordered `major.minor.micro[.qualifier]` tuple with two
//! sentinels:
//!
//! - [`Version::UNKNOWN`] orders below every release. A lookup for an unknown
//!   version is treated as a lookup for the latest one.
//! - [`Version::LATEST`] orders above every release and is the upper end of
//!   [`VersionRange::ALL`].
//!
//! # Example
//!
//! ```
//! use modelres::version::{Version, VersionRange};
//!
//! let v = Version::parse("3.6.2").unwrap();
//! let range = VersionRange::parse("[3.6,3.7)").unwrap();
//!
//! assert!(range.includes(&v));
//! assert!(Version::UNKNOWN < v && v < Version::LATEST);
//! ```

mod error;
mod range;

pub use error::{VersionError, VersionResult};
pub use range::{VersionRange, VersionRangeBuilder};

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Textual form of [`Version::UNKNOWN`].
const UNKNOWN_LITERAL: &str = "unknown";

/// Textual form of [`Version::LATEST`].
const LATEST_LITERAL: &str = "latest";

/// Accepts `1`, `1.2`, `1.2.3`, and a qualifier after `.` or `-` once all
/// three numeric segments are present.
fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d+)(?:\.(\d+)(?:\.(\d+)(?:[.-]([0-9A-Za-z_.-]+))?)?)?$")
            .expect("version pattern is valid")
    })
}

/// Variant order is significant: it defines the ordering of the sentinels
/// relative to releases.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Kind {
    Unknown,
    Release {
        major: u32,
        minor: u32,
        micro: u32,
        qualifier: String,
    },
    Latest,
}

/// A comparable, immutable version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    kind: Kind,
}

impl Version {
    /// Version of a library whose actual version could not be determined.
    pub const UNKNOWN: Version = Version {
        kind: Kind::Unknown,
    };

    /// Maximal version, greater than any release.
    pub const LATEST: Version = Version { kind: Kind::Latest };

    /// `0.0.0`, the smallest release.
    pub const ZERO: Version = Version::new(0, 0, 0);

    /// Create a release version without qualifier.
    pub const fn new(major: u32, minor: u32, micro: u32) -> Self {
        Self {
            kind: Kind::Release {
                major,
                minor,
                micro,
                qualifier: String::new(),
            },
        }
    }

    /// Create a release version with a qualifier.
    ///
    /// A non-empty qualifier orders after the same version without one, so
    /// `3.6.0.v2010` is greater than `3.6.0`.
    pub fn with_qualifier(major: u32, minor: u32, micro: u32, qualifier: impl Into<String>) -> Self {
        Self {
            kind: Kind::Release {
                major,
                minor,
                micro,
                qualifier: qualifier.into(),
            },
        }
    }

    /// Parse a version string.
    ///
    /// Missing minor/micro segments default to zero. The literals `unknown`
    /// and `latest` (case-insensitive) parse to the sentinels.
    ///
    /// ```
    /// use modelres::version::Version;
    ///
    /// assert_eq!(Version::parse("3.6").unwrap(), Version::new(3, 6, 0));
    /// assert_eq!(
    ///     Version::parse("1.0.0-SNAPSHOT").unwrap(),
    ///     Version::with_qualifier(1, 0, 0, "SNAPSHOT")
    /// );
    /// assert_eq!(Version::parse("latest").unwrap(), Version::LATEST);
    /// ```
    pub fn parse(input: &str) -> VersionResult<Self> {
        let trimmed = input.trim();
        if trimmed.eq_ignore_ascii_case(UNKNOWN_LITERAL) {
            return Ok(Self::UNKNOWN);
        }
        if trimmed.eq_ignore_ascii_case(LATEST_LITERAL) {
            return Ok(Self::LATEST);
        }

        let captures = version_pattern()
            .captures(trimmed)
            .ok_or_else(|| VersionError::InvalidVersion(input.to_string()))?;

        let segment = |index: usize| -> VersionResult<u32> {
            match captures.get(index) {
                Some(m) => m
                    .as_str()
                    .parse::<u32>()
                    .map_err(|_| VersionError::InvalidVersion(input.to_string())),
                None => Ok(0),
            }
        };

        let qualifier = captures
            .get(4)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        Ok(Self::with_qualifier(segment(1)?, segment(2)?, segment(3)?, qualifier))
    }

    /// Whether this is the [`Version::UNKNOWN`] sentinel.
    pub fn is_unknown(&self) -> bool {
        matches!(self.kind, Kind::Unknown)
    }

    /// Whether this is the [`Version::LATEST`] sentinel.
    pub fn is_latest(&self) -> bool {
        matches!(self.kind, Kind::Latest)
    }

    /// The numeric segments of a release, `None` for sentinels.
    pub fn segments(&self) -> Option<(u32, u32, u32)> {
        match &self.kind {
            Kind::Release {
                major,
                minor,
                micro,
                ..
            } => Some((*major, *minor, *micro)),
            _ => None,
        }
    }

    /// The qualifier of a release, `None` for sentinels and unqualified versions.
    pub fn qualifier(&self) -> Option<&str> {
        match &self.kind {
            Kind::Release { qualifier, .. } if !qualifier.is_empty() => Some(qualifier),
            _ => None,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Kind::Unknown => f.write_str(UNKNOWN_LITERAL),
            Kind::Latest => f.write_str(LATEST_LITERAL),
            Kind::Release {
                major,
                minor,
                micro,
                qualifier,
            } => {
                write!(f, "{}.{}.{}", major, minor, micro)?;
                if !qualifier.is_empty() {
                    write!(f, ".{}", qualifier)?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Version {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}
