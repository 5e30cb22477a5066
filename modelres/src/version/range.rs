//! Version ranges with inclusive or exclusive bounds.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Version, VersionError, VersionResult};

/// An interval of versions, written `[min,max]`, `(min,max)` or mixed.
///
/// Unbounded ends are expressed with the sentinels: `[unknown,latest]` is
/// [`VersionRange::ALL`]. Ranges are immutable and always well-formed: the
/// lower bound never lies above the upper bound.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionRange {
    min: Version,
    min_inclusive: bool,
    max: Version,
    max_inclusive: bool,
}

impl VersionRange {
    /// Range containing every version, including [`Version::UNKNOWN`].
    pub const ALL: VersionRange = VersionRange {
        min: Version::UNKNOWN,
        min_inclusive: true,
        max: Version::LATEST,
        max_inclusive: true,
    };

    /// Range containing no version at all.
    pub const EMPTY: VersionRange = VersionRange {
        min: Version::ZERO,
        min_inclusive: false,
        max: Version::ZERO,
        max_inclusive: false,
    };

    /// Create a range, rejecting a lower bound above the upper bound.
    pub fn new(
        min: Version,
        min_inclusive: bool,
        max: Version,
        max_inclusive: bool,
    ) -> VersionResult<Self> {
        if min > max {
            return Err(VersionError::InvertedBounds {
                min: min.to_string(),
                max: max.to_string(),
            });
        }
        Ok(Self {
            min,
            min_inclusive,
            max,
            max_inclusive,
        })
    }

    /// Start building a range. Unset bounds default to `[0.0.0` and `latest]`.
    pub fn builder() -> VersionRangeBuilder {
        VersionRangeBuilder::default()
    }

    /// Parse the `[min,max)` string form.
    ///
    /// ```
    /// use modelres::version::{Version, VersionRange};
    ///
    /// let range = VersionRange::parse("(3.6,3.8]").unwrap();
    /// assert!(!range.includes(&Version::new(3, 6, 0)));
    /// assert!(range.includes(&Version::new(3, 8, 0)));
    /// ```
    pub fn parse(input: &str) -> VersionResult<Self> {
        let invalid = || VersionError::InvalidRange(input.to_string());
        let trimmed = input.trim();

        let min_inclusive = match trimmed.chars().next() {
            Some('[') => true,
            Some('(') => false,
            _ => return Err(invalid()),
        };
        let max_inclusive = match trimmed.chars().last() {
            Some(']') => true,
            Some(')') => false,
            _ => return Err(invalid()),
        };
        if trimmed.len() < 2 {
            return Err(invalid());
        }

        let inner = &trimmed[1..trimmed.len() - 1];
        let mut bounds = inner.split(',');
        let (Some(min), Some(max), None) = (bounds.next(), bounds.next(), bounds.next()) else {
            return Err(invalid());
        };

        let min = Version::parse(min).map_err(|_| invalid())?;
        let max = Version::parse(max).map_err(|_| invalid())?;
        Self::new(min, min_inclusive, max, max_inclusive)
    }

    /// Lower bound version.
    pub fn min(&self) -> &Version {
        &self.min
    }

    /// Whether the lower bound is part of the range.
    pub fn is_min_inclusive(&self) -> bool {
        self.min_inclusive
    }

    /// Upper bound version.
    pub fn max(&self) -> &Version {
        &self.max
    }

    /// Whether the upper bound is part of the range.
    pub fn is_max_inclusive(&self) -> bool {
        self.max_inclusive
    }

    /// Whether `version` lies within the range.
    pub fn includes(&self, version: &Version) -> bool {
        let above_min = match version.cmp(&self.min) {
            Ordering::Greater => true,
            Ordering::Equal => self.min_inclusive,
            Ordering::Less => false,
        };
        let below_max = match version.cmp(&self.max) {
            Ordering::Less => true,
            Ordering::Equal => self.max_inclusive,
            Ordering::Greater => false,
        };
        above_min && below_max
    }

    /// Whether `version` lies below the range's lower bound.
    pub fn is_version_below(&self, version: &Version) -> bool {
        match self.min.cmp(version) {
            Ordering::Equal => !self.min_inclusive,
            ordering => ordering == Ordering::Greater,
        }
    }

    /// Whether `version` lies above the range's upper bound.
    pub fn is_version_above(&self, version: &Version) -> bool {
        match self.max.cmp(version) {
            Ordering::Equal => !self.max_inclusive,
            ordering => ordering == Ordering::Less,
        }
    }

    /// Whether this range starts strictly before `other`.
    ///
    /// On equal versions an inclusive bound is lower than an exclusive one.
    pub fn is_lower_bound_lower_than(&self, other: &VersionRange) -> bool {
        self.compare_lower_bounds(other) == Ordering::Less
    }

    /// Whether this range ends strictly after `other`.
    ///
    /// On equal versions an inclusive bound is higher than an exclusive one.
    pub fn is_upper_bound_higher_than(&self, other: &VersionRange) -> bool {
        self.compare_upper_bounds(other) == Ordering::Greater
    }

    /// Whether this range ends at or after `other`.
    pub fn has_greater_equal_upper_bound_than(&self, other: &VersionRange) -> bool {
        self.compare_upper_bounds(other) != Ordering::Less
    }

    /// Whether both ranges share the same lower bound, inclusiveness included.
    pub fn is_lower_bound_equal(&self, other: &VersionRange) -> bool {
        self.compare_lower_bounds(other) == Ordering::Equal
    }

    /// Whether both ranges share the same upper bound, inclusiveness included.
    pub fn is_upper_bound_equal(&self, other: &VersionRange) -> bool {
        self.compare_upper_bounds(other) == Ordering::Equal
    }

    /// Orders lower bounds from lowest to highest.
    pub fn compare_lower_bounds(&self, other: &VersionRange) -> Ordering {
        self.min
            .cmp(&other.min)
            .then_with(|| other.min_inclusive.cmp(&self.min_inclusive))
    }

    /// Orders upper bounds from lowest to highest.
    pub fn compare_upper_bounds(&self, other: &VersionRange) -> Ordering {
        self.max
            .cmp(&other.max)
            .then_with(|| self.max_inclusive.cmp(&other.max_inclusive))
    }

    /// Whether no version can satisfy the range.
    pub fn is_empty(&self) -> bool {
        match self.min.cmp(&self.max) {
            Ordering::Less => false,
            Ordering::Equal => !(self.min_inclusive && self.max_inclusive),
            Ordering::Greater => true,
        }
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{},{}{}",
            if self.min_inclusive { '[' } else { '(' },
            self.min,
            self.max,
            if self.max_inclusive { ']' } else { ')' }
        )
    }
}

impl FromStr for VersionRange {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VersionRange {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<VersionRange> for String {
    fn from(range: VersionRange) -> Self {
        range.to_string()
    }
}

/// Builder for [`VersionRange`].
#[derive(Debug, Clone)]
pub struct VersionRangeBuilder {
    min: Version,
    min_inclusive: bool,
    max: Version,
    max_inclusive: bool,
}

impl Default for VersionRangeBuilder {
    fn default() -> Self {
        Self {
            min: Version::ZERO,
            min_inclusive: true,
            max: Version::LATEST,
            max_inclusive: true,
        }
    }
}

impl VersionRangeBuilder {
    /// Set an inclusive lower bound.
    pub fn min_inclusive(mut self, version: Version) -> Self {
        self.min = version;
        self.min_inclusive = true;
        self
    }

    /// Set an exclusive lower bound.
    pub fn min_exclusive(mut self, version: Version) -> Self {
        self.min = version;
        self.min_inclusive = false;
        self
    }

    /// Set an inclusive upper bound.
    pub fn max_inclusive(mut self, version: Version) -> Self {
        self.max = version;
        self.max_inclusive = true;
        self
    }

    /// Set an exclusive upper bound.
    pub fn max_exclusive(mut self, version: Version) -> Self {
        self.max = version;
        self.max_inclusive = false;
        self
    }

    /// Build the range.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::InvertedBounds`] when the lower bound lies
    /// above the upper bound.
    pub fn build(self) -> VersionResult<VersionRange> {
        VersionRange::new(self.min, self.min_inclusive, self.max, self.max_inclusive)
    }
}
