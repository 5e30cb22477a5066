//! Remote repository address of a model archive.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A coordinate string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid model coordinate '{0}': expected groupId:artifactId:extension[:classifier]:version")]
pub struct CoordinateParseError(pub String);

/// Maven-style coordinate of a model archive.
///
/// The string form is `groupId:artifactId:extension[:classifier]:version`.
///
/// # Example
///
/// ```
/// use modelres::model::ModelCoordinate;
///
/// let coord: ModelCoordinate = "org.example:example:zip:call:1.0.0".parse().unwrap();
/// assert_eq!(coord.group_id(), "org.example");
/// assert_eq!(coord.classifier(), Some("call"));
/// assert_eq!(coord.to_string(), "org.example:example:zip:call:1.0.0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelCoordinate {
    group_id: String,
    artifact_id: String,
    classifier: String,
    extension: String,
    version: String,
}

impl ModelCoordinate {
    /// Create a coordinate. An empty classifier means "no classifier".
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        classifier: impl Into<String>,
        extension: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            classifier: classifier.into(),
            extension: extension.into(),
            version: version.into(),
        }
    }

    /// Group id, e.g. `org.eclipse.recommenders`.
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Artifact id.
    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    /// Classifier, `None` when empty.
    pub fn classifier(&self) -> Option<&str> {
        if self.classifier.is_empty() {
            None
        } else {
            Some(&self.classifier)
        }
    }

    /// File extension, e.g. `zip`.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Version as published, with or without a `-SNAPSHOT` suffix.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Check that every segment can be used as a repository path component.
    ///
    /// Segments must be non-empty, must not be `.` or `..` and must not
    /// contain path separators. Each dot-separated part of the group id
    /// becomes a directory and must be non-empty as well.
    pub fn validate(&self) -> Result<(), CoordinateParseError> {
        let group_parts_ok = self.group_id.split('.').all(|part| !part.is_empty());
        let segments_ok = [
            &self.group_id,
            &self.artifact_id,
            &self.extension,
            &self.version,
        ]
        .into_iter()
        .all(|segment| is_path_segment(segment));
        let classifier_ok = self.classifier.is_empty() || is_path_segment(&self.classifier);

        if group_parts_ok && segments_ok && classifier_ok {
            Ok(())
        } else {
            Err(CoordinateParseError(self.to_string()))
        }
    }
}

fn is_path_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(|c| matches!(c, '/' | '\\' | '\0'))
}

impl fmt::Display for ModelCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.extension)?;
        if let Some(classifier) = self.classifier() {
            write!(f, ":{}", classifier)?;
        }
        write!(f, ":{}", self.version)
    }
}

impl FromStr for ModelCoordinate {
    type Err = CoordinateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(CoordinateParseError(s.to_string()));
        }
        let coordinate = match parts.as_slice() {
            [group, artifact, extension, version] => {
                Self::new(*group, *artifact, "", *extension, *version)
            }
            [group, artifact, extension, classifier, version] => {
                Self::new(*group, *artifact, *classifier, *extension, *version)
            }
            _ => return Err(CoordinateParseError(s.to_string())),
        };
        coordinate
            .validate()
            .map_err(|_| CoordinateParseError(s.to_string()))?;
        Ok(coordinate)
    }
}
