//! Maven snapshot repository layout.
//!
//! Remote paths are `/`-separated and relative to the repository root:
//!
//! ```text
//! org/example/example/1.0.0-SNAPSHOT/maven-metadata.xml
//! org/example/example/1.0.0-SNAPSHOT/example-1.0.0-20140625.000000-1-model.zip
//! org/example/example/1.0.0-SNAPSHOT/example-1.0.0-SNAPSHOT-model.zip
//! ```

use std::path::{Path, PathBuf};

use super::checksum::ChecksumAlgorithm;
use crate::model::ModelCoordinate;

const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// Name of the snapshot metadata file in a version directory.
pub const METADATA_FILE: &str = "maven-metadata.xml";

/// `1.0.0` → `1.0.0-SNAPSHOT`; already suffixed versions are kept.
pub fn snapshot_version(version: &str) -> String {
    if version.ends_with(SNAPSHOT_SUFFIX) {
        version.to_string()
    } else {
        format!("{}{}", version, SNAPSHOT_SUFFIX)
    }
}

/// `1.0.0-SNAPSHOT` → `1.0.0`.
pub fn base_version(version: &str) -> &str {
    version.strip_suffix(SNAPSHOT_SUFFIX).unwrap_or(version)
}

/// Directory holding every file of the coordinate's snapshot.
pub fn version_dir(coordinate: &ModelCoordinate) -> String {
    format!(
        "{}/{}/{}",
        coordinate.group_id().replace('.', "/"),
        coordinate.artifact_id(),
        snapshot_version(coordinate.version())
    )
}

/// Path of the snapshot metadata.
pub fn metadata_path(coordinate: &ModelCoordinate) -> String {
    format!("{}/{}", version_dir(coordinate), METADATA_FILE)
}

/// File name of the artifact for a resolved snapshot `version`, e.g.
/// `example-1.0.0-20140625.000000-1-model.zip`.
pub fn artifact_file_name(coordinate: &ModelCoordinate, version: &str) -> String {
    match coordinate.classifier() {
        Some(classifier) => format!(
            "{}-{}-{}.{}",
            coordinate.artifact_id(),
            version,
            classifier,
            coordinate.extension()
        ),
        None => format!(
            "{}-{}.{}",
            coordinate.artifact_id(),
            version,
            coordinate.extension()
        ),
    }
}

/// Path of a timestamped snapshot artifact.
pub fn timestamped_artifact_path(coordinate: &ModelCoordinate, snapshot_value: &str) -> String {
    format!(
        "{}/{}",
        version_dir(coordinate),
        artifact_file_name(coordinate, snapshot_value)
    )
}

/// Path of the artifact under its literal `-SNAPSHOT` name.
pub fn literal_artifact_path(coordinate: &ModelCoordinate) -> String {
    timestamped_artifact_path(coordinate, &snapshot_version(coordinate.version()))
}

/// Path of the checksum published for `resource`.
pub fn checksum_path(resource: &str, algorithm: ChecksumAlgorithm) -> String {
    format!("{}.{}", resource, algorithm.extension())
}

/// Where a resolved artifact is kept in the local repository.
pub fn local_path(root: &Path, coordinate: &ModelCoordinate) -> PathBuf {
    let mut path = root.to_path_buf();
    for segment in literal_artifact_path(coordinate).split('/') {
        path.push(segment);
    }
    path
}
