//! Parsing of `maven-metadata.xml` for snapshot versions.

use serde::Deserialize;

/// Snapshot information published for one artifact version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotMetadata {
    timestamp: Option<String>,
    build_number: Option<u32>,
    versions: Vec<SnapshotVersion>,
}

/// One published file of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SnapshotVersion {
    #[serde(default)]
    pub classifier: String,
    pub extension: String,
    pub value: String,
    #[serde(default)]
    pub updated: Option<String>,
}

#[derive(Deserialize)]
struct RawMetadata {
    #[serde(default)]
    versioning: Option<RawVersioning>,
}

#[derive(Deserialize)]
struct RawVersioning {
    #[serde(default)]
    snapshot: Option<RawSnapshot>,
    #[serde(rename = "snapshotVersions", default)]
    snapshot_versions: Option<RawSnapshotVersions>,
}

#[derive(Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(rename = "buildNumber", default)]
    build_number: Option<u32>,
}

#[derive(Deserialize)]
struct RawSnapshotVersions {
    #[serde(rename = "snapshotVersion", default)]
    entries: Vec<SnapshotVersion>,
}

impl SnapshotMetadata {
    /// Parse the XML document.
    pub fn parse(xml: &str) -> Result<Self, quick_xml::de::DeError> {
        let raw: RawMetadata = quick_xml::de::from_str(xml)?;
        let versioning = raw.versioning;
        let snapshot = versioning.as_ref().and_then(|v| v.snapshot.as_ref());

        Ok(Self {
            timestamp: snapshot.and_then(|s| s.timestamp.clone()),
            build_number: snapshot.and_then(|s| s.build_number),
            versions: versioning
                .and_then(|v| v.snapshot_versions)
                .map(|v| v.entries)
                .unwrap_or_default(),
        })
    }

    /// Published files of the snapshot.
    pub fn versions(&self) -> &[SnapshotVersion] {
        &self.versions
    }

    /// Resolved version string of the file with `classifier` and
    /// `extension`, e.g. `1.0.0-20140625.000000-1`.
    ///
    /// Uses the matching `snapshotVersion` entry when present, otherwise
    /// builds the value from the snapshot timestamp and build number.
    pub fn artifact_version(
        &self,
        base_version: &str,
        classifier: Option<&str>,
        extension: &str,
    ) -> Option<String> {
        let classifier = classifier.unwrap_or("");
        if let Some(entry) = self
            .versions
            .iter()
            .find(|v| v.classifier == classifier && v.extension == extension)
        {
            return Some(entry.value.clone());
        }

        match (&self.timestamp, self.build_number) {
            (Some(timestamp), Some(build)) => {
                Some(format!("{}-{}-{}", base_version, timestamp, build))
            }
            _ => None,
        }
    }
}
