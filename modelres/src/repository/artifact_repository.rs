//! Resolution of model archives from a Maven snapshot repository.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::checksum::ChecksumAlgorithm;
use super::error::{RepositoryError, RepositoryResult, TransportResult};
use super::layout;
use super::listener::{NoopTransferListener, ProgressWriter, TransferListener};
use super::metadata::SnapshotMetadata;
use super::transport::Transport;
use crate::model::ModelCoordinate;

/// How often a resource is fetched when its checksum does not match.
const MAX_ATTEMPTS: u32 = 2;

/// Downloads, verifies and caches model archives.
///
/// Completed outcomes, successful or not, are remembered per coordinate.
/// [`resolve`](Self::resolve) returns a remembered outcome without touching
/// the network unless forced; [`get_location`](Self::get_location) only
/// ever reads remembered state and never waits for a running resolution.
pub struct ArtifactRepository {
    local_root: PathBuf,
    transport: Arc<dyn Transport>,
    listener: Arc<dyn TransferListener>,
    outcomes: DashMap<ModelCoordinate, Option<PathBuf>>,
    in_flight: DashMap<ModelCoordinate, Arc<Mutex<()>>>,
}

impl ArtifactRepository {
    /// Create a repository that stores resolved archives below `local_root`
    /// and fetches them through `transport`.
    pub fn new(local_root: impl Into<PathBuf>, transport: Arc<dyn Transport>) -> Self {
        Self {
            local_root: local_root.into(),
            transport,
            listener: Arc::new(NoopTransferListener),
            outcomes: DashMap::new(),
            in_flight: DashMap::new(),
        }
    }

    /// Report transfers to `listener`.
    pub fn with_listener(mut self, listener: Arc<dyn TransferListener>) -> Self {
        self.listener = listener;
        self
    }

    /// Local repository directory.
    pub fn local_root(&self) -> &Path {
        &self.local_root
    }

    /// URL of the remote repository.
    pub fn remote_url(&self) -> &str {
        self.transport.base_url()
    }

    /// Where `coordinate` is kept once resolved.
    pub fn local_path(&self, coordinate: &ModelCoordinate) -> PathBuf {
        layout::local_path(&self.local_root, coordinate)
    }

    /// Resolve `coordinate` to a verified local file.
    ///
    /// Without `force`, a remembered outcome is returned as is, and an
    /// archive already present in the local repository is used without
    /// contacting the remote. With `force`, the remote is always consulted
    /// and the new outcome replaces the remembered one.
    ///
    /// Failures are logged and remembered; they yield `None`.
    pub fn resolve(&self, coordinate: &ModelCoordinate, force: bool) -> Option<PathBuf> {
        if let Err(e) = coordinate.validate() {
            warn!(error = %e, "Refusing to resolve model archive");
            return None;
        }
        if !force {
            if let Some(outcome) = self.remembered(coordinate) {
                debug!(coordinate = %coordinate, found = outcome.is_some(), "Using remembered resolution");
                return outcome;
            }
        }

        let lock = Arc::clone(
            self.in_flight
                .entry(coordinate.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        );
        let outcome = {
            let _guard = lock.lock();
            self.resolve_exclusive(coordinate, force)
        };

        // The map and `lock` hold the only references when nobody else waits.
        self.in_flight
            .remove_if(coordinate, |_, entry| Arc::strong_count(entry) == 2);
        outcome
    }

    fn resolve_exclusive(&self, coordinate: &ModelCoordinate, force: bool) -> Option<PathBuf> {
        // Another caller may have finished while we waited.
        if !force {
            if let Some(outcome) = self.remembered(coordinate) {
                return outcome;
            }
            let local = self.local_path(coordinate);
            if local.is_file() {
                debug!(coordinate = %coordinate, path = %local.display(), "Found archive in local repository");
                self.outcomes.insert(coordinate.clone(), Some(local.clone()));
                return Some(local);
            }
        }

        let outcome = match self.download(coordinate) {
            Ok(path) => {
                info!(coordinate = %coordinate, path = %path.display(), "Resolved model archive");
                Some(path)
            }
            Err(e) => {
                warn!(
                    coordinate = %coordinate,
                    repository = %self.remote_url(),
                    error = %e,
                    "Failed to resolve model archive"
                );
                None
            }
        };

        self.outcomes.insert(coordinate.clone(), outcome.clone());
        outcome
    }

    /// Last completed outcome for `coordinate`, without network access.
    ///
    /// Falls back to the local repository when nothing has been resolved in
    /// this process. With `force`, a remembered file is checked to still
    /// exist.
    pub fn get_location(&self, coordinate: &ModelCoordinate, force: bool) -> Option<PathBuf> {
        if coordinate.validate().is_err() {
            return None;
        }
        match self.remembered(coordinate) {
            Some(Some(path)) if force && !path.is_file() => None,
            Some(outcome) => outcome,
            None => {
                let local = self.local_path(coordinate);
                local.is_file().then_some(local)
            }
        }
    }

    fn remembered(&self, coordinate: &ModelCoordinate) -> Option<Option<PathBuf>> {
        self.outcomes.get(coordinate).map(|entry| entry.value().clone())
    }

    fn download(&self, coordinate: &ModelCoordinate) -> RepositoryResult<PathBuf> {
        let dest = self.local_path(coordinate);
        let staging = dest
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.local_root.clone());
        fs::create_dir_all(&staging).map_err(RepositoryError::io(&staging))?;

        let resource = self.remote_artifact_path(coordinate, &staging)?;
        let staged = self.fetch_verified(&resource, &staging)?;
        staged.persist(&dest).map_err(|e| RepositoryError::Io {
            path: dest.clone(),
            source: e.error,
        })?;
        Ok(dest)
    }

    /// Remote path of the artifact, from verified metadata when possible,
    /// otherwise the literal `-SNAPSHOT` name.
    fn remote_artifact_path(
        &self,
        coordinate: &ModelCoordinate,
        staging: &Path,
    ) -> RepositoryResult<String> {
        let literal = layout::literal_artifact_path(coordinate);
        let metadata = match self.fetch_metadata(coordinate, staging) {
            Ok(metadata) => metadata,
            Err(e) if e.is_unverifiable() => {
                debug!(coordinate = %coordinate, reason = %e, "Metadata unusable, using literal snapshot path");
                return Ok(literal);
            }
            Err(e) => return Err(e),
        };

        let version = metadata.artifact_version(
            layout::base_version(coordinate.version()),
            coordinate.classifier(),
            coordinate.extension(),
        );
        Ok(match version {
            Some(version) => layout::timestamped_artifact_path(coordinate, &version),
            None => literal,
        })
    }

    fn fetch_metadata(
        &self,
        coordinate: &ModelCoordinate,
        staging: &Path,
    ) -> RepositoryResult<SnapshotMetadata> {
        let resource = layout::metadata_path(coordinate);
        let staged = self.fetch_verified(&resource, staging)?;
        let bytes = fs::read(staged.path()).map_err(RepositoryError::io(staged.path()))?;
        SnapshotMetadata::parse(&String::from_utf8_lossy(&bytes)).map_err(|e| {
            RepositoryError::Metadata {
                resource,
                reason: e.to_string(),
            }
        })
    }

    /// Fetch `resource` into a temporary file in `staging` and verify it
    /// against its published checksum, retrying once on mismatch.
    fn fetch_verified(&self, resource: &str, staging: &Path) -> RepositoryResult<NamedTempFile> {
        let mut attempt = 1;
        loop {
            let mut staged = tempfile::Builder::new()
                .prefix(".download-")
                .tempfile_in(staging)
                .map_err(RepositoryError::io(staging))?;
            self.fetch(resource, staged.as_file_mut())?;

            let (algorithm, expected) = self.fetch_checksum(resource)?;
            let actual = algorithm
                .digest_file(staged.path())
                .map_err(RepositoryError::io(staged.path()))?;

            if actual == expected {
                debug!(resource, %algorithm, "Checksum verified");
                return Ok(staged);
            }

            self.listener.transfer_corrupted(resource, &expected, &actual);
            warn!(resource, attempt, %algorithm, %expected, %actual, "Checksum mismatch");

            if attempt >= MAX_ATTEMPTS {
                return Err(RepositoryError::ChecksumMismatch {
                    resource: resource.to_string(),
                    expected,
                    actual,
                });
            }
            attempt += 1;
        }
    }

    /// Published checksum of `resource`: SHA-1 if present, else MD5.
    fn fetch_checksum(&self, resource: &str) -> RepositoryResult<(ChecksumAlgorithm, String)> {
        for algorithm in ChecksumAlgorithm::PREFERENCE {
            let path = layout::checksum_path(resource, algorithm);
            let mut body = Vec::new();
            match self.fetch(&path, &mut body) {
                Ok(_) => match algorithm.parse_checksum_file(&body) {
                    Some(digest) => return Ok((algorithm, digest)),
                    None => warn!(checksum = %path, "Ignoring malformed checksum file"),
                },
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e.into()),
            }
        }

        Err(RepositoryError::ChecksumMissing {
            resource: resource.to_string(),
        })
    }

    fn fetch(&self, resource: &str, sink: &mut dyn std::io::Write) -> TransportResult<u64> {
        self.listener.transfer_initiated(resource);
        let mut writer = ProgressWriter::new(sink, self.listener.as_ref(), resource);

        match self.transport.get(resource, &mut writer) {
            Ok(transferred) => {
                self.listener.transfer_succeeded(resource, transferred);
                Ok(transferred)
            }
            Err(e) => {
                debug!(resource, error = %e, "Fetch failed");
                self.listener.transfer_failed(resource, &e);
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for ArtifactRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactRepository")
            .field("local_root", &self.local_root)
            .field("remote_url", &self.remote_url())
            .field("outcomes", &self.outcomes.len())
            .finish()
    }
}
