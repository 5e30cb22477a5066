//! Canonical on-disk store of model archives.
//!
//! Every archive lives at `<root>/<identifier>.<extension>`. The store keeps
//! one open handle per identifier and publishes each handle to the
//! [`ModelIndex`] so lookups can find it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::error::{ArchiveError, ArchiveResult};
use super::model_archive::ModelArchive;
use crate::index::ModelIndex;
use crate::model::Manifest;

/// Default file extension of stored archives.
pub const DEFAULT_EXTENSION: &str = "zip";

/// Directory of registered model archives.
#[derive(Debug)]
pub struct ArchiveStore {
    root: PathBuf,
    extension: String,
    index: Arc<ModelIndex>,
    handles: DashMap<String, Arc<ModelArchive>>,
}

impl ArchiveStore {
    /// Create a store rooted at `root`. Nothing is read until [`open`](Self::open)
    /// or the first lookup; the directory is created on demand.
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>, index: Arc<ModelIndex>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
            index,
            handles: DashMap::new(),
        }
    }

    /// Store directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Index this store publishes to.
    pub fn index(&self) -> &Arc<ModelIndex> {
        &self.index
    }

    /// Where the archive with `identifier` is kept.
    pub fn canonical_path(&self, identifier: &str) -> PathBuf {
        self.root.join(format!("{}.{}", identifier, self.extension))
    }

    /// Scan the store directory and publish every readable archive.
    ///
    /// Files that cannot be opened, or whose manifest identifier does not
    /// match their file name, are logged and skipped. Returns the number of
    /// archives published.
    pub fn open(&self) -> ArchiveResult<usize> {
        fs::create_dir_all(&self.root).map_err(ArchiveError::io(&self.root))?;
        let entries = fs::read_dir(&self.root).map_err(ArchiveError::io(&self.root))?;

        let mut published = 0;
        for entry in entries {
            let path = entry.map_err(ArchiveError::io(&self.root))?.path();
            if !self.is_store_file(&path) {
                continue;
            }

            let archive = match ModelArchive::open(&path) {
                Ok(archive) => archive,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable archive");
                    continue;
                }
            };

            let identifier = archive.manifest().identifier().to_string();
            if self.canonical_path(&identifier) != path {
                warn!(
                    path = %path.display(),
                    identifier = %identifier,
                    "Skipping archive stored under a foreign name"
                );
                continue;
            }

            self.publish(identifier, archive);
            published += 1;
        }

        info!(root = %self.root.display(), archives = published, "Opened archive store");
        Ok(published)
    }

    /// Handle for the archive described by `manifest`.
    ///
    /// Returns the cached handle if there is one, otherwise opens the
    /// canonical file if it exists. `Ok(None)` means the store does not
    /// hold this archive.
    pub fn get_model_archive(&self, manifest: &Manifest) -> ArchiveResult<Option<Arc<ModelArchive>>> {
        let identifier = manifest.identifier();
        if let Some(handle) = self.handles.get(identifier) {
            return Ok(Some(Arc::clone(handle.value())));
        }

        let path = self.canonical_path(identifier);
        if !path.is_file() {
            return Ok(None);
        }

        let archive = ModelArchive::open(&path)?;
        if archive.manifest().identifier() != identifier {
            return Err(ArchiveError::IdentifierMismatch {
                path,
                expected: identifier.to_string(),
                actual: archive.manifest().identifier().to_string(),
            });
        }

        Ok(Some(self.publish(identifier.to_string(), archive)))
    }

    /// Move `file` into the store and publish it.
    ///
    /// The file must be a valid archive. It is moved to its canonical path
    /// without overwriting anything; on success `file` no longer exists.
    ///
    /// # Errors
    ///
    /// [`ArchiveError::AlreadyRegistered`] when an archive with the same
    /// identifier is already stored. The stored file is left untouched.
    pub fn register(&self, file: impl AsRef<Path>) -> ArchiveResult<Arc<ModelArchive>> {
        let file = file.as_ref();
        let candidate = ModelArchive::open(file)?;
        let identifier = candidate.manifest().identifier().to_string();
        let dest = self.canonical_path(&identifier);

        if self.handles.contains_key(&identifier) || dest.exists() {
            return Err(ArchiveError::AlreadyRegistered {
                identifier,
                path: dest,
            });
        }

        // The candidate's file handle must be closed before the move.
        drop(candidate);

        fs::create_dir_all(&self.root).map_err(ArchiveError::io(&self.root))?;
        match move_no_clobber(file, &dest, &self.root) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(ArchiveError::AlreadyRegistered {
                    identifier,
                    path: dest,
                });
            }
            Err(source) => {
                return Err(ArchiveError::Io {
                    path: dest,
                    source,
                })
            }
        }

        let archive = ModelArchive::open(&dest)?;
        let handle = self.publish(identifier.clone(), archive);
        info!(archive = %identifier, path = %dest.display(), "Registered model archive");
        Ok(handle)
    }

    /// Register a copy of `file`, leaving the original in place.
    pub fn import(&self, file: impl AsRef<Path>) -> ArchiveResult<Arc<ModelArchive>> {
        let file = file.as_ref();
        fs::create_dir_all(&self.root).map_err(ArchiveError::io(&self.root))?;

        let staged = tempfile::Builder::new()
            .prefix(".import-")
            .tempfile_in(&self.root)
            .map_err(ArchiveError::io(&self.root))?;
        fs::copy(file, staged.path()).map_err(ArchiveError::io(file))?;
        let staged = staged.into_temp_path();

        debug!(source = %file.display(), "Importing archive copy");
        self.register(&staged)
    }

    /// All archives currently held, ordered by identifier.
    pub fn archives(&self) -> Vec<Arc<ModelArchive>> {
        let mut all: Vec<_> = self
            .handles
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        all.sort_by(|a, b| a.manifest().identifier().cmp(b.manifest().identifier()));
        all
    }

    /// Release every handle and withdraw the archives from the index.
    pub fn close(&self) {
        let identifiers: Vec<String> = self.handles.iter().map(|e| e.key().clone()).collect();
        for identifier in &identifiers {
            self.handles.remove(identifier);
            self.index.unregister(identifier);
        }
        debug!(released = identifiers.len(), "Closed archive store");
    }

    fn publish(&self, identifier: String, archive: ModelArchive) -> Arc<ModelArchive> {
        let handle = Arc::clone(
            self.handles
                .entry(identifier)
                .or_insert_with(|| Arc::new(archive))
                .value(),
        );
        self.index.register(Arc::clone(&handle));
        handle
    }

    fn is_store_file(&self, path: &Path) -> bool {
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .map_or(true, |n| n.starts_with('.'));
        !hidden
            && path.is_file()
            && path.extension().and_then(|e| e.to_str()) == Some(self.extension.as_str())
    }
}

/// Move `src` to `dest`, failing with `AlreadyExists` instead of replacing.
///
/// Tries a hard link first; across filesystems the file is copied into a
/// temporary file next to `dest` and persisted without clobbering. Once
/// `dest` is complete a source that cannot be removed is only logged.
fn move_no_clobber(src: &Path, dest: &Path, staging_dir: &Path) -> io::Result<()> {
    match fs::hard_link(src, dest) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Err(e),
        Err(e) => {
            debug!(error = %e, "Hard link failed, copying archive instead");
            let staged = NamedTempFile::new_in(staging_dir)?;
            fs::copy(src, staged.path())?;
            staged.persist_noclobber(dest).map_err(|e| e.error)?;
        }
    }
    if let Err(e) = fs::remove_file(src) {
        warn!(
            source = %src.display(),
            error = %e,
            "Archive stored but the original file could not be removed"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LibraryIdentifier;
    use crate::version::{Version, VersionRange};
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn manifest(id: &str, range: &str, secs: i64) -> Manifest {
        Manifest::new(
            id,
            "org.eclipse.jface",
            VersionRange::parse(range).unwrap(),
            Utc.timestamp_opt(secs, 0).unwrap(),
        )
        .unwrap()
    }

    fn write_archive(dir: &Path, file: &str, manifest: &Manifest, payload: &[u8]) -> PathBuf {
        let path = dir.join(file);
        ModelArchive::write(&path, manifest, [("models.json", payload)]).unwrap();
        path
    }

    fn store(root: &Path) -> ArchiveStore {
        ArchiveStore::new(root, DEFAULT_EXTENSION, Arc::new(ModelIndex::new()))
    }

    #[cfg(unix)]
    #[test]
    fn test_register_keeps_archive_when_source_cannot_be_removed() {
        use std::os::unix::fs::PermissionsExt;

        let incoming = TempDir::new().unwrap();
        let root = TempDir::new().unwrap();
        let store = store(root.path());
        let file = write_archive(incoming.path(), "download.tmp", &manifest("jface-3.6", "[3.6,3.7)", 1), b"a");

        fs::set_permissions(incoming.path(), fs::Permissions::from_mode(0o555)).unwrap();
        let writable = incoming.path().join("writable-check");
        if fs::File::create(&writable).is_ok() {
            // Permissions are not enforced for this user.
            fs::remove_file(&writable).unwrap();
            fs::set_permissions(incoming.path(), fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = store.register(&file);
        fs::set_permissions(incoming.path(), fs::Permissions::from_mode(0o755)).unwrap();

        let handle = result.unwrap();
        assert!(file.exists());
        assert!(store.canonical_path("jface-3.6").is_file());
        let library = LibraryIdentifier::new("org.eclipse.jface", Version::new(3, 6, 0));
        let found = store.index().find_model_archive(&library).unwrap();
        assert!(Arc::ptr_eq(&found, &handle));
    }

    #[test]
    fn test_register_moves_file_and_publishes() {
        let incoming = TempDir::new().unwrap();
        let root = TempDir::new().unwrap();
        let store = store(root.path());

        let file = write_archive(incoming.path(), "download.tmp", &manifest("jface-3.6", "[3.6,3.7)", 1), b"a");
        let handle = store.register(&file).unwrap();

        assert!(!file.exists());
        assert_eq!(handle.path(), store.canonical_path("jface-3.6"));
        assert!(store.canonical_path("jface-3.6").is_file());

        let library = LibraryIdentifier::new("org.eclipse.jface", Version::new(3, 6, 0));
        let found = store.index().find_model_archive(&library).unwrap();
        assert!(Arc::ptr_eq(&found, &handle));
    }

    #[test]
    fn test_duplicate_registration_rejected_and_file_untouched() {
        let incoming = TempDir::new().unwrap();
        let root = TempDir::new().unwrap();
        let store = store(root.path());
        let m = manifest("jface-3.6", "[3.6,3.7)", 1);

        let first = write_archive(incoming.path(), "first.zip", &m, b"original");
        store.register(&first).unwrap();
        let stored_bytes = fs::read(store.canonical_path("jface-3.6")).unwrap();

        let second = write_archive(incoming.path(), "second.zip", &m, b"replacement");
        let result = store.register(&second);

        assert!(matches!(result, Err(ArchiveError::AlreadyRegistered { .. })));
        assert!(second.exists());
        assert_eq!(fs::read(store.canonical_path("jface-3.6")).unwrap(), stored_bytes);
    }

    #[test]
    fn test_register_rejects_existing_file_without_handle() {
        let root = TempDir::new().unwrap();
        let incoming = TempDir::new().unwrap();
        let m = manifest("jface-3.6", "[3.6,3.7)", 1);
        write_archive(root.path(), "jface-3.6.zip", &m, b"on disk");

        let store = store(root.path());
        let candidate = write_archive(incoming.path(), "candidate.zip", &m, b"new");
        assert!(matches!(
            store.register(&candidate),
            Err(ArchiveError::AlreadyRegistered { .. })
        ));
    }

    #[test]
    fn test_get_model_archive_opens_canonical_file() {
        let root = TempDir::new().unwrap();
        let m = manifest("jface-3.6", "[3.6,3.7)", 1);
        write_archive(root.path(), "jface-3.6.zip", &m, b"x");

        let store = store(root.path());
        let first = store.get_model_archive(&m).unwrap().unwrap();
        let second = store.get_model_archive(&m).unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.index().len(), 1);

        let missing = manifest("jface-3.7", "[3.7,3.8)", 1);
        assert!(store.get_model_archive(&missing).unwrap().is_none());
    }

    #[test]
    fn test_get_model_archive_detects_identifier_mismatch() {
        let root = TempDir::new().unwrap();
        write_archive(root.path(), "jface-3.6.zip", &manifest("other", "[3.6,3.7)", 1), b"x");

        let store = store(root.path());
        let result = store.get_model_archive(&manifest("jface-3.6", "[3.6,3.7)", 1));
        assert!(matches!(result, Err(ArchiveError::IdentifierMismatch { .. })));
    }

    #[test]
    fn test_open_scans_and_skips_bad_files() {
        let root = TempDir::new().unwrap();
        write_archive(root.path(), "jface-3.6.zip", &manifest("jface-3.6", "[3.6,3.7)", 1), b"x");
        write_archive(root.path(), "jface-3.7.zip", &manifest("jface-3.7", "[3.7,3.8)", 1), b"y");
        write_archive(root.path(), "renamed.zip", &manifest("jface-3.8", "[3.8,3.9)", 1), b"z");
        fs::write(root.path().join("garbage.zip"), b"nope").unwrap();
        fs::write(root.path().join("notes.txt"), b"ignored").unwrap();

        let store = store(root.path());
        assert_eq!(store.open().unwrap(), 2);

        let ids: Vec<_> = store
            .archives()
            .iter()
            .map(|a| a.manifest().identifier().to_string())
            .collect();
        assert_eq!(ids, vec!["jface-3.6", "jface-3.7"]);
    }

    #[test]
    fn test_import_keeps_source() {
        let incoming = TempDir::new().unwrap();
        let root = TempDir::new().unwrap();
        let store = store(root.path());

        let source = write_archive(incoming.path(), "shared.zip", &manifest("jface-3.6", "[3.6,3.7)", 1), b"a");
        store.import(&source).unwrap();

        assert!(source.exists());
        assert!(store.canonical_path("jface-3.6").is_file());
        let leftovers: Vec<_> = fs::read_dir(root.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with(".import-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_close_withdraws_from_index() {
        let incoming = TempDir::new().unwrap();
        let root = TempDir::new().unwrap();
        let store = store(root.path());
        let file = write_archive(incoming.path(), "a.zip", &manifest("jface-3.6", "[3.6,3.7)", 1), b"a");
        store.register(&file).unwrap();

        store.close();
        assert!(store.archives().is_empty());
        assert!(store.index().is_empty());
        assert!(store.canonical_path("jface-3.6").is_file());
    }
}
