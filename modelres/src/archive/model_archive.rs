//! An opened model archive.

use std::fmt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::error::{ArchiveError, ArchiveResult};
use crate::index::HasManifest;
use crate::model::{Manifest, MANIFEST_ENTRY};

/// Upper bound on the buffer reserved up front for an entry.
const MAX_PREALLOCATION: u64 = 1024 * 1024;

/// A zip container of models plus its parsed manifest.
///
/// The underlying file stays open for the lifetime of the handle; dropping
/// the last reference closes it.
pub struct ModelArchive {
    manifest: Manifest,
    path: PathBuf,
    zip: Mutex<ZipArchive<File>>,
}

impl ModelArchive {
    /// Open the archive at `path` and read its manifest.
    ///
    /// # Errors
    ///
    /// Fails when the file is unreadable, not a zip container, lacks a
    /// manifest entry, or the manifest is invalid.
    pub fn open(path: impl AsRef<Path>) -> ArchiveResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(ArchiveError::io(path))?;
        let mut zip = ZipArchive::new(file).map_err(ArchiveError::zip(path))?;
        let manifest = read_manifest(&mut zip, path)?;

        Ok(Self {
            manifest,
            path: path.to_path_buf(),
            zip: Mutex::new(zip),
        })
    }

    /// Package `manifest` and `entries` into a new archive at `path`.
    ///
    /// An existing file at `path` is truncated.
    pub fn write<'e, I>(
        path: impl AsRef<Path>,
        manifest: &Manifest,
        entries: I,
    ) -> ArchiveResult<()>
    where
        I: IntoIterator<Item = (&'e str, &'e [u8])>,
    {
        let path = path.as_ref();
        manifest
            .validate()
            .map_err(|e| ArchiveError::InvalidManifest {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let file = File::create(path).map_err(ArchiveError::io(path))?;
        let mut writer = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let json = serde_json::to_vec_pretty(manifest).map_err(|e| ArchiveError::InvalidManifest {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        writer
            .start_file(MANIFEST_ENTRY, options)
            .map_err(ArchiveError::zip(path))?;
        writer.write_all(&json).map_err(ArchiveError::io(path))?;

        for (name, data) in entries {
            writer
                .start_file(name, options)
                .map_err(ArchiveError::zip(path))?;
            writer.write_all(data).map_err(ArchiveError::io(path))?;
        }

        writer.finish().map_err(ArchiveError::zip(path))?;
        Ok(())
    }

    /// The archive's manifest.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Where the archive was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names of all entries, sorted.
    pub fn entry_names(&self) -> Vec<String> {
        let zip = self.zip.lock();
        let mut names: Vec<String> = zip.file_names().map(str::to_string).collect();
        names.sort();
        names
    }

    /// Whether the archive contains an entry called `name`.
    pub fn has_entry(&self, name: &str) -> bool {
        self.zip.lock().file_names().any(|n| n == name)
    }

    /// Read the entry called `name`, or `None` if there is none.
    pub fn read_entry(&self, name: &str) -> ArchiveResult<Option<Vec<u8>>> {
        let mut zip = self.zip.lock();
        let mut entry = match zip.by_name(name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(source) => {
                return Err(ArchiveError::Zip {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        // The declared size comes from the zip header and is not trusted.
        let mut data = Vec::with_capacity(entry.size().min(MAX_PREALLOCATION) as usize);
        entry
            .read_to_end(&mut data)
            .map_err(ArchiveError::io(&self.path))?;
        Ok(Some(data))
    }
}

impl HasManifest for ModelArchive {
    fn manifest(&self) -> &Manifest {
        &self.manifest
    }
}

impl fmt::Debug for ModelArchive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelArchive")
            .field("identifier", &self.manifest.identifier())
            .field("path", &self.path)
            .finish()
    }
}

fn read_manifest(zip: &mut ZipArchive<File>, path: &Path) -> ArchiveResult<Manifest> {
    let entry = match zip.by_name(MANIFEST_ENTRY) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => {
            return Err(ArchiveError::MissingManifest {
                path: path.to_path_buf(),
            })
        }
        Err(source) => {
            return Err(ArchiveError::Zip {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let invalid = |reason: String| ArchiveError::InvalidManifest {
        path: path.to_path_buf(),
        reason,
    };
    let manifest: Manifest = serde_json::from_reader(entry).map_err(|e| invalid(e.to_string()))?;
    manifest.validate().map_err(|e| invalid(e.to_string()))?;
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::VersionRange;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn manifest() -> Manifest {
        Manifest::new(
            "jface-3.6",
            "org.eclipse.jface",
            VersionRange::parse("[3.6,3.7)").unwrap(),
            Utc.timestamp_opt(1_350_043_200, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_write_then_open() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("jface.zip");
        let entries: [(&str, &[u8]); 2] = [
            ("org/eclipse/jface/Viewer.json", b"{}"),
            ("org/eclipse/jface/Action.json", b"[1,2]"),
        ];
        ModelArchive::write(&path, &manifest(), entries).unwrap();

        let archive = ModelArchive::open(&path).unwrap();
        assert_eq!(archive.manifest(), &manifest());
        assert_eq!(archive.path(), path.as_path());
        assert!(archive.has_entry(MANIFEST_ENTRY));
        assert!(archive.has_entry("org/eclipse/jface/Viewer.json"));
        assert_eq!(archive.entry_names().len(), 3);
        assert_eq!(
            archive.read_entry("org/eclipse/jface/Action.json").unwrap(),
            Some(b"[1,2]".to_vec())
        );
        assert_eq!(archive.read_entry("missing").unwrap(), None);
    }

    #[test]
    fn test_read_entry_larger_than_preallocation() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("large.zip");
        let payload = vec![b'x'; MAX_PREALLOCATION as usize * 2 + 17];
        ModelArchive::write(&path, &manifest(), [("models.bin", payload.as_slice())]).unwrap();

        let archive = ModelArchive::open(&path).unwrap();
        assert_eq!(archive.read_entry("models.bin").unwrap(), Some(payload));
    }

    #[test]
    fn test_open_rejects_non_zip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.zip");
        std::fs::write(&path, b"not a zip").unwrap();

        assert!(matches!(ModelArchive::open(&path), Err(ArchiveError::Zip { .. })));
    }

    #[test]
    fn test_open_requires_manifest() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("no-manifest.zip");
        let mut writer = ZipWriter::new(File::create(&path).unwrap());
        writer
            .start_file("data.json", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"{}").unwrap();
        writer.finish().unwrap();

        assert!(matches!(
            ModelArchive::open(&path),
            Err(ArchiveError::MissingManifest { .. })
        ));
    }

    #[test]
    fn test_open_rejects_invalid_manifest() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad-manifest.zip");
        let mut writer = ZipWriter::new(File::create(&path).unwrap());
        writer
            .start_file(MANIFEST_ENTRY, SimpleFileOptions::default())
            .unwrap();
        writer
            .write_all(br#"{"identifier":"../x","name":"n","versionRange":"[1,2)","timestamp":"2012-10-12T12:00:00Z"}"#)
            .unwrap();
        writer.finish().unwrap();

        assert!(matches!(
            ModelArchive::open(&path),
            Err(ArchiveError::InvalidManifest { .. })
        ));
    }
}
