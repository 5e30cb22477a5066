use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use super::error::ResolverResult;
use crate::archive::{ArchiveError, ArchiveStore, ModelArchive};
use crate::config::ResolverConfig;
use crate::index::ModelIndex;
use crate::model::{LibraryIdentifier, Manifest, ModelCoordinate};
use crate::repository::{transport_for_url, ArtifactRepository, TransferListener, Transport};

/// Resolves libraries to model archives, locally or from a remote repository.
#[derive(Debug)]
pub struct ModelResolver {
    config: ResolverConfig,
    store: ArchiveStore,
    repository: ArtifactRepository,
}

impl ModelResolver {
    /// Build a resolver whose transport is chosen from `config.remote_url`.
    pub fn from_config(config: ResolverConfig) -> ResolverResult<Self> {
        let transport = transport_for_url(
            &config.remote_url,
            config.timeout,
            config.proxy.as_deref(),
        )?;
        Self::new(config, transport)
    }

    /// Build a resolver over an explicit transport and open the store.
    pub fn new(config: ResolverConfig, transport: Arc<dyn Transport>) -> ResolverResult<Self> {
        let index = Arc::new(ModelIndex::new());
        let store = ArchiveStore::new(
            config.store_dir.clone(),
            config.archive_extension.clone(),
            index,
        );
        let published = store.open()?;
        let repository = ArtifactRepository::new(config.repository_dir.clone(), transport);

        debug!(
            store = %config.store_dir.display(),
            repository = %config.repository_dir.display(),
            remote = %repository.remote_url(),
            archives = published,
            "Model resolver ready"
        );
        Ok(Self {
            config,
            store,
            repository,
        })
    }

    /// Report transfer events to `listener`.
    pub fn with_listener(mut self, listener: Arc<dyn TransferListener>) -> Self {
        self.repository = self.repository.with_listener(listener);
        self
    }

    /// Configuration this resolver was built from.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// The archive store.
    pub fn store(&self) -> &ArchiveStore {
        &self.store
    }

    /// The index of registered archives.
    pub fn index(&self) -> &Arc<ModelIndex> {
        self.store.index()
    }

    /// The remote repository.
    pub fn repository(&self) -> &ArtifactRepository {
        &self.repository
    }

    /// Best registered archive for `library`, or `None`.
    pub fn find_model_archive(&self, library: &LibraryIdentifier) -> Option<Arc<ModelArchive>> {
        self.store.index().find_model_archive(library)
    }

    /// Handle of the stored archive described by `manifest`.
    pub fn get_model_archive(&self, manifest: &Manifest) -> ResolverResult<Option<Arc<ModelArchive>>> {
        Ok(self.store.get_model_archive(manifest)?)
    }

    /// Download `coordinate` into the local repository. Blocks until done.
    pub fn resolve(&self, coordinate: &ModelCoordinate, force: bool) -> Option<PathBuf> {
        self.repository.resolve(coordinate, force)
    }

    /// Local file of `coordinate` if it has been resolved. Never blocks.
    pub fn get_location(&self, coordinate: &ModelCoordinate, force: bool) -> Option<PathBuf> {
        self.repository.get_location(coordinate, force)
    }

    /// Move `file` into the store.
    pub fn register(&self, file: impl AsRef<Path>) -> ResolverResult<Arc<ModelArchive>> {
        Ok(self.store.register(file)?)
    }

    /// Resolve `coordinate` and import the downloaded archive into the store.
    ///
    /// When the store already holds an archive with the downloaded archive's
    /// identifier, that archive is returned and the store is left as is.
    /// `Ok(None)` means the coordinate could not be resolved.
    pub fn install(
        &self,
        coordinate: &ModelCoordinate,
        force: bool,
    ) -> ResolverResult<Option<Arc<ModelArchive>>> {
        let Some(path) = self.repository.resolve(coordinate, force) else {
            return Ok(None);
        };

        let manifest = ModelArchive::open(&path)?.manifest().clone();
        if let Some(existing) = self.store.get_model_archive(&manifest)? {
            debug!(coordinate = %coordinate, archive = %manifest.identifier(), "Archive already installed");
            return Ok(Some(existing));
        }

        match self.store.import(&path) {
            Ok(archive) => {
                info!(coordinate = %coordinate, archive = %manifest.identifier(), "Installed model archive");
                Ok(Some(archive))
            }
            Err(ArchiveError::AlreadyRegistered { .. }) => {
                Ok(self.store.get_model_archive(&manifest)?)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// All stored archives, ordered by identifier.
    pub fn archives(&self) -> Vec<Arc<ModelArchive>> {
        self.store.archives()
    }

    /// Drop every open archive handle.
    pub fn close(&self) {
        self.store.close();
    }
}
