//! Settings of the model resolver.

use std::path::PathBuf;
use std::time::Duration;

use crate::archive::DEFAULT_EXTENSION;
use crate::repository::DEFAULT_TIMEOUT_SECS;

/// Default remote model repository.
pub const DEFAULT_REMOTE_URL: &str = "https://download.eclipse.org/recommenders/models/";

/// Configuration for [`ModelResolver`](crate::service::ModelResolver).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Directory of registered model archives.
    pub store_dir: PathBuf,

    /// File extension of stored archives.
    pub archive_extension: String,

    /// Local repository receiving downloaded archives.
    pub repository_dir: PathBuf,

    /// Root URL of the remote repository (`http`, `https` or `file`).
    pub remote_url: String,

    /// HTTP request timeout.
    pub timeout: Duration,

    /// Optional proxy for HTTP requests.
    pub proxy: Option<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        let base = dirs::data_local_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("modelres");
        Self {
            store_dir: base.join("models"),
            archive_extension: DEFAULT_EXTENSION.to_string(),
            repository_dir: base.join("repository"),
            remote_url: DEFAULT_REMOTE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            proxy: None,
        }
    }
}

impl ResolverConfig {
    /// Create a configuration keeping all data below `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base = base_dir.into();
        Self {
            store_dir: base.join("models"),
            repository_dir: base.join("repository"),
            ..Default::default()
        }
    }

    /// Set the archive store directory.
    pub fn with_store_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_dir = path.into();
        self
    }

    /// Set the file extension of stored archives.
    pub fn with_archive_extension(mut self, extension: impl Into<String>) -> Self {
        self.archive_extension = extension.into();
        self
    }

    /// Set the local repository directory.
    pub fn with_repository_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.repository_dir = path.into();
        self
    }

    /// Set the remote repository URL.
    pub fn with_remote_url(mut self, url: impl Into<String>) -> Self {
        self.remote_url = url.into();
        self
    }

    /// Set the HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Route HTTP requests through `proxy`.
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }
}
