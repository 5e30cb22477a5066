//! INI configuration file.
//!
//! ```ini
//! [store]
//! dir = ~/.local/share/modelres/models
//! extension = zip
//!
//! [repository]
//! url = https://download.eclipse.org/recommenders/models/
//! dir = ~/.local/share/modelres/repository
//! timeout_secs = 300
//! proxy = http://proxy.example.org:3128
//!
//! [logging]
//! level = info
//! file = ~/.local/state/modelres/modelres.log
//! ```
//!
//! Every key is optional; missing keys keep their defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;

use super::error::{ConfigError, ConfigResult};
use super::resolver::ResolverConfig;
use crate::logging::LogConfig;

const STORE: &str = "store";
const REPOSITORY: &str = "repository";
const LOGGING: &str = "logging";

/// Contents of `config.ini`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    /// Resolver settings from `[store]` and `[repository]`.
    pub resolver: ResolverConfig,
    /// Logging settings from `[logging]`.
    pub logging: LogConfig,
}

impl ConfigFile {
    /// `<config dir>/modelres/config.ini`.
    pub fn default_path() -> ConfigResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("modelres").join("config.ini"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load the file at the default location, or defaults if it does not exist.
    pub fn load() -> ConfigResult<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load the file at `path`.
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    /// Parse configuration text.
    pub fn parse(text: &str) -> ConfigResult<Self> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Read {
            path: PathBuf::from("<string>"),
            reason: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    /// Write the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        self.to_ini().write_to_file(path).map_err(write_err)
    }

    fn from_ini(ini: &Ini) -> ConfigResult<Self> {
        let mut config = Self::default();
        let get = |section: &str, key: &str| {
            ini.section(Some(section))
                .and_then(|props| props.get(key))
                .map(str::trim)
                .filter(|value| !value.is_empty())
        };

        let resolver = &mut config.resolver;
        if let Some(dir) = get(STORE, "dir") {
            resolver.store_dir = expand_tilde(dir);
        }
        if let Some(extension) = get(STORE, "extension") {
            resolver.archive_extension = extension.trim_start_matches('.').to_string();
        }
        if let Some(url) = get(REPOSITORY, "url") {
            resolver.remote_url = url.to_string();
        }
        if let Some(dir) = get(REPOSITORY, "dir") {
            resolver.repository_dir = expand_tilde(dir);
        }
        if let Some(secs) = get(REPOSITORY, "timeout_secs") {
            let secs: u64 = secs.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidValue {
                    section: REPOSITORY.to_string(),
                    key: "timeout_secs".to_string(),
                    value: secs.to_string(),
                    reason: e.to_string(),
                }
            })?;
            resolver.timeout = Duration::from_secs(secs);
        }
        resolver.proxy = get(REPOSITORY, "proxy").map(str::to_string);

        if let Some(level) = get(LOGGING, "level") {
            config.logging.level = level.to_string();
        }
        config.logging.file = get(LOGGING, "file").map(expand_tilde);

        Ok(config)
    }

    fn to_ini(&self) -> Ini {
        let resolver = &self.resolver;
        let mut ini = Ini::new();
        ini.with_section(Some(STORE))
            .set("dir", resolver.store_dir.to_string_lossy())
            .set("extension", resolver.archive_extension.as_str());

        let mut repository = ini.with_section(Some(REPOSITORY));
        repository
            .set("url", resolver.remote_url.as_str())
            .set("dir", resolver.repository_dir.to_string_lossy())
            .set("timeout_secs", resolver.timeout.as_secs().to_string());
        if let Some(proxy) = &resolver.proxy {
            repository.set("proxy", proxy.as_str());
        }

        let mut logging = ini.with_section(Some(LOGGING));
        logging.set("level", self.logging.level.as_str());
        if let Some(file) = &self.logging.file {
            logging.set("file", file.to_string_lossy());
        }
        ini
    }
}

/// Expand a leading `~` to the home directory.
fn expand_tilde(value: &str) -> PathBuf {
    match value.strip_prefix("~/") {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(value),
        },
        None => PathBuf::from(value),
    }
}
