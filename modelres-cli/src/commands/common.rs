//! Common helpers shared across CLI commands.

use std::path::Path;
use std::sync::Arc;

use modelres::archive::ModelArchive;
use modelres::config::ConfigFile;
use modelres::service::ModelResolver;

use crate::error::CliError;
use crate::progress::ProgressListener;

/// Load `path`, or the default config file when none is given.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile, CliError> {
    Ok(match path {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    })
}

/// Filter directive for `-v` repetitions; zero keeps the configured level.
pub fn verbosity_level(verbose: u8, configured: &str) -> String {
    match verbose {
        0 => configured.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Build a resolver that reports transfers on the terminal.
pub fn open_resolver(config: &ConfigFile) -> Result<(ModelResolver, Arc<ProgressListener>), CliError> {
    let progress = Arc::new(ProgressListener::new());
    let resolver = ModelResolver::from_config(config.resolver.clone())?.with_listener(progress.clone());
    Ok((resolver, progress))
}

/// One-line summary of an archive.
pub fn describe(archive: &ModelArchive) -> String {
    let manifest = archive.manifest();
    format!(
        "{:<24} {:<28} {:<16} {}",
        manifest.identifier(),
        manifest.name(),
        manifest.version_range().to_string(),
        manifest.timestamp().format("%Y-%m-%d %H:%M:%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_verbosity_level() {
        assert_eq!(verbosity_level(0, "warn"), "warn");
        assert_eq!(verbosity_level(1, "warn"), "debug");
        assert_eq!(verbosity_level(3, "warn"), "trace");
    }

    #[test]
    fn test_load_explicit_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        fs::write(&path, "[repository]\nurl = file:///srv/models\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.resolver.remote_url, "file:///srv/models");
    }

    #[test]
    fn test_load_missing_explicit_config_fails() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            load_config(Some(&temp.path().join("absent.ini"))),
            Err(CliError::Config(_))
        ));
    }
}
