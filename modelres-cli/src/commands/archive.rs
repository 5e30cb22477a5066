//! Commands on the local archive store: find, register, list.

use std::path::Path;

use modelres::model::LibraryIdentifier;
use modelres::service::ModelResolver;
use modelres::version::Version;

use super::common::describe;
use crate::error::CliError;

/// Print the best archive for `name` at `version` (latest when omitted).
pub fn find(resolver: &ModelResolver, name: &str, version: Option<&str>) -> Result<(), CliError> {
    let version = match version {
        Some(version) => Version::parse(version)?,
        None => Version::LATEST,
    };
    let library = LibraryIdentifier::new(name, version);

    let archive = resolver
        .find_model_archive(&library)
        .ok_or_else(|| CliError::NoMatch(library.to_string()))?;

    println!("{}", describe(&archive));
    println!("  {}", archive.path().display());
    Ok(())
}

/// Move `file` into the store.
pub fn register(resolver: &ModelResolver, file: &Path) -> Result<(), CliError> {
    let archive = resolver.register(file)?;
    println!(
        "Registered {} at {}",
        console::style(archive.manifest().identifier()).green(),
        archive.path().display()
    );
    Ok(())
}

/// Print every stored archive.
pub fn list(resolver: &ModelResolver) -> Result<(), CliError> {
    let archives = resolver.archives();
    if archives.is_empty() {
        println!("No model archives in {}", resolver.store().root().display());
        return Ok(());
    }

    for archive in &archives {
        println!("{}", describe(archive));
    }
    println!();
    println!("{} archive(s) in {}", archives.len(), resolver.store().root().display());
    Ok(())
}
