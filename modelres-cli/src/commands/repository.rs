//! Commands on the remote repository: resolve, install, location.

use modelres::model::ModelCoordinate;
use modelres::service::ModelResolver;

use super::common::describe;
use crate::error::CliError;
use crate::progress::ProgressListener;

/// Download `coordinate` into the local repository and print its path.
pub fn resolve(
    resolver: &ModelResolver,
    progress: &ProgressListener,
    coordinate: &str,
    force: bool,
) -> Result<(), CliError> {
    let coordinate: ModelCoordinate = coordinate.parse()?;
    println!("Resolving {} from {}", coordinate, resolver.repository().remote_url());

    let path = resolver.resolve(&coordinate, force);
    progress.finish();

    let path = path.ok_or_else(|| CliError::Unresolved(coordinate.to_string()))?;
    println!("{}", path.display());
    Ok(())
}

/// Resolve `coordinate` and add the archive to the store.
pub fn install(
    resolver: &ModelResolver,
    progress: &ProgressListener,
    coordinate: &str,
    force: bool,
) -> Result<(), CliError> {
    let coordinate: ModelCoordinate = coordinate.parse()?;
    println!("Installing {} from {}", coordinate, resolver.repository().remote_url());

    let archive = resolver.install(&coordinate, force);
    progress.finish();

    let archive = archive?.ok_or_else(|| CliError::Unresolved(coordinate.to_string()))?;
    println!("{}", describe(&archive));
    println!("  {}", archive.path().display());
    Ok(())
}

/// Print the local path of an already resolved coordinate.
pub fn location(resolver: &ModelResolver, coordinate: &str) -> Result<(), CliError> {
    let coordinate: ModelCoordinate = coordinate.parse()?;
    let path = resolver
        .get_location(&coordinate, true)
        .ok_or_else(|| CliError::Unresolved(coordinate.to_string()))?;
    println!("{}", path.display());
    Ok(())
}
