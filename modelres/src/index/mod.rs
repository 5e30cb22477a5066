//! Model index: known archives and a cache of library lookups.
//!
//! The index holds every archive the store has published and remembers the
//! best archive found for each [`LibraryIdentifier`] that has been looked
//! up. Registering a new archive sweeps the cache and replaces entries the
//! new archive improves on, so a lookup never returns an archive worse than
//! one already known.
//!
//! # Concurrency
//!
//! Both maps are [`DashMap`]s. A lookup that misses the cache while an
//! archive is being registered may cache the result computed without the
//! new archive; the entry is corrected by the next registration sweep.

pub mod matcher;

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::archive::ModelArchive;
use crate::model::LibraryIdentifier;

pub use matcher::{ArchiveMatcher, HasManifest};

/// Registry of known archives with a per-library lookup cache.
///
/// Generic over the archive handle so it can be exercised with plain
/// manifests; production code uses [`ModelArchive`].
#[derive(Debug)]
pub struct ModelIndex<A = ModelArchive> {
    archives: DashMap<String, Arc<A>>,
    cache: DashMap<LibraryIdentifier, Option<Arc<A>>>,
}

impl<A> Default for ModelIndex<A> {
    fn default() -> Self {
        Self {
            archives: DashMap::new(),
            cache: DashMap::new(),
        }
    }
}

impl<A: HasManifest> ModelIndex<A> {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `archive` known and update every cached lookup it improves.
    ///
    /// Archives are keyed by manifest identifier; registering the same
    /// identifier again replaces the previous handle. Lookups cached on the
    /// previous handle follow the new one only if its manifest is unchanged;
    /// otherwise they are dropped and rescanned on the next lookup.
    pub fn register(&self, archive: Arc<A>) {
        let identifier = archive.manifest().identifier().to_string();
        self.archives.insert(identifier.clone(), Arc::clone(&archive));

        let mut updated = 0usize;
        let mut stale = Vec::new();
        for mut entry in self.cache.iter_mut() {
            let replace = match entry.value() {
                Some(cached) if cached.manifest().identifier() == identifier => {
                    if cached.manifest() == archive.manifest() {
                        true
                    } else {
                        stale.push(entry.key().clone());
                        false
                    }
                }
                Some(cached) => {
                    let matcher = ArchiveMatcher::new(entry.key());
                    matcher
                        .best_match([cached, &archive])
                        .is_some_and(|winner| Arc::ptr_eq(winner, &archive))
                }
                None => ArchiveMatcher::new(entry.key())
                    .best_match([&archive])
                    .is_some(),
            };
            if replace {
                *entry.value_mut() = Some(Arc::clone(&archive));
                updated += 1;
            }
        }
        for library in &stale {
            self.cache.remove(library);
        }

        debug!(
            archive = %identifier,
            updated_lookups = updated,
            dropped_lookups = stale.len(),
            "Registered model archive in index"
        );
    }

    /// Remove the archive with `identifier` and forget lookups that
    /// resolved to it.
    pub fn unregister(&self, identifier: &str) -> Option<Arc<A>> {
        let (_, removed) = self.archives.remove(identifier)?;
        self.cache.retain(|_, cached| {
            cached
                .as_ref()
                .map_or(true, |a| a.manifest().identifier() != identifier)
        });
        debug!(archive = %identifier, "Unregistered model archive from index");
        Some(removed)
    }

    /// Best archive for `library`, or `None` when nothing matches.
    ///
    /// Results, including `None`, are cached until a registration improves
    /// on them. [`LibraryIdentifier::UNKNOWN`] always yields `None` and is
    /// never cached.
    pub fn find_model_archive(&self, library: &LibraryIdentifier) -> Option<Arc<A>> {
        if library.is_unknown() {
            return None;
        }
        if let Some(hit) = self.cache.get(library) {
            return hit.value().clone();
        }

        let candidates: Vec<Arc<A>> = self
            .archives
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        let found = ArchiveMatcher::new(library)
            .best_match(candidates.iter())
            .cloned();

        debug!(
            library = %library,
            found = found.as_ref().map(|a| a.manifest().identifier()),
            "Model index cache miss"
        );

        self.cache
            .entry(library.clone())
            .or_insert(found)
            .value()
            .clone()
    }

    /// All known archives, ordered by identifier.
    pub fn archives(&self) -> Vec<Arc<A>> {
        let mut all: Vec<Arc<A>> = self
            .archives
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        all.sort_by(|a, b| a.manifest().identifier().cmp(b.manifest().identifier()));
        all
    }

    /// Libraries with a cached lookup result.
    pub fn cached_identifiers(&self) -> Vec<LibraryIdentifier> {
        self.cache.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Number of known archives.
    pub fn len(&self) -> usize {
        self.archives.len()
    }

    /// Whether no archive is known.
    pub fn is_empty(&self) -> bool {
        self.archives.is_empty()
    }
}
