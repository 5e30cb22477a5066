//! Best-match selection of a model archive for a library.
//!
//! Candidates are classified against the requested version into three
//! buckets, tried in order:
//!
//! 1. **Exact**: the archive's range includes the version. The newest
//!    archive wins.
//! 2. **Closest upper**: the version lies below the archive's range. The
//!    archive with the lowest lower bound wins, newest first on ties.
//! 3. **Closest lower**: the version lies above the archive's range. The
//!    archive with the highest upper bound wins, newest first on ties.
//!
//! Remaining ties are broken by the smaller manifest identifier, so the
//! result does not depend on candidate order.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::model::{LibraryIdentifier, Manifest};
use crate::version::Version;

/// Anything that carries a [`Manifest`] and can take part in matching.
pub trait HasManifest {
    /// The manifest describing this candidate.
    fn manifest(&self) -> &Manifest;
}

impl HasManifest for Manifest {
    fn manifest(&self) -> &Manifest {
        self
    }
}

impl<T: HasManifest + ?Sized> HasManifest for Arc<T> {
    fn manifest(&self) -> &Manifest {
        (**self).manifest()
    }
}

/// Selects the best candidate for one requested library.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use modelres::index::ArchiveMatcher;
/// use modelres::model::{LibraryIdentifier, Manifest};
/// use modelres::version::{Version, VersionRange};
///
/// let jface36 = Manifest::new(
///     "jface-3.6",
///     "org.eclipse.jface",
///     VersionRange::parse("[3.6,3.7)").unwrap(),
///     Utc::now(),
/// )
/// .unwrap();
///
/// let target = LibraryIdentifier::new("org.eclipse.jface", Version::new(3, 6, 2));
/// let best = ArchiveMatcher::new(&target).best_match([&jface36]);
/// assert_eq!(best.map(|m| m.identifier()), Some("jface-3.6"));
/// ```
#[derive(Debug, Clone)]
pub struct ArchiveMatcher<'a> {
    name: &'a str,
    version: Version,
    unknown: bool,
}

impl<'a> ArchiveMatcher<'a> {
    /// Create a matcher for `target`.
    ///
    /// An unknown version is matched as [`Version::LATEST`].
    pub fn new(target: &'a LibraryIdentifier) -> Self {
        let version = if target.version().is_unknown() {
            Version::LATEST
        } else {
            target.version().clone()
        };
        Self {
            name: target.name(),
            version,
            unknown: target.is_unknown(),
        }
    }

    /// Pick the best candidate, or `None` when no candidate is for the
    /// requested library.
    pub fn best_match<'c, T, I>(&self, candidates: I) -> Option<&'c T>
    where
        T: HasManifest + ?Sized + 'c,
        I: IntoIterator<Item = &'c T>,
    {
        if self.unknown {
            return None;
        }

        let mut exact: Option<&'c T> = None;
        let mut upper: Option<&'c T> = None;
        let mut lower: Option<&'c T> = None;

        for candidate in candidates {
            let manifest = candidate.manifest();
            if manifest.name() != self.name {
                continue;
            }
            let range = manifest.version_range();
            if range.includes(&self.version) {
                exact = pick(exact, candidate, rank_exact);
            } else if range.is_version_below(&self.version) {
                upper = pick(upper, candidate, rank_upper);
            } else if range.is_version_above(&self.version) {
                lower = pick(lower, candidate, rank_lower);
            }
        }

        exact.or(upper).or(lower)
    }
}

/// Keep whichever of `current` and `candidate` ranks first.
fn pick<'c, T>(
    current: Option<&'c T>,
    candidate: &'c T,
    rank: fn(&Manifest, &Manifest) -> Ordering,
) -> Option<&'c T>
where
    T: HasManifest + ?Sized,
{
    match current {
        Some(best) if rank(best.manifest(), candidate.manifest()) != Ordering::Greater => {
            Some(best)
        }
        _ => Some(candidate),
    }
}

// Each ranking returns `Less` when `a` is the better candidate.

fn newest_then_identifier(a: &Manifest, b: &Manifest) -> Ordering {
    b.timestamp()
        .cmp(&a.timestamp())
        .then_with(|| a.identifier().cmp(b.identifier()))
}

fn rank_exact(a: &Manifest, b: &Manifest) -> Ordering {
    newest_then_identifier(a, b)
}

fn rank_upper(a: &Manifest, b: &Manifest) -> Ordering {
    a.version_range()
        .compare_lower_bounds(b.version_range())
        .then_with(|| newest_then_identifier(a, b))
}

fn rank_lower(a: &Manifest, b: &Manifest) -> Ordering {
    b.version_range()
        .compare_upper_bounds(a.version_range())
        .then_with(|| newest_then_identifier(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::VersionRange;
    use chrono::{TimeZone, Utc};

    const ECLIPSE: &str = "org.eclipse";

    fn v(major: u32, minor: u32) -> Version {
        Version::new(major, minor, 0)
    }

    fn manifest(id: &str, name: &str, range: &str, millis: i64) -> Manifest {
        let ts = Utc.timestamp_millis_opt(millis).unwrap();
        Manifest::new(id, name, VersionRange::parse(range).unwrap(), ts).unwrap()
    }

    fn best<'a>(target: &LibraryIdentifier, candidates: &'a [Manifest]) -> Option<&'a str> {
        ArchiveMatcher::new(target)
            .best_match(candidates.iter())
            .map(|m| m.identifier())
    }

    #[test]
    fn test_exact_match() {
        let candidates = vec![
            manifest("android", "android", "[2.3,2.4)", 1),
            manifest("e36", ECLIPSE, "[3.6,3.7)", 1),
        ];
        let target = LibraryIdentifier::new(ECLIPSE, v(3, 6));
        assert_eq!(best(&target, &candidates), Some("e36"));
    }

    #[test]
    fn test_exact_match_prefers_newest() {
        let candidates = vec![
            manifest("e36", ECLIPSE, "[3.6,3.7)", 1),
            manifest("e36-newer", ECLIPSE, "[3.6,3.7)", 100),
            manifest("e35-37", ECLIPSE, "[3.5,3.7)", 10),
        ];
        let target = LibraryIdentifier::new(ECLIPSE, Version::new(3, 6, 2));
        assert_eq!(best(&target, &candidates), Some("e36-newer"));
    }

    #[test]
    fn test_name_mismatch_is_none() {
        let candidates = vec![manifest("android", "android", "[2.3,2.4)", 1)];
        let target = LibraryIdentifier::new(ECLIPSE, v(3, 6));
        assert_eq!(best(&target, &candidates), None);
    }

    #[test]
    fn test_unknown_identifier_is_none() {
        let candidates = vec![manifest("all", ECLIPSE, "[unknown,latest]", 1)];
        assert_eq!(best(&LibraryIdentifier::UNKNOWN, &candidates), None);
    }

    #[test]
    fn test_latest_falls_back_to_highest_upper_bound() {
        let candidates = vec![
            manifest("android", "android", "[2.3,2.4)", 1),
            manifest("e36", ECLIPSE, "[3.6,3.7)", 1),
        ];
        let target = LibraryIdentifier::new(ECLIPSE, Version::LATEST);
        assert_eq!(best(&target, &candidates), Some("e36"));
    }

    #[test]
    fn test_unknown_version_means_latest() {
        let candidates = vec![
            manifest("e36", ECLIPSE, "[3.6,3.7)", 1),
            manifest("e37", ECLIPSE, "[3.7,3.8)", 0),
        ];
        let target = LibraryIdentifier::new(ECLIPSE, Version::UNKNOWN);
        assert_eq!(best(&target, &candidates), Some("e37"));
    }

    #[test]
    fn test_version_between_ranges_picks_closest_upper() {
        let candidates = vec![
            manifest("e35", ECLIPSE, "[3.5,3.6)", 1),
            manifest("e38", ECLIPSE, "[3.8,3.9)", 1),
            manifest("e37", ECLIPSE, "[3.7,3.8)", 0),
        ];
        let target = LibraryIdentifier::new(ECLIPSE, v(3, 6));
        assert_eq!(best(&target, &candidates), Some("e37"));
    }

    #[test]
    fn test_only_lower_versions_picks_highest_upper_bound() {
        let candidates = vec![
            manifest("e35", ECLIPSE, "[3.5,3.6)", 1),
            manifest("e35-37", ECLIPSE, "[3.5,3.7)", 10),
        ];
        let target = LibraryIdentifier::new(ECLIPSE, v(3, 8));
        assert_eq!(best(&target, &candidates), Some("e35-37"));
    }

    #[test]
    fn test_equal_upper_bound_prefers_newest() {
        let candidates = vec![
            manifest("e36", ECLIPSE, "[3.6,3.7)", 1),
            manifest("e35-37", ECLIPSE, "[3.5,3.7)", 10),
        ];
        let target = LibraryIdentifier::new(ECLIPSE, v(3, 8));
        assert_eq!(best(&target, &candidates), Some("e35-37"));
    }

    #[test]
    fn test_inclusive_upper_bound_beats_exclusive() {
        let candidates = vec![
            manifest("exclusive", ECLIPSE, "[3.5,3.7)", 100),
            manifest("inclusive", ECLIPSE, "[3.5,3.7]", 1),
        ];
        let target = LibraryIdentifier::new(ECLIPSE, v(3, 8));
        assert_eq!(best(&target, &candidates), Some("inclusive"));
    }

    #[test]
    fn test_full_tie_broken_by_identifier() {
        let a = vec![
            manifest("b", ECLIPSE, "[3.6,3.7)", 5),
            manifest("a", ECLIPSE, "[3.6,3.7)", 5),
        ];
        let target = LibraryIdentifier::new(ECLIPSE, v(3, 6));
        assert_eq!(best(&target, &a), Some("a"));
    }

    #[test]
    fn test_works_on_arcs() {
        let candidates = vec![Arc::new(manifest("e36", ECLIPSE, "[3.6,3.7)", 1))];
        let target = LibraryIdentifier::new(ECLIPSE, v(3, 6));
        let found = ArchiveMatcher::new(&target).best_match(candidates.iter());
        assert!(found.is_some());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn arb_manifest(index: usize) -> impl Strategy<Value = Manifest> {
            (0u32..6, 0u32..4, any::<bool>(), any::<bool>(), 0i64..4).prop_map(
                move |(minor, width, min_inc, max_inc, millis)| {
                    let range = VersionRange::new(
                        v(3, minor),
                        min_inc,
                        v(3, minor + width),
                        max_inc,
                    )
                    .unwrap();
                    let ts = Utc.timestamp_millis_opt(millis).unwrap();
                    Manifest::new(format!("m{index}"), ECLIPSE, range, ts).unwrap()
                },
            )
        }

        fn arb_candidates() -> impl Strategy<Value = Vec<Manifest>> {
            (1usize..8).prop_flat_map(|n| (0..n).map(arb_manifest).collect::<Vec<_>>())
        }

        proptest! {
            #[test]
            fn test_result_independent_of_order(
                candidates in arb_candidates(),
                minor in 0u32..10,
            ) {
                let target = LibraryIdentifier::new(ECLIPSE, v(3, minor));
                let forward = best(&target, &candidates).map(str::to_string);

                let mut reversed = candidates.clone();
                reversed.reverse();
                let backward = best(&target, &reversed).map(str::to_string);

                prop_assert_eq!(forward, backward);
            }

            #[test]
            fn test_exact_match_wins_when_available(
                candidates in arb_candidates(),
                minor in 0u32..10,
            ) {
                let version = v(3, minor);
                let target = LibraryIdentifier::new(ECLIPSE, version.clone());
                let any_exact = candidates.iter().any(|m| m.version_range().includes(&version));
                if let Some(id) = best(&target, &candidates) {
                    let winner = candidates.iter().find(|m| m.identifier() == id).unwrap();
                    prop_assert_eq!(winner.version_range().includes(&version), any_exact);
                }
            }

            #[test]
            fn test_closest_upper_wins_without_exact(
                candidates in arb_candidates(),
                minor in 0u32..10,
            ) {
                let version = v(3, minor);
                let target = LibraryIdentifier::new(ECLIPSE, version.clone());
                let any_exact = candidates.iter().any(|m| m.version_range().includes(&version));
                let above: Vec<&Manifest> = candidates
                    .iter()
                    .filter(|m| m.version_range().is_version_below(&version))
                    .collect();

                if !any_exact && !above.is_empty() {
                    let id = best(&target, &candidates).unwrap();
                    let winner = candidates.iter().find(|m| m.identifier() == id).unwrap();
                    prop_assert!(winner.version_range().is_version_below(&version));
                    for other in &above {
                        let bounds = other
                            .version_range()
                            .compare_lower_bounds(winner.version_range());
                        prop_assert_ne!(bounds, Ordering::Less);
                        if bounds == Ordering::Equal {
                            prop_assert!(other.timestamp() <= winner.timestamp());
                        }
                    }
                }
            }

            #[test]
            fn test_closest_lower_wins_without_exact_or_upper(
                candidates in arb_candidates(),
                minor in 0u32..10,
            ) {
                let version = v(3, minor);
                let target = LibraryIdentifier::new(ECLIPSE, version.clone());
                let any_exact_or_upper = candidates.iter().any(|m| {
                    m.version_range().includes(&version)
                        || m.version_range().is_version_below(&version)
                });
                let below: Vec<&Manifest> = candidates
                    .iter()
                    .filter(|m| m.version_range().is_version_above(&version))
                    .collect();

                if !any_exact_or_upper && !below.is_empty() {
                    let id = best(&target, &candidates).unwrap();
                    let winner = candidates.iter().find(|m| m.identifier() == id).unwrap();
                    prop_assert!(winner.version_range().is_version_above(&version));
                    for other in &below {
                        let bounds = other
                            .version_range()
                            .compare_upper_bounds(winner.version_range());
                        prop_assert_ne!(bounds, Ordering::Greater);
                        if bounds == Ordering::Equal {
                            prop_assert!(other.timestamp() <= winner.timestamp());
                        }
                    }
                }
            }
        }
    }
}
