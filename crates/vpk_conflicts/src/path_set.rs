//! Path sets and the collision check between them.

use camino::Utf8Path;
use std::collections::BTreeSet;
use vpk_index::{Vpk, VpkError};

/// Normalized entry paths of one archive, kept sorted so reports are stable.
pub type PathSet = BTreeSet<String>;

/// Collect paths containing `name_match`. An empty `name_match` keeps everything.
///
/// Matching is a plain, case-sensitive substring test.
pub fn collect_paths<'a>(paths: impl IntoIterator<Item = &'a str>, name_match: &str) -> PathSet {
    paths
        .into_iter()
        .filter(|path| path.contains(name_match))
        .map(str::to_string)
        .collect()
}

/// Paths present in both sets, compared byte for byte.
pub fn intersect(base: &PathSet, candidate: &PathSet) -> PathSet {
    // Walk the smaller set and probe the larger one.
    let (small, large) = if base.len() <= candidate.len() {
        (base, candidate)
    } else {
        (candidate, base)
    };
    small
        .iter()
        .filter(|path| large.contains(*path))
        .cloned()
        .collect()
}

/// Open the archive at `path` and collect its (filtered) paths.
///
/// The archive is dropped, and its file handle closed, before this returns.
pub fn read_path_set(path: &Utf8Path, name_match: &str) -> Result<PathSet, VpkError> {
    let vpk = Vpk::open(path)?;
    Ok(collect_paths(vpk.paths(), name_match))
}
