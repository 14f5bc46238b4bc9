//! Scan orchestration: resolve inputs, index the base package, check every candidate.
//!
//! # Flow
//!
//! 1. [`ScanPlan::resolve`] validates a [`ScanRequest`] before any archive is opened,
//!    then discovers candidate packages and the addon list.
//! 2. [`load_base`] indexes the base package. Any failure here is fatal, as is an
//!    empty (filtered) path set.
//! 3. [`ConflictScanner::scan`] opens each candidate in turn, intersects its paths
//!    with the base set and records a [`CandidateOutcome`]. A candidate that cannot
//!    be read is skipped and counted; it never stops the scan.

use camino::{Utf8Path, Utf8PathBuf};
use vpk_index::VpkError;

use crate::addon_list::{addon_id, display_name, AddonList};
use crate::discovery::{detect_addon_list, find_addon_packages, KnownGames};
use crate::error::{Error, Result};
use crate::path_set::{intersect, read_path_set, PathSet};

/// Raw user inputs for a scan.
#[derive(Debug, Clone, Default)]
pub struct ScanRequest {
    /// Game directory; add-ons are discovered under `<dir>/addons`.
    pub mod_directory: Option<Utf8PathBuf>,
    pub base_package: Option<Utf8PathBuf>,
    pub addon_list: Option<Utf8PathBuf>,
    /// Only base paths containing this substring are compared.
    pub name_match: String,
    /// Explicitly listed candidate packages.
    pub packages: Vec<Utf8PathBuf>,
}

/// Where the addon list came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddonListSource {
    /// Given by the user; failing to load it is an error.
    Explicit(Utf8PathBuf),
    /// Found in the game directory; failing to load it is only a warning.
    Detected(Utf8PathBuf),
}

impl AddonListSource {
    pub fn path(&self) -> &Utf8Path {
        match self {
            AddonListSource::Explicit(path) | AddonListSource::Detected(path) => path,
        }
    }
}

/// Fully resolved scan inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPlan {
    pub base_package: Utf8PathBuf,
    pub name_match: String,
    /// Explicit packages first, then discovered ones.
    pub candidates: Vec<Utf8PathBuf>,
    pub addon_list: Option<AddonListSource>,
}

impl ScanPlan {
    pub fn resolve(request: ScanRequest, games: &KnownGames) -> Result<Self> {
        let ScanRequest {
            mod_directory,
            base_package,
            addon_list,
            name_match,
            packages,
        } = request;

        if mod_directory.is_none() && packages.is_empty() {
            return Err(Error::Configuration(
                "no add-on packages specified and no game directory given".to_string(),
            ));
        }

        let base_package = match (base_package, mod_directory.as_deref()) {
            (Some(path), _) => path,
            (None, Some(dir)) => games.detect_base_package(dir).ok_or_else(|| {
                Error::Configuration(format!("no base package detected for '{dir}'"))
            })?,
            (None, None) => {
                return Err(Error::Configuration(
                    "no base package specified".to_string(),
                ))
            }
        };

        let addon_list = match (addon_list, mod_directory.as_deref()) {
            (Some(path), _) => Some(AddonListSource::Explicit(path)),
            (None, Some(dir)) => detect_addon_list(dir).map(AddonListSource::Detected),
            (None, None) => None,
        };

        let mut candidates = packages;
        if let Some(dir) = mod_directory.as_deref() {
            candidates.extend(find_addon_packages(dir));
        }

        Ok(Self {
            base_package,
            name_match,
            candidates,
            addon_list,
        })
    }

    /// Load the addon list, if any.
    ///
    /// An auto-detected list that fails to load is ignored with a warning.
    pub fn load_addon_list(&self) -> Result<Option<AddonList>> {
        match &self.addon_list {
            None => Ok(None),
            Some(AddonListSource::Explicit(path)) => AddonList::load(path).map(Some),
            Some(AddonListSource::Detected(path)) => match AddonList::load(path) {
                Ok(list) => Ok(Some(list)),
                Err(e) => {
                    tracing::warn!("Ignoring detected addon list: {}", e);
                    Ok(None)
                }
            },
        }
    }

    /// Index the base package and check every candidate against it.
    pub fn execute<F>(&self, addon_list: Option<&AddonList>, on_outcome: F) -> Result<ScanSummary>
    where
        F: FnMut(&CandidateOutcome),
    {
        let base = load_base(&self.base_package, &self.name_match)?;
        let summary = ConflictScanner::new(&base)
            .with_addon_list(addon_list)
            .with_progress(on_outcome)
            .scan(&self.candidates);
        Ok(summary)
    }
}

/// Index the base package, keeping only paths containing `name_match`.
pub fn load_base(path: &Utf8Path, name_match: &str) -> Result<PathSet> {
    let base = read_path_set(path, name_match).map_err(|source| Error::BasePackage {
        path: path.to_path_buf(),
        source,
    })?;

    if base.is_empty() {
        return Err(Error::EmptyBase {
            path: path.to_path_buf(),
            name_match: name_match.to_string(),
        });
    }

    tracing::info!(
        "Indexed base package {}: {} path(s) matching '{}'",
        path,
        base.len(),
        name_match
    );

    Ok(base)
}

/// Result of checking one candidate package.
#[derive(Debug)]
pub enum CandidateResult {
    /// No shared paths.
    Clean,
    /// Paths present in both the base package and the candidate.
    Conflicts(PathSet),
    /// The candidate could not be opened or indexed.
    Skipped(VpkError),
}

#[derive(Debug)]
pub struct CandidateOutcome {
    pub path: Utf8PathBuf,
    pub addon_id: String,
    /// `"<id> (<title>)"` or the bare identifier.
    pub display_name: String,
    pub result: CandidateResult,
}

/// Counters and per-candidate outcomes of a finished scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    pub checked: usize,
    pub skipped: usize,
    pub conflicting: usize,
    pub outcomes: Vec<CandidateOutcome>,
}

impl ScanSummary {
    fn record(&mut self, outcome: CandidateOutcome) {
        self.checked += 1;
        match outcome.result {
            CandidateResult::Clean => {}
            CandidateResult::Conflicts(_) => self.conflicting += 1,
            CandidateResult::Skipped(_) => self.skipped += 1,
        }
        self.outcomes.push(outcome);
    }

    pub fn conflicts(&self) -> impl Iterator<Item = (&CandidateOutcome, &PathSet)> {
        self.outcomes.iter().filter_map(|o| match &o.result {
            CandidateResult::Conflicts(paths) => Some((o, paths)),
            _ => None,
        })
    }
}

/// Checks candidate packages against a base path set, one at a time.
pub struct ConflictScanner<'a> {
    base: &'a PathSet,
    addon_list: Option<&'a AddonList>,
    progress: Option<Box<dyn FnMut(&CandidateOutcome) + 'a>>,
}

impl<'a> ConflictScanner<'a> {
    pub fn new(base: &'a PathSet) -> Self {
        Self {
            base,
            addon_list: None,
            progress: None,
        }
    }

    pub fn with_addon_list(mut self, addon_list: Option<&'a AddonList>) -> Self {
        self.addon_list = addon_list;
        self
    }

    /// Called with each outcome as soon as its candidate has been checked.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&CandidateOutcome) + 'a,
    {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Check a single candidate package.
    pub fn check(&self, path: &Utf8Path) -> CandidateOutcome {
        let id = addon_id(path).to_string();
        let display_name = display_name(self.addon_list, &id);

        let result = match read_path_set(path, "") {
            Ok(paths) => {
                let common = intersect(self.base, &paths);
                if common.is_empty() {
                    tracing::debug!("No conflicts in {}", path);
                    CandidateResult::Clean
                } else {
                    tracing::debug!("{} conflicting path(s) in {}", common.len(), path);
                    CandidateResult::Conflicts(common)
                }
            }
            Err(e) => {
                tracing::info!("Skipping {}: {}", path, e);
                CandidateResult::Skipped(e)
            }
        };

        CandidateOutcome {
            path: path.to_path_buf(),
            addon_id: id,
            display_name,
            result,
        }
    }

    pub fn scan<P: AsRef<Utf8Path>>(mut self, candidates: &[P]) -> ScanSummary {
        let mut summary = ScanSummary::default();

        for candidate in candidates {
            let outcome = self.check(candidate.as_ref());
            if let Some(progress) = self.progress.as_mut() {
                progress(&outcome);
            }
            summary.record(outcome);
        }

        tracing::info!(
            "Checked {} package(s): {} skipped, {} conflicting",
            summary.checked,
            summary.skipped,
            summary.conflicting
        );

        summary
    }
}
