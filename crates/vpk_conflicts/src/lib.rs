//! Detects file path collisions between a base VPK package and add-on packages.
//!
//! Games built on the Source engine mount add-on VPKs over the base content, so any
//! path an add-on shares with the base package overrides the original file. This
//! crate lists those shared paths per add-on:
//!
//! - **Path sets**: every archive is reduced to the set of its normalized entry paths
//!   ([`read_path_set`]), optionally filtered by substring.
//! - **Collision check**: [`intersect`] is a pure, case-sensitive set intersection.
//! - **Scanning**: [`ConflictScanner`] walks the candidates one by one; unreadable
//!   candidates are skipped and counted instead of aborting the run.
//! - **Discovery**: add-ons under `<game>/addons`, the base package and addon list
//!   are located from the game directory ([`ScanPlan::resolve`]).
//!
//! # Example
//!
//! ```no_run
//! use vpk_conflicts::{KnownGames, ScanPlan, ScanRequest};
//!
//! # fn main() -> Result<(), vpk_conflicts::Error> {
//! let plan = ScanPlan::resolve(
//!     ScanRequest {
//!         mod_directory: Some("steamapps/common/Left 4 Dead 2/left4dead2".into()),
//!         name_match: "maps/".to_string(),
//!         ..Default::default()
//!     },
//!     &KnownGames::default(),
//! )?;
//!
//! let addon_list = plan.load_addon_list()?;
//! let summary = plan.execute(addon_list.as_ref(), |_| {})?;
//! for (outcome, paths) in summary.conflicts() {
//!     println!("{}: {} shared path(s)", outcome.display_name, paths.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod addon_list;
pub mod discovery;
pub mod error;
pub mod path_set;
pub mod scan;

pub use addon_list::{addon_id, AddonInfo, AddonList};
pub use discovery::{find_addon_packages, KnownGames};
pub use error::{Error, Result};
pub use path_set::{collect_paths, intersect, read_path_set, PathSet};
pub use scan::{
    load_base, AddonListSource, CandidateOutcome, CandidateResult, ConflictScanner, ScanPlan,
    ScanRequest, ScanSummary,
};
