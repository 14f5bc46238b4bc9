//! Read-only index reader for Valve VPK archives.
//!
//! A VPK package is a directory file (`pak01_dir.vpk`) holding a tree of
//! `extension -> directory -> file name` tables, optionally accompanied by numbered
//! data files. This crate parses the tree and exposes every entry's metadata and
//! normalized path; file contents are never read.
//!
//! ```no_run
//! use vpk_index::Vpk;
//!
//! # fn main() -> Result<(), vpk_index::VpkError> {
//! let vpk = Vpk::open("left4dead2/pak01_dir.vpk")?;
//! for path in vpk.paths().filter(|p| p.starts_with("maps/")) {
//!     println!("{path}");
//! }
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;

mod entry;
mod error;
mod header;
mod naming;
mod read;

#[cfg(any(test, feature = "fixture"))]
pub mod fixture;

pub use entry::*;
pub use error::{FormatError, Result, VpkError};
pub use header::{VpkHeader, VpkHeaderV2, VPK_SIGNATURE};
pub use naming::directory_for_part;

/// An indexed VPK directory file.
///
/// Entries are indexed eagerly when mounting. The source is not retained, so an
/// opened file is closed as soon as its tree has been read.
#[derive(Debug)]
pub struct Vpk {
    header: VpkHeader,
    entries: Vec<VpkEntry>,
    /// Normalized path -> index into `entries`.
    lookup: HashMap<String, usize>,
}

impl Vpk {
    pub fn header(&self) -> &VpkHeader {
        &self.header
    }

    /// Entries in the order they appear in the directory tree.
    pub fn entries(&self) -> &[VpkEntry] {
        &self.entries
    }

    /// Normalized entry paths in tree order. Each path is yielded exactly once.
    pub fn paths(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(VpkEntry::path)
    }

    pub fn get(&self, path: &str) -> Option<&VpkEntry> {
        self.lookup.get(path).map(|&idx| &self.entries[idx])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
