//! Error types for conflict scans.
//!
//! Only failures that end the whole run live here. A candidate package that fails
//! to open is reported through [`CandidateResult::Skipped`](crate::CandidateResult::Skipped)
//! instead.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The caller's inputs cannot describe a scan.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The base package could not be opened or indexed.
    #[error("Failed to read base package '{path}': {source}")]
    BasePackage {
        path: Utf8PathBuf,
        #[source]
        source: vpk_index::VpkError,
    },

    /// The base package has no paths left after filtering.
    #[error("Base package '{path}' has no entries matching '{name_match}'")]
    EmptyBase {
        path: Utf8PathBuf,
        name_match: String,
    },

    /// The addon list exists but could not be read or parsed.
    #[error("Failed to load addon list '{path}': {message}")]
    AddonList { path: Utf8PathBuf, message: String },
}
