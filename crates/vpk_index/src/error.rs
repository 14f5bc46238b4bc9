//! Error types for VPK index reading.
//!
//! [`VpkError`] separates "could not get at the bytes" ([`VpkError::NotFound`],
//! [`VpkError::Io`]) from "the bytes are not a VPK directory" ([`VpkError::Format`]).
//! Callers that scan many archives use [`VpkError::kind`] to label failures.

use camino::Utf8PathBuf;
use std::io;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, VpkError>;

/// Errors that can occur while opening or indexing a VPK archive.
#[derive(Error, Debug)]
pub enum VpkError {
    /// The archive could not be opened (missing file, permission denied).
    #[error("cannot open '{path}': {source}")]
    NotFound {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading from an already opened archive failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The directory tree does not conform to the VPK layout.
    #[error("{0}")]
    Format(#[from] FormatError),
}

impl VpkError {
    /// Short, stable label for the error category.
    pub fn kind(&self) -> &'static str {
        match self {
            VpkError::NotFound { .. } => "NotFoundError",
            VpkError::Io(_) => "IoError",
            VpkError::Format(_) => "FormatError",
        }
    }

    pub fn is_format(&self) -> bool {
        matches!(self, VpkError::Format(_))
    }
}

/// Structural problems found while parsing a VPK directory file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("invalid VPK signature: {0:#010x}")]
    InvalidMagic(u32),

    #[error("unsupported VPK version: {0}")]
    UnsupportedVersion(u32),

    #[error("truncated {context} at offset {offset}")]
    Truncated { context: &'static str, offset: usize },

    #[error("invalid entry terminator {value:#06x} after '{path}'")]
    InvalidTerminator { path: String, value: u16 },

    #[error("tree string at offset {offset} is not valid UTF-8")]
    InvalidString { offset: usize },
}

/// Map an unexpected EOF from a reader into [`FormatError::Truncated`].
pub(crate) fn eof_as_truncated(
    err: io::Error,
    context: &'static str,
    offset: usize,
) -> VpkError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        FormatError::Truncated { context, offset }.into()
    } else {
        VpkError::Io(err)
    }
}
