//! Multi-part archive naming.
//!
//! A split package is one directory file `<name>_dir.vpk` plus numbered data files
//! `<name>_000.vpk`, `<name>_001.vpk`, ... next to it.

use camino::{Utf8Path, Utf8PathBuf};

const DIR_SUFFIX: &str = "_dir";

/// If `path` looks like a numbered data file, return the matching directory file path.
///
/// `pak01_003.vpk` -> `pak01_dir.vpk`. The result is not checked for existence.
pub fn directory_for_part(path: &Utf8Path) -> Option<Utf8PathBuf> {
    let stem = path.file_stem()?;
    let (name, number) = stem.rsplit_once('_')?;
    if name.is_empty() || number.len() != 3 || !number.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let file_name = match path.extension() {
        Some(ext) => format!("{name}{DIR_SUFFIX}.{ext}"),
        None => format!("{name}{DIR_SUFFIX}"),
    };
    Some(path.with_file_name(file_name))
}
