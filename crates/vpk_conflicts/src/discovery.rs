//! Locating packages inside a game directory.

use camino::{Utf8Path, Utf8PathBuf};
use std::collections::BTreeMap;
use walkdir::WalkDir;

/// Directory (relative to the game directory) that holds add-on packages.
pub const ADDONS_DIR: &str = "addons";

/// Addon list location probed when none is given explicitly.
pub const DEFAULT_ADDON_LIST: &str = "addons/workshop/addons.lst";

/// Extension of package files.
pub const PACKAGE_EXTENSION: &str = "vpk";

/// Game directory name -> base package file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownGames {
    packages: BTreeMap<String, String>,
}

impl Default for KnownGames {
    fn default() -> Self {
        Self::empty().with_game("left4dead2", "pak01_dir.vpk")
    }
}

impl KnownGames {
    pub fn empty() -> Self {
        Self {
            packages: BTreeMap::new(),
        }
    }

    pub fn with_game(mut self, game: impl Into<String>, package: impl Into<String>) -> Self {
        self.packages.insert(game.into(), package.into());
        self
    }

    /// Add or replace entries.
    pub fn extend<I, K, V>(&mut self, games: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.packages
            .extend(games.into_iter().map(|(k, v)| (k.into(), v.into())));
    }

    pub fn base_package_for(&self, game: &str) -> Option<&str> {
        self.packages.get(game).map(String::as_str)
    }

    /// Guess the base package from the game directory's own name.
    ///
    /// `.../left4dead2` -> `.../left4dead2/pak01_dir.vpk`.
    pub fn detect_base_package(&self, mod_dir: &Utf8Path) -> Option<Utf8PathBuf> {
        let game = game_name(mod_dir)?;
        let package = self.base_package_for(game)?;
        Some(mod_dir.join(package))
    }
}

/// Final component of the game directory, ignoring trailing separators.
pub fn game_name(mod_dir: &Utf8Path) -> Option<&str> {
    mod_dir.file_name()
}

/// The addon list at [`DEFAULT_ADDON_LIST`], if that file exists.
pub fn detect_addon_list(mod_dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let path = mod_dir.join(DEFAULT_ADDON_LIST);
    path.is_file().then_some(path)
}

/// Recursively collect `*.vpk` files under `<mod_dir>/addons`, sorted by path.
///
/// Numbered data files of split packages are left out when their `_dir.vpk`
/// sibling exists, since only the directory file holds an index. Directories that
/// cannot be read are logged and skipped.
pub fn find_addon_packages(mod_dir: &Utf8Path) -> Vec<Utf8PathBuf> {
    let addons_dir = mod_dir.join(ADDONS_DIR);
    if !addons_dir.is_dir() {
        tracing::warn!("Add-on directory {} does not exist", addons_dir);
        return Vec::new();
    }

    let mut packages = Vec::new();
    for entry in WalkDir::new(addons_dir.as_std_path()).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable add-on path: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = match Utf8PathBuf::from_path_buf(entry.into_path()) {
            Ok(p) => p,
            Err(p) => {
                tracing::warn!("Skipping non-UTF-8 path: {}", p.display());
                continue;
            }
        };

        if path.extension() != Some(PACKAGE_EXTENSION) {
            continue;
        }

        if let Some(dir_file) = vpk_index::directory_for_part(&path) {
            if dir_file.is_file() {
                tracing::debug!("Skipping data file {} of {}", path, dir_file);
                continue;
            }
        }

        packages.push(path);
    }

    tracing::info!(
        "Found {} add-on package(s) under {}",
        packages.len(),
        addons_dir
    );

    packages
}
