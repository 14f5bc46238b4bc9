//! Application configuration management utilities.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use vpk_conflicts::KnownGames;

use crate::errors::CliError;

/// Application-wide configuration stored in config.toml.
///
/// ```toml
/// name_match = "maps/"
///
/// [games]
/// portal2 = "pak01_dir.vpk"
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    /// Default for `--name-match`.
    #[serde(default)]
    pub name_match: Option<String>,

    /// Game directory name -> base package, on top of the built-in table.
    #[serde(default)]
    pub games: BTreeMap<String, String>,
}

impl AppConfig {
    pub fn known_games(&self) -> KnownGames {
        let mut games = KnownGames::default();
        games.extend(self.games.clone());
        games
    }
}

/// Returns the directory where the current executable resides.
pub fn install_dir() -> Option<Utf8PathBuf> {
    let exe = env::current_exe().ok()?;
    let parent = exe.parent()?;
    Utf8PathBuf::from_path_buf(parent.to_path_buf()).ok()
}

/// Returns the default configuration file path (config.toml next to the executable).
pub fn default_config_path() -> Option<Utf8PathBuf> {
    install_dir().map(|dir| dir.join("config.toml"))
}

/// Parse configuration from a file.
pub fn read_config(path: &Utf8Path) -> Result<AppConfig, CliError> {
    let content = fs::read_to_string(path.as_std_path())?;
    toml::from_str(&content).map_err(|source| CliError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads the configuration.
///
/// An explicitly given file must exist and parse. The default file is optional:
/// when missing or invalid the defaults are used.
pub fn load_config(explicit: Option<&Utf8Path>) -> Result<AppConfig, CliError> {
    if let Some(path) = explicit {
        return read_config(path);
    }

    let Some(path) = default_config_path() else {
        return Ok(AppConfig::default());
    };
    if !path.is_file() {
        return Ok(AppConfig::default());
    }

    match read_config(&path) {
        Ok(cfg) => {
            tracing::debug!("Loaded configuration from {}", path);
            Ok(cfg)
        }
        Err(e) => {
            tracing::warn!("Ignoring configuration file {}: {}", path, e);
            Ok(AppConfig::default())
        }
    }
}
