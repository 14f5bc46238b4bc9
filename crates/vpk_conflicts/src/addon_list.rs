//! Optional add-on metadata used to label report lines.
//!
//! The sidecar is a JSON document written by workshop download tools:
//!
//! ```json
//! { "plugins": { "123456789": { "title": "Custom Campaign" } } }
//! ```
//!
//! Keys are add-on identifiers, i.e. package file names without the `.vpk` extension.
//! Metadata never influences which paths are compared.

use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddonList {
    #[serde(default)]
    pub plugins: HashMap<String, AddonInfo>,
}

/// Descriptor of one add-on. Only the title is interpreted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddonInfo {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AddonList {
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let contents = fs::read_to_string(path.as_std_path()).map_err(|e| Error::AddonList {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json(&contents).map_err(|e| Error::AddonList {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str(contents)
    }

    pub fn title(&self, addon_id: &str) -> Option<&str> {
        self.plugins
            .get(addon_id)
            .and_then(|info| info.title.as_deref())
    }

    /// `"<id> (<title>)"` when a title is known, the bare identifier otherwise.
    pub fn display_name(&self, addon_id: &str) -> String {
        match self.title(addon_id) {
            Some(title) => format!("{addon_id} ({title})"),
            None => addon_id.to_string(),
        }
    }
}

/// Identifier of a candidate package: its file name without extension.
pub fn addon_id(path: &Utf8Path) -> &str {
    path.file_stem()
        .or_else(|| path.file_name())
        .unwrap_or(path.as_str())
}

/// Display text for a candidate, with or without an addon list.
pub fn display_name(addon_list: Option<&AddonList>, addon_id: &str) -> String {
    match addon_list {
        Some(list) => list.display_name(addon_id),
        None => addon_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const LIST: &str = r#"{
        "plugins": {
            "123456789": { "title": "Custom Campaign", "author": "someone" },
            "555": { "description": "no title here" }
        }
    }"#;

    #[test]
    fn test_display_name_with_title() {
        let list = AddonList::from_json(LIST).unwrap();
        assert_eq!(list.display_name("123456789"), "123456789 (Custom Campaign)");
    }

    #[test]
    fn test_display_name_unknown_addon() {
        let list = AddonList::from_json(LIST).unwrap();
        assert_eq!(list.display_name("987654321"), "987654321");
    }

    #[test]
    fn test_display_name_missing_title() {
        let list = AddonList::from_json(LIST).unwrap();
        assert_eq!(list.display_name("555"), "555");
        assert!(list.plugins["555"].extra.contains_key("description"));
    }

    #[test]
    fn test_missing_plugins_key() {
        let list = AddonList::from_json("{}").unwrap();
        assert!(list.plugins.is_empty());
    }

    #[test]
    fn test_addon_id() {
        assert_eq!(addon_id(Utf8Path::new("addons/workshop/123456789.vpk")), "123456789");
        assert_eq!(addon_id(Utf8Path::new("mymod_dir.vpk")), "mymod_dir");
        assert_eq!(addon_id(Utf8Path::new("noext")), "noext");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(LIST.as_bytes()).unwrap();
        file.flush().unwrap();

        let path = Utf8Path::from_path(file.path()).unwrap();
        let list = AddonList::load(path).unwrap();
        assert_eq!(list.title("123456789"), Some("Custom Campaign"));
    }

    #[test]
    fn test_load_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"\"addons\"\n{\n}").unwrap();
        file.flush().unwrap();

        let path = Utf8Path::from_path(file.path()).unwrap();
        assert!(matches!(
            AddonList::load(path),
            Err(Error::AddonList { .. })
        ));
    }
}
