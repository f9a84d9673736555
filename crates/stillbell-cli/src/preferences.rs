//! Remembered render choices.
//!
//! Stored as JSON under the user config directory
//! (`<config_dir>/stillbell/preferences.json`).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use stillbell_engine::BackgroundKind;

/// Last background and duration chosen with `render --remember`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Preferred ambience bed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<BackgroundKind>,
    /// Preferred track length in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<f64>,
}

impl Preferences {
    /// Default location, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("stillbell").join("preferences.json"))
    }

    /// Reads preferences from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read preferences '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse preferences '{}'", path.display()))
    }

    /// Writes preferences to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create '{}'", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write preferences '{}'", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = Preferences::load_from(&dir.path().join("none.json")).unwrap();
        assert_eq!(prefs, Preferences::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.json");
        let prefs = Preferences {
            background: Some(BackgroundKind::Water),
            duration_minutes: Some(25.0),
        };

        prefs.save_to(&path).unwrap();
        assert_eq!(Preferences::load_from(&path).unwrap(), prefs);
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Preferences::load_from(&path).is_err());
    }

    #[test]
    fn test_partial_file() {
        let prefs: Preferences = serde_json::from_str(r#"{ "background": "sea" }"#).unwrap();
        assert_eq!(prefs.background, Some(BackgroundKind::Sea));
        assert_eq!(prefs.duration_minutes, None);
    }
}
