use crate::error::AppResult;
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Optional `config.toml` next to the storage file. Every field has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    /// Name of a syntect default theme used for code blocks.
    pub highlight_theme: String,
    /// Overrides the location of `storage.json`.
    pub storage_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 760.0,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            highlight_theme: "InspiredGitHub".to_string(),
            storage_path: None,
        }
    }
}

impl AppConfig {
    /// Reads the user's config, falling back to defaults when it is missing or broken.
    pub fn load() -> Self {
        let Some(path) = config_dir().map(|dir| dir.join("config.toml")) else {
            return Self::default();
        };
        match Self::from_path(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "ignoring unreadable config");
                Self::default()
            }
        }
    }

    pub fn from_path(path: &Path) -> AppResult<Self> {
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn parse(text: &str) -> AppResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn storage_file(&self) -> Option<PathBuf> {
        self.storage_path
            .clone()
            .or_else(|| config_dir().map(|dir| dir.join("storage.json")))
    }
}

pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "markdownannotator", "annotator")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config.highlight_theme, "InspiredGitHub");
        assert_eq!(config.window.width, 1200.0);
        assert!(config.storage_path.is_none());
    }

    #[test]
    fn partial_window_table_keeps_other_defaults() {
        let config = AppConfig::parse("[window]\nwidth = 900.0\n").unwrap();
        assert_eq!(config.window.width, 900.0);
        assert_eq!(config.window.height, 760.0);
    }

    #[test]
    fn storage_override_is_used() {
        let config = AppConfig::parse("storage_path = \"/tmp/notes.json\"").unwrap();
        assert_eq!(config.storage_file(), Some(PathBuf::from("/tmp/notes.json")));
    }

    #[test]
    fn malformed_config_is_an_error() {
        assert!(AppConfig::parse("window = 3").is_err());
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::from_path(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.highlight_theme, "InspiredGitHub");
    }
}
