use crate::error::{AppError, AppResult};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const PREVIEW_KEY: &str = "markdown-editor-preview";
pub const WORD_WRAP_KEY: &str = "markdown-editor-wordwrap";
pub const SPLIT_KEY: &str = "markdown-editor-split";
pub const CONTENT_KEY: &str = "markdown-editor-content";

/// String key/value storage. Absent keys read as the empty string.
pub trait KeyValueStore {
    fn load(&self, key: &str) -> String;
    fn save(&mut self, key: &str, value: &str) -> AppResult<()>;
    fn clear(&mut self, key: &str) -> AppResult<()>;
}

/// Store backed by a flat JSON object on disk, rewritten atomically on every change.
pub struct FileStore {
    path: Option<PathBuf>,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens the store at `path`. A missing or corrupt file starts empty.
    pub fn open(path: PathBuf) -> Self {
        let values = match read_values(&path) {
            Ok(values) => values,
            Err(AppError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                BTreeMap::new()
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "discarding unreadable storage");
                BTreeMap::new()
            }
        };
        tracing::debug!(path = %path.display(), keys = values.len(), "opened storage");
        Self {
            path: Some(path),
            values,
        }
    }

    /// A store that never touches the disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            values: BTreeMap::new(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn flush(&self) -> AppResult<()> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(std::env::temp_dir);
        fs::create_dir_all(&parent)?;

        let json = serde_json::to_string_pretty(&self.values)?;
        let mut tmp = NamedTempFile::new_in(&parent)?;
        tmp.write_all(json.as_bytes())?;
        tmp.flush()?;
        tmp.persist(path).map_err(|e| AppError::Persist {
            path: path.display().to_string(),
            source: e.error,
        })?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> String {
        self.values.get(key).cloned().unwrap_or_default()
    }

    fn save(&mut self, key: &str, value: &str) -> AppResult<()> {
        if self.values.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn clear(&mut self, key: &str) -> AppResult<()> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

fn read_values(path: &Path) -> AppResult<BTreeMap<String, String>> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_keys_read_empty() {
        let store = FileStore::in_memory();
        assert_eq!(store.load(CONTENT_KEY), "");
    }

    #[test]
    fn save_then_clear() {
        let mut store = FileStore::in_memory();
        store.save(SPLIT_KEY, "-40").unwrap();
        assert_eq!(store.load(SPLIT_KEY), "-40");
        store.clear(SPLIT_KEY).unwrap();
        assert_eq!(store.load(SPLIT_KEY), "");
    }

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let mut store = FileStore::open(path.clone());
        store.save(CONTENT_KEY, "# Title\n\nbody").unwrap();
        store.save(PREVIEW_KEY, "false").unwrap();
        drop(store);

        let reopened = FileStore::open(path);
        assert_eq!(reopened.load(CONTENT_KEY), "# Title\n\nbody");
        assert_eq!(reopened.load(PREVIEW_KEY), "false");
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{ not json").unwrap();

        let mut store = FileStore::open(path.clone());
        assert_eq!(store.load(CONTENT_KEY), "");

        store.save(CONTENT_KEY, "fresh").unwrap();
        assert_eq!(FileStore::open(path).load(CONTENT_KEY), "fresh");
    }
}
