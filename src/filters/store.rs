//! Persistent key-value store for the user's last filters.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const KEY_TOPIC: &str = "selectedTopic";
pub const KEY_SOURCE: &str = "selectedSource";
pub const KEY_KEYWORD: &str = "selectedKeyword";
pub const KEY_START_DATE: &str = "startDate";
pub const KEY_END_DATE: &str = "endDate";

pub const ALL_KEYS: [&str; 5] = [
    KEY_TOPIC,
    KEY_SOURCE,
    KEY_KEYWORD,
    KEY_START_DATE,
    KEY_END_DATE,
];

/// String-keyed, string-valued storage that survives restarts.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// In-memory store for tests and `--once` runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// JSON object on disk (`filters.json` in the data dir), rewritten on every change.
///
/// A missing or corrupt file reads as an empty store. Write failures are
/// logged and otherwise ignored; the in-memory copy stays authoritative.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = std::fs::read_to_string(&path)
            .ok()
            .and_then(|body| match serde_json::from_str(&body) {
                Ok(map) => Some(map),
                Err(err) => {
                    tracing::warn!(path = %path.display(), "ignoring unreadable filter store: {err}");
                    None
                }
            })
            .unwrap_or_default();
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) {
        if let Some(parent) = self.path.parent()
            && let Err(err) = std::fs::create_dir_all(parent)
        {
            tracing::warn!(path = %parent.display(), "could not create data dir: {err}");
            return;
        }
        match serde_json::to_string_pretty(&self.entries) {
            Ok(body) => {
                if let Err(err) = std::fs::write(&self.path, body) {
                    tracing::warn!(path = %self.path.display(), "could not save filters: {err}");
                }
            }
            Err(err) => tracing::warn!("could not encode filters: {err}"),
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        if self.entries.get(key).map(String::as_str) == Some(value) {
            return;
        }
        self.entries.insert(key.to_string(), value.to_string());
        self.flush();
    }

    fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.flush();
        }
    }
}

pub fn store_path_for(data_dir: &Path) -> PathBuf {
    data_dir.join("filters.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_store_roundtrips_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = store_path_for(dir.path());
        let mut store = JsonFileStore::open(&path);
        store.set(KEY_TOPIC, "Energy");
        store.set(KEY_KEYWORD, "solar");
        store.remove(KEY_KEYWORD);

        let reopened = JsonFileStore::open(&path);
        assert_eq!(reopened.get(KEY_TOPIC).as_deref(), Some("Energy"));
        assert_eq!(reopened.get(KEY_KEYWORD), None);
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let path = store_path_for(dir.path());
        std::fs::write(&path, "{not json").unwrap();
        let store = JsonFileStore::open(&path);
        assert_eq!(store.get(KEY_TOPIC), None);
    }

    #[test]
    fn creates_missing_parent_on_first_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/filters.json");
        let mut store = JsonFileStore::open(&path);
        store.set(KEY_SOURCE, "Grist");
        assert!(path.exists());
    }
}
