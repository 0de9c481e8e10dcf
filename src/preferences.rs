use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Key under which the active language code is persisted.
pub const PREFERRED_LANGUAGE_KEY: &str = "preferredLanguage";

/// Durable string key-value storage for user preferences.
///
/// Calls are synchronous: a write has landed once `set` returns.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Preferences stored as a flat JSON object on disk.
#[derive(Debug)]
pub struct FilePreferenceStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(e).context(format!(
                    "Failed to read preferences from {}",
                    self.path.display()
                ))
            }
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).context(format!(
            "Failed to parse preferences file {}",
            self.path.display()
        ))
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).context(format!(
                    "Failed to create preferences directory {}",
                    parent.display()
                ))?;
            }
        }

        let json = serde_json::to_string_pretty(&entries)
            .context("Failed to serialize preferences")?;
        std::fs::write(&self.path, json).context(format!(
            "Failed to write preferences to {}",
            self.path.display()
        ))?;

        Ok(())
    }
}

/// Preferences held in memory only; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a single entry.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        store
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");
        assert_eq!(FilePreferenceStore::new(&path).path(), path.as_path());
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FilePreferenceStore::new(dir.path().join("prefs.json"));

        assert_eq!(store.get(PREFERRED_LANGUAGE_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_store_set_then_get() {
        let dir = TempDir::new().unwrap();
        let store = FilePreferenceStore::new(dir.path().join("prefs.json"));

        store.set(PREFERRED_LANGUAGE_KEY, "es").unwrap();
        assert_eq!(
            store.get(PREFERRED_LANGUAGE_KEY).unwrap(),
            Some("es".to_string())
        );
    }

    #[test]
    fn test_file_store_survives_new_instance() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");

        FilePreferenceStore::new(&path)
            .set(PREFERRED_LANGUAGE_KEY, "fr")
            .unwrap();

        let reopened = FilePreferenceStore::new(&path);
        assert_eq!(
            reopened.get(PREFERRED_LANGUAGE_KEY).unwrap(),
            Some("fr".to_string())
        );
    }

    #[test]
    fn test_file_store_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("prefs.json");
        let store = FilePreferenceStore::new(&path);

        store.set(PREFERRED_LANGUAGE_KEY, "de").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_file_store_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let store = FilePreferenceStore::new(dir.path().join("prefs.json"));

        store.set("theme", "dark").unwrap();
        store.set(PREFERRED_LANGUAGE_KEY, "it").unwrap();
        store.set(PREFERRED_LANGUAGE_KEY, "pt").unwrap();

        assert_eq!(store.get("theme").unwrap(), Some("dark".to_string()));
        assert_eq!(
            store.get(PREFERRED_LANGUAGE_KEY).unwrap(),
            Some("pt".to_string())
        );
    }

    #[test]
    fn test_file_store_writes_raw_code_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");
        FilePreferenceStore::new(&path)
            .set(PREFERRED_LANGUAGE_KEY, "ja")
            .unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["preferredLanguage"], "ja");
    }

    #[test]
    fn test_file_store_corrupt_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "not json").unwrap();

        let result = FilePreferenceStore::new(&path).get(PREFERRED_LANGUAGE_KEY);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("parse"));
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryPreferenceStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap(), Some("v".to_string()));
    }

    #[test]
    fn test_memory_store_with_entry() {
        let store = MemoryPreferenceStore::with_entry(PREFERRED_LANGUAGE_KEY, "ko");
        assert_eq!(
            store.get(PREFERRED_LANGUAGE_KEY).unwrap(),
            Some("ko".to_string())
        );
    }
}
