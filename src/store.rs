//! Key-value string storage that survives between runs.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
#[cfg(test)]
use std::sync::{Mutex, PoisonError};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{DirectoryError, Result};

pub const LOCAL_USERS_KEY: &str = "localUsers";
pub const THEME_KEY: &str = "theme";

const STORAGE_FILE: &str = "storage.json";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite the entry for `key` as a whole.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// All entries live in one JSON object on disk; every write replaces the file.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(STORAGE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let contents =
            std::fs::read_to_string(&self.path).map_err(|e| DirectoryError::StorageRead {
                path: self.path.clone(),
                source: e,
            })?;

        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&contents).map_err(|e| DirectoryError::StorageCorrupt {
            path: self.path.clone(),
            source: e,
        })
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let write_err = |e: std::io::Error| DirectoryError::StorageWrite {
            path: self.path.clone(),
            source: e,
        };

        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent).map_err(write_err)?;

        let contents = serde_json::to_string_pretty(entries)?;

        // Written next to the target and renamed over it, so readers see
        // either the old file or the new one.
        let mut file = NamedTempFile::new_in(parent).map_err(write_err)?;
        file.write_all(contents.as_bytes()).map_err(write_err)?;
        file.persist(&self.path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(DirectoryError::StorageCorrupt { path, source }) => {
                warn!(path = %path.display(), error = %source, "replacing unreadable storage file");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)?;
        debug!(key, path = %self.path().display(), "saved storage entry");
        Ok(())
    }
}

/// Store that lives only as long as the process.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
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

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(store.get(THEME_KEY).unwrap(), None);

        store.set(THEME_KEY, "dark").unwrap();
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("dark"));

        store.set(THEME_KEY, "light").unwrap();
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("light"));
    }

    #[test]
    fn test_file_store_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::in_dir(dir.path());
        assert_eq!(store.get(LOCAL_USERS_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");

        let store = FileStore::in_dir(&nested);
        store.set(LOCAL_USERS_KEY, "[]").unwrap();
        store.set(THEME_KEY, "dark").unwrap();

        let reopened = FileStore::in_dir(&nested);
        assert_eq!(reopened.get(LOCAL_USERS_KEY).unwrap().as_deref(), Some("[]"));
        assert_eq!(reopened.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::in_dir(dir.path());
        std::fs::write(store.path(), "{ not json").unwrap();

        assert!(matches!(
            store.get(THEME_KEY),
            Err(DirectoryError::StorageCorrupt { .. })
        ));
    }

    #[test]
    fn test_file_store_set_replaces_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::in_dir(dir.path());
        std::fs::write(store.path(), "{ not json").unwrap();

        store.set(THEME_KEY, "dark").unwrap();

        let reopened = FileStore::in_dir(dir.path());
        assert_eq!(reopened.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
        assert_eq!(reopened.get(LOCAL_USERS_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_store_write_leaves_only_storage_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::in_dir(dir.path());
        store.set(THEME_KEY, "dark").unwrap();
        store.set(LOCAL_USERS_KEY, "[]").unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![STORAGE_FILE.to_string()]);

        let contents = std::fs::read_to_string(store.path()).unwrap();
        let entries: BTreeMap<String, String> = serde_json::from_str(&contents).unwrap();
        assert_eq!(entries.len(), 2);
    }
}
