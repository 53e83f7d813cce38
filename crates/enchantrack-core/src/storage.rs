//! Key-value persistence adapters.
//!
//! The tracker persists exactly two keys: the progress snapshot and the view
//! mode. Hosts provide a [`KeyValueStore`]: browser `localStorage` in wasm,
//! [`FileStore`] on the command line, [`MemoryStore`] in tests.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// Key holding the serialized progress snapshot.
pub const PROGRESS_KEY: &str = "enchantrack.progress";

/// Key holding the last selected view mode.
pub const VIEW_MODE_KEY: &str = "enchantrack.viewMode";

/// String-keyed persistence with get/set/remove semantics.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &mut T {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// In-memory store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_value(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.values.remove(key);
        Ok(())
    }
}

/// JSON object file mapping keys to string values.
///
/// Every write replaces the whole file through a sibling temp file and a
/// rename, so an interrupted write leaves the previous contents in place.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Open `path`, treating a missing file as an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => {
                serde_json::from_str(&content).map_err(|source| StorageError::Corrupt {
                    path: path.clone(),
                    source,
                })?
            }
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StorageError::Io { path, source }),
        };
        tracing::debug!(
            target: "enchantrack.storage",
            path = %path.display(),
            keys = values.len(),
            "file store opened"
        );
        Ok(Self { path, values })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StorageError> {
        let io_error = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };
        let content = serde_json::to_string_pretty(&self.values).map_err(|source| {
            StorageError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;

        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let mut tmp_name = self.path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = self.path.with_file_name(tmp_name);

        let mut file = fs::File::create(&tmp_path).map_err(io_error)?;
        file.write_all(content.as_bytes()).map_err(io_error)?;
        file.sync_all().map_err(io_error)?;
        fs::rename(&tmp_path, &self.path).map_err(io_error)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let previous = self.values.insert(key.to_string(), value.to_string());
        if let Err(error) = self.flush() {
            match previous {
                Some(old) => self.values.insert(key.to_string(), old),
                None => self.values.remove(key),
            };
            return Err(error);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if let Some(old) = self.values.remove(key) {
            if let Err(error) = self.flush() {
                self.values.insert(key.to_string(), old);
                return Err(error);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::{FileStore, KeyValueStore, MemoryStore};
    use crate::error::StorageError;

    #[test]
    fn memory_store_round_trips_values() {
        let mut store = MemoryStore::new();
        store.set("a", "1").expect("set");
        assert_eq!(store.get("a").expect("get"), Some("1".to_string()));
        store.remove("a").expect("remove");
        assert_eq!(store.get("a").expect("get"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("state.json");

        let mut store = FileStore::open(&path).expect("open missing file");
        store.set("enchantrack.viewMode", "list").expect("set");

        let reopened = FileStore::open(&path).expect("reopen");
        assert_eq!(
            reopened.get("enchantrack.viewMode").expect("get"),
            Some("list".to_string())
        );
        assert!(!path.with_file_name("state.json.tmp").exists());
    }

    #[test]
    fn file_store_remove_rewrites_file() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("state.json");

        let mut store = FileStore::open(&path).expect("open");
        store.set("k", "v").expect("set");
        store.remove("k").expect("remove");

        let reopened = FileStore::open(&path).expect("reopen");
        assert_eq!(reopened.get("k").expect("get"), None);
    }

    #[test]
    fn corrupt_state_file_is_reported() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("state.json");
        std::fs::write(&path, "not json").expect("write");

        match FileStore::open(&path).expect_err("corrupt file should fail") {
            StorageError::Corrupt { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("expected Corrupt, got {other}"),
        }
    }
}
