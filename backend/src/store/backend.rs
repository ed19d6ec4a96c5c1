//! Durable key-value backends for the record store.
//!
//! A backend holds named string values, the way browser local storage does.
//! [`FileStorage`] keeps one `<key>.json` file per key in a data directory;
//! [`MemoryStorage`] keeps values in a map for tests and throwaway runs.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::StoreResult;

/// A synchronous key-value store holding whole serialized values.
pub trait StorageBackend: Send {
    /// Read the value under `key`, `None` if never written or removed.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Overwrite the value under `key`. Readers never observe a partial value.
    fn set(&mut self, key: &str, value: &str) -> StoreResult<()>;

    /// Delete `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> StoreResult<()>;
}

// =============================================================================
// File Storage
// =============================================================================

/// One JSON file per key under a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Use `dir` as the data directory. It is created on first write.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: PathBuf::from(dir.as_ref()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        fs::create_dir_all(&self.dir)?;

        // Write aside then rename over the old file
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// Memory Storage
// =============================================================================

/// Values kept in memory only.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a key with a raw value, e.g. to simulate corrupt data.
    pub fn with_value(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        self.values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_storage_missing_key_is_none() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("data"));
        assert_eq!(storage.get("students").unwrap(), None);
    }

    #[test]
    fn test_file_storage_overwrites_and_removes() {
        let dir = tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("data"));

        storage.set("students", "[1]").unwrap();
        storage.set("students", "[2]").unwrap();
        assert_eq!(storage.get("students").unwrap().as_deref(), Some("[2]"));
        assert!(dir.path().join("data/students.json").exists());
        assert!(!dir.path().join("data/.students.json.tmp").exists());

        storage.remove("students").unwrap();
        assert_eq!(storage.get("students").unwrap(), None);
        // Removing again is fine
        storage.remove("students").unwrap();
    }

    #[test]
    fn test_file_storage_unwritable_dir_is_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "x").unwrap();

        let mut storage = FileStorage::new(&blocker);
        assert!(storage.set("students", "[]").is_err());
    }

    #[test]
    fn test_memory_storage() {
        let mut storage = MemoryStorage::new().with_value("k", "v");
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));
        storage.remove("k").unwrap();
        assert_eq!(storage.get("k").unwrap(), None);
    }
}
