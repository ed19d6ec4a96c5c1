//! Record Store - The durable collection of student records
//!
//! All records live under one key as a JSON array. Every mutation reads the
//! whole collection, changes it in memory and writes the whole collection
//! back, so a write is last-writer-wins. Two processes sharing a data
//! directory can lose each other's changes.

pub mod backend;

use tracing::{debug, warn};

use crate::error::StoreResult;
use crate::models::StudentRecord;

pub use backend::{FileStorage, MemoryStorage, StorageBackend};

/// Key holding the serialized record array.
pub const DB_KEY: &str = "eduregister_students";

/// The student record collection over a storage backend.
pub struct RecordStore {
    backend: Box<dyn StorageBackend>,
    key: String,
}

impl RecordStore {
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self::with_key(backend, DB_KEY)
    }

    /// Use a custom storage key.
    pub fn with_key(backend: impl StorageBackend + 'static, key: &str) -> Self {
        Self {
            backend: Box::new(backend),
            key: key.to_string(),
        }
    }

    /// A store backed by memory only.
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }

    /// Load every record in insertion order.
    ///
    /// Missing or corrupt data yields an empty collection. A backend that
    /// cannot be read is an error: callers about to write must not mistake
    /// it for an empty store.
    pub fn try_load_all(&self) -> StoreResult<Vec<StudentRecord>> {
        let Some(raw) = self.backend.get(&self.key)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Option<Vec<StudentRecord>>>(&raw) {
            Ok(records) => Ok(records.unwrap_or_default()),
            Err(e) => {
                warn!(
                    key = %self.key,
                    error = %e,
                    "stored records are corrupt, treating store as empty"
                );
                Ok(Vec::new())
            }
        }
    }

    /// Like [`try_load_all`](Self::try_load_all), but an unreadable backend
    /// also yields an empty collection. For display only.
    pub fn load_all(&self) -> Vec<StudentRecord> {
        self.try_load_all().unwrap_or_else(|e| {
            warn!(key = %self.key, error = %e, "could not read stored records");
            Vec::new()
        })
    }

    /// Replace the stored collection with `records`.
    pub fn save_all(&mut self, records: &[StudentRecord]) -> StoreResult<()> {
        let content = serde_json::to_string(records)?;
        self.backend.set(&self.key, &content)?;
        debug!(count = records.len(), "saved records");
        Ok(())
    }

    pub fn count(&self) -> StoreResult<usize> {
        Ok(self.try_load_all()?.len())
    }

    pub fn find_by_id(&self, id: &str) -> StoreResult<Option<StudentRecord>> {
        Ok(self.try_load_all()?.into_iter().find(|r| r.id == id))
    }

    /// Append a record.
    pub fn insert(&mut self, record: StudentRecord) -> StoreResult<()> {
        let mut records = self.try_load_all()?;
        records.push(record);
        self.save_all(&records)
    }

    /// Replace the record with the same id in place. Returns `false` if absent.
    pub fn replace(&mut self, record: StudentRecord) -> StoreResult<bool> {
        let mut records = self.try_load_all()?;
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(slot) => {
                *slot = record;
                self.save_all(&records)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove the record with `id`. Returns `false` if absent.
    pub fn delete_by_id(&mut self, id: &str) -> StoreResult<bool> {
        let mut records = self.try_load_all()?;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Ok(false);
        }
        self.save_all(&records)?;
        Ok(true)
    }

    /// Remove the whole collection.
    pub fn clear(&mut self) -> StoreResult<()> {
        self.backend.remove(&self.key)?;
        debug!(key = %self.key, "cleared store");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::models::StudentForm;
    use chrono::{TimeZone, Utc};
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    fn record(id: &str, roll_no: &str, email: &str) -> StudentRecord {
        let form = StudentForm {
            first_name: "Asha".into(),
            last_name: "Rao".into(),
            email: email.into(),
            phone: "9876543210".into(),
            dob: "2004-05-01".into(),
            gender: "Female".into(),
            course: "B.Tech".into(),
            year: "1st Year".into(),
            roll_no: roll_no.into(),
            ..StudentForm::default()
        };
        let at = Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap();
        StudentRecord::from_form(id, form, at, None)
    }

    #[test]
    fn test_empty_store_loads_empty() {
        let store = RecordStore::in_memory();
        assert!(store.load_all().is_empty());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_corrupt_data_fails_soft() {
        let store = RecordStore::new(MemoryStorage::new().with_value(DB_KEY, "{not json"));
        assert!(store.load_all().is_empty());

        let store = RecordStore::new(MemoryStorage::new().with_value(DB_KEY, "null"));
        assert!(store.load_all().is_empty());

        let store = RecordStore::new(MemoryStorage::new().with_value(DB_KEY, r#"[{"id": 1}]"#));
        assert!(store.load_all().is_empty());
    }

    #[test]
    fn test_save_load_round_trip_preserves_order() {
        let mut store = RecordStore::in_memory();
        let records = vec![
            record("S3", "CS103", "c@x.com"),
            record("S1", "CS101", "a@x.com"),
            record("S2", "CS102", "b@x.com"),
        ];
        store.save_all(&records).unwrap();

        assert_eq!(store.load_all(), records);
        // Idempotent without intervening writes
        assert_eq!(store.load_all(), store.load_all());
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut store = RecordStore::in_memory();
        store.insert(record("S1", "CS101", "a@x.com")).unwrap();
        store.insert(record("S2", "CS102", "b@x.com")).unwrap();

        let mut edited = record("S1", "CS101", "a@x.com");
        edited.last_name = "Iyer".into();
        assert!(store.replace(edited).unwrap());

        let all = store.load_all();
        assert_eq!(all[0].id, "S1");
        assert_eq!(all[0].last_name, "Iyer");
        assert_eq!(all[1].id, "S2");

        assert!(!store.replace(record("S9", "CS109", "z@x.com")).unwrap());
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_delete_and_clear() {
        let mut store = RecordStore::in_memory();
        store.insert(record("S1", "CS101", "a@x.com")).unwrap();
        store.insert(record("S2", "CS102", "b@x.com")).unwrap();

        assert!(store.delete_by_id("S1").unwrap());
        assert!(!store.delete_by_id("S1").unwrap());
        assert!(store.find_by_id("S1").unwrap().is_none());
        assert_eq!(store.count().unwrap(), 1);

        store.clear().unwrap();
        assert!(store.load_all().is_empty());
    }

    #[test]
    fn test_file_backed_store_persists_across_instances() {
        let dir = tempdir().unwrap();
        let mut store = RecordStore::new(FileStorage::new(dir.path()));
        store.insert(record("S1", "CS101", "a@x.com")).unwrap();

        let reopened = RecordStore::new(FileStorage::new(dir.path()));
        let found = reopened.find_by_id("S1").unwrap();
        assert_eq!(found.map(|r| r.roll_no), Some("CS101".into()));
    }

    #[test]
    fn test_unwritable_storage_surfaces_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();

        let mut store = RecordStore::new(FileStorage::new(&blocker));
        let err = store.insert(record("S1", "CS101", "a@x.com")).unwrap_err();
        assert!(err.to_string().contains("Storage unavailable"));
    }

    #[test]
    fn test_unreadable_backend_is_an_error_not_empty() {
        let backend = UnreadableStorage::default();
        let written = backend.value.clone();
        let mut store = RecordStore::new(backend);
        store.save_all(&[record("S1", "CS101", "a@x.com")]).unwrap();

        let err = store.try_load_all().unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(store.count().is_err());
        assert!(store.find_by_id("S1").is_err());
        assert!(store.delete_by_id("S1").is_err());

        // A write must not replace records it could not read
        assert!(store.insert(record("S2", "CS102", "b@x.com")).is_err());
        let kept = written.lock().unwrap().clone().unwrap();
        assert!(kept.contains("S1"));
        assert!(!kept.contains("S2"));

        // Display reads still degrade to empty
        assert!(store.load_all().is_empty());
    }

    /// Accepts writes but fails every read.
    #[derive(Default)]
    struct UnreadableStorage {
        value: Arc<Mutex<Option<String>>>,
    }

    impl StorageBackend for UnreadableStorage {
        fn get(&self, _key: &str) -> StoreResult<Option<String>> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read denied").into())
        }

        fn set(&mut self, _key: &str, value: &str) -> StoreResult<()> {
            *self.value.lock().unwrap() = Some(value.to_string());
            Ok(())
        }

        fn remove(&mut self, _key: &str) -> StoreResult<()> {
            *self.value.lock().unwrap() = None;
            Ok(())
        }
    }
}
