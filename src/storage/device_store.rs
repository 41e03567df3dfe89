use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use dashmap::DashMap;

use crate::storage::{KeyValueStore, StoreError, WriteBatch};

/// Device-local store: a lock-free map of entries with optional file
/// persistence.
///
/// Reads go straight to the map. Writes funnel through [`KeyValueStore::commit`],
/// which holds a single lock while applying the batch and snapshotting to
/// disk, so one batch never interleaves with another. The snapshot is written
/// to a temp file and renamed over the previous one; the file on disk is
/// always a complete, consistent copy of the store.
pub struct DeviceStore {
    entries: DashMap<String, String>,
    path: Option<PathBuf>,
    commit_lock: Mutex<()>,
}

impl DeviceStore {
    /// Creates a store with no backing file, for tests and one-shot runs.
    pub fn in_memory() -> Self {
        Self {
            entries: DashMap::new(),
            path: None,
            commit_lock: Mutex::new(()),
        }
    }

    /// Opens a file-backed store, loading the existing snapshot if present.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = DashMap::new();

        if path.exists() {
            let raw = fs::read_to_string(&path)?;
            let snapshot: BTreeMap<String, String> = serde_json::from_str(&raw)?;

            for (key, value) in snapshot {
                entries.insert(key, value);
            }
        }

        Ok(Self {
            entries,
            path: Some(path),
            commit_lock: Mutex::new(()),
        })
    }

    fn persist(&self, path: &Path) -> Result<(), StoreError> {
        let snapshot: BTreeMap<String, String> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_string(&snapshot)?)?;
        fs::rename(&tmp, path)?;

        Ok(())
    }
}

impl KeyValueStore for DeviceStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let _guard = self
            .commit_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        for (key, value) in batch {
            self.entries.insert(key, value);
        }

        if let Some(path) = &self.path {
            self.persist(path)?;
        }

        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }
}
