//! Persisted visit-history state.
//!
//! The only cross-session state in the system is a single key-value pair
//! recording whether this client has been seen before. The store is an
//! injected seam so tests and storage-disabled environments never touch the
//! filesystem. Every failure here is recoverable: a failed read classifies
//! the session as a first visit, a failed write is logged and dropped.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

/// Key under which the visit flag is persisted.
pub const VISITED_KEY: &str = "2s6y_visited";

/// Value written once a first visit completes.
pub const VISITED_VALUE: &str = "true";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read visit state from {path}: {source}")]
    Read {
        path: PathBuf,
        source: io::Error,
    },
    #[error("failed to write visit state to {path}: {source}")]
    Write {
        path: PathBuf,
        source: io::Error,
    },
    #[error("visit state at {path} is not valid JSON: {source}")]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("visit storage is unavailable")]
    Unavailable,
}

/// Injected key-value persistence for the visit flag.
pub trait VisitStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory store for tests and storage-disabled sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl VisitStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// File-backed store holding one JSON object of string entries.
///
/// Reads tolerate a missing file (empty state). Writes go through a temp
/// file in the target directory followed by a rename, so a crash mid-write
/// never leaves a truncated document behind.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_entries(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source: err,
                });
            }
        };
        serde_json::from_str(&content).map_err(|err| StoreError::Decode {
            path: self.path.clone(),
            source: err,
        })
    }

    fn write_err(&self, source: io::Error) -> StoreError {
        StoreError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

impl VisitStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load_entries()?.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        // A document that no longer parses is unrecoverable state; start over
        // rather than refusing the write.
        let mut entries = match self.load_entries() {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!("Discarding unreadable visit state: {err}");
                BTreeMap::new()
            }
        };
        entries.insert(key.to_string(), value.to_string());

        let json = serde_json::to_string_pretty(&entries).map_err(|err| StoreError::Decode {
            path: self.path.clone(),
            source: err,
        })?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| self.write_err(err))?;
        }
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir).map_err(|err| self.write_err(err))?;
        tmp.write_all(json.as_bytes())
            .map_err(|err| self.write_err(err))?;
        tmp.persist(&self.path)
            .map_err(|err| self.write_err(err.error))?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    use super::{StoreError, VisitStore};

    /// Store handle tests can keep after handing a clone to the gate.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct SharedStore {
        inner: Arc<Mutex<Inner>>,
    }

    #[derive(Debug, Default)]
    struct Inner {
        entries: BTreeMap<String, String>,
        set_calls: usize,
    }

    impl SharedStore {
        pub(crate) fn preset(key: &str, value: &str) -> Self {
            let store = Self::default();
            store
                .inner
                .lock()
                .expect("store lock")
                .entries
                .insert(key.to_string(), value.to_string());
            store
        }

        pub(crate) fn value(&self, key: &str) -> Option<String> {
            self.inner
                .lock()
                .expect("store lock")
                .entries
                .get(key)
                .cloned()
        }

        pub(crate) fn set_calls(&self) -> usize {
            self.inner.lock().expect("store lock").set_calls
        }
    }

    impl VisitStore for SharedStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            Ok(self.value(key))
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            let mut inner = self.inner.lock().expect("store lock");
            inner.set_calls += 1;
            inner.entries.insert(key.to_string(), value.to_string());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn memory_store_round_trips() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get(VISITED_KEY).expect("get"), None);
        store.set(VISITED_KEY, VISITED_VALUE).expect("set");
        assert_eq!(
            store.get(VISITED_KEY).expect("get"),
            Some(VISITED_VALUE.to_string())
        );
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempdir().expect("temp dir");
        let store = JsonFileStore::new(dir.path().join("state.json"));
        assert_eq!(store.get(VISITED_KEY).expect("get"), None);
    }

    #[test]
    fn file_store_round_trips() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("state.json");
        let mut store = JsonFileStore::new(&path);
        store.set(VISITED_KEY, VISITED_VALUE).expect("set");

        // A fresh handle sees the persisted entry.
        let store = JsonFileStore::new(&path);
        assert_eq!(
            store.get(VISITED_KEY).expect("get"),
            Some(VISITED_VALUE.to_string())
        );
    }

    #[test]
    fn set_creates_missing_parent_directories() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("deeper").join("state.json");
        let mut store = JsonFileStore::new(&path);
        store.set(VISITED_KEY, VISITED_VALUE).expect("set");
        assert!(path.exists());
    }

    #[test]
    fn corrupt_document_fails_reads_but_not_writes() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("state.json");
        fs::write(&path, "not json").expect("seed corrupt file");

        let mut store = JsonFileStore::new(&path);
        assert!(matches!(
            store.get(VISITED_KEY),
            Err(StoreError::Decode { .. })
        ));

        // The write replaces the corrupt document instead of failing.
        store.set(VISITED_KEY, VISITED_VALUE).expect("set");
        assert_eq!(
            store.get(VISITED_KEY).expect("get"),
            Some(VISITED_VALUE.to_string())
        );
    }

    #[test]
    fn set_preserves_other_entries() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("state.json");
        let mut store = JsonFileStore::new(&path);
        store.set("other", "kept").expect("set");
        store.set(VISITED_KEY, VISITED_VALUE).expect("set");
        assert_eq!(store.get("other").expect("get"), Some("kept".to_string()));
    }
}
