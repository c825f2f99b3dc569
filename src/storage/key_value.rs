//! Key-value namespaces: in-memory and JSON file backed

use crate::storage::error::{StoreError, StoreResult};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A named, durable key-value namespace holding floating-point entries
pub trait KeyValueStore: Send {
    /// Name of the namespace
    fn namespace(&self) -> &str;

    /// Read several keys from one consistent snapshot
    fn get_many(&self, keys: &[&str]) -> StoreResult<Vec<Option<f64>>>;

    /// Write all entries or none of them
    fn commit(&mut self, entries: &[(&str, f64)]) -> StoreResult<()>;

    /// Remove keys in one commit
    fn remove(&mut self, keys: &[&str]) -> StoreResult<()>;

    /// Read a single key
    fn get(&self, key: &str) -> StoreResult<Option<f64>> {
        Ok(self.get_many(&[key])?.into_iter().next().flatten())
    }

    /// Check whether a key is present
    fn contains(&self, key: &str) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// In-process namespace, mainly for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryStore {
    namespace: String,
    entries: BTreeMap<String, f64>,
    read_only: bool,
    commit_count: u32,
}

impl MemoryStore {
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            ..Default::default()
        }
    }

    /// Reject all further commits, simulating a failing backing medium
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Number of successful commits
    pub fn commit_count(&self) -> u32 {
        self.commit_count
    }

    /// Insert an entry directly, bypassing commit semantics
    pub fn insert_raw(&mut self, key: &str, value: f64) {
        self.entries.insert(key.to_string(), value);
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.read_only {
            return Err(StoreError::Write {
                namespace: self.namespace.clone(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "namespace is read-only"),
            });
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn get_many(&self, keys: &[&str]) -> StoreResult<Vec<Option<f64>>> {
        Ok(keys.iter().map(|key| self.entries.get(*key).copied()).collect())
    }

    fn commit(&mut self, entries: &[(&str, f64)]) -> StoreResult<()> {
        self.check_writable()?;
        for (key, value) in entries {
            self.entries.insert((*key).to_string(), *value);
        }
        self.commit_count += 1;
        Ok(())
    }

    fn remove(&mut self, keys: &[&str]) -> StoreResult<()> {
        self.check_writable()?;
        for key in keys {
            self.entries.remove(*key);
        }
        self.commit_count += 1;
        Ok(())
    }
}

/// Namespace persisted as one JSON object in `<dir>/<namespace>.json`.
///
/// Commits go to a temporary file in the same directory which is then renamed over the
/// target, so a reader sees either the previous or the new document, never a mix.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    namespace: String,
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open (or lazily create) a namespace inside `dir`
    pub fn open<P: AsRef<Path>>(dir: P, namespace: &str) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Write {
            namespace: namespace.to_string(),
            source,
        })?;

        Ok(Self {
            namespace: namespace.to_string(),
            dir,
        })
    }

    /// Location of the namespace document
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.namespace))
    }

    fn read_document(&self) -> StoreResult<BTreeMap<String, f64>> {
        let content = match fs::read_to_string(self.path()) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StoreError::Read {
                    namespace: self.namespace.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&content).map_err(|source| StoreError::Corrupted {
            namespace: self.namespace.clone(),
            source,
        })
    }

    fn write_document(&self, document: &BTreeMap<String, f64>) -> StoreResult<()> {
        let write_err = |source: io::Error| StoreError::Write {
            namespace: self.namespace.clone(),
            source,
        };

        let content = serde_json::to_vec_pretty(document)
            .map_err(|e| write_err(io::Error::new(io::ErrorKind::InvalidData, e)))?;

        let mut staged = tempfile::NamedTempFile::new_in(&self.dir).map_err(write_err)?;
        staged.write_all(&content).map_err(write_err)?;
        staged.as_file().sync_all().map_err(write_err)?;
        staged.persist(self.path()).map_err(|e| write_err(e.error))?;

        debug!(namespace = %self.namespace, entries = document.len(), "namespace committed");
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn get_many(&self, keys: &[&str]) -> StoreResult<Vec<Option<f64>>> {
        let document = self.read_document()?;
        Ok(keys.iter().map(|key| document.get(*key).copied()).collect())
    }

    fn commit(&mut self, entries: &[(&str, f64)]) -> StoreResult<()> {
        let mut document = self.read_document()?;
        for (key, value) in entries {
            document.insert((*key).to_string(), *value);
        }
        self.write_document(&document)
    }

    fn remove(&mut self, keys: &[&str]) -> StoreResult<()> {
        let mut document = self.read_document()?;
        for key in keys {
            document.remove(*key);
        }
        self.write_document(&document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_store_commit() {
        let mut store = MemoryStore::new("prefs");
        store.commit(&[("a", 1.5), ("b", -2.25)]).unwrap();

        assert_eq!(store.get("a").unwrap(), Some(1.5));
        assert_eq!(store.get_many(&["b", "c"]).unwrap(), vec![Some(-2.25), None]);
        assert!(store.contains("a").unwrap());
        assert!(!store.contains("c").unwrap());
        assert_eq!(store.commit_count(), 1);
    }

    #[test]
    fn test_memory_store_read_only() {
        let mut store = MemoryStore::new("prefs");
        store.commit(&[("a", 1.0)]).unwrap();
        store.set_read_only(true);

        let err = store.commit(&[("a", 2.0), ("b", 3.0)]).unwrap_err();
        assert!(err.is_write_failure());
        assert_eq!(store.get_many(&["a", "b"]).unwrap(), vec![Some(1.0), None]);
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(dir.path(), "prefs").unwrap();

        assert_eq!(store.get("a").unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempdir().unwrap();
        let mut store = JsonFileStore::open(dir.path(), "prefs").unwrap();
        store.commit(&[("lat", 52.52), ("lon", 13.405)]).unwrap();

        let reopened = JsonFileStore::open(dir.path(), "prefs").unwrap();
        assert_eq!(
            reopened.get_many(&["lat", "lon"]).unwrap(),
            vec![Some(52.52), Some(13.405)]
        );
    }

    #[test]
    fn test_file_store_remove() {
        let dir = tempdir().unwrap();
        let mut store = JsonFileStore::open(dir.path(), "prefs").unwrap();
        store.commit(&[("lat", 1.0), ("lon", 2.0)]).unwrap();
        store.remove(&["lat"]).unwrap();

        assert_eq!(store.get_many(&["lat", "lon"]).unwrap(), vec![None, Some(2.0)]);
    }

    #[test]
    fn test_file_store_leaves_no_staging_files() {
        let dir = tempdir().unwrap();
        let mut store = JsonFileStore::open(dir.path(), "prefs").unwrap();
        store.commit(&[("a", 1.0)]).unwrap();
        store.commit(&[("a", 2.0)]).unwrap();

        let files: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_file_store_corrupted_document() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(dir.path(), "prefs").unwrap();
        fs::write(store.path(), "not json").unwrap();

        assert!(matches!(store.get("a"), Err(StoreError::Corrupted { .. })));
    }
}
