//! String key-value storage backends
//!
//! The settings store never talks to a concrete backend directly; it is
//! handed something implementing [`KeyValueStore`]. Values are opaque
//! strings, so callers own the serialization of whatever they keep here.

use crate::config::{StorageBackend, StorageConfig};
use crate::error::{Result, TariffError};
use crate::logging::{LogContext, StructuredLogger, get_logger, get_logger_with_context};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Get/set-by-key string storage
pub trait KeyValueStore: Send + Sync {
    /// Value stored under `key`, if any
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;

    /// Forget `key`; a missing key is not an error
    fn remove_item(&mut self, key: &str) -> Result<()>;
}

/// In-process store
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            items: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        self.items.remove(key);
        Ok(())
    }
}

/// Store persisted as a single JSON object of string values
///
/// The whole file is rewritten after every mutation. Two processes sharing a
/// file race with last-write-wins semantics.
pub struct FileStore {
    file_path: PathBuf,
    items: BTreeMap<String, String>,
    logger: StructuredLogger,
}

impl FileStore {
    /// Open the store at `path`, reading existing contents if the file exists
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file_path = path.as_ref().to_path_buf();
        let logger = get_logger_with_context(
            LogContext::new("storage").with_field("path", file_path.display().to_string()),
        );

        let items = if file_path.exists() {
            let contents = std::fs::read_to_string(&file_path)?;
            if contents.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&contents).map_err(|e| {
                    TariffError::storage(format!(
                        "{} is not a key-value JSON object: {}",
                        file_path.display(),
                        e
                    ))
                })?
            }
        } else {
            logger.info("No storage file found, starting empty");
            BTreeMap::new()
        };

        logger.debug(&format!("Loaded {} keys from disk", items.len()));
        Ok(Self {
            file_path,
            items,
            logger,
        })
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.file_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.items)?;
        std::fs::write(&self.file_path, contents)?;
        self.logger.debug("Saved storage file to disk");
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        if self.items.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Build the backend selected by configuration
pub fn open_backend(config: &StorageConfig) -> Result<Box<dyn KeyValueStore>> {
    let logger = get_logger("storage");
    match config.backend {
        StorageBackend::File => {
            logger.info(&format!("Using file storage at {}", config.path));
            Ok(Box::new(FileStore::open(&config.path)?))
        }
        StorageBackend::Memory => {
            logger.warn("Using in-memory storage; settings are lost on restart");
            Ok(Box::new(MemoryStore::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_set_get_remove() {
        let mut store = MemoryStore::new();
        assert!(store.get_item("a").unwrap().is_none());
        store.set_item("a", "1").unwrap();
        store.set_item("a", "2").unwrap();
        assert_eq!(store.get_item("a").unwrap().as_deref(), Some("2"));
        assert_eq!(store.len(), 1);
        store.remove_item("a").unwrap();
        store.remove_item("a").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let mut store = FileStore::open(&path).unwrap();
        store.set_item("solis_offpeak_start", "22").unwrap();
        store.set_item("gone", "x").unwrap();
        store.remove_item("gone").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get_item("solis_offpeak_start").unwrap().as_deref(),
            Some("22")
        );
        assert!(reopened.get_item("gone").unwrap().is_none());
    }

    #[test]
    fn file_store_rejects_non_object_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[1, 2, 3]").unwrap();
        let err = FileStore::open(tmp.path()).err().unwrap();
        assert!(matches!(err, TariffError::Storage { .. }));
    }

    #[test]
    fn file_store_treats_empty_file_as_empty() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let store = FileStore::open(tmp.path()).unwrap();
        assert!(store.get_item("anything").unwrap().is_none());
    }
}
