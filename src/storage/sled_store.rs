//! On-disk [`KeyValueStore`] backed by an embedded `sled` database

use crate::error::{Result, WellscopeError};
use crate::storage::KeyValueStore;
use std::path::Path;

/// Quota-bounded persistent string store
///
/// # Examples
///
/// ```
/// use wellscope::storage::{KeyValueStore, SledStore};
///
/// # fn main() -> wellscope::error::Result<()> {
/// let dir = tempfile::tempdir()?;
/// let store = SledStore::open(dir.path().join("session.db"), 1024)?;
/// store.set("greeting", "hello")?;
/// assert_eq!(store.get("greeting")?.as_deref(), Some("hello"));
/// # Ok(())
/// # }
/// ```
pub struct SledStore {
    db: sled::Db,
    quota_bytes: usize,
}

impl SledStore {
    /// Open or create the store at `path`
    ///
    /// # Errors
    ///
    /// Returns `WellscopeError::Storage` if the database cannot be opened
    pub fn open(path: impl AsRef<Path>, quota_bytes: usize) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                WellscopeError::Storage(format!("Failed to create store directory: {}", e))
            })?;
        }
        let db = sled::open(path)
            .map_err(|e| WellscopeError::Storage(format!("Failed to open database: {}", e)))?;
        Ok(Self { db, quota_bytes })
    }

    /// Bytes held by every key except `key`
    fn used_bytes_excluding(&self, key: &str) -> Result<usize> {
        let mut total = 0;
        for entry in self.db.iter() {
            let (k, v) =
                entry.map_err(|e| WellscopeError::Storage(format!("Iteration failed: {}", e)))?;
            if k.as_ref() != key.as_bytes() {
                total += k.len() + v.len();
            }
        }
        Ok(total)
    }
}

impl KeyValueStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self
            .db
            .get(key.as_bytes())
            .map_err(|e| WellscopeError::Storage(format!("Get failed: {}", e)))?
        {
            Some(bytes) => {
                let text = String::from_utf8(bytes.to_vec())
                    .map_err(|e| WellscopeError::Storage(format!("Stored value is not UTF-8: {}", e)))?;
                Ok(Some(text))
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let needed = self.used_bytes_excluding(key)? + key.len() + value.len();
        if needed > self.quota_bytes {
            return Err(WellscopeError::QuotaExceeded {
                needed,
                quota: self.quota_bytes,
            }
            .into());
        }

        self.db
            .insert(key.as_bytes(), value.as_bytes())
            .map_err(|e| WellscopeError::Storage(format!("Insert failed: {}", e)))?;

        self.db
            .flush()
            .map_err(|e| WellscopeError::Storage(format!("Flush failed: {}", e)))?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.db
            .remove(key.as_bytes())
            .map_err(|e| WellscopeError::Storage(format!("Remove failed: {}", e)))?;
        self.db
            .flush()
            .map_err(|e| WellscopeError::Storage(format!("Flush failed: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store(quota: usize) -> (SledStore, TempDir) {
        let dir = TempDir::new().expect("failed to create tempdir");
        let store = SledStore::open(dir.path().join("nested").join("session.db"), quota)
            .expect("failed to open store");
        (store, dir)
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let (_store, dir) = create_test_store(1024);
        assert!(dir.path().join("nested").exists());
    }

    #[test]
    fn test_set_and_get_roundtrip() {
        let (store, _dir) = create_test_store(1024);
        store.set("wellscope.ui-session.v1", "{\"a\":1}").unwrap();
        assert_eq!(
            store.get("wellscope.ui-session.v1").unwrap().as_deref(),
            Some("{\"a\":1}")
        );
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.db");
        {
            let store = SledStore::open(&path, 1024).unwrap();
            store.set("k", "persisted").unwrap();
        }
        let reopened = SledStore::open(&path, 1024).unwrap();
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("persisted"));
    }

    #[test]
    fn test_quota_rejects_oversized_write() {
        let (store, _dir) = create_test_store(32);
        store.set("a", "small").unwrap();
        let err = store.set("b", &"x".repeat(64)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WellscopeError>(),
            Some(WellscopeError::QuotaExceeded { .. })
        ));
        assert!(store.get("b").unwrap().is_none());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (store, _dir) = create_test_store(1024);
        store.set("k", "v").unwrap();
        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert!(store.get("k").unwrap().is_none());
    }
}
