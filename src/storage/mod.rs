//! Local session persistence
//!
//! A string-keyed, size-bounded store holding JSON snapshots of the UI
//! session and of each well's chat. Persistence is best-effort:
//! [`PersistenceCodec`] never returns an error to its caller. Writes report a
//! [`SaveOutcome`], reads collapse every failure into `None`.

pub mod memory;
pub mod sled_store;

pub use memory::MemoryStore;
pub use sled_store::SledStore;

use crate::api::WellId;
use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Key of the UI session snapshot
pub const UI_SESSION_KEY: &str = "wellscope.ui-session.v1";

/// Prefix of the per-well chat session keys
pub const CHAT_SESSION_PREFIX: &str = "wellscope.chat-session.v1.";

/// Storage key of a well's chat session
pub fn chat_session_key(well_id: WellId) -> String {
    format!("{}{}", CHAT_SESSION_PREFIX, well_id)
}

/// Raw string storage backing the codec
///
/// Implementations enforce their own byte quota and fail writes that would
/// exceed it with [`crate::error::WellscopeError::QuotaExceeded`].
pub trait KeyValueStore: Send + Sync {
    /// Stored text for `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`; deleting a missing key succeeds
    fn remove(&self, key: &str) -> Result<()>;
}

/// What happened to a best-effort write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The value is now in the store
    Saved,
    /// The write failed and was discarded
    Dropped,
}

impl SaveOutcome {
    pub fn is_saved(self) -> bool {
        self == Self::Saved
    }
}

/// JSON codec over a [`KeyValueStore`] with a no-throw contract
#[derive(Clone)]
pub struct PersistenceCodec {
    store: Arc<dyn KeyValueStore>,
}

impl PersistenceCodec {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Serialize `value` and write it under `key`
    ///
    /// Serialization failures, disabled storage and quota overruns are
    /// logged and reported as [`SaveOutcome::Dropped`].
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> SaveOutcome {
        let text = match serde_json::to_string(value) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(key, "Failed to serialize snapshot: {}", e);
                return SaveOutcome::Dropped;
            }
        };

        match self.store.set(key, &text) {
            Ok(()) => {
                tracing::debug!(key, bytes = text.len(), "Snapshot saved");
                SaveOutcome::Saved
            }
            Err(e) => {
                tracing::warn!(key, "Snapshot write dropped: {}", e);
                SaveOutcome::Dropped
            }
        }
    }

    /// Read and decode the value under `key`
    ///
    /// Returns `None` when the key is missing, the store fails, the text is
    /// not JSON, the JSON is neither an object nor an array, or it does not
    /// match `T`.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let text = match self.store.get(key) {
            Ok(Some(text)) => text,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, "Snapshot read failed: {}", e);
                return None;
            }
        };

        let value: serde_json::Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, "Ignoring unparsable snapshot: {}", e);
                return None;
            }
        };

        if !(value.is_object() || value.is_array()) {
            tracing::warn!(key, "Ignoring snapshot that is not an object or array");
            return None;
        }

        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!(key, "Ignoring malformed snapshot: {}", e);
                None
            }
        }
    }

    /// Delete `key`, best-effort
    pub fn remove(&self, key: &str) -> SaveOutcome {
        match self.store.remove(key) {
            Ok(()) => SaveOutcome::Saved,
            Err(e) => {
                tracing::warn!(key, "Snapshot removal dropped: {}", e);
                SaveOutcome::Dropped
            }
        }
    }
}

impl std::fmt::Debug for PersistenceCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceCodec").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::BTreeSet;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        curves: BTreeSet<String>,
    }

    fn codec_with(store: Arc<MemoryStore>) -> PersistenceCodec {
        PersistenceCodec::new(store)
    }

    #[test]
    fn test_chat_session_key_format() {
        assert_eq!(chat_session_key(42), "wellscope.chat-session.v1.42");
    }

    #[test]
    fn test_save_then_load_roundtrip_as_set() {
        let codec = codec_with(Arc::new(MemoryStore::new(1024)));
        let sample = Sample {
            name: "a".into(),
            curves: ["Y", "X"].iter().map(|s| s.to_string()).collect(),
        };
        assert_eq!(codec.save("k", &sample), SaveOutcome::Saved);
        let loaded: Sample = codec.load("k").unwrap();
        let expected: BTreeSet<String> = ["X", "Y"].iter().map(|s| s.to_string()).collect();
        assert_eq!(loaded.curves, expected);
    }

    #[test]
    fn test_load_missing_key_is_none() {
        let codec = codec_with(Arc::new(MemoryStore::new(1024)));
        assert!(codec.load::<Sample>("missing").is_none());
    }

    #[test]
    fn test_load_corrupt_text_is_none() {
        let store = Arc::new(MemoryStore::new(1024));
        store.set("k", "{\"name\": \"trunc").unwrap();
        let codec = codec_with(store);
        assert!(codec.load::<Sample>("k").is_none());
    }

    #[test]
    fn test_load_scalar_json_is_none() {
        let store = Arc::new(MemoryStore::new(1024));
        store.set("k", "42").unwrap();
        store.set("s", "\"text\"").unwrap();
        let codec = codec_with(store);
        assert!(codec.load::<serde_json::Value>("k").is_none());
        assert!(codec.load::<serde_json::Value>("s").is_none());
    }

    #[test]
    fn test_load_wrong_shape_is_none() {
        let store = Arc::new(MemoryStore::new(1024));
        store.set("k", "{\"unrelated\": true}").unwrap();
        let codec = codec_with(store);
        assert!(codec.load::<Sample>("k").is_none());
    }

    #[test]
    fn test_save_over_quota_is_dropped_not_error() {
        let store = Arc::new(MemoryStore::new(16));
        let codec = codec_with(store.clone());
        let outcome = codec.save("key", &"x".repeat(100));
        assert_eq!(outcome, SaveOutcome::Dropped);
        assert!(store.get("key").unwrap().is_none());
    }

    #[test]
    fn test_save_with_disabled_store_is_dropped() {
        let store = Arc::new(MemoryStore::new(1024));
        store.set_disabled(true);
        let codec = codec_with(store);
        assert!(!codec.save("k", &vec![1, 2, 3]).is_saved());
        assert!(codec.load::<Vec<i32>>("k").is_none());
    }

    #[test]
    fn test_remove_deletes_key() {
        let store = Arc::new(MemoryStore::new(1024));
        let codec = codec_with(store.clone());
        codec.save("k", &vec![1]);
        assert!(codec.remove("k").is_saved());
        assert!(store.get("k").unwrap().is_none());
    }
}
