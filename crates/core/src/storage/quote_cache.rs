use std::sync::{Arc, Mutex};

use crate::errors::CoreError;
use crate::models::quote::QuoteMap;

use super::kv::KeyValueStore;

/// Last successful quote snapshot, persisted as JSON under a single key.
///
/// Writes replace the whole snapshot; there is no merge, expiry or
/// versioning. The mutex keeps read/replace pairs from interleaving when
/// several fetchers share one store; the last writer wins.
pub struct QuoteCache {
    store: Arc<dyn KeyValueStore>,
    key: String,
    lock: Mutex<()>,
}

impl QuoteCache {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the stored snapshot. Missing or corrupt entries read as empty.
    pub fn load(&self) -> QuoteMap {
        match self.try_load() {
            Ok(quotes) => quotes,
            Err(e) => {
                log::warn!("Ignoring unreadable quote cache {:?}: {e}", self.key);
                QuoteMap::new()
            }
        }
    }

    /// Like `load`, but surfaces storage and parse errors.
    pub fn try_load(&self) -> Result<QuoteMap, CoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        match self.store.get(&self.key)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(QuoteMap::new()),
        }
    }

    /// Replace the stored snapshot with `quotes`.
    pub fn replace(&self, quotes: &QuoteMap) -> Result<(), CoreError> {
        let json =
            serde_json::to_string(quotes).map_err(|e| CoreError::Serialization(e.to_string()))?;
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.store.set(&self.key, &json)
    }
}
