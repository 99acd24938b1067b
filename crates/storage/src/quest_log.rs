use std::sync::Arc;

use crate::keys;
use crate::repository::{KeyValueStore, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Persisted quest completions: a JSON array of `questId-date` keys.
#[derive(Clone)]
pub struct QuestLog {
    kv: Arc<dyn KeyValueStore>,
}

impl QuestLog {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// # Errors
    ///
    /// Returns `StorageError` on backend failure or malformed JSON.
    pub async fn completed_keys(&self) -> Result<Option<Vec<String>>, StorageError> {
        let Some(raw) = self.kv.get(keys::QUESTS_COMPLETED).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw).map(Some).map_err(ser)
    }

    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    pub async fn save_completed_keys(&self, completed: &[String]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(completed).map_err(ser)?;
        self.kv.set(keys::QUESTS_COMPLETED, &raw).await
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
