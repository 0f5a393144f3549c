//! Repository Layer - Core Traits
//!
//! Defines the storage interface the sync core writes through.
//! Implementations can use SQLite, in-memory, etc.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::{SyncError, SyncResult};

/// Named storage slots holding opaque text
#[async_trait]
pub trait PersistedStore: Send + Sync {
    /// Read a slot; `Ok(None)` when it was never written
    async fn load(&self, slot: &str) -> SyncResult<Option<String>>;

    /// Replace the whole content of a slot
    async fn save(&self, slot: &str, value: &str) -> SyncResult<()>;
}

/// Read and decode a JSON slot.
///
/// Absent and corrupt content both come back as `Ok(None)` (corruption is logged).
/// A failed read is an error: the slot may still hold data and must not be overwritten.
pub async fn load_json<T: DeserializeOwned>(
    store: &dyn PersistedStore,
    slot: &str,
) -> SyncResult<Option<T>> {
    let Some(raw) = store.load(slot).await? else {
        return Ok(None);
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            log::warn!("Discarding corrupt content in slot '{}': {}", slot, e);
            Ok(None)
        }
    }
}

/// Encode a value as JSON and write it to a slot
pub async fn save_json<T: Serialize + ?Sized>(
    store: &dyn PersistedStore,
    slot: &str,
    value: &T,
) -> SyncResult<()> {
    let raw = serde_json::to_string(value)
        .map_err(|e| SyncError::Persistence(format!("Failed to encode slot '{}': {}", slot, e)))?;
    store.save(slot, &raw).await
}
