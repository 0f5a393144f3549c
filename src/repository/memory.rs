//! In-memory slot storage, lost when the process exits.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::domain::SyncResult;
use super::traits::PersistedStore;

#[derive(Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersistedStore for MemoryStore {
    async fn load(&self, slot: &str) -> SyncResult<Option<String>> {
        Ok(self.slots.lock().await.get(slot).cloned())
    }

    async fn save(&self, slot: &str, value: &str) -> SyncResult<()> {
        self.slots.lock().await.insert(slot.to_string(), value.to_string());
        Ok(())
    }
}
