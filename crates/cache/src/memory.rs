//! Process-local cache store.

use std::collections::HashMap;

use async_trait::async_trait;
use huddle_chats::Message;
use tokio::sync::RwLock;

use crate::error::CacheResult;
use crate::CacheStore;

#[derive(Default)]
pub struct MemoryCacheStore {
    records: RwLock<HashMap<String, Vec<Message>>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly, bypassing the trait
    pub async fn seed(&self, channel_id: impl Into<String>, messages: Vec<Message>) {
        self.records.write().await.insert(channel_id.into(), messages);
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn load(&self, channel_id: &str) -> CacheResult<Option<Vec<Message>>> {
        Ok(self.records.read().await.get(channel_id).cloned())
    }

    async fn store(&self, channel_id: &str, messages: &[Message]) -> CacheResult<()> {
        self.records
            .write()
            .await
            .insert(channel_id.to_string(), messages.to_vec());
        Ok(())
    }

    async fn remove(&self, channel_id: &str) -> CacheResult<()> {
        self.records.write().await.remove(channel_id);
        Ok(())
    }
}
