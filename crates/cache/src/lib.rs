//! Durable per-channel message cache.
//!
//! One record per channel identifier holding the ordered message snapshot as
//! last known to the client. Records carry no schema version; a record that
//! no longer decodes is treated as absent.

mod connection;
mod error;
mod memory;
mod migrations;
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use huddle_chats::Message;
use huddle_config::CacheConfig;

pub use connection::prepare_database;
pub use error::{CacheError, CacheResult};
pub use memory::MemoryCacheStore;
pub use migrations::run_migrations;
pub use sqlite::SqliteCacheStore;

/// Key/value persistence of per-channel message lists.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Load the snapshot for a channel; `None` when nothing usable is cached.
    async fn load(&self, channel_id: &str) -> CacheResult<Option<Vec<Message>>>;

    /// Replace the snapshot for a channel.
    async fn store(&self, channel_id: &str, messages: &[Message]) -> CacheResult<()>;

    async fn remove(&self, channel_id: &str) -> CacheResult<()>;
}

/// Open the store described by the configuration.
pub async fn open_store(config: &CacheConfig) -> CacheResult<Arc<dyn CacheStore>> {
    if config.is_memory() {
        return Ok(Arc::new(MemoryCacheStore::new()));
    }

    let store = SqliteCacheStore::open(config).await?;
    Ok(Arc::new(store))
}
