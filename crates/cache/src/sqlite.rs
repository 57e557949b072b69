//! SQLite-backed cache store.

use async_trait::async_trait;
use huddle_chats::Message;
use huddle_config::CacheConfig;
use sqlx::{Row, SqlitePool};
use tracing::{debug, warn};

use crate::connection::prepare_database;
use crate::error::CacheResult;
use crate::migrations::run_migrations;
use crate::CacheStore;

/// Durable cache that survives process restarts
#[derive(Clone)]
pub struct SqliteCacheStore {
    pool: SqlitePool,
}

impl SqliteCacheStore {
    /// Open the database named by the configuration and apply migrations
    pub async fn open(config: &CacheConfig) -> CacheResult<Self> {
        let pool = prepare_database(config).await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl CacheStore for SqliteCacheStore {
    async fn load(&self, channel_id: &str) -> CacheResult<Option<Vec<Message>>> {
        let row = sqlx::query("SELECT messages FROM channel_cache WHERE channel_id = ?")
            .bind(channel_id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            debug!(channel_id, "no cache record");
            return Ok(None);
        };

        let raw: String = row.try_get("messages")?;
        match serde_json::from_str::<Vec<Message>>(&raw) {
            Ok(messages) => {
                debug!(channel_id, count = messages.len(), "loaded cache record");
                Ok(Some(messages))
            }
            Err(error) => {
                warn!(channel_id, %error, "discarding cache record that no longer decodes");
                Ok(None)
            }
        }
    }

    async fn store(&self, channel_id: &str, messages: &[Message]) -> CacheResult<()> {
        let encoded = serde_json::to_string(messages)?;
        let count = i64::try_from(messages.len()).unwrap_or(i64::MAX);
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO channel_cache (channel_id, messages, message_count, updated_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(channel_id) DO UPDATE SET
                messages = excluded.messages,
                message_count = excluded.message_count,
                updated_at = excluded.updated_at",
        )
        .bind(channel_id)
        .bind(&encoded)
        .bind(count)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        debug!(channel_id, count, "stored cache record");
        Ok(())
    }

    async fn remove(&self, channel_id: &str) -> CacheResult<()> {
        sqlx::query("DELETE FROM channel_cache WHERE channel_id = ?")
            .bind(channel_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
