//! Cache schema migrations

use sqlx::SqlitePool;
use tracing::info;

use crate::error::CacheResult;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Run cache schema migrations
pub async fn run_migrations(pool: &SqlitePool) -> CacheResult<()> {
    MIGRATOR.run(pool).await?;
    info!("cache migrations applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::prepare_database;
    use huddle_config::CacheConfig;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_migrations_create_cache_table() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test_migrations.db");
        let config = CacheConfig {
            url: format!("sqlite://{}", db_path.display()),
            max_connections: 1,
        };

        let pool = prepare_database(&config).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let table: String = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'channel_cache'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(table, "channel_cache");

        // Applying twice is a no-op
        run_migrations(&pool).await.unwrap();
    }
}
