//! Cache database connection management

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tokio::fs;
use tracing::info;

use huddle_config::CacheConfig;

use crate::error::{CacheError, CacheResult};

/// Prepare and establish a cache database connection
pub async fn prepare_database(config: &CacheConfig) -> CacheResult<SqlitePool> {
    ensure_sqlite_path(&config.url).await?;

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections.max(1))
        .connect(&config.url)
        .await?;

    // WAL keeps readers from blocking the writer
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    info!(url = %config.url, "cache database connection established");
    Ok(pool)
}

/// Ensure the SQLite database file and directory exist
async fn ensure_sqlite_path(url: &str) -> CacheResult<()> {
    let Some(sqlite_path) = url.strip_prefix("sqlite://") else {
        return Ok(());
    };

    if sqlite_path == ":memory:" {
        return Ok(());
    }

    let io_error = |path: &Path, source| CacheError::Io {
        path: path.display().to_string(),
        source,
    };

    let path = Path::new(sqlite_path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| io_error(parent, source))?;
        }
    }

    if fs::metadata(path).await.is_err() {
        fs::OpenOptions::new()
            .create(true)
            .write(true)
            .open(path)
            .await
            .map_err(|source| io_error(path, source))?;
    }

    Ok(())
}
