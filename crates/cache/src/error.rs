use thiserror::Error;

pub type CacheResult<T> = Result<T, CacheError>;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("cache migrations failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("failed to prepare cache file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode cache record: {0}")]
    Encode(#[from] serde_json::Error),
}
