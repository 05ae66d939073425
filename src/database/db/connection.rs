use std::path::PathBuf;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::error::Result;

/// Open (and create if needed) the configured SQLite database.
pub async fn get_db_pool(config: &DatabaseConfig) -> Result<Pool<Sqlite>> {
    if let Some(parent) = database_file_path(&config.url).and_then(|p| p.parent().map(PathBuf::from)) {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(&parent)?;
            debug!(path = %parent.display(), "created database directory");
        }
    }

    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    info!(url = %config.url, "connected to database");
    Ok(pool)
}

/// A private in-memory database. A single connection that never expires keeps
/// the data alive for as long as the pool.
pub async fn memory_pool() -> Result<Pool<Sqlite>> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// File path behind a `sqlite:` URL, or `None` for in-memory databases.
pub fn database_file_path(url: &str) -> Option<PathBuf> {
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        None
    } else {
        Some(PathBuf::from(path))
    }
}
