use sqlx::{Pool, Sqlite};
use tracing::info;

use crate::error::Result;

/// Apply the migrations embedded from `./migrations`.
pub async fn run_migrations(pool: &Pool<Sqlite>) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("database migrations applied");
    Ok(())
}
