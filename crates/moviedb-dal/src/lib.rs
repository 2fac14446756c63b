pub mod error;
pub mod genre;
pub mod movie;

use std::str::FromStr as _;

pub use error::Error;
pub use sqlx::Error as SqlxError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{debug, info};

use crate::error::Result;

pub type ChosenDB = sqlx::Sqlite;
pub type Pool = sqlx::Pool<ChosenDB>;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

pub async fn new_pool(database_url: &str) -> Result<Pool, Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.foreign_keys(true);
    if database_url.contains(":memory:") {
        return memory_pool(options).await;
    }
    let pool = SqlitePoolOptions::new()
        .max_connections(50)
        .connect_with(options.create_if_missing(true))
        .await?;
    Ok(pool)
}

/// Pool over a private in-memory database.
pub async fn new_memory_pool() -> Result<Pool, Error> {
    new_pool("sqlite::memory:").await
}

// Every SQLite in-memory connection sees its own database, so the pool is pinned
// to a single connection which is never recycled.
async fn memory_pool(options: SqliteConnectOptions) -> Result<Pool, Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Creates missing tables, existing data is kept.
pub async fn migrate(pool: &Pool) -> Result<()> {
    MIGRATOR.run(pool).await?;
    debug!("Database schema is up to date");
    Ok(())
}

/// Drops both tables (and migration bookkeeping) and creates them again empty.
pub async fn reset_schema(pool: &Pool) -> Result<()> {
    sqlx::raw_sql(
        "DROP TABLE IF EXISTS movies; DROP TABLE IF EXISTS genres; DROP TABLE IF EXISTS _sqlx_migrations;",
    )
    .execute(pool)
    .await?;
    info!("Dropped existing movies and genres tables");
    migrate(pool).await
}

pub async fn ping(pool: &Pool) -> Result<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
