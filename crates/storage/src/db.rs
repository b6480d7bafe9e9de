use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{self, SqliteConnectOptions, SqlitePool};
use tracing::info;

/// Open (or create) the bot database under `data_folder` and apply the
/// schema. Writes are best-effort; WAL keeps readers unblocked while the
/// alert monitor and handlers share the pool.
pub async fn connect(data_folder: &str) -> Result<SqlitePool, sqlx::Error> {
    std::fs::create_dir_all(data_folder)?;
    let db_path = format!("{}/bot_data.db", data_folder);

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path))?
        .create_if_missing(true)
        .journal_mode(sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlite::SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(30));

    let pool = SqlitePool::connect_with(options).await?;
    apply_schema(&pool).await?;
    info!("database ready at {}", db_path);
    Ok(pool)
}

/// In-memory database for tests.
pub async fn connect_in_memory() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
    let pool = SqlitePool::connect_with(options).await?;
    apply_schema(&pool).await?;
    Ok(pool)
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let schema = include_str!("../sql/schema.sql");
    for statement in schema.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
