//! SQLite pool construction.
//!
//! Every connection gets the same session setup: foreign keys on, WAL
//! journaling, and a busy timeout matched to the pool's acquire timeout so
//! a briefly locked ward database backs off instead of erroring.

use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;

use wardstock_core::config::DatabaseConfig;

pub type DbPool = sqlx::SqlitePool;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

// SQLITE_BUSY retries should never outlast a human waiting on a chat reply.
const BUSY_TIMEOUT_CAP_MS: u64 = 30_000;

pub async fn connect(database_url: &str) -> Result<DbPool, sqlx::Error> {
    connect_with_settings(database_url, DEFAULT_MAX_CONNECTIONS, DEFAULT_ACQUIRE_TIMEOUT_SECS).await
}

pub async fn connect_from_config(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    connect_with_settings(&config.url, config.max_connections, config.timeout_secs).await
}

pub async fn connect_with_settings(
    database_url: &str,
    max_connections: u32,
    timeout_secs: u64,
) -> Result<DbPool, sqlx::Error> {
    let acquire_timeout = Duration::from_secs(timeout_secs.max(1));
    let busy_timeout_ms = (acquire_timeout.as_millis() as u64).min(BUSY_TIMEOUT_CAP_MS);

    SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(acquire_timeout)
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                let session_pragmas = [
                    "PRAGMA foreign_keys = ON".to_string(),
                    "PRAGMA journal_mode = WAL".to_string(),
                    format!("PRAGMA busy_timeout = {busy_timeout_ms}"),
                ];
                for pragma in session_pragmas {
                    sqlx::query(&pragma).execute(&mut *conn).await?;
                }
                Ok(())
            })
        })
        .connect(database_url)
        .await
}
