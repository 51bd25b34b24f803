//! SQLite pool setup (design §4.3.1 "Additional concerns" / §5 "shared-
//! resource policy"): WAL mode, foreign keys, and a configurable busy
//! timeout applied right after the pool connects.

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use swagger_mcp_foundation::{Error, Result};

/// Pool tuning, landing from the external config bundle's `database.*`
/// keys (design §6).
#[derive(Debug, Clone)]
pub struct PoolSettings {
    /// `database.pool_size` (1..50).
    pub max_connections: u32,
    /// `database.timeout` in seconds (1..60), used as SQLite's
    /// `busy_timeout` so concurrent readers wait out the single writer
    /// instead of failing immediately (design §5 "SQLite database is
    /// opened in WAL mode with a busy timeout").
    pub busy_timeout_secs: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self { max_connections: 10, busy_timeout_secs: 30 }
    }
}

/// Open (creating if absent) the SQLite database at `path`, with WAL mode,
/// foreign keys, and the busy timeout from `settings` applied to every
/// connection in the pool.
pub async fn open_pool(path: &Path, settings: &PoolSettings) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(settings.busy_timeout_secs));

    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .connect_with(options)
        .await
        .map_err(|e| Error::storage(format!("failed to open database at {}: {e}", path.display())))?;

    Ok(pool)
}

/// Open an in-memory database, used by tests and by the query engine's
/// doctest fixtures.
pub async fn open_in_memory_pool() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(":memory:")
        .create_if_missing(true)
        .foreign_keys(true);
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(|e| Error::storage(format!("failed to open in-memory database: {e}")))
}
