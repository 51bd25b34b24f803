//! Forward-only migration runner (design §4.3.1 "Migrations"): applies
//! any version not yet recorded in `database_migrations`, inside a
//! transaction, and records its checksum. Every migration file also
//! carries a `-- rollback:` trailer with down SQL; this runner parses and
//! stores it but never executes it automatically — migrations are
//! additive-only, and rollback SQL is kept on hand for manual recovery.

use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use swagger_mcp_foundation::{Error, Result};

/// One embedded migration file.
struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

/// All migrations shipped with this crate, in ascending version order.
/// New migrations are appended here and to `migrations/`; nothing is ever
/// edited in place once released.
const MIGRATIONS: &[Migration] = &[
    Migration { version: 1, name: "001_initial_schema", sql: include_str!("../migrations/001_initial_schema.sql") },
    Migration { version: 2, name: "002_api_servers", sql: include_str!("../migrations/002_api_servers.sql") },
];

/// Split a migration file into its forward SQL and its `-- rollback:`
/// trailer (if present). The trailer is every line at or after a
/// `-- rollback:` marker; it is stored for operator-driven recovery, not
/// executed by this runner.
fn split_forward_and_rollback(sql: &'static str) -> (&'static str, Option<&'static str>) {
    match sql.find("-- rollback:") {
        Some(idx) => (&sql[..idx], Some(&sql[idx..])),
        None => (sql, None),
    }
}

fn checksum(sql: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(sql.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Apply every migration not yet recorded in `database_migrations`, each
/// inside its own transaction, in ascending version order.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS database_migrations (
            version INTEGER PRIMARY KEY,
            checksum TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| Error::storage(format!("failed to bootstrap migration ledger: {e}")))?;

    for migration in MIGRATIONS {
        let already_applied: Option<(String,)> =
            sqlx::query_as("SELECT checksum FROM database_migrations WHERE version = ?")
                .bind(migration.version)
                .fetch_optional(pool)
                .await
                .map_err(|e| Error::storage(format!("failed to query migration ledger: {e}")))?;

        let (forward_sql, _rollback_sql) = split_forward_and_rollback(migration.sql);
        let expected_checksum = checksum(forward_sql);

        if let Some((applied_checksum,)) = already_applied {
            if applied_checksum != expected_checksum {
                return Err(Error::storage(format!(
                    "migration {} ({}) checksum mismatch: applied={applied_checksum} current={expected_checksum}",
                    migration.version, migration.name
                )));
            }
            continue;
        }

        let mut tx = pool
            .begin()
            .await
            .map_err(|e| Error::storage(format!("failed to begin migration transaction: {e}")))?;

        for statement in split_statements(forward_sql) {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| Error::storage(format!("migration {} failed: {e}", migration.name)))?;
        }

        sqlx::query(
            "INSERT INTO database_migrations (version, checksum, applied_at) VALUES (?, ?, datetime('now'))",
        )
        .bind(migration.version)
        .bind(&expected_checksum)
        .execute(&mut *tx)
        .await
        .map_err(|e| Error::storage(format!("failed to record migration {}: {e}", migration.name)))?;

        tx.commit()
            .await
            .map_err(|e| Error::storage(format!("failed to commit migration {}: {e}", migration.name)))?;

        tracing::info!(version = migration.version, name = migration.name, "applied migration");
    }

    Ok(())
}

/// `sqlx` executes one statement per call; a migration file is many
/// semicolon-terminated statements (including multi-statement `CREATE
/// TRIGGER ... BEGIN ... END;` blocks, which this splitter must not break
/// up). Split on a semicolon only when not inside a `BEGIN ... END` span.
fn split_statements(sql: &str) -> Vec<&str> {
    let mut statements = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let bytes = sql.as_bytes();
    let mut i = 0usize;
    while i < bytes.len() {
        if sql[i..].to_uppercase().starts_with("BEGIN") {
            depth += 1;
        } else if sql[i..].to_uppercase().starts_with("END") {
            depth = depth.saturating_sub(1);
        } else if bytes[i] == b';' && depth == 0 {
            let stmt = sql[start..i].trim();
            if !stmt.is_empty() {
                statements.push(stmt);
            }
            start = i + 1;
        }
        i += 1;
    }
    let tail = sql[start..].trim();
    if !tail.is_empty() {
        statements.push(tail);
    }
    statements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::open_in_memory_pool;

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = open_in_memory_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM database_migrations")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(row.0, 1);
    }

    #[tokio::test]
    async fn creates_every_base_table() {
        let pool = open_in_memory_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();

        for table in ["apis", "endpoints", "schemas", "security_schemes", "endpoint_dependencies", "endpoint_categories"] {
            let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name = ?")
                .bind(table)
                .fetch_one(&pool)
                .await
                .unwrap();
            assert_eq!(row.0, 1, "missing table {table}");
        }
    }

    #[test]
    fn splits_statements_without_breaking_trigger_bodies() {
        let sql = "CREATE TABLE t (id INT);\nCREATE TRIGGER tr AFTER INSERT ON t BEGIN SELECT 1; SELECT 2; END;\nCREATE INDEX i ON t(id);";
        let statements = split_statements(sql);
        assert_eq!(statements.len(), 3);
        assert!(statements[1].contains("SELECT 1"));
        assert!(statements[1].contains("SELECT 2"));
    }
}
