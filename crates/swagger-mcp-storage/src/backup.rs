//! Rolling DB backups (design §6 persisted-state layout's `backups/`
//! directory): a plain `tokio::fs::copy` plus an oldest-first eviction
//! scan, rather than any SQLite-specific mechanism (the source file is
//! just copied; WAL checkpointing is the caller's concern).

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use swagger_mcp_foundation::{Error, Result};

/// Maximum number of rolling backups kept under `backups/` (design §6).
pub const MAX_BACKUPS: usize = 10;

/// Copy the database file at `db_path` into `backup_dir` as
/// `{stem}_{YYYYMMDD_HHMMSS}{suffix}`, then evict the oldest backups
/// beyond [`MAX_BACKUPS`].
pub async fn create_backup(db_path: &Path, backup_dir: &Path, now: DateTime<Utc>) -> Result<PathBuf> {
    tokio::fs::create_dir_all(backup_dir)
        .await
        .map_err(|e| Error::storage(format!("failed to create backup directory: {e}")))?;

    let stem = db_path.file_stem().and_then(|s| s.to_str()).unwrap_or("mcp_server");
    let suffix = db_path.extension().and_then(|s| s.to_str()).map_or_else(String::new, |e| format!(".{e}"));
    let name = format!("{stem}_{}{suffix}", now.format("%Y%m%d_%H%M%S"));
    let dest = backup_dir.join(name);

    tokio::fs::copy(db_path, &dest)
        .await
        .map_err(|e| Error::storage(format!("failed to copy database to backup: {e}")))?;

    evict_oldest(backup_dir, stem).await?;
    Ok(dest)
}

/// Delete the oldest backups for `stem` beyond [`MAX_BACKUPS`], ranked by
/// file name (the timestamped naming scheme sorts lexicographically in
/// chronological order).
async fn evict_oldest(backup_dir: &Path, stem: &str) -> Result<()> {
    let mut entries = tokio::fs::read_dir(backup_dir)
        .await
        .map_err(|e| Error::storage(format!("failed to read backup directory: {e}")))?;

    let mut names = Vec::new();
    while let Some(entry) =
        entries.next_entry().await.map_err(|e| Error::storage(format!("failed to walk backup directory: {e}")))?
    {
        let file_name = entry.file_name();
        if let Some(name) = file_name.to_str() {
            if name.starts_with(stem) {
                names.push(name.to_string());
            }
        }
    }
    names.sort();

    if names.len() > MAX_BACKUPS {
        for stale in &names[..names.len() - MAX_BACKUPS] {
            let path = backup_dir.join(stale);
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| Error::storage(format!("failed to evict stale backup {}: {e}", path.display())))?;
        }
    }
    Ok(())
}
