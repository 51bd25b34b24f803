//! Generation-stamped index directories and the atomic `current` symlink
//! swap (design §5 "An atomic directory swap makes the new index
//! visible" / §6 "a `current` symlink points at the active generation").

use std::path::{Path, PathBuf};

use swagger_mcp_foundation::{Error, Generation, Result};

/// The symlink name pointing at the active generation directory.
pub const CURRENT_LINK: &str = "current";

/// The directory a given generation's index segments live under, relative
/// to the `search_index/` root.
#[must_use]
pub fn generation_dir(root: &Path, generation: Generation) -> PathBuf {
    root.join(generation.to_string())
}

/// The path of the `current` symlink, relative to the `search_index/` root.
#[must_use]
pub fn current_link(root: &Path) -> PathBuf {
    root.join(CURRENT_LINK)
}

/// Read the generation the `current` symlink points at, if any.
pub fn read_current_generation(root: &Path) -> Result<Option<Generation>> {
    let link = current_link(root);
    if !link.exists() {
        return Ok(None);
    }
    let target = std::fs::read_link(&link)
        .or_else(|_| std::fs::canonicalize(&link))
        .map_err(|e| Error::index(format!("failed to read current index symlink: {e}")))?;
    let name = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::index("current index symlink has no directory name"))?;
    let raw: u64 = name.parse().map_err(|e| Error::index(format!("malformed generation directory name '{name}': {e}")))?;
    Ok(Some(Generation::from_raw(raw)))
}

/// Point `current` at `generation`, replacing any prior symlink. Performed
/// as a create-then-rename so a concurrent reader never observes a
/// missing symlink (design §5 "Cache entries from a previous index
/// generation are invalidated ... An atomic directory swap makes the new
/// index visible").
pub fn swap_current(root: &Path, generation: Generation) -> Result<()> {
    let target_dir_name = generation.to_string();
    let link = current_link(root);
    let staging = root.join(format!(".{CURRENT_LINK}.tmp"));

    if staging.exists() {
        let _ = std::fs::remove_file(&staging);
    }

    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(&target_dir_name, &staging)
            .map_err(|e| Error::index(format!("failed to stage current index symlink: {e}")))?;
    }
    #[cfg(not(unix))]
    {
        std::fs::write(&staging, &target_dir_name)
            .map_err(|e| Error::index(format!("failed to stage current index pointer: {e}")))?;
    }

    std::fs::rename(&staging, &link).map_err(|e| Error::index(format!("failed to swap current index pointer: {e}")))?;
    Ok(())
}

/// Remove a generation's directory (used to clean up a failed or
/// abandoned rebuild, design §5 "on expiry ... the new index directory
/// (if any) is removed").
pub fn remove_generation(root: &Path, generation: Generation) -> Result<()> {
    let dir = generation_dir(root, generation);
    if dir.exists() {
        std::fs::remove_dir_all(&dir)
            .map_err(|e| Error::index(format!("failed to remove abandoned generation directory: {e}")))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_then_read_round_trips_the_generation() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(generation_dir(root, Generation::FIRST)).unwrap();

        assert!(read_current_generation(root).unwrap().is_none());
        swap_current(root, Generation::FIRST).unwrap();
        assert_eq!(read_current_generation(root).unwrap(), Some(Generation::FIRST));

        std::fs::create_dir_all(generation_dir(root, Generation::FIRST.next())).unwrap();
        swap_current(root, Generation::FIRST.next()).unwrap();
        assert_eq!(read_current_generation(root).unwrap(), Some(Generation::FIRST.next()));
    }
}
