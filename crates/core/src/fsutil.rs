//! Directory walking and path helpers shared by the segmenter and partitioner.

use std::path::{Path, PathBuf};

use crate::error::{PrepError, Result};

/// Normalize an extension given as ".wav" or "wav" to "wav".
pub fn bare_extension(ext: &str) -> &str {
    ext.strip_prefix('.').unwrap_or(ext)
}

/// True if `path` has exactly the given extension (leading dot optional).
pub fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .map(|e| e == bare_extension(ext))
        .unwrap_or(false)
}

/// Recursively collect files under `root` with the given extension, sorted.
pub fn files_with_extension(root: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let entries = std::fs::read_dir(&dir).map_err(|e| PrepError::io(&dir, e))?;
        for entry in entries {
            let path = entry.map_err(|e| PrepError::io(&dir, e))?.path();
            if path.is_dir() {
                stack.push(path);
            } else if has_extension(&path, ext) {
                found.push(path);
            }
        }
    }
    found.sort();
    Ok(found)
}

/// Immediate subdirectories of `root`, sorted by name.
pub fn subdirectories(root: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(root).map_err(|e| PrepError::io(root, e))?;
    let mut dirs = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| PrepError::io(root, e))?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Re-root `path` from under `from` to under `to`, swapping its extension.
///
/// Returns None when `path` is not inside `from`.
pub fn rebase_with_extension(path: &Path, from: &Path, to: &Path, ext: &str) -> Option<PathBuf> {
    let relative = path.strip_prefix(from).ok()?;
    Some(to.join(relative).with_extension(bare_extension(ext)))
}

pub fn create_dir_all(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| PrepError::io(path, e))
}
