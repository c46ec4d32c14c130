//! Sequential, gap-tolerant file numbering per label directory.
//!
//! Each label gets a directory under the output root holding `0.wav`,
//! `1.wav`, ... An allocator is created once per run and shared by
//! reference with every writer. A directory left over from an earlier run
//! is scanned once and numbering resumes after its highest numeric name.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{PrepError, Result};
use crate::fsutil::{bare_extension, create_dir_all};

/// Clip and annotation paths handed out for one allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipPaths {
    pub index: u64,
    pub clip: PathBuf,
    pub annotation: PathBuf,
}

#[derive(Debug)]
pub struct FileIndexAllocator {
    root: PathBuf,
    clip_ext: String,
    annotation_ext: String,
    counters: Mutex<HashMap<PathBuf, u64>>,
}

/// Highest purely numeric file stem in `dir`, if any.
fn max_numeric_stem(dir: &Path) -> Result<Option<u64>> {
    let entries = std::fs::read_dir(dir).map_err(|e| PrepError::io(dir, e))?;
    let mut max = None;
    for entry in entries {
        let path = entry.map_err(|e| PrepError::io(dir, e))?.path();
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        if let Ok(n) = stem.parse::<u64>() {
            max = max.max(Some(n));
        }
    }
    Ok(max)
}

fn successor(dir: &Path, index: u64) -> Result<u64> {
    index.checked_add(1).ok_or_else(|| {
        PrepError::InvalidConfig(format!("file numbering exhausted in {}", dir.display()))
    })
}

impl FileIndexAllocator {
    pub fn new(root: impl Into<PathBuf>, clip_ext: &str, annotation_ext: &str) -> Self {
        Self {
            root: root.into(),
            clip_ext: bare_extension(clip_ext).to_string(),
            annotation_ext: bare_extension(annotation_ext).to_string(),
            counters: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn label_dir(&self, label: &str) -> PathBuf {
        self.root.join(label)
    }

    /// Next free index for `label`, creating its directory on first use.
    pub fn allocate(&self, label: &str) -> Result<u64> {
        let dir = self.label_dir(label);
        // One lock for the whole decision so concurrent callers never share an index.
        let mut counters = self
            .counters
            .lock()
            .map_err(|_| PrepError::InvalidConfig("allocator lock poisoned".to_string()))?;

        let index = if !dir.is_dir() {
            create_dir_all(&dir)?;
            0
        } else if let Some(&last) = counters.get(&dir) {
            successor(&dir, last)?
        } else {
            let resumed = match max_numeric_stem(&dir)? {
                Some(n) => successor(&dir, n)?,
                None => 0,
            };
            if resumed > 0 {
                log::debug!("Resuming {} at index {}", dir.display(), resumed);
            }
            resumed
        };

        counters.insert(dir, index);
        Ok(index)
    }

    /// Allocate an index and build the matching clip and annotation paths.
    pub fn next_paths(&self, label: &str) -> Result<ClipPaths> {
        let index = self.allocate(label)?;
        let base = self.label_dir(label).join(index.to_string());
        Ok(ClipPaths {
            index,
            clip: base.with_extension(&self.clip_ext),
            annotation: base.with_extension(&self.annotation_ext),
        })
    }
}
