//! Sample discovery and copying for the partitioner.

use std::path::{Path, PathBuf};

use crate::error::{PrepError, Result};
use crate::fsutil::{bare_extension, files_with_extension};

/// One sample: a primary file and, in paired mode, its companion.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SampleFiles {
    pub primary: PathBuf,
    pub companion: Option<PathBuf>,
}

/// Collect the samples of one class folder (searched recursively).
///
/// With `paired_ext`, a primary file without a same-stem companion in the
/// same directory is left out.
pub fn collect_samples(
    class_dir: &Path,
    ext: &str,
    paired_ext: Option<&str>,
) -> Result<Vec<SampleFiles>> {
    let primaries = files_with_extension(class_dir, ext)?;
    let Some(paired_ext) = paired_ext else {
        return Ok(primaries
            .into_iter()
            .map(|primary| SampleFiles { primary, companion: None })
            .collect());
    };

    let mut samples = Vec::with_capacity(primaries.len());
    for primary in primaries {
        let companion = primary.with_extension(bare_extension(paired_ext));
        if companion.is_file() {
            samples.push(SampleFiles {
                primary,
                companion: Some(companion),
            });
        } else {
            log::debug!("No companion for {}, excluded", primary.display());
        }
    }
    Ok(samples)
}

fn copy_into(src: &Path, dst_dir: &Path) -> Result<()> {
    let name = src
        .file_name()
        .ok_or_else(|| PrepError::InvalidConfig(format!("not a file path: {}", src.display())))?;
    let dst = dst_dir.join(name);
    std::fs::copy(src, &dst).map_err(|e| PrepError::io(&dst, e))?;
    Ok(())
}

/// Copy every sample (and companion) flat into `dst_dir`.
pub fn copy_samples(samples: &[SampleFiles], dst_dir: &Path) -> Result<()> {
    for sample in samples {
        copy_into(&sample.primary, dst_dir)?;
        if let Some(companion) = &sample.companion {
            copy_into(companion, dst_dir)?;
        }
    }
    Ok(())
}
