//! Train/valid/test partitioning of a class-per-folder corpus.
//!
//! Every immediate subdirectory of the source root is a class. Each class
//! is shuffled and cut into three slices that are copied into same-named
//! folders under `train/`, `valid/` and `test/`.
//!
//! In balanced mode every class is cut to the size of the smallest class
//! first; the surplus is not copied anywhere. In proportional mode each
//! class keeps all of its files.

pub mod files;
pub mod quota;

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::audio::prepare::CONVERTED_DIR;
use crate::cancel::CancelFlag;
use crate::error::{PrepError, Result};
use crate::fsutil::{create_dir_all, subdirectories};

pub use files::{collect_samples, copy_samples, SampleFiles};
pub use quota::{SplitCounts, SplitQuota};

pub const REPORT_FILE: &str = "split_report.json";

/// The three destination roots under one parent.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitRoots {
    pub root: PathBuf,
    pub train: PathBuf,
    pub valid: PathBuf,
    pub test: PathBuf,
}

impl SplitRoots {
    pub fn under(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            train: root.join("train"),
            valid: root.join("valid"),
            test: root.join("test"),
        }
    }

    fn all(&self) -> [&Path; 3] {
        [self.train.as_path(), self.valid.as_path(), self.test.as_path()]
    }
}

/// Create `train/`, `valid/` and `test/` under `root`.
pub fn create_split_roots(root: &Path) -> Result<SplitRoots> {
    let roots = SplitRoots::under(root);
    for dir in roots.all() {
        create_dir_all(dir)?;
    }
    Ok(roots)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSplit {
    pub class: String,
    /// Samples found in the class folder
    pub available: usize,
    pub counts: SplitCounts,
    /// Samples left out by balancing
    pub discarded: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionReport {
    pub quota: SplitQuota,
    /// Smallest class size (balanced mode only)
    pub min_count: Option<usize>,
    pub classes: Vec<ClassSplit>,
    pub warnings: Vec<String>,
    pub cancelled: bool,
}

impl PartitionReport {
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| PrepError::InvalidConfig(format!("cannot serialize report: {}", e)))?;
        std::fs::write(path, json).map_err(|e| PrepError::io(path, e))
    }
}

fn class_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Split the classes under `source_root` into `roots`.
///
/// A failed copy aborts the run and leaves the destination half-written;
/// rerun into a clean destination. The report is also written to
/// `<roots.root>/split_report.json`.
pub fn partition_corpus(
    source_root: &Path,
    roots: &SplitRoots,
    quota: &SplitQuota,
    cancel: &CancelFlag,
) -> Result<PartitionReport> {
    quota.validate()?;
    if !source_root.is_dir() {
        return Err(PrepError::InvalidConfig(format!(
            "source root is not a directory: {}",
            source_root.display()
        )));
    }

    let mut classes = Vec::new();
    for dir in subdirectories(source_root)? {
        if roots.all().iter().any(|r| r.starts_with(&dir)) {
            log::warn!("Skipping {}: it contains the destination", dir.display());
            continue;
        }
        if dir.file_name().is_some_and(|n| n == CONVERTED_DIR) {
            log::warn!("Skipping {}: converted audio, not a class", dir.display());
            continue;
        }
        let samples = collect_samples(&dir, &quota.extension, quota.paired_extension.as_deref())?;
        classes.push((class_name(&dir), samples));
    }

    let mut report = PartitionReport {
        quota: quota.clone(),
        min_count: None,
        classes: Vec::with_capacity(classes.len()),
        warnings: Vec::new(),
        cancelled: false,
    };

    if quota.balanced {
        let min_count = classes.iter().map(|(_, s)| s.len()).min().unwrap_or(0);
        report.min_count = Some(min_count);
        if min_count == 0 {
            for (name, _) in classes.iter().filter(|(_, s)| s.is_empty()) {
                let msg = format!(
                    "class '{}' has no .{} samples; balanced split leaves every class empty",
                    name,
                    quota.extension.trim_start_matches('.')
                );
                log::warn!("{}", msg);
                report.warnings.push(msg);
            }
        }
        log::info!("Balanced split: {} samples per class", min_count);
    }

    let mut rng = match quota.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    for (name, mut samples) in classes {
        if cancel.is_cancelled() {
            log::warn!("Partition cancelled before class '{}'", name);
            report.cancelled = true;
            break;
        }

        samples.shuffle(&mut rng);
        let used = report.min_count.unwrap_or(samples.len()).min(samples.len());
        let counts = quota.counts_for(used);

        let train_end = counts.train;
        let valid_end = train_end + counts.valid;
        let slices = [
            &samples[..train_end],
            &samples[train_end..valid_end],
            &samples[valid_end..used],
        ];
        for (root, slice) in roots.all().into_iter().zip(slices) {
            let dst = root.join(&name);
            create_dir_all(&dst)?;
            copy_samples(slice, &dst)?;
        }

        log::info!(
            "{}: {} train, {} valid, {} test ({} discarded)",
            name,
            counts.train,
            counts.valid,
            counts.test,
            samples.len() - used
        );
        report.classes.push(ClassSplit {
            class: name,
            available: samples.len(),
            counts,
            discarded: samples.len() - used,
        });
    }

    create_dir_all(&roots.root)?;
    report.write_json(&roots.root.join(REPORT_FILE))?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn make_class(root: &Path, name: &str, n: usize, with_companion: bool) {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        for i in 0..n {
            std::fs::write(dir.join(format!("{}.wav", i)), format!("{}-{}", name, i)).unwrap();
            if with_companion {
                std::fs::write(dir.join(format!("{}.wrd", i)), b"0 16 AH\n").unwrap();
            }
        }
    }

    fn names_in(dir: &Path, ext: &str) -> HashSet<String> {
        match std::fs::read_dir(dir) {
            Ok(entries) => entries
                .map(|e| e.unwrap().path())
                .filter(|p| p.extension().map(|x| x == ext).unwrap_or(false))
                .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
                .collect(),
            Err(_) => HashSet::new(),
        }
    }

    fn quota(balanced: bool) -> SplitQuota {
        SplitQuota {
            balanced,
            seed: Some(7),
            ..SplitQuota::default()
        }
    }

    #[test]
    fn test_create_split_roots() {
        let dir = tempfile::tempdir().unwrap();
        let roots = create_split_roots(&dir.path().join("div")).unwrap();
        assert!(roots.train.is_dir() && roots.valid.is_dir() && roots.test.is_dir());
    }

    #[test]
    fn test_balanced_truncates_to_smallest_class() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        make_class(src.path(), "AA", 10, false);
        make_class(src.path(), "IY", 25, false);
        let roots = create_split_roots(dst.path()).unwrap();

        let report =
            partition_corpus(src.path(), &roots, &quota(true), &CancelFlag::new()).unwrap();
        assert_eq!(report.min_count, Some(10));
        for class in &report.classes {
            assert_eq!(class.counts, SplitCounts { train: 8, valid: 1, test: 1 });
        }
        assert_eq!(report.classes[1].discarded, 15);

        for name in ["AA", "IY"] {
            let train = names_in(&roots.train.join(name), "wav");
            let valid = names_in(&roots.valid.join(name), "wav");
            let test = names_in(&roots.test.join(name), "wav");
            assert_eq!(train.len() + valid.len() + test.len(), 10);
            assert!(train.is_disjoint(&valid) && train.is_disjoint(&test));
            assert!(valid.is_disjoint(&test));
        }
    }

    #[test]
    fn test_proportional_keeps_every_file() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        make_class(src.path(), "AA", 10, false);
        make_class(src.path(), "IY", 25, false);
        let roots = create_split_roots(dst.path()).unwrap();

        let report =
            partition_corpus(src.path(), &roots, &quota(false), &CancelFlag::new()).unwrap();
        assert_eq!(report.min_count, None);
        let iy = report.classes.iter().find(|c| c.class == "IY").unwrap();
        assert_eq!(iy.counts, SplitCounts { train: 20, valid: 2, test: 3 });
        assert_eq!(iy.discarded, 0);

        let copied: usize = [&roots.train, &roots.valid, &roots.test]
            .iter()
            .map(|r| names_in(&r.join("IY"), "wav").len())
            .sum();
        assert_eq!(copied, 25);
    }

    #[test]
    fn test_paired_copies_companions_together() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        make_class(src.path(), "AH", 10, true);
        // An unpaired clip must never be copied.
        std::fs::write(src.path().join("AH").join("99.wav"), b"x").unwrap();
        let roots = create_split_roots(dst.path()).unwrap();

        let q = SplitQuota {
            paired_extension: Some("wrd".to_string()),
            ..quota(true)
        };
        let report = partition_corpus(src.path(), &roots, &q, &CancelFlag::new()).unwrap();
        assert_eq!(report.min_count, Some(10));

        for root in [&roots.train, &roots.valid, &roots.test] {
            let wavs = names_in(&root.join("AH"), "wav");
            let wrds = names_in(&root.join("AH"), "wrd");
            let stems = |s: &HashSet<String>| -> HashSet<String> {
                s.iter().map(|n| n.split('.').next().unwrap().to_string()).collect()
            };
            assert_eq!(stems(&wavs), stems(&wrds));
            assert!(!wavs.contains("99.wav"));
        }
    }

    #[test]
    fn test_empty_class_warns_and_empties_all() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        make_class(src.path(), "AA", 5, false);
        std::fs::create_dir_all(src.path().join("OY")).unwrap();
        let roots = create_split_roots(dst.path()).unwrap();

        let report =
            partition_corpus(src.path(), &roots, &quota(true), &CancelFlag::new()).unwrap();
        assert_eq!(report.min_count, Some(0));
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("OY"));
        assert!(roots.train.join("AA").is_dir());
        assert!(names_in(&roots.train.join("AA"), "wav").is_empty());
    }

    #[test]
    fn test_mirrors_class_folders_in_every_root() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        make_class(src.path(), "none", 3, false);
        make_class(src.path(), "ER", 3, false);
        let roots = create_split_roots(dst.path()).unwrap();

        partition_corpus(src.path(), &roots, &quota(false), &CancelFlag::new()).unwrap();
        for root in [&roots.train, &roots.valid, &roots.test] {
            assert!(root.join("none").is_dir());
            assert!(root.join("ER").is_dir());
        }
    }

    #[test]
    fn test_same_seed_same_split() {
        let src = tempfile::tempdir().unwrap();
        make_class(src.path(), "UW", 30, false);

        let mut trains = Vec::new();
        for _ in 0..2 {
            let dst = tempfile::tempdir().unwrap();
            let roots = create_split_roots(dst.path()).unwrap();
            partition_corpus(src.path(), &roots, &quota(true), &CancelFlag::new()).unwrap();
            trains.push(names_in(&roots.train.join("UW"), "wav"));
        }
        assert_eq!(trains[0], trains[1]);
    }

    #[test]
    fn test_cancelled_before_first_class() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        make_class(src.path(), "AA", 4, false);
        let roots = create_split_roots(dst.path()).unwrap();
        let cancel = CancelFlag::new();
        cancel.cancel();

        let report = partition_corpus(src.path(), &roots, &quota(true), &cancel).unwrap();
        assert!(report.cancelled);
        assert!(report.classes.is_empty());
        assert!(!roots.train.join("AA").exists());
    }

    #[test]
    fn test_destination_inside_source_is_skipped() {
        let src = tempfile::tempdir().unwrap();
        make_class(src.path(), "AE", 10, false);
        let roots = create_split_roots(&src.path().join("div")).unwrap();

        let report =
            partition_corpus(src.path(), &roots, &quota(true), &CancelFlag::new()).unwrap();
        assert_eq!(report.classes.len(), 1);
        assert_eq!(report.min_count, Some(10));
    }

    #[test]
    fn test_kept_converted_audio_is_not_a_class() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        make_class(src.path(), "AE", 10, false);
        make_class(&src.path().join(CONVERTED_DIR), "19", 3, false);
        let roots = create_split_roots(dst.path()).unwrap();

        let report =
            partition_corpus(src.path(), &roots, &quota(true), &CancelFlag::new()).unwrap();
        let classes: Vec<_> = report.classes.iter().map(|c| c.class.as_str()).collect();
        assert_eq!(classes, vec!["AE"]);
        assert_eq!(report.min_count, Some(10));
        assert!(!roots.train.join(CONVERTED_DIR).exists());
    }

    #[test]
    fn test_report_written() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        make_class(src.path(), "AA", 2, false);
        let roots = create_split_roots(dst.path()).unwrap();
        partition_corpus(src.path(), &roots, &quota(true), &CancelFlag::new()).unwrap();

        let text = std::fs::read_to_string(dst.path().join(REPORT_FILE)).unwrap();
        let parsed: PartitionReport = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.classes[0].class, "AA");
    }
}
