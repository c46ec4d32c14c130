//! Run configuration for segmentation.

use std::path::{Path, PathBuf};

use crate::alignment::LabelSet;
use crate::audio::prepare::CONVERTED_DIR;
use crate::error::{PrepError, Result};
use crate::fsutil::bare_extension;
use crate::segment::SegmentMode;

pub const DEFAULT_INTERVAL_MS: f64 = 500.0;

#[derive(Debug, Clone)]
pub struct SegmentConfig {
    /// Root of the utterance audio tree (WAV or FLAC)
    pub audio_root: PathBuf,
    /// Root of the alignment tree, mirroring `audio_root`
    pub alignment_root: PathBuf,
    /// Root the label directories are created under
    pub output_root: PathBuf,
    pub mode: SegmentMode,
    /// Window length for the window modes (ms)
    pub interval_ms: f64,
    pub labels: LabelSet,
    pub alignment_ext: String,
    pub clip_ext: String,
    pub annotation_ext: String,
    /// Where FLAC input is converted to WAV; None disables conversion
    pub converted_dir: Option<PathBuf>,
    /// Remove `converted_dir` once the batch finishes
    pub delete_converted: bool,
}

impl SegmentConfig {
    /// Config with the stock settings: 500 ms windows labeled by dominant
    /// vowel, `.TextGrid` alignments, `.wav`/`.wrd` output.
    pub fn new(audio_root: &Path, alignment_root: &Path, output_root: &Path) -> Self {
        Self {
            audio_root: audio_root.to_path_buf(),
            alignment_root: alignment_root.to_path_buf(),
            output_root: output_root.to_path_buf(),
            mode: SegmentMode::ByInterval,
            interval_ms: DEFAULT_INTERVAL_MS,
            labels: LabelSet::default(),
            alignment_ext: "TextGrid".to_string(),
            clip_ext: "wav".to_string(),
            annotation_ext: "wrd".to_string(),
            converted_dir: Some(output_root.join(CONVERTED_DIR)),
            delete_converted: true,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (what, dir) in [("audio", &self.audio_root), ("alignment", &self.alignment_root)] {
            if !dir.is_dir() {
                return Err(PrepError::InvalidConfig(format!(
                    "{} root is not a directory: {}",
                    what,
                    dir.display()
                )));
            }
        }
        let positive = self.interval_ms.is_finite() && self.interval_ms > 0.0;
        if self.mode != SegmentMode::ByPhoneme && !positive {
            return Err(PrepError::InvalidConfig(format!(
                "window length must be positive, got {}",
                self.interval_ms
            )));
        }
        if self.labels.is_empty() {
            return Err(PrepError::InvalidConfig("permitted label set is empty".to_string()));
        }
        if bare_extension(&self.clip_ext) == bare_extension(&self.annotation_ext) {
            return Err(PrepError::InvalidConfig(format!(
                "clip and annotation extensions must differ (both '{}')",
                self.clip_ext
            )));
        }
        Ok(())
    }
}
