//! Segmentation strategies: turn one aligned utterance into labeled clips.
//!
//! - `by_phoneme`: one clip per retained phoneme, filed under its label
//! - `by_interval`: fixed-length windows filed under their dominant phoneme
//! - `by_count`: fixed-length windows filed under their phoneme count

pub mod annotation;
pub mod interval;
pub mod phoneme;
pub mod window;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::allocator::FileIndexAllocator;
use crate::error::{PrepError, Result};
use crate::types::Utterance;

pub use interval::{IntervalSegmenter, WindowLabeling};
pub use phoneme::PhonemeSegmenter;

/// Directory name for windows that claimed no phoneme.
pub const NO_PHONEME_LABEL: &str = "none";

/// Counts produced by segmenting one utterance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentSummary {
    pub clips_written: usize,
    pub intervals_assigned: usize,
    pub intervals_unassigned: usize,
}

/// Segmentation backend trait.
pub trait Segmenter: Send + Sync {
    /// Mode name for logs and reports.
    fn name(&self) -> &str;

    /// Write the clips for one utterance under label directories handed out
    /// by `allocator`.
    fn segment(
        &self,
        utterance: &Utterance,
        allocator: &FileIndexAllocator,
    ) -> Result<SegmentSummary>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentMode {
    ByPhoneme,
    ByInterval,
    ByCount,
}

impl SegmentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentMode::ByPhoneme => "by_phoneme",
            SegmentMode::ByInterval => "by_interval",
            SegmentMode::ByCount => "by_count",
        }
    }
}

impl fmt::Display for SegmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SegmentMode {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "by_phoneme" => Ok(SegmentMode::ByPhoneme),
            "by_interval" => Ok(SegmentMode::ByInterval),
            "by_count" => Ok(SegmentMode::ByCount),
            _ => Err(PrepError::InvalidConfig(format!(
                "Unknown segmentation mode: '{}'. Available: by_phoneme, by_interval, by_count",
                s
            ))),
        }
    }
}

/// Build the segmenter for a mode. `interval_ms` is ignored by `by_phoneme`.
pub fn get_segmenter(mode: SegmentMode, interval_ms: f64) -> Result<Box<dyn Segmenter>> {
    match mode {
        SegmentMode::ByPhoneme => Ok(Box::new(PhonemeSegmenter)),
        SegmentMode::ByInterval => Ok(Box::new(IntervalSegmenter::new(
            interval_ms,
            WindowLabeling::DominantPhoneme,
        )?)),
        SegmentMode::ByCount => Ok(Box::new(IntervalSegmenter::new(
            interval_ms,
            WindowLabeling::PhonemeCount,
        )?)),
    }
}
