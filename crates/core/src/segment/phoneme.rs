//! One clip per phoneme, cut at its aligned boundaries.

use super::{SegmentSummary, Segmenter};
use crate::allocator::FileIndexAllocator;
use crate::audio::io::{cut_ms, write_wav};
use crate::error::{PrepError, Result};
use crate::types::Utterance;

#[derive(Debug, Clone, Copy, Default)]
pub struct PhonemeSegmenter;

impl Segmenter for PhonemeSegmenter {
    fn name(&self) -> &str {
        "by_phoneme"
    }

    fn segment(
        &self,
        utterance: &Utterance,
        allocator: &FileIndexAllocator,
    ) -> Result<SegmentSummary> {
        let mut summary = SegmentSummary::default();
        for interval in &utterance.intervals {
            let paths = allocator.next_paths(&interval.label)?;
            let samples = cut_ms(&utterance.audio, interval.start_ms, interval.end_ms);
            write_wav(&paths.clip, &samples, utterance.audio.sample_rate).map_err(|e| {
                std::fs::remove_file(&paths.clip).ok();
                PrepError::audio_write(&paths.clip, &e)
            })?;
            summary.clips_written += 1;
            summary.intervals_assigned += 1;
        }
        Ok(summary)
    }
}
