//! Fixed-length window segmentation.

use std::path::Path;

use super::annotation::write_annotation;
use super::window::assign_windows;
use super::{SegmentSummary, Segmenter, NO_PHONEME_LABEL};
use crate::allocator::FileIndexAllocator;
use crate::audio::io::{cut_fixed, write_wav};
use crate::error::{PrepError, Result};
use crate::types::{PhonemeInterval, Utterance};

/// How a window picks the directory it is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowLabeling {
    /// Greatest label string among the claimed phonemes, or "none".
    ///
    /// This is lexicographic order, not frequency: a window holding AA, AA
    /// and IY is filed under IY. Existing corpora were built this way.
    DominantPhoneme,
    /// Number of claimed phonemes ("0", "1", ...).
    PhonemeCount,
}

impl WindowLabeling {
    pub fn label_for(&self, assigned: &[PhonemeInterval]) -> String {
        match self {
            WindowLabeling::DominantPhoneme => assigned
                .iter()
                .map(|p| p.label.as_str())
                .max()
                .unwrap_or(NO_PHONEME_LABEL)
                .to_string(),
            WindowLabeling::PhonemeCount => assigned.len().to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IntervalSegmenter {
    interval_ms: f64,
    labeling: WindowLabeling,
}

impl IntervalSegmenter {
    pub fn new(interval_ms: f64, labeling: WindowLabeling) -> Result<Self> {
        if !(interval_ms.is_finite() && interval_ms > 0.0) {
            return Err(PrepError::InvalidConfig(format!(
                "window length must be a positive number of milliseconds, got {}",
                interval_ms
            )));
        }
        Ok(Self { interval_ms, labeling })
    }
}

/// Remove a half-written clip so a failed window leaves nothing behind.
fn discard(path: &Path) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            log::warn!("Could not remove partial output {}: {}", path.display(), e);
        }
    }
}

impl Segmenter for IntervalSegmenter {
    fn name(&self) -> &str {
        match self.labeling {
            WindowLabeling::DominantPhoneme => "by_interval",
            WindowLabeling::PhonemeCount => "by_count",
        }
    }

    fn segment(
        &self,
        utterance: &Utterance,
        allocator: &FileIndexAllocator,
    ) -> Result<SegmentSummary> {
        let windows = assign_windows(&utterance.intervals, utterance.duration_ms, self.interval_ms);
        let sample_rate = utterance.audio.sample_rate;
        let mut summary = SegmentSummary::default();

        for window in &windows {
            let label = self.labeling.label_for(&window.assigned);
            let paths = allocator.next_paths(&label)?;
            log::debug!(
                "Window {} [{:.0}, {:.0}) ms: {} phoneme(s) -> {}",
                window.index,
                window.start_ms,
                window.end_ms,
                window.assigned.len(),
                paths.clip.display()
            );

            if window.needs_padding {
                log::debug!(
                    "Window {} padded with {:.0} ms of silence",
                    window.index,
                    window.padding_ms(utterance.duration_ms)
                );
            }
            let samples = cut_fixed(&utterance.audio, window.start_ms, self.interval_ms);
            if let Err(e) = write_wav(&paths.clip, &samples, sample_rate) {
                discard(&paths.clip);
                return Err(PrepError::audio_write(&paths.clip, &e));
            }
            if let Err(e) = write_annotation(&paths.annotation, &window.assigned) {
                discard(&paths.clip);
                discard(&paths.annotation);
                return Err(e);
            }

            summary.clips_written += 1;
            summary.intervals_assigned += window.assigned.len();
        }

        summary.intervals_unassigned = utterance.intervals.len() - summary.intervals_assigned;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::io::read_wav;
    use crate::types::AudioBuffer;

    fn utterance(duration_ms: usize, intervals: Vec<PhonemeInterval>) -> Utterance {
        let samples = vec![0.25; duration_ms * 16];
        Utterance::new(AudioBuffer::new(samples, 16000), intervals)
    }

    #[test]
    fn test_dominant_label_is_lexicographic_max() {
        let assigned = vec![
            PhonemeInterval::new(0.0, 10.0, "AA"),
            PhonemeInterval::new(10.0, 20.0, "AA"),
            PhonemeInterval::new(20.0, 30.0, "IY"),
        ];
        assert_eq!(WindowLabeling::DominantPhoneme.label_for(&assigned), "IY");
        assert_eq!(WindowLabeling::DominantPhoneme.label_for(&[]), "none");
        assert_eq!(WindowLabeling::PhonemeCount.label_for(&assigned), "3");
        assert_eq!(WindowLabeling::PhonemeCount.label_for(&[]), "0");
    }

    #[test]
    fn test_segment_writes_fixed_length_clips() {
        let dir = tempfile::tempdir().unwrap();
        let alloc = FileIndexAllocator::new(dir.path(), "wav", "wrd");
        let utt = utterance(1200, vec![PhonemeInterval::new(400.0, 900.0, "AH")]);
        let seg = IntervalSegmenter::new(500.0, WindowLabeling::DominantPhoneme).unwrap();

        let summary = seg.segment(&utt, &alloc).unwrap();
        assert_eq!(summary.clips_written, 3);
        assert_eq!(summary.intervals_assigned, 1);
        assert_eq!(summary.intervals_unassigned, 0);

        let none0 = read_wav(&dir.path().join("none").join("0.wav")).unwrap();
        let padded = read_wav(&dir.path().join("none").join("1.wav")).unwrap();
        let ah = read_wav(&dir.path().join("AH").join("0.wav")).unwrap();
        for clip in [&none0, &padded, &ah] {
            assert_eq!(clip.samples.len(), 8000);
        }
        // Last window: 200 ms of audio then 300 ms of silence.
        assert!(padded.samples[..3200].iter().all(|&s| s > 0.2));
        assert!(padded.samples[3200..].iter().all(|&s| s == 0.0));

        let wrd = std::fs::read_to_string(dir.path().join("AH").join("0.wrd")).unwrap();
        assert_eq!(wrd, "0 6400 AH\n");
        let empty = std::fs::read_to_string(dir.path().join("none").join("1.wrd")).unwrap();
        assert_eq!(empty, "");
    }

    #[test]
    fn test_count_mode_files_by_count() {
        let dir = tempfile::tempdir().unwrap();
        let alloc = FileIndexAllocator::new(dir.path(), "wav", "wrd");
        let utt = utterance(
            1000,
            vec![
                PhonemeInterval::new(50.0, 120.0, "AA"),
                PhonemeInterval::new(200.0, 300.0, "IY"),
                PhonemeInterval::new(600.0, 700.0, "EH"),
            ],
        );
        let seg = IntervalSegmenter::new(500.0, WindowLabeling::PhonemeCount).unwrap();
        seg.segment(&utt, &alloc).unwrap();

        assert!(dir.path().join("2").join("0.wav").exists());
        assert!(dir.path().join("1").join("0.wav").exists());
        assert!(dir.path().join("1").join("0.wrd").exists());
    }

    #[test]
    fn test_numbering_continues_across_utterances() {
        let dir = tempfile::tempdir().unwrap();
        let alloc = FileIndexAllocator::new(dir.path(), "wav", "wrd");
        let seg = IntervalSegmenter::new(500.0, WindowLabeling::DominantPhoneme).unwrap();
        seg.segment(&utterance(1000, vec![]), &alloc).unwrap();
        seg.segment(&utterance(500, vec![]), &alloc).unwrap();

        for i in 0..3 {
            assert!(dir.path().join("none").join(format!("{}.wav", i)).exists());
        }
    }

    #[test]
    fn test_rejects_non_positive_length() {
        assert!(IntervalSegmenter::new(0.0, WindowLabeling::DominantPhoneme).is_err());
        assert!(IntervalSegmenter::new(-1.0, WindowLabeling::PhonemeCount).is_err());
    }
}
