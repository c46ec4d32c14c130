//! Batch segmentation over an audio tree and its mirrored alignment tree.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::alignment::{read_alignment, LabelSet};
use crate::allocator::FileIndexAllocator;
use crate::audio::io::read_wav;
use crate::audio::prepare::{prepare_audio, remove_converted};
use crate::cancel::CancelFlag;
use crate::config::SegmentConfig;
use crate::error::{PrepError, Result};
use crate::fsutil::{create_dir_all, files_with_extension, rebase_with_extension};
use crate::segment::{get_segmenter, SegmentMode, SegmentSummary, Segmenter};
use crate::types::Utterance;

pub const REPORT_FILE: &str = "segment_report.json";

/// What happened to one audio file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UtteranceStatus {
    Processed { summary: SegmentSummary },
    SkippedNoAlignment,
    FailedMalformed { reason: String },
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtteranceOutcome {
    pub audio: PathBuf,
    pub alignment: PathBuf,
    pub status: UtteranceStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub mode: SegmentMode,
    pub interval_ms: f64,
    pub total: usize,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub clips_written: usize,
    pub cancelled: bool,
    pub outcomes: Vec<UtteranceOutcome>,
}

impl BatchReport {
    fn new(mode: SegmentMode, interval_ms: f64, total: usize) -> Self {
        Self {
            mode,
            interval_ms,
            total,
            processed: 0,
            skipped: 0,
            failed: 0,
            clips_written: 0,
            cancelled: false,
            outcomes: Vec::with_capacity(total),
        }
    }

    fn record(&mut self, outcome: UtteranceOutcome) {
        match &outcome.status {
            UtteranceStatus::Processed { summary } => {
                self.processed += 1;
                self.clips_written += summary.clips_written;
            }
            UtteranceStatus::SkippedNoAlignment => self.skipped += 1,
            UtteranceStatus::FailedMalformed { .. } | UtteranceStatus::Failed { .. } => {
                self.failed += 1
            }
        }
        self.outcomes.push(outcome);
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| PrepError::InvalidConfig(format!("cannot serialize report: {}", e)))?;
        std::fs::write(path, json).map_err(|e| PrepError::io(path, e))
    }
}

/// Parse, load and segment one utterance.
pub fn process_utterance(
    audio_path: &Path,
    alignment_path: &Path,
    labels: &LabelSet,
    segmenter: &dyn Segmenter,
    allocator: &FileIndexAllocator,
) -> Result<SegmentSummary> {
    if !alignment_path.is_file() {
        return Err(PrepError::MissingAlignment {
            audio: audio_path.to_path_buf(),
        });
    }
    let intervals = read_alignment(alignment_path, labels)?;
    let audio = read_wav(audio_path).map_err(|e| PrepError::audio_read(audio_path, &e))?;
    let utterance = Utterance::new(audio, intervals);
    segmenter.segment(&utterance, allocator)
}

/// Map a per-utterance result to its outcome; errors that should stop the
/// whole batch are passed back up.
fn classify(result: Result<SegmentSummary>) -> Result<UtteranceStatus> {
    match result {
        Ok(summary) => Ok(UtteranceStatus::Processed { summary }),
        Err(PrepError::MissingAlignment { .. }) => Ok(UtteranceStatus::SkippedNoAlignment),
        Err(e @ PrepError::MalformedAlignment { .. }) => Ok(UtteranceStatus::FailedMalformed {
            reason: e.to_string(),
        }),
        Err(
            e @ (PrepError::AudioRead { .. } | PrepError::AudioWrite { .. } | PrepError::Io { .. }),
        ) => Ok(UtteranceStatus::Failed {
            reason: e.to_string(),
        }),
        Err(e) => Err(e),
    }
}

/// Segment every WAV under the audio root that has a matching alignment.
///
/// Per-file problems are recorded in the report and the batch continues.
/// The report is also written to `<output_root>/segment_report.json`.
pub fn run_segmentation(config: &SegmentConfig, cancel: &CancelFlag) -> Result<BatchReport> {
    config.validate()?;
    create_dir_all(&config.output_root)?;

    let prepared = prepare_audio(&config.audio_root, config.converted_dir.as_deref())?;
    if prepared.wav_count == 0 {
        return Err(PrepError::InvalidConfig(format!(
            "no audio files found under {}",
            config.audio_root.display()
        )));
    }

    let segmenter = get_segmenter(config.mode, config.interval_ms)?;
    let allocator =
        FileIndexAllocator::new(&config.output_root, &config.clip_ext, &config.annotation_ext);
    let audio_files = files_with_extension(&prepared.root, "wav")?;
    let total = audio_files.len();
    let mut report = BatchReport::new(config.mode, config.interval_ms, total);

    log::info!("Segmenting {} file(s) with {}", total, segmenter.name());

    for (n, audio_path) in audio_files.iter().enumerate() {
        if cancel.is_cancelled() {
            log::warn!("Cancelled after {} of {} files", n, total);
            report.cancelled = true;
            break;
        }

        let alignment_path = rebase_with_extension(
            audio_path,
            &prepared.root,
            &config.alignment_root,
            &config.alignment_ext,
        )
        .ok_or_else(|| {
            PrepError::InvalidConfig(format!("{} escapes audio root", audio_path.display()))
        })?;

        let result = process_utterance(
            audio_path,
            &alignment_path,
            &config.labels,
            segmenter.as_ref(),
            &allocator,
        );
        let status = classify(result)?;
        match &status {
            UtteranceStatus::Processed { summary } => {
                log::debug!("{}: {} clip(s)", audio_path.display(), summary.clips_written)
            }
            UtteranceStatus::SkippedNoAlignment => {
                log::debug!(
                    "{}: no alignment at {}",
                    audio_path.display(),
                    alignment_path.display()
                )
            }
            UtteranceStatus::FailedMalformed { reason } | UtteranceStatus::Failed { reason } => {
                log::warn!("Skipping {}: {}", audio_path.display(), reason)
            }
        }
        report.record(UtteranceOutcome {
            audio: audio_path.clone(),
            alignment: alignment_path,
            status,
        });

        let dir_done = audio_files
            .get(n + 1)
            .map(|next| next.parent() != audio_path.parent())
            .unwrap_or(true);
        if dir_done {
            log::info!("{} out of {} files were parsed", n + 1, total);
        }
    }

    if let Some(converted) = &prepared.converted {
        if config.delete_converted {
            remove_converted(converted)?;
        }
    }

    report.write_json(&config.output_root.join(REPORT_FILE))?;
    log::info!(
        "Segmentation done: {} processed, {} skipped, {} failed, {} clips",
        report.processed,
        report.skipped,
        report.failed,
        report.clips_written
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_outcomes() {
        let missing = classify(Err(PrepError::MissingAlignment { audio: "a.wav".into() })).unwrap();
        assert_eq!(missing, UtteranceStatus::SkippedNoAlignment);

        let malformed =
            classify(Err(PrepError::malformed("a.TextGrid", "missing size marker"))).unwrap();
        assert!(matches!(malformed, UtteranceStatus::FailedMalformed { .. }));

        let audio = classify(Err(PrepError::AudioRead {
            path: "a.wav".into(),
            message: "truncated".into(),
        }))
        .unwrap();
        assert!(matches!(audio, UtteranceStatus::Failed { .. }));

        assert!(classify(Err(PrepError::InvalidConfig("bad".into()))).is_err());
    }

    #[test]
    fn test_report_counts() {
        let mut report = BatchReport::new(SegmentMode::ByInterval, 500.0, 3);
        let summary = SegmentSummary {
            clips_written: 4,
            intervals_assigned: 2,
            intervals_unassigned: 0,
        };
        for status in [
            UtteranceStatus::Processed { summary },
            UtteranceStatus::SkippedNoAlignment,
            UtteranceStatus::Failed { reason: "x".into() },
        ] {
            report.record(UtteranceOutcome {
                audio: "a.wav".into(),
                alignment: "a.TextGrid".into(),
                status,
            });
        }
        assert_eq!((report.processed, report.skipped, report.failed), (1, 1, 1));
        assert_eq!(report.clips_written, 4);
    }

    #[test]
    fn test_status_json_shape() {
        let json = serde_json::to_value(UtteranceStatus::SkippedNoAlignment).unwrap();
        assert_eq!(json, serde_json::json!({"status": "skipped_no_alignment"}));
    }
}
