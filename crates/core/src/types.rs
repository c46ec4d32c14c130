use serde::{Deserialize, Serialize};

/// A single aligned phoneme with timing in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhonemeInterval {
    /// Start time in milliseconds
    pub start_ms: f64,
    /// End time in milliseconds
    pub end_ms: f64,
    /// Canonical label (stress digit already stripped)
    pub label: String,
}

impl PhonemeInterval {
    pub fn new(start_ms: f64, end_ms: f64, label: &str) -> Self {
        Self {
            start_ms,
            end_ms,
            label: label.to_string(),
        }
    }

    pub fn duration_ms(&self) -> f64 {
        self.end_ms - self.start_ms
    }
}

/// Decoded mono audio.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Samples normalized to [-1, 1]
    pub samples: Vec<f64>,
    pub sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f64>, sample_rate: u32) -> Self {
        Self { samples, sample_rate }
    }

    pub fn duration_ms(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 * 1000.0 / self.sample_rate as f64
    }
}

/// One utterance ready for segmentation: its audio and its retained intervals.
///
/// Intervals are expected sorted by start and non-overlapping, as produced by
/// the aligner. This is not re-checked.
#[derive(Debug, Clone)]
pub struct Utterance {
    pub audio: AudioBuffer,
    pub duration_ms: f64,
    pub intervals: Vec<PhonemeInterval>,
}

impl Utterance {
    pub fn new(audio: AudioBuffer, intervals: Vec<PhonemeInterval>) -> Self {
        let duration_ms = audio.duration_ms();
        Self {
            audio,
            duration_ms,
            intervals,
        }
    }
}

/// A fixed-length slice of an utterance and the intervals it claimed.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    pub index: usize,
    pub start_ms: f64,
    pub end_ms: f64,
    /// Claimed intervals, re-expressed in window-local time
    pub assigned: Vec<PhonemeInterval>,
    /// True when the window runs past the end of the audio
    pub needs_padding: bool,
}

impl Window {
    /// Length of silence needed after the real audio, in milliseconds.
    pub fn padding_ms(&self, duration_ms: f64) -> f64 {
        (self.end_ms - duration_ms).max(0.0)
    }
}
