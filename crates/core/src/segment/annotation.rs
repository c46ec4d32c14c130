//! Per-clip annotation files: one `<start_sample> <end_sample> <label>` line
//! per phoneme, in window-local sample positions.

use std::path::Path;

use crate::error::{PrepError, Result};
use crate::types::PhonemeInterval;

/// Samples per millisecond at the fixed 16 kHz annotation rate.
pub const SAMPLES_PER_MS: f64 = 16.0;

fn to_sample(ms: f64) -> i64 {
    (ms * SAMPLES_PER_MS).round_ties_even() as i64
}

pub fn format_annotation(intervals: &[PhonemeInterval]) -> String {
    intervals
        .iter()
        .map(|p| format!("{} {} {}\n", to_sample(p.start_ms), to_sample(p.end_ms), p.label))
        .collect()
}

/// Write the annotation file; an empty interval list gives an empty file.
pub fn write_annotation(path: &Path, intervals: &[PhonemeInterval]) -> Result<()> {
    std::fs::write(path, format_annotation(intervals)).map_err(|e| PrepError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_lines() {
        let intervals = vec![
            PhonemeInterval::new(0.0, 400.0, "AH"),
            PhonemeInterval::new(412.5, 500.0, "IY"),
        ];
        assert_eq!(format_annotation(&intervals), "0 6400 AH\n6600 8000 IY\n");
    }

    #[test]
    fn test_rounds_half_to_even() {
        // 0.03125 ms * 16 = 0.5 samples, 0.09375 ms * 16 = 1.5 samples
        let intervals = vec![PhonemeInterval::new(0.03125, 0.09375, "EH")];
        assert_eq!(format_annotation(&intervals), "0 2 EH\n");
    }

    #[test]
    fn test_write_empty_annotation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("0.wrd");
        write_annotation(&path, &[]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }
}
