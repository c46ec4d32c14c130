//! Split fractions and the per-class count arithmetic.

use serde::{Deserialize, Serialize};

use crate::error::{PrepError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitQuota {
    pub train_fraction: f64,
    pub valid_fraction: f64,
    /// Truncate every class to the smallest class size
    pub balanced: bool,
    /// Primary file extension, e.g. "wav"
    pub extension: String,
    /// Companion extension copied alongside each primary file, e.g. "wrd"
    pub paired_extension: Option<String>,
    /// Shuffle seed; entropy when None
    pub seed: Option<u64>,
}

impl Default for SplitQuota {
    fn default() -> Self {
        Self {
            train_fraction: 0.8,
            valid_fraction: 0.1,
            balanced: true,
            extension: "wav".to_string(),
            paired_extension: None,
            seed: None,
        }
    }
}

/// How many samples of one class go to each split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitCounts {
    pub train: usize,
    pub valid: usize,
    pub test: usize,
}

impl SplitCounts {
    pub fn total(&self) -> usize {
        self.train + self.valid + self.test
    }
}

impl SplitQuota {
    pub fn validate(&self) -> Result<()> {
        let in_range = |f: f64| f.is_finite() && (0.0..=1.0).contains(&f);
        if !in_range(self.train_fraction) || !in_range(self.valid_fraction) {
            return Err(PrepError::InvalidConfig(format!(
                "split fractions must lie in [0, 1], got train={} valid={}",
                self.train_fraction, self.valid_fraction
            )));
        }
        if self.train_fraction + self.valid_fraction >= 1.0 {
            return Err(PrepError::InvalidConfig(format!(
                "train + valid must leave room for test, got {} + {}",
                self.train_fraction, self.valid_fraction
            )));
        }
        if self.extension.trim_start_matches('.').is_empty() {
            return Err(PrepError::InvalidConfig("empty file extension".to_string()));
        }
        Ok(())
    }

    /// Split `count` samples: train and valid are rounded (half to even),
    /// test takes the remainder.
    pub fn counts_for(&self, count: usize) -> SplitCounts {
        let round = |f: f64| (count as f64 * f).round_ties_even() as usize;
        let train = round(self.train_fraction).min(count);
        let valid = round(self.valid_fraction).min(count - train);
        SplitCounts {
            train,
            valid,
            test: count - train - valid,
        }
    }
}
