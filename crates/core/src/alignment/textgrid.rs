//! Parse the phone tier of a TextGrid alignment file.
//!
//! Only the long ("ooTextFile") layout written by forced aligners is
//! understood: after the tier header line `name = "phones"` comes a line
//! carrying `size = N`, then N blocks of
//!
//! ```text
//! intervals [k]:
//!     xmin = 0.53
//!     xmax = 0.61
//!     text = "AH0"
//! ```
//!
//! Times are in seconds in the file and milliseconds in the result.

use std::path::Path;

use anyhow::{bail, Context, Result};

use super::labels::LabelSet;
use crate::error::PrepError;
use crate::types::PhonemeInterval;

const MAX_PREALLOCATED_INTERVALS: usize = 4096;

/// Value to the right of the first `=` on a `key = value` line.
fn field<'a>(line: &'a str, key: &str) -> Result<&'a str> {
    let (lhs, rhs) = line
        .split_once('=')
        .with_context(|| format!("expected '{} = ...', got '{}'", key, line.trim()))?;
    if !lhs.contains(key) {
        bail!("expected '{} = ...', got '{}'", key, line.trim());
    }
    Ok(rhs.trim())
}

fn seconds_field(line: &str, key: &str) -> Result<f64> {
    let raw = field(line, key)?;
    raw.parse::<f64>()
        .with_context(|| format!("invalid {} value '{}'", key, raw))
}

fn quoted_field<'a>(line: &'a str, key: &str) -> Result<&'a str> {
    let raw = field(line, key)?;
    raw.split('"')
        .nth(1)
        .with_context(|| format!("unquoted {} value '{}'", key, raw))
}

fn is_phone_tier_header(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with("name") && line.contains("\"phones\"")
}

/// Parse TextGrid text into the permitted phone intervals, in file order.
///
/// Any structural problem fails the whole file; no partial list is returned.
pub fn parse_textgrid(text: &str, labels: &LabelSet) -> Result<Vec<PhonemeInterval>> {
    let mut lines = text.lines();

    if !lines.by_ref().any(is_phone_tier_header) {
        bail!("missing phones tier");
    }
    let size_line = lines
        .by_ref()
        .find(|l| l.contains("size"))
        .context("missing size marker after phones tier")?;
    let size: usize = {
        let raw = field(size_line, "size")?;
        raw.parse()
            .with_context(|| format!("invalid size value '{}'", raw))?
    };

    // `size` is untrusted; a bogus count must fail on the missing blocks,
    // not on the allocation.
    let mut intervals = Vec::with_capacity(size.min(MAX_PREALLOCATED_INTERVALS));
    for k in 0..size {
        let mut next = || {
            lines
                .next()
                .with_context(|| format!("file ends inside interval {} of {}", k + 1, size))
        };
        next()?; // "intervals [k]:"
        let start = seconds_field(next()?, "xmin")?;
        let end = seconds_field(next()?, "xmax")?;
        let raw_label = quoted_field(next()?, "text")?;

        if let Some(label) = labels.admit(raw_label) {
            intervals.push(PhonemeInterval::new(start * 1000.0, end * 1000.0, label));
        }
    }

    Ok(intervals)
}

/// Read and parse one alignment file.
pub fn read_alignment(path: &Path, labels: &LabelSet) -> crate::Result<Vec<PhonemeInterval>> {
    let text = std::fs::read_to_string(path).map_err(|e| PrepError::io(path, e))?;
    parse_textgrid(&text, labels).map_err(|e| PrepError::malformed(path, format!("{:#}", e)))
}
