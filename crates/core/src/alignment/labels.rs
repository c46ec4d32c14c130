//! Phoneme label canonicalization and the permitted-label filter.

use std::collections::BTreeSet;
use std::str::FromStr;

use crate::error::PrepError;

lazy_static::lazy_static! {
    /// The 15 ARPABET vowels, without stress markers.
    pub static ref DEFAULT_VOWELS: Vec<&'static str> = vec![
        "AA", "AE", "AH", "AO", "AW", "AY", "EH", "ER",
        "EY", "OW", "OY", "UH", "UW", "IH", "IY",
    ];
}

/// Strip one trailing ARPABET stress digit ("AH0" -> "AH").
pub fn canonical_label(label: &str) -> &str {
    label
        .strip_suffix(|c: char| matches!(c, '0' | '1' | '2'))
        .unwrap_or(label)
}

/// Set of canonical labels an interval must carry to be kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    labels: BTreeSet<String>,
}

impl LabelSet {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Canonicalize `raw` and return it if permitted.
    pub fn admit<'a>(&self, raw: &'a str) -> Option<&'a str> {
        let label = canonical_label(raw);
        self.labels.contains(label).then_some(label)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Default for LabelSet {
    fn default() -> Self {
        Self::new(DEFAULT_VOWELS.iter().copied())
    }
}

/// Parse a comma-separated list such as "AA,AE,IY".
impl FromStr for LabelSet {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let set = Self::new(
            s.split(',')
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(|l| canonical_label(l).to_string()),
        );
        if set.is_empty() {
            return Err(PrepError::InvalidConfig(format!("empty label list: '{}'", s)));
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_strips_stress() {
        assert_eq!(canonical_label("AH0"), "AH");
        assert_eq!(canonical_label("IY1"), "IY");
        assert_eq!(canonical_label("ER2"), "ER");
        assert_eq!(canonical_label("K"), "K");
    }

    #[test]
    fn test_canonical_strips_one_digit_only() {
        assert_eq!(canonical_label("AH3"), "AH3");
        assert_eq!(canonical_label("X12"), "X1");
    }

    #[test]
    fn test_default_set_has_fifteen_vowels() {
        let set = LabelSet::default();
        assert_eq!(set.len(), 15);
        assert_eq!(set.admit("UW1"), Some("UW"));
        assert_eq!(set.admit("T"), None);
        assert_eq!(set.admit(""), None);
        assert_eq!(set.admit("sil"), None);
    }

    #[test]
    fn test_parse_label_list() {
        let set: LabelSet = "AA, AE ,IY1".parse().unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.admit("IY0"), Some("IY"));
        assert_eq!(set.admit("AH"), None);
    }

    #[test]
    fn test_parse_empty_label_list() {
        assert!(" , ".parse::<LabelSet>().is_err());
    }
}
