//! Reading time-aligned phonetic annotations.

pub mod labels;
pub mod textgrid;

pub use labels::{canonical_label, LabelSet};
pub use textgrid::{parse_textgrid, read_alignment};
