//! Core library for phonoslice: turn phoneme-aligned speech into labeled
//! fixed-length clips and split them into train/valid/test trees.

pub mod alignment;
pub mod allocator;
pub mod audio;
pub mod batch;
pub mod cancel;
pub mod config;
pub mod error;
pub mod fsutil;
pub mod partition;
pub mod segment;
pub mod types;

pub use error::{PrepError, Result};
