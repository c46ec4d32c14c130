//! Error kinds surfaced by the corpus preparation pipeline.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PrepError>;

#[derive(Debug, Error)]
pub enum PrepError {
    /// The alignment file lacks a required marker or has a broken block.
    #[error("malformed alignment {}: {reason}", path.display())]
    MalformedAlignment { path: PathBuf, reason: String },

    /// No alignment file sits next to an audio file.
    #[error("no alignment file for {}", audio.display())]
    MissingAlignment { audio: PathBuf },

    #[error("failed to read audio {}: {message}", path.display())]
    AudioRead { path: PathBuf, message: String },

    #[error("failed to write audio {}: {message}", path.display())]
    AudioWrite { path: PathBuf, message: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PrepError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedAlignment {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn audio_read(path: impl Into<PathBuf>, err: &anyhow::Error) -> Self {
        Self::AudioRead {
            path: path.into(),
            message: format!("{:#}", err),
        }
    }

    pub(crate) fn audio_write(path: impl Into<PathBuf>, err: &anyhow::Error) -> Self {
        Self::AudioWrite {
            path: path.into(),
            message: format!("{:#}", err),
        }
    }
}
