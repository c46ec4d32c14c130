//! Bring an audio tree into the form segmentation expects: WAV files at
//! 16 kHz, converting compressed sources into a mirrored directory first.

use std::path::{Path, PathBuf};

use crate::audio::io::convert_to_wav;
use crate::error::{PrepError, Result};
use crate::fsutil::{create_dir_all, files_with_extension, rebase_with_extension};

/// Default name for the directory converted WAVs are written to.
pub const CONVERTED_DIR: &str = "converted_wav";

/// Outcome of audio preparation.
#[derive(Debug, Clone)]
pub struct PreparedAudio {
    /// Root to read WAV files from (the audio root itself or the converted tree)
    pub root: PathBuf,
    /// Number of WAV files found under `root`
    pub wav_count: usize,
    /// Set when a converted tree was produced
    pub converted: Option<PathBuf>,
}

/// Convert every `source_ext` file under `src_root` into a WAV under
/// `dst_root`, keeping relative paths. Returns the number converted.
pub fn convert_tree(src_root: &Path, dst_root: &Path, source_ext: &str) -> Result<usize> {
    let sources = files_with_extension(src_root, source_ext)?;
    for src in &sources {
        let dst = rebase_with_extension(src, src_root, dst_root, "wav")
            .ok_or_else(|| {
                PrepError::InvalidConfig(format!(
                    "{} is outside {}",
                    src.display(),
                    src_root.display()
                ))
            })?;
        if let Some(parent) = dst.parent() {
            create_dir_all(parent)?;
        }
        log::debug!("Converting {} -> {}", src.display(), dst.display());
        convert_to_wav(src, &dst).map_err(|e| PrepError::audio_read(src, &e))?;
    }
    Ok(sources.len())
}

/// Locate WAV input for segmentation.
///
/// With `converted_dir` set, FLAC files under `audio_root` are first
/// converted into that directory, which then becomes the input root.
pub fn prepare_audio(audio_root: &Path, converted_dir: Option<&Path>) -> Result<PreparedAudio> {
    let mut root = audio_root.to_path_buf();
    let mut converted = None;

    if let Some(wav_root) = converted_dir {
        let flac_count = files_with_extension(audio_root, "flac")?.len();
        log::info!("found {} audio files in format flac", flac_count);
        if flac_count > 0 {
            convert_tree(audio_root, wav_root, "flac")?;
            log::info!("files converted to .wav format");
            root = wav_root.to_path_buf();
            converted = Some(wav_root.to_path_buf());
        }
    }

    let wav_count = files_with_extension(&root, "wav")?.len();
    log::info!("found {} audio files in format wav", wav_count);

    Ok(PreparedAudio {
        root,
        wav_count,
        converted,
    })
}

/// Delete a converted WAV tree produced by [`prepare_audio`].
pub fn remove_converted(dir: &Path) -> Result<()> {
    std::fs::remove_dir_all(dir).map_err(|e| PrepError::io(dir, e))?;
    log::info!("created wav files deleted");
    Ok(())
}
