//! Audio I/O: WAV read/write, millisecond cuts, fixed windows padded with
//! silence, and decoding FLAC (or MP3) to 16 kHz mono WAV.

use std::path::Path;

use anyhow::{Context, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::types::AudioBuffer;

/// Sample rate every clip and annotation assumes.
pub const TARGET_SAMPLE_RATE: u32 = 16000;

/// Read a WAV file into a mono buffer.
///
/// - Normalizes integer PCM to f64 in [-1, 1]
/// - Passes through float WAVs as f64
/// - Keeps the first channel of multi-channel files
pub fn read_wav(path: &Path) -> Result<AudioBuffer> {
    let reader = WavReader::open(path)
        .with_context(|| format!("Failed to open WAV file: {}", path.display()))?;

    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let samples: Vec<f64> = match spec.sample_format {
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f64;
            reader
                .into_samples::<i32>()
                .step_by(channels)
                .map(|s| s.map(|v| v as f64 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()
                .context("Failed to read WAV samples")?
        }
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .step_by(channels)
            .map(|s| s.map(|v| v as f64))
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to read WAV samples")?,
    };

    Ok(AudioBuffer::new(samples, spec.sample_rate))
}

/// Write f64 samples to a 16-bit PCM mono WAV file.
///
/// Clips values to [-1, 1]. The parent directory must already exist.
pub fn write_wav(path: &Path, samples: &[f64], sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file: {}", path.display()))?;

    for &sample in samples {
        let int16 = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
        writer.write_sample(int16)?;
    }

    writer.finalize().context("Failed to finalize WAV file")?;
    Ok(())
}

fn ms_to_index(ms: f64, sample_rate: u32) -> usize {
    (ms.max(0.0) * sample_rate as f64 / 1000.0).round() as usize
}

/// Cut `[start_ms, end_ms)` out of a buffer, clamped to its bounds.
pub fn cut_ms(audio: &AudioBuffer, start_ms: f64, end_ms: f64) -> Vec<f64> {
    let start_idx = ms_to_index(start_ms, audio.sample_rate).min(audio.samples.len());
    let end_idx = ms_to_index(end_ms, audio.sample_rate).min(audio.samples.len());
    if start_idx >= end_idx {
        return vec![];
    }
    audio.samples[start_idx..end_idx].to_vec()
}

/// Cut a window of exactly `length_ms` starting at `start_ms`.
///
/// Whatever part of the window lies past the end of the audio is filled
/// with silence, so the result always holds `round(length_ms * rate)` samples.
pub fn cut_fixed(audio: &AudioBuffer, start_ms: f64, length_ms: f64) -> Vec<f64> {
    let want = ms_to_index(length_ms, audio.sample_rate);
    let start_idx = ms_to_index(start_ms, audio.sample_rate).min(audio.samples.len());
    let end_idx = (start_idx + want).min(audio.samples.len());
    let mut out = audio.samples[start_idx..end_idx].to_vec();
    out.resize(want, 0.0);
    out
}

/// Frames fed to the resampler per call.
const RESAMPLE_CHUNK: usize = 1024;

/// Resample mono audio from `from_sr` to `to_sr`.
///
/// Input is streamed through rubato in fixed chunks and the filter delay
/// is trimmed, so the result holds `round(len * to_sr / from_sr)` samples.
pub fn resample(samples: &[f64], from_sr: u32, to_sr: u32) -> Result<Vec<f64>> {
    use rubato::{
        Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
    };

    if from_sr == to_sr || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let ratio = to_sr as f64 / from_sr as f64;
    let expected = (samples.len() as f64 * ratio).round() as usize;
    let mut resampler = SincFixedIn::<f64>::new(ratio, 1.0, params, RESAMPLE_CHUNK, 1)
        .context("Failed to build resampler")?;

    let mut out = Vec::with_capacity(expected + RESAMPLE_CHUNK);
    let mut pos = 0;
    while samples.len() - pos >= resampler.input_frames_next() {
        let n = resampler.input_frames_next();
        let chunk = resampler.process(&[&samples[pos..pos + n]], None)?;
        out.extend_from_slice(&chunk[0]);
        pos += n;
    }
    if pos < samples.len() {
        let chunk = resampler.process_partial(Some(&[&samples[pos..]]), None)?;
        out.extend_from_slice(&chunk[0]);
    }
    // Flush the samples still held back by the filter delay.
    let tail = resampler.process_partial(None::<&[&[f64]]>, None)?;
    out.extend_from_slice(&tail[0]);

    let delay = resampler.output_delay().min(out.len());
    out.drain(..delay);
    out.resize(expected, 0.0);
    Ok(out)
}

/// Decode any format symphonia knows into a mono buffer at its native rate.
///
/// Channels are averaged. Packets that fail to decode are skipped.
pub fn decode_mono(input_path: &Path) -> Result<AudioBuffer> {
    use symphonia::core::audio::SampleBuffer;
    use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
    use symphonia::core::errors::Error as SymphError;
    use symphonia::core::formats::FormatOptions;
    use symphonia::core::io::MediaSourceStream;
    use symphonia::core::meta::MetadataOptions;
    use symphonia::core::probe::Hint;

    let file = std::fs::File::open(input_path)
        .with_context(|| format!("Failed to open: {}", input_path.display()))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = input_path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }
    let mut format = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .with_context(|| format!("Unsupported format: {}", input_path.display()))?
        .format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .with_context(|| format!("No audio track in {}", input_path.display()))?;
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .with_context(|| format!("Unknown sample rate in {}", input_path.display()))?;
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Unsupported codec")?;

    let mut mono: Vec<f64> = Vec::new();
    let mut buf: Option<SampleBuffer<f64>> = None;
    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break
            }
            Err(SymphError::ResetRequired) => break,
            Err(e) => return Err(e.into()),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphError::DecodeError(msg)) => {
                log::debug!("Skipping undecodable packet in {}: {}", input_path.display(), msg);
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        let spec = *decoded.spec();
        let channels = spec.channels.count().max(1);
        let buf = buf.get_or_insert_with(|| SampleBuffer::new(decoded.capacity() as u64, spec));
        buf.copy_interleaved_ref(decoded);
        mono.extend(
            buf.samples()
                .chunks(channels)
                .map(|frame| frame.iter().sum::<f64>() / channels as f64),
        );
    }

    if mono.is_empty() {
        anyhow::bail!("No audio decoded from {}", input_path.display());
    }
    Ok(AudioBuffer::new(mono, sample_rate))
}

/// Decode `input_path` and write it as 16 kHz mono WAV to `output_path`.
pub fn convert_to_wav(input_path: &Path, output_path: &Path) -> Result<()> {
    let audio = decode_mono(input_path)?;
    let samples = resample(&audio.samples, audio.sample_rate, TARGET_SAMPLE_RATE)
        .with_context(|| format!("Failed to resample {}", input_path.display()))?;
    write_wav(output_path, &samples, TARGET_SAMPLE_RATE)
}
