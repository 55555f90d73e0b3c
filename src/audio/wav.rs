//! Loading pre-recorded audio for the transcription stage.
//!
//! WAV files are decoded, downmixed to mono from any channel count and resampled to the recognition
//! sample rate. Anything else is taken as raw LINEAR16 bytes.

use crate::error::{LingoError, Result};
use std::io::Read;
use std::path::Path;

/// Load an audio file as 16-bit little-endian PCM bytes at `sample_rate`.
pub fn load_audio_file(path: &Path, sample_rate: u32) -> Result<Vec<u8>> {
    let is_wav = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("wav"));

    let file = std::fs::File::open(path).map_err(|e| LingoError::Transcription {
        message: format!("Failed to open audio file {}: {}", path.display(), e),
    })?;

    if is_wav {
        let samples = decode_wav(std::io::BufReader::new(file), sample_rate)?;
        Ok(samples_to_le_bytes(&samples))
    } else {
        let mut buffer = Vec::new();
        std::io::BufReader::new(file)
            .read_to_end(&mut buffer)
            .map_err(|e| LingoError::Transcription {
                message: format!("Failed to read audio file {}: {}", path.display(), e),
            })?;
        Ok(buffer)
    }
}

/// Decode 16-bit WAV data to mono samples at `sample_rate`.
pub fn decode_wav<R: Read>(reader: R, sample_rate: u32) -> Result<Vec<i16>> {
    let mut wav_reader = hound::WavReader::new(reader).map_err(|e| LingoError::Transcription {
        message: format!("Failed to parse WAV file: {}", e),
    })?;

    let spec = wav_reader.spec();
    if spec.bits_per_sample != 16 || spec.sample_format != hound::SampleFormat::Int {
        return Err(LingoError::Transcription {
            message: format!(
                "Unsupported WAV format: {}-bit {:?} (expected 16-bit PCM)",
                spec.bits_per_sample, spec.sample_format
            ),
        });
    }

    let raw_samples: Vec<i16> = wav_reader
        .samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| LingoError::Transcription {
            message: format!("Failed to read WAV samples: {}", e),
        })?;

    let mono_samples = downmix(&raw_samples, spec.channels);
    Ok(resample(&mono_samples, spec.sample_rate, sample_rate))
}

/// Average interleaved frames down to one channel.
fn downmix(samples: &[i16], channels: u16) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks_exact(channels as usize)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}

/// Serialize samples as LINEAR16 (little-endian) bytes.
pub fn samples_to_le_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

/// Simple linear interpolation resampling.
fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = (source_pos.floor() as usize).min(samples.len() - 1);
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[source_idx]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as i16
            }
        })
        .collect()
}
