//! Audio file decoding
//!
//! Reads WAV files into [`PcmBuffer`]s for the mixing engine. All samples
//! are converted to 32-bit float on load; the source bit depth may be
//! 8/16/24/32-bit integer or 32-bit float.
//!
//! No sample rate conversion happens here. The mix session requires both
//! inputs at its own rate and rejects mismatches, so decoding preserves
//! whatever rate the file declares.

use std::path::Path;

use hound::{SampleFormat, WavReader};

use crate::engine::buffer::PcmBuffer;
use crate::error::{MixError, Result};

/// Largest input file accepted by the decoder (50 MB).
pub const MAX_INPUT_BYTES: u64 = 50 * 1024 * 1024;

/// Decode a WAV file into a planar float buffer.
///
/// # Arguments
/// * `path` - Path to the WAV file
///
/// # Errors
/// * `FileNotFound` - If the file does not exist
/// * `InvalidInput` - If the file exceeds [`MAX_INPUT_BYTES`]
/// * `InvalidAudio` - If the file is not a readable WAV file
/// * `UnsupportedFormat` - If the bit depth has no float conversion
pub fn decode_wav_file(path: &Path) -> Result<PcmBuffer> {
    if !path.exists() {
        return Err(MixError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let file_len = std::fs::metadata(path)?.len();
    if file_len > MAX_INPUT_BYTES {
        return Err(MixError::InvalidInput {
            reason: format!(
                "{}: file is {} bytes, limit is {} bytes",
                path.display(),
                file_len,
                MAX_INPUT_BYTES
            ),
        });
    }

    let reader = WavReader::open(path).map_err(|e| MixError::InvalidAudio {
        reason: format!("Failed to open WAV file: {}", e),
    })?;

    let spec = reader.spec();
    let sample_rate = spec.sample_rate;
    let channels = spec.channels as usize;
    if channels == 0 {
        return Err(MixError::InvalidAudio {
            reason: "WAV file declares zero channels".to_string(),
        });
    }

    let interleaved = read_samples_as_f32(reader, spec.bits_per_sample, spec.sample_format)?;

    PcmBuffer::from_channels(deinterleave(&interleaved, channels), sample_rate)
}

/// Generate a mono sine tone.
///
/// Useful for exercising the mix pipeline without audio files on disk.
pub fn generate_test_tone(frequency: f32, duration_secs: f64, sample_rate: u32) -> PcmBuffer {
    let num_frames = (duration_secs * sample_rate as f64) as usize;
    let angular_freq = 2.0 * std::f32::consts::PI * frequency / sample_rate as f32;

    let samples = (0..num_frames)
        .map(|i| (angular_freq * i as f32).sin())
        .collect();

    PcmBuffer::from_channels(vec![samples], sample_rate)
        .expect("generated tone satisfies buffer invariants")
}

/// Generate a stereo tone with a different frequency per channel.
pub fn generate_stereo_test_tone(
    freq_left: f32,
    freq_right: f32,
    duration_secs: f64,
    sample_rate: u32,
) -> PcmBuffer {
    let num_frames = (duration_secs * sample_rate as f64) as usize;

    let tone = |freq: f32| -> Vec<f32> {
        let angular_freq = 2.0 * std::f32::consts::PI * freq / sample_rate as f32;
        (0..num_frames)
            .map(|i| (angular_freq * i as f32).sin())
            .collect()
    };

    PcmBuffer::from_channels(vec![tone(freq_left), tone(freq_right)], sample_rate)
        .expect("generated tone satisfies buffer invariants")
}

// ============================================================================
// Internal helper functions
// ============================================================================

/// Read samples from a WAV reader and convert to f32.
fn read_samples_as_f32<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f32>> {
    match sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| MixError::InvalidAudio {
                reason: format!("Failed to read float samples: {}", e),
            }),
        SampleFormat::Int => match bits_per_sample {
            8 => reader
                .samples::<i8>()
                .map(|s| s.map(|v| v as f32 / 128.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| MixError::InvalidAudio {
                    reason: format!("Failed to read 8-bit samples: {}", e),
                }),
            16 => reader
                .samples::<i16>()
                .map(|s| s.map(|v| v as f32 / 32768.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| MixError::InvalidAudio {
                    reason: format!("Failed to read 16-bit samples: {}", e),
                }),
            24 => {
                // 24-bit stored as i32 in hound
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / 8388608.0))
                    .collect::<std::result::Result<Vec<f32>, _>>()
                    .map_err(|e| MixError::InvalidAudio {
                        reason: format!("Failed to read 24-bit samples: {}", e),
                    })
            }
            32 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / 2147483648.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| MixError::InvalidAudio {
                    reason: format!("Failed to read 32-bit int samples: {}", e),
                }),
            _ => Err(MixError::UnsupportedFormat {
                format: format!("{}-bit integer audio", bits_per_sample),
            }),
        },
    }
}

/// De-interleave samples from [L,R,L,R,...] to [[L,L,...], [R,R,...]]
fn deinterleave(samples: &[f32], channels: usize) -> Vec<Vec<f32>> {
    let frames = samples.len() / channels.max(1);
    let mut result = vec![Vec::with_capacity(frames); channels];

    for (i, sample) in samples.iter().enumerate() {
        result[i % channels].push(*sample);
    }

    result
}

// ============================================================================
// Tests
// ============================================================================
