//! WAV container encoding
//!
//! Serializes a mixed buffer into the canonical 16-bit linear-PCM
//! RIFF/WAVE layout: a 44-byte little-endian header followed by
//! frame-interleaved samples. Encoding is pure; identical float input
//! always yields identical bytes.

use crate::engine::buffer::PcmBuffer;
use crate::error::{MixError, Result};

/// Bytes per encoded sample (16-bit PCM).
const BYTES_PER_SAMPLE: usize = 2;

/// Size of the RIFF header fields that precede the sample data.
const HEADER_LEN: usize = 44;

/// WAVE format tag for uncompressed linear PCM.
const FORMAT_PCM: u16 = 1;

/// Encode a buffer as a complete in-memory WAV file.
///
/// Samples are clamped to [-1, 1], scaled to the 16-bit range and rounded
/// half-away-from-zero, then interleaved frame by frame in channel order.
///
/// # Errors
/// `InternalEncodingError` on violated container invariants: ragged
/// channels, a channel count the format cannot carry, or sizes that
/// overflow the 32-bit RIFF fields. None of these are reachable through a
/// [`PcmBuffer`] of ordinary shape.
pub fn encode_wav(pcm: &PcmBuffer) -> Result<Vec<u8>> {
    let channels = pcm.num_channels();
    let frames = pcm.num_frames();

    // block_align is a u16 holding channels * 2
    if channels == 0 || channels > (u16::MAX as usize) / BYTES_PER_SAMPLE {
        return Err(MixError::InternalEncodingError {
            reason: format!("channel count {} not representable", channels),
        });
    }
    if let Some(ragged) = pcm.channels().iter().position(|ch| ch.len() != frames) {
        return Err(MixError::InternalEncodingError {
            reason: format!("channel {} length differs from frame count", ragged),
        });
    }

    let data_len = frames
        .checked_mul(channels)
        .and_then(|n| n.checked_mul(BYTES_PER_SAMPLE))
        .filter(|&n| n <= (u32::MAX as usize) - (HEADER_LEN - 8))
        .ok_or_else(|| MixError::InternalEncodingError {
            reason: format!("{} frames x {} channels overflows RIFF sizes", frames, channels),
        })?;

    let byte_rate = pcm
        .sample_rate()
        .checked_mul(channels as u32 * BYTES_PER_SAMPLE as u32)
        .ok_or_else(|| MixError::InternalEncodingError {
            reason: format!("byte rate overflows at {} Hz", pcm.sample_rate()),
        })?;
    let block_align = (channels * BYTES_PER_SAMPLE) as u16;

    let mut bytes = Vec::with_capacity(HEADER_LEN + data_len);

    // RIFF chunk
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&((HEADER_LEN - 8 + data_len) as u32).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");

    // fmt chunk
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&FORMAT_PCM.to_le_bytes());
    bytes.extend_from_slice(&(channels as u16).to_le_bytes());
    bytes.extend_from_slice(&pcm.sample_rate().to_le_bytes());
    bytes.extend_from_slice(&byte_rate.to_le_bytes());
    bytes.extend_from_slice(&block_align.to_le_bytes());
    bytes.extend_from_slice(&(8 * BYTES_PER_SAMPLE as u16).to_le_bytes());

    // data chunk: frames in order, channels interleaved within each frame
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&(data_len as u32).to_le_bytes());
    for frame in 0..frames {
        for channel in pcm.channels() {
            bytes.extend_from_slice(&quantize(channel[frame]).to_le_bytes());
        }
    }

    Ok(bytes)
}

/// Quantize a float sample to 16-bit PCM.
#[inline]
fn quantize(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * 32767.0).round() as i16
}
