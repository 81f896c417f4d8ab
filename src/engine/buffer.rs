//! PCM buffer management
//!
//! Provides the decoded-audio buffer type shared by the decoder, the mixer
//! and the encoder. Samples are stored planar (one `Vec<f32>` per channel)
//! so the mixer can hand each channel to a separate worker.

use crate::error::{MixError, Result};

/// Default session sample rate (44.1kHz)
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// A decoded, immutable block of PCM audio.
///
/// Invariants, checked at construction:
/// - at least one channel
/// - every channel holds the same number of frames
/// - the sample rate is non-zero
///
/// A buffer with zero frames is valid as far as this type is concerned;
/// whether it is acceptable input is decided by the operation consuming it.
#[derive(Clone, Debug, PartialEq)]
pub struct PcmBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl PcmBuffer {
    /// Create a buffer from planar channel data.
    ///
    /// # Errors
    /// `InvalidInput` if the channel list is empty, the channels have
    /// differing lengths, or the sample rate is zero.
    pub fn from_channels(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(MixError::InvalidInput {
                reason: "sample rate must be non-zero".to_string(),
            });
        }
        if channels.is_empty() {
            return Err(MixError::InvalidInput {
                reason: "buffer must have at least one channel".to_string(),
            });
        }
        let frames = channels[0].len();
        if let Some(ragged) = channels.iter().position(|ch| ch.len() != frames) {
            return Err(MixError::InvalidInput {
                reason: format!(
                    "channel {} has {} frames, expected {}",
                    ragged,
                    channels[ragged].len(),
                    frames
                ),
            });
        }
        Ok(Self {
            sample_rate,
            channels,
        })
    }

    /// Create a silent buffer with the given shape.
    pub fn silence(num_channels: usize, num_frames: usize, sample_rate: u32) -> Self {
        Self {
            sample_rate,
            channels: vec![vec![0.0; num_frames]; num_channels.max(1)],
        }
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Number of frames per channel.
    pub fn num_frames(&self) -> usize {
        self.channels[0].len()
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.num_frames() as f64 / self.sample_rate as f64
    }

    /// True if the buffer holds no frames.
    pub fn is_empty(&self) -> bool {
        self.num_frames() == 0
    }

    /// Samples of a single channel.
    ///
    /// # Panics
    /// Panics if `index` is out of range; callers index through a
    /// [`ChannelPlan`](crate::mix::ChannelPlan), which only produces
    /// valid source indices.
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    /// All channels, planar.
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }
}
