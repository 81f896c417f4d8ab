//! Channel reconciliation
//!
//! When the two sources disagree on channel count, the output uses the
//! larger count and the narrower source folds down: output channels past
//! its range read from its channel 0, never from silence. The mapping is
//! computed once per mix call and applied uniformly across all frames.

use crate::engine::buffer::PcmBuffer;

/// Per-mix channel layout: output channel count plus the source-channel
/// index each output channel reads from, for both inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelPlan {
    output_channels: usize,
    original_source: Vec<usize>,
    bgm_source: Vec<usize>,
}

impl ChannelPlan {
    /// Build the plan for a pair of input buffers.
    pub fn new(original: &PcmBuffer, bgm: &PcmBuffer) -> Self {
        let output_channels = original.num_channels().max(bgm.num_channels());
        Self {
            output_channels,
            original_source: fold_down_map(output_channels, original.num_channels()),
            bgm_source: fold_down_map(output_channels, bgm.num_channels()),
        }
    }

    /// Number of output channels.
    pub fn output_channels(&self) -> usize {
        self.output_channels
    }

    /// Source channel of the primary track for an output channel.
    pub fn original_source(&self, output_channel: usize) -> usize {
        self.original_source[output_channel]
    }

    /// Source channel of the background track for an output channel.
    pub fn bgm_source(&self, output_channel: usize) -> usize {
        self.bgm_source[output_channel]
    }
}

fn fold_down_map(output_channels: usize, source_channels: usize) -> Vec<usize> {
    (0..output_channels)
        .map(|c| if c < source_channels { c } else { 0 })
        .collect()
}
