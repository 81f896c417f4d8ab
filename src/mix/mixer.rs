//! The sample-loop core
//!
//! Combines the scaled primary track with the scaled, faded, looped
//! background track into a single clamped output buffer. Construction
//! checks preconditions and allocates the output; [`Mixer::run`] fills it.
//! Channels carry no data dependency on one another, so each output
//! channel is rendered by its own rayon worker.
//!
//! Frame math: the total frame count and the background start offset are
//! floored to whole frames, while the fade windows stay real-valued so the
//! envelope ratio is continuous rather than stepping at frame boundaries.

use rayon::prelude::*;

use crate::engine::buffer::PcmBuffer;
use crate::error::{MixError, Result};
use crate::mix::channels::ChannelPlan;
use crate::mix::params::MixParams;

/// A prepared mix: validated inputs plus the allocated output buffer.
pub struct Mixer<'a> {
    original: &'a PcmBuffer,
    bgm: &'a PcmBuffer,
    plan: &'a ChannelPlan,
    params: &'a MixParams,
    sample_rate: u32,
    frame_count: usize,
    bgm_start_frame: usize,
    output: Vec<Vec<f32>>,
}

impl<'a> Mixer<'a> {
    /// Validate preconditions and allocate the output buffer.
    ///
    /// # Arguments
    /// * `original` - Primary track, already at `sample_rate`
    /// * `bgm` - Background track, already at `sample_rate`
    /// * `plan` - Channel reconciliation plan for the two inputs
    /// * `final_duration_secs` - Resolved output duration
    /// * `params` - Mix parameter snapshot
    /// * `sample_rate` - Processing rate shared by both inputs
    ///
    /// # Errors
    /// `EmptyBgmBuffer` if the background track holds no frames; its
    /// length is the modulus of the loop index and must be positive.
    pub fn new(
        original: &'a PcmBuffer,
        bgm: &'a PcmBuffer,
        plan: &'a ChannelPlan,
        final_duration_secs: f64,
        params: &'a MixParams,
        sample_rate: u32,
    ) -> Result<Self> {
        if bgm.is_empty() {
            return Err(MixError::EmptyBgmBuffer);
        }

        let frame_count = (final_duration_secs * sample_rate as f64).floor() as usize;
        let bgm_start_frame = (params.bgm_start_offset * sample_rate as f64).floor() as usize;

        Ok(Self {
            original,
            bgm,
            plan,
            params,
            sample_rate,
            frame_count,
            bgm_start_frame,
            output: vec![vec![0.0; frame_count]; plan.output_channels()],
        })
    }

    /// Number of output frames this mix will produce.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Render all channels and hand back the mixed buffer.
    ///
    /// Channel order in the result matches the plan, so the output is
    /// deterministic regardless of worker scheduling.
    pub fn run(mut self) -> PcmBuffer {
        let mut output = std::mem::take(&mut self.output);

        output
            .par_iter_mut()
            .enumerate()
            .for_each(|(channel, samples)| self.render_channel(channel, samples));

        PcmBuffer::from_channels(output, self.sample_rate)
            .expect("mixer output satisfies buffer invariants")
    }

    /// Fill one output channel.
    fn render_channel(&self, channel: usize, samples: &mut [f32]) {
        let original = self.original.channel(self.plan.original_source(channel));
        let bgm = self.bgm.channel(self.plan.bgm_source(channel));

        let rate = self.sample_rate as f64;
        let frame_count = self.frame_count as f64;
        let fade_in_frames = self.params.fade_in_duration * rate;
        let fade_out_frames = self.params.fade_out_duration * rate;
        let fade_out_start = frame_count - fade_out_frames;

        for (i, out) in samples.iter_mut().enumerate() {
            let original_sample = if i < original.len() {
                original[i] * self.params.original_volume
            } else {
                0.0
            };

            // The modulo wraps indefinitely: the background tiles to fill
            // the output no matter how the two lengths compare.
            let bgm_index = (i + self.bgm_start_frame) % bgm.len();
            let mut bgm_sample = bgm[bgm_index] * self.params.bgm_volume;

            let frame = i as f64;
            if frame < fade_in_frames {
                bgm_sample *= (frame / fade_in_frames) as f32;
            }
            // Independent of fade-in; both multipliers apply when the
            // windows overlap on a short output.
            if frame > fade_out_start {
                bgm_sample *= ((frame_count - frame) / fade_out_frames) as f32;
            }

            *out = (original_sample + bgm_sample).clamp(-1.0, 1.0);
        }
    }
}
