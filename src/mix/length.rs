//! Output length resolution

use crate::mix::params::LengthStrategy;

/// Pick the output duration for a mix.
///
/// `LoopBgm` resolves to the primary track's duration: looping tiles the
/// background inside the output span, it never extends the output.
pub fn resolve(
    strategy: LengthStrategy,
    original_duration_secs: f64,
    bgm_duration_secs: f64,
) -> f64 {
    match strategy {
        LengthStrategy::FitToOriginal => original_duration_secs,
        LengthStrategy::FitToBgm => bgm_duration_secs,
        LengthStrategy::LoopBgm => original_duration_secs,
    }
}
