//! Mix parameters
//!
//! The immutable parameter snapshot passed to each mix call, plus the
//! length-reconciliation strategy. Parameter sets serialize to JSON so
//! presets can be stored on disk and loaded by the CLI.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MixError, Result};

/// Policy selecting which input's duration determines the output duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthStrategy {
    /// Output is as long as the primary track.
    FitToOriginal,
    /// Output is as long as the background track.
    FitToBgm,
    /// Background tiles inside the primary track's span; output length
    /// matches the primary track.
    LoopBgm,
}

impl LengthStrategy {
    /// The wire name used in presets and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            LengthStrategy::FitToOriginal => "fit_to_original",
            LengthStrategy::FitToBgm => "fit_to_bgm",
            LengthStrategy::LoopBgm => "loop_bgm",
        }
    }
}

impl fmt::Display for LengthStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LengthStrategy {
    type Err = MixError;

    /// Parse a strategy name. Unrecognized names fail; there is no
    /// silent fallback.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "fit_to_original" => Ok(LengthStrategy::FitToOriginal),
            "fit_to_bgm" => Ok(LengthStrategy::FitToBgm),
            "loop_bgm" => Ok(LengthStrategy::LoopBgm),
            other => Err(MixError::InvalidInput {
                reason: format!("unrecognized length strategy: {:?}", other),
            }),
        }
    }
}

/// Parameters for a single mix call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixParams {
    /// Linear gain applied to the primary track, 0.0 to 1.0.
    pub original_volume: f32,
    /// Linear gain applied to the background track, 0.0 to 1.0.
    pub bgm_volume: f32,
    /// Background fade-in length in seconds.
    pub fade_in_duration: f64,
    /// Background fade-out length in seconds.
    pub fade_out_duration: f64,
    /// Length-reconciliation strategy.
    pub strategy: LengthStrategy,
    /// Offset into the background track, in seconds, at output frame 0.
    pub bgm_start_offset: f64,
}

impl Default for MixParams {
    fn default() -> Self {
        Self {
            original_volume: 1.0,
            bgm_volume: 0.25,
            fade_in_duration: 2.0,
            fade_out_duration: 1.0,
            strategy: LengthStrategy::LoopBgm,
            bgm_start_offset: 0.0,
        }
    }
}

impl MixParams {
    /// Validate all fields.
    ///
    /// Volumes must lie in [0, 1]; durations and the start offset must be
    /// finite and non-negative. Out-of-range values are rejected rather
    /// than clamped: the interactive controls already constrain them, so a
    /// bad value here means a broken preset or caller.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("original_volume", self.original_volume),
            ("bgm_volume", self.bgm_volume),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(MixError::InvalidInput {
                    reason: format!("{} must be in [0, 1], got {}", name, value),
                });
            }
        }

        for (name, value) in [
            ("fade_in_duration", self.fade_in_duration),
            ("fade_out_duration", self.fade_out_duration),
            ("bgm_start_offset", self.bgm_start_offset),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(MixError::InvalidInput {
                    reason: format!("{} must be finite and >= 0, got {}", name, value),
                });
            }
        }

        Ok(())
    }
}
