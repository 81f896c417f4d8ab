//! CLI Module
//!
//! Command-line interface for the bgmix mixing engine.

pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Bgmix - mix a voice or music track with looping background music
#[derive(Parser, Debug)]
#[command(name = "bgmix")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Mix two WAV files into one
    Mix(MixArgs),

    /// Print sample rate, channels, frames and duration of a WAV file
    Probe {
        /// Path to the WAV file
        path: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct MixArgs {
    /// Primary (foreground) WAV file
    #[arg(long)]
    pub original: PathBuf,

    /// Background-music WAV file
    #[arg(long)]
    pub bgm: PathBuf,

    /// Output WAV path
    #[arg(short, long)]
    pub output: PathBuf,

    /// JSON preset file with mix parameters; flags below override it
    #[arg(long)]
    pub params: Option<PathBuf>,

    /// Primary track volume, 0.0 to 1.0
    #[arg(long)]
    pub original_volume: Option<f32>,

    /// Background volume, 0.0 to 1.0
    #[arg(long)]
    pub bgm_volume: Option<f32>,

    /// Background fade-in in seconds
    #[arg(long)]
    pub fade_in: Option<f64>,

    /// Background fade-out in seconds
    #[arg(long)]
    pub fade_out: Option<f64>,

    /// Length strategy: fit_to_original, fit_to_bgm, loop_bgm
    #[arg(long)]
    pub strategy: Option<String>,

    /// Offset into the background track at output start, in seconds
    #[arg(long)]
    pub bgm_offset: Option<f64>,
}
