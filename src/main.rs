//! Bgmix CLI - Background-Music Mixer
//!
//! Command-line interface for the bgmix mixing engine.

use clap::Parser;
use env_logger::Env;
use log::info;

use bgmix::cli::{commands, Cli, Commands};
use bgmix::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    info!("bgmix v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Mix(args) => commands::mix(&args),
        Commands::Probe { path } => commands::probe(&path),
    }
}
