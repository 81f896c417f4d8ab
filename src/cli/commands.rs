//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::fs;
use std::path::Path;

use log::info;

use crate::cli::MixArgs;
use crate::engine::io::decode_wav_file;
use crate::error::Result;
use crate::mix::params::MixParams;
use crate::session::MixSession;

/// Mix two WAV files and write the encoded result.
pub fn mix(args: &MixArgs) -> Result<()> {
    info!(
        "Mixing {} + {}",
        args.original.display(),
        args.bgm.display()
    );

    let original = decode_wav_file(&args.original)?;
    let bgm = decode_wav_file(&args.bgm)?;
    let params = assemble_params(args)?;

    // The session processes at the primary track's rate; a differing bgm
    // rate is rejected inside mix() since no resampling exists.
    let session = MixSession::new(original.sample_rate());
    let progress = session.subscribe_progress();

    let printer = std::thread::spawn(move || {
        for event in progress {
            info!("mix progress: {}%", event.percentage);
        }
    });

    let outcome = session.mix(&original, &bgm, &params);
    drop(session);
    let _ = printer.join();
    let result = outcome?;

    fs::write(&args.output, &result.encoded_bytes)?;

    println!(
        "Wrote {} ({:.2}s, {} channels, {} bytes)",
        args.output.display(),
        result.duration_secs,
        result.pcm.num_channels(),
        result.encoded_bytes.len()
    );

    Ok(())
}

/// Print the shape of a WAV file.
pub fn probe(path: &Path) -> Result<()> {
    let buffer = decode_wav_file(path)?;

    println!("File:        {}", path.display());
    println!("Sample rate: {} Hz", buffer.sample_rate());
    println!("Channels:    {}", buffer.num_channels());
    println!("Frames:      {}", buffer.num_frames());
    println!("Duration:    {:.3}s", buffer.duration());

    Ok(())
}

/// Build the parameter set from an optional preset file plus flag overrides.
fn assemble_params(args: &MixArgs) -> Result<MixParams> {
    let mut params = match &args.params {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => MixParams::default(),
    };

    if let Some(v) = args.original_volume {
        params.original_volume = v;
    }
    if let Some(v) = args.bgm_volume {
        params.bgm_volume = v;
    }
    if let Some(v) = args.fade_in {
        params.fade_in_duration = v;
    }
    if let Some(v) = args.fade_out {
        params.fade_out_duration = v;
    }
    if let Some(s) = &args.strategy {
        params.strategy = s.parse()?;
    }
    if let Some(v) = args.bgm_offset {
        params.bgm_start_offset = v;
    }

    params.validate()?;
    Ok(params)
}
