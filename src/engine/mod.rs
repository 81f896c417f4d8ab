//! Audio Engine Module
//!
//! Core audio data handling:
//! - PCM buffer management
//! - WAV file decoding

pub mod buffer;
pub mod io;

pub use buffer::{PcmBuffer, DEFAULT_SAMPLE_RATE};
pub use io::{decode_wav_file, generate_stereo_test_tone, generate_test_tone, MAX_INPUT_BYTES};
