//! Bgmix - Background-Music Mixing Engine
//!
//! Bgmix blends a primary audio track with a background-music track into a
//! single WAV file: independent volume scaling, linear fade-in/fade-out on
//! the background, modulo-based background looping with a start offset,
//! and a choice of length-reconciliation strategies.
//!
//! # Architecture
//!
//! - [`engine`] - PCM buffers and WAV file decoding
//! - [`mix`] - the deterministic core: length resolution, channel
//!   reconciliation, the sample loop, and container encoding
//! - [`session`] - per-call orchestration, observable processing state,
//!   progress milestones, and cooperative cancellation

pub mod cli;
pub mod engine;
pub mod error;
pub mod mix;
pub mod session;

pub use error::{MixError, Result};
pub use session::{MixSession, MixedResult, Phase, ProcessingState, ProgressEvent};
