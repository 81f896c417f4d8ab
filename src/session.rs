//! Mix session and processing state
//!
//! A [`MixSession`] runs one mix at a time, owns the observable
//! [`ProcessingState`], publishes progress milestones to subscribers, and
//! converts every failure into a typed [`MixError`](crate::error::MixError).
//! Observers subscribe to change notifications; nothing outside the
//! session writes its state.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};

use log::{debug, info};

use crate::engine::buffer::{PcmBuffer, DEFAULT_SAMPLE_RATE};
use crate::error::{MixError, Result};
use crate::mix::channels::ChannelPlan;
use crate::mix::encoder::encode_wav;
use crate::mix::length;
use crate::mix::mixer::Mixer;
use crate::mix::params::MixParams;

// ============================================================================
// Progress milestones
// ============================================================================

/// Published at entry, before any work.
const MILESTONE_START: u8 = 0;
/// Published once length and channel layout are resolved.
const MILESTONE_RESOLVED: u8 = 20;
/// Published once the output buffer is allocated, before the sample loop.
const MILESTONE_ALLOCATED: u8 = 40;
/// Published when the sample loop completes.
const MILESTONE_MIXED: u8 = 80;
/// Published when encoding completes.
const MILESTONE_ENCODED: u8 = 100;

// ============================================================================
// Observable state
// ============================================================================

/// Lifecycle phase of a session's current (or last) mix call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No mix has run yet.
    #[default]
    Idle,
    /// A mix call is in flight.
    Processing,
    /// The last mix call succeeded.
    Completed,
    /// The last mix call failed; the error is recorded in the state.
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "Idle"),
            Phase::Processing => write!(f, "Processing"),
            Phase::Completed => write!(f, "Completed"),
            Phase::Failed => write!(f, "Failed"),
        }
    }
}

/// Snapshot of the session's processing state.
#[derive(Debug, Clone, Default)]
pub struct ProcessingState {
    pub phase: Phase,
    pub progress: u8,
    pub error: Option<String>,
}

/// A progress milestone notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub percentage: u8,
}

/// Cloneable handle that requests cancellation of the in-flight mix.
///
/// The flag is checked at every milestone boundary; a cancelled call fails
/// with `Cancelled` and the session ends up `Failed`. The flag is re-armed
/// at the start of each call, so cancelling between calls has no effect.
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// True once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The product of a successful mix call.
#[derive(Debug, Clone)]
pub struct MixedResult {
    /// The mixed float buffer.
    pub pcm: PcmBuffer,
    /// Resolved output duration in seconds.
    pub duration_secs: f64,
    /// The complete WAV container bytes.
    pub encoded_bytes: Vec<u8>,
}

// ============================================================================
// Session
// ============================================================================

/// Orchestrates mix calls and owns the processing state.
///
/// One mix may be active per session at a time; a call arriving while
/// another is in flight fails with `Busy` and leaves the in-flight call
/// untouched. Terminal phases (`Completed`, `Failed`) re-enter
/// `Processing` on the next call.
pub struct MixSession {
    sample_rate: u32,
    state: Mutex<ProcessingState>,
    progress_subscribers: Mutex<Vec<Sender<ProgressEvent>>>,
    state_subscribers: Mutex<Vec<Sender<ProcessingState>>>,
    cancel_flag: Arc<AtomicBool>,
}

impl Default for MixSession {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE)
    }
}

impl MixSession {
    /// Create a session processing at the given sample rate.
    ///
    /// Both inputs of every mix call must already be decoded at this rate;
    /// the session performs no resampling.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            state: Mutex::new(ProcessingState::default()),
            progress_subscribers: Mutex::new(Vec::new()),
            state_subscribers: Mutex::new(Vec::new()),
            cancel_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The session's processing sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Current processing state.
    pub fn state(&self) -> ProcessingState {
        self.state.lock().expect("state lock poisoned").clone()
    }

    /// Subscribe to progress milestones.
    pub fn subscribe_progress(&self) -> Receiver<ProgressEvent> {
        let (tx, rx) = channel();
        self.progress_subscribers
            .lock()
            .expect("subscriber lock poisoned")
            .push(tx);
        rx
    }

    /// Subscribe to state transitions.
    pub fn subscribe_state(&self) -> Receiver<ProcessingState> {
        let (tx, rx) = channel();
        self.state_subscribers
            .lock()
            .expect("subscriber lock poisoned")
            .push(tx);
        rx
    }

    /// Handle for cancelling the in-flight mix from another thread.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(self.cancel_flag.clone())
    }

    /// Mix the primary track with the background track.
    ///
    /// # Arguments
    /// * `original` - Primary track at the session's sample rate
    /// * `bgm` - Background track at the session's sample rate
    /// * `params` - Parameter snapshot for this call
    ///
    /// # Errors
    /// * `Busy` - Another mix call is in flight on this session
    /// * `InvalidInput` - Parameter or sample-rate precondition violated
    /// * `EmptyBgmBuffer` - The background track holds no frames
    /// * `Cancelled` - The cancel handle fired before a milestone
    /// * `InternalEncodingError` - Container invariant violated
    ///
    /// On any failure the session transitions to `Failed`, records the
    /// message, resets progress to 0, and discards partial output.
    pub fn mix(
        &self,
        original: &PcmBuffer,
        bgm: &PcmBuffer,
        params: &MixParams,
    ) -> Result<MixedResult> {
        self.begin()?;

        match self.run_mix(original, bgm, params) {
            Ok(result) => {
                self.complete();
                info!(
                    "mix complete: {:.3}s, {} bytes",
                    result.duration_secs,
                    result.encoded_bytes.len()
                );
                Ok(result)
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    // ========================================================================
    // Pipeline
    // ========================================================================

    fn run_mix(
        &self,
        original: &PcmBuffer,
        bgm: &PcmBuffer,
        params: &MixParams,
    ) -> Result<MixedResult> {
        self.milestone(MILESTONE_START)?;

        params.validate()?;
        for (name, buffer) in [("original", original), ("bgm", bgm)] {
            if buffer.sample_rate() != self.sample_rate {
                return Err(MixError::InvalidInput {
                    reason: format!(
                        "{} buffer is at {} Hz, session processes at {} Hz",
                        name,
                        buffer.sample_rate(),
                        self.sample_rate
                    ),
                });
            }
        }

        let duration_secs =
            length::resolve(params.strategy, original.duration(), bgm.duration());
        let plan = ChannelPlan::new(original, bgm);
        debug!(
            "resolved mix: {:.3}s, {} channels, strategy {}",
            duration_secs,
            plan.output_channels(),
            params.strategy
        );
        self.milestone(MILESTONE_RESOLVED)?;

        let mixer = Mixer::new(original, bgm, &plan, duration_secs, params, self.sample_rate)?;
        self.milestone(MILESTONE_ALLOCATED)?;

        let pcm = mixer.run();
        self.milestone(MILESTONE_MIXED)?;

        let encoded_bytes = encode_wav(&pcm)?;
        self.milestone(MILESTONE_ENCODED)?;

        Ok(MixedResult {
            pcm,
            duration_secs,
            encoded_bytes,
        })
    }

    // ========================================================================
    // State transitions
    // ========================================================================

    /// Enter `Processing`, or fail with `Busy` if a call is in flight.
    fn begin(&self) -> Result<()> {
        let snapshot = {
            let mut state = self.state.lock().expect("state lock poisoned");
            if state.phase == Phase::Processing {
                return Err(MixError::Busy);
            }
            self.cancel_flag.store(false, Ordering::SeqCst);
            state.phase = Phase::Processing;
            state.progress = 0;
            state.error = None;
            state.clone()
        };
        self.publish_state(snapshot);
        Ok(())
    }

    /// Record a milestone, checking for cancellation first.
    fn milestone(&self, percentage: u8) -> Result<()> {
        if self.cancel_flag.load(Ordering::SeqCst) {
            return Err(MixError::Cancelled);
        }

        let snapshot = {
            let mut state = self.state.lock().expect("state lock poisoned");
            state.progress = percentage;
            state.clone()
        };
        debug!("mix progress: {}%", percentage);
        self.publish_progress(ProgressEvent { percentage });
        self.publish_state(snapshot);
        Ok(())
    }

    fn complete(&self) {
        let snapshot = {
            let mut state = self.state.lock().expect("state lock poisoned");
            state.phase = Phase::Completed;
            state.clone()
        };
        self.publish_state(snapshot);
    }

    fn fail(&self, err: &MixError) {
        let snapshot = {
            let mut state = self.state.lock().expect("state lock poisoned");
            state.phase = Phase::Failed;
            state.progress = 0;
            state.error = Some(err.to_string());
            state.clone()
        };
        self.publish_state(snapshot);
    }

    // ========================================================================
    // Notification fan-out
    // ========================================================================

    fn publish_progress(&self, event: ProgressEvent) {
        self.progress_subscribers
            .lock()
            .expect("subscriber lock poisoned")
            .retain(|tx| tx.send(event).is_ok());
    }

    fn publish_state(&self, snapshot: ProcessingState) {
        self.state_subscribers
            .lock()
            .expect("subscriber lock poisoned")
            .retain(|tx| tx.send(snapshot.clone()).is_ok());
    }
}
