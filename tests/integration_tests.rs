//! Integration Tests
//!
//! End-to-end tests for the bgmix mixing-and-encoding pipeline.

use std::sync::Arc;

use bgmix::engine::io::{generate_stereo_test_tone, generate_test_tone};
use bgmix::engine::PcmBuffer;
use bgmix::mix::{length, LengthStrategy, MixParams};
use bgmix::session::Phase;
use bgmix::{MixError, MixSession};

use test_case::test_case;

const RATE: u32 = 44100;

/// Constant-valued buffer, the shape most properties are easiest to read on.
fn constant(num_channels: usize, duration_secs: f64, value: f32) -> PcmBuffer {
    let frames = (duration_secs * RATE as f64) as usize;
    PcmBuffer::from_channels(vec![vec![value; frames]; num_channels], RATE).unwrap()
}

fn params(strategy: LengthStrategy) -> MixParams {
    MixParams {
        original_volume: 1.0,
        bgm_volume: 0.5,
        fade_in_duration: 0.0,
        fade_out_duration: 0.0,
        strategy,
        bgm_start_offset: 0.0,
    }
}

// === Scenario Tests ===

#[test]
fn test_scenario_basic_mix() {
    // 1s of constant 1.0 over 2s of constant 1.0 at half volume:
    // every sample clamps to 1.0 and quantizes to 32767.
    let original = constant(1, 1.0, 1.0);
    let bgm = constant(1, 2.0, 1.0);
    let session = MixSession::new(RATE);

    let result = session
        .mix(&original, &bgm, &params(LengthStrategy::FitToOriginal))
        .unwrap();

    assert!((result.duration_secs - 1.0).abs() < 1e-9);
    assert_eq!(result.pcm.num_frames(), RATE as usize);
    assert!(result.pcm.channel(0).iter().all(|&s| s == 1.0));

    let payload = &result.encoded_bytes[44..];
    assert_eq!(payload.len(), RATE as usize * 2);
    for chunk in payload.chunks_exact(2) {
        assert_eq!(i16::from_le_bytes([chunk[0], chunk[1]]), 32767);
    }
}

#[test]
fn test_scenario_empty_bgm() {
    let original = constant(1, 1.0, 0.5);
    let bgm = PcmBuffer::from_channels(vec![vec![]], RATE).unwrap();
    let session = MixSession::new(RATE);

    let err = session
        .mix(&original, &bgm, &params(LengthStrategy::FitToOriginal))
        .unwrap_err();
    assert!(matches!(err, MixError::EmptyBgmBuffer));

    let state = session.state();
    assert_eq!(state.phase, Phase::Failed);
    assert_eq!(state.progress, 0);
    assert!(state.error.is_some());
}

#[test]
fn test_scenario_reentrancy() {
    // A second call while the first is processing must fail with Busy and
    // leave the first call's result untouched.
    let session = Arc::new(MixSession::new(RATE));
    let progress = session.subscribe_progress();

    let worker = {
        let session = Arc::clone(&session);
        std::thread::spawn(move || {
            let original = constant(2, 60.0, 0.25);
            let bgm = constant(2, 10.0, 0.5);
            session.mix(&original, &bgm, &params(LengthStrategy::FitToOriginal))
        })
    };

    // The first milestone means the worker holds the Processing phase.
    let first = progress.recv().unwrap();
    assert_eq!(first.percentage, 0);

    let original = constant(1, 0.1, 0.1);
    let bgm = constant(1, 0.1, 0.1);
    let err = session
        .mix(&original, &bgm, &params(LengthStrategy::FitToOriginal))
        .unwrap_err();
    assert!(matches!(err, MixError::Busy));

    let result = worker.join().unwrap().unwrap();
    assert_eq!(result.pcm.num_frames(), 60 * RATE as usize);
    // 0.25 + 0.5 * 0.5, unaffected by the rejected call
    assert!((result.pcm.channel(0)[0] - 0.5).abs() < 1e-6);
    assert_eq!(session.state().phase, Phase::Completed);
}

#[test]
fn test_cancellation_mid_mix() {
    let session = Arc::new(MixSession::new(RATE));
    let progress = session.subscribe_progress();
    let handle = session.cancel_handle();

    let worker = {
        let session = Arc::clone(&session);
        std::thread::spawn(move || {
            let original = constant(2, 60.0, 0.25);
            let bgm = constant(2, 10.0, 0.5);
            session.mix(&original, &bgm, &params(LengthStrategy::FitToOriginal))
        })
    };

    // Cancel while the sample loop runs; the check at the next milestone
    // (80%) aborts the call.
    for event in &progress {
        if event.percentage == 40 {
            handle.cancel();
            break;
        }
    }

    let err = worker.join().unwrap().unwrap_err();
    assert!(matches!(err, MixError::Cancelled));

    let state = session.state();
    assert_eq!(state.phase, Phase::Failed);
    assert_eq!(state.progress, 0);
}

// === Property Tests ===

#[test]
fn test_clamping_property() {
    // Full-scale inputs everywhere; every output sample stays in [-1, 1].
    let original = generate_stereo_test_tone(440.0, 880.0, 1.0, RATE);
    let bgm = generate_test_tone(330.0, 0.3, RATE);
    let mut p = params(LengthStrategy::FitToOriginal);
    p.bgm_volume = 1.0;

    let session = MixSession::new(RATE);
    let result = session.mix(&original, &bgm, &p).unwrap();

    for channel in result.pcm.channels() {
        assert!(channel.iter().all(|&s| (-1.0..=1.0).contains(&s)));
    }
}

#[test]
fn test_determinism() {
    let original = generate_stereo_test_tone(440.0, 660.0, 2.0, RATE);
    let bgm = generate_test_tone(110.0, 0.7, RATE);
    let mut p = params(LengthStrategy::LoopBgm);
    p.fade_in_duration = 0.5;
    p.fade_out_duration = 0.25;
    p.bgm_start_offset = 0.1;

    let first = MixSession::new(RATE).mix(&original, &bgm, &p).unwrap();
    let second = MixSession::new(RATE).mix(&original, &bgm, &p).unwrap();

    assert_eq!(first.encoded_bytes, second.encoded_bytes);
}

#[test_case(LengthStrategy::FitToOriginal, 3.0 ; "fit to original")]
#[test_case(LengthStrategy::FitToBgm, 1.25 ; "fit to bgm")]
#[test_case(LengthStrategy::LoopBgm, 3.0 ; "loop bgm")]
fn test_length_law(strategy: LengthStrategy, expected_secs: f64) {
    let original = constant(1, 3.0, 0.1);
    let bgm = constant(1, 1.25, 0.1);
    let session = MixSession::new(RATE);

    let result = session.mix(&original, &bgm, &params(strategy)).unwrap();

    let resolved = length::resolve(strategy, original.duration(), bgm.duration());
    assert_eq!(resolved, expected_secs);
    assert_eq!(result.duration_secs, resolved);
    // Exact to one sample period
    assert_eq!(
        result.pcm.num_frames(),
        (expected_secs * RATE as f64).floor() as usize
    );
}

#[test]
fn test_loop_law() {
    // Background shorter than the output: without fades, the bgm
    // contribution repeats with the bgm's period.
    let original = constant(1, 2.0, 0.0);
    let bgm_frames = RATE as usize / 2;
    let bgm = PcmBuffer::from_channels(
        vec![(0..bgm_frames)
            .map(|i| (i as f32 / bgm_frames as f32) - 0.5)
            .collect()],
        RATE,
    )
    .unwrap();

    let mut p = params(LengthStrategy::FitToOriginal);
    p.bgm_volume = 1.0;
    let result = MixSession::new(RATE).mix(&original, &bgm, &p).unwrap();

    let out = result.pcm.channel(0);
    for i in 0..(out.len() - bgm_frames) {
        assert_eq!(out[i], out[i + bgm_frames]);
    }
}

#[test]
fn test_fade_law() {
    // With a positive fade-in, the bgm contributes nothing at frame 0 and
    // exactly its full level at the boundary frame.
    let original = constant(1, 1.0, 0.0);
    let bgm = constant(1, 1.0, 1.0);
    let mut p = params(LengthStrategy::FitToOriginal);
    p.bgm_volume = 1.0;
    p.fade_in_duration = 0.25;

    let result = MixSession::new(RATE).mix(&original, &bgm, &p).unwrap();
    let out = result.pcm.channel(0);

    let fade_in_frames = (0.25 * RATE as f64) as usize;
    assert_eq!(out[0], 0.0);
    assert!(out[fade_in_frames - 1] < 1.0);
    assert_eq!(out[fade_in_frames], 1.0);
}

#[test]
fn test_round_trip() {
    // A standard WAV parser recovers shape exactly and samples within one
    // quantization step.
    let original = generate_stereo_test_tone(440.0, 880.0, 0.5, RATE);
    let bgm = generate_test_tone(220.0, 0.2, RATE);
    let mut p = params(LengthStrategy::FitToOriginal);
    p.bgm_volume = 0.25;
    p.fade_in_duration = 0.1;

    let result = MixSession::new(RATE).mix(&original, &bgm, &p).unwrap();

    let mut reader =
        hound::WavReader::new(std::io::Cursor::new(result.encoded_bytes.clone())).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels as usize, result.pcm.num_channels());
    assert_eq!(spec.sample_rate, RATE);
    assert_eq!(reader.duration() as usize, result.pcm.num_frames());

    let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    let tolerance = 1.0 / 32767.0;
    for (frame, samples) in decoded.chunks_exact(2).enumerate() {
        for (channel, &sample) in samples.iter().enumerate() {
            let expected = result.pcm.channel(channel)[frame];
            let actual = sample as f32 / 32767.0;
            assert!(
                (expected - actual).abs() <= tolerance,
                "frame {} channel {}: {} vs {}",
                frame,
                channel,
                expected,
                actual
            );
        }
    }
}

#[test]
fn test_mono_bgm_folds_into_stereo_output() {
    // Amplitudes kept low enough that nothing clamps, so the bgm residual
    // is recoverable exactly on both channels.
    let frames = RATE as usize / 2;
    let original =
        PcmBuffer::from_channels(vec![vec![0.3; frames], vec![-0.2; frames]], RATE).unwrap();
    let bgm_samples: Vec<f32> = (0..frames)
        .map(|i| ((i % 100) as f32 / 100.0) - 0.5)
        .collect();
    let bgm = PcmBuffer::from_channels(vec![bgm_samples], RATE).unwrap();

    let result = MixSession::new(RATE)
        .mix(&original, &bgm, &params(LengthStrategy::FitToOriginal))
        .unwrap();

    assert_eq!(result.pcm.num_channels(), 2);
    // The bgm feeds both channels from its only channel: subtracting the
    // per-channel originals leaves identical residuals.
    for i in 0..result.pcm.num_frames() {
        let residual_l = result.pcm.channel(0)[i] - 0.3;
        let residual_r = result.pcm.channel(1)[i] + 0.2;
        assert!((residual_l - residual_r).abs() < 1e-6);
    }
}

#[test]
fn test_fit_to_bgm_extends_past_original() {
    // Output longer than the original: the tail is bgm only.
    let original = constant(1, 0.5, 0.8);
    let bgm = constant(1, 2.0, 0.4);
    let session = MixSession::new(RATE);

    let result = session
        .mix(&original, &bgm, &params(LengthStrategy::FitToBgm))
        .unwrap();

    assert_eq!(result.pcm.num_frames(), 2 * RATE as usize);
    let out = result.pcm.channel(0);
    let original_frames = RATE as usize / 2;
    // Inside the original's span: 0.8 + 0.5 * 0.4
    assert!((out[0] - 1.0).abs() < 1e-6);
    // Past it: bgm alone
    assert!((out[original_frames] - 0.2).abs() < 1e-6);
}
