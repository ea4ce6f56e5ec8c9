//! End-to-end pipeline tests: assembler -> exchange -> session -> snapshots
//!
//! Drives the full analysis path the way a capture callback would, without
//! touching any audio device.

use xferlab::audio::exchange::{FrameExchange, WindowAssembler};
use xferlab::audio::generator::{FunctionGenerator, SignalKind};
use xferlab::dsp::estimator::EstimatorConfig;
use xferlab::dsp::windows::WindowKind;
use xferlab::session::SessionManager;

const WINDOW_LEN: usize = 1024;

fn config(window_kind: WindowKind) -> EstimatorConfig {
    EstimatorConfig {
        window_len: WINDOW_LEN,
        window_kind,
        sample_rate: 48000.0,
        average_depth: 0,
    }
}

#[test]
fn loopback_measures_unity_transfer() {
    let (publisher, receiver) = FrameExchange::new().split();
    let mut assembler = WindowAssembler::new(WINDOW_LEN, publisher);
    let mut session = SessionManager::new(receiver, config(WindowKind::None));

    // Same broadband signal on both channels, as in an electrical loopback
    let mut generator = FunctionGenerator::new(48000.0);
    generator.set_kind(SignalKind::WhiteNoise);
    generator.set_volume(1.0);

    for _ in 0..WINDOW_LEN {
        let s = generator.next_sample();
        assembler.push_pair(s, s);
    }

    assert!(session.update());

    let live = session.live();
    for h in &live.h {
        assert!((h.re - 1.0).abs() < 1e-9);
        assert!(h.im.abs() < 1e-9);
    }

    // The impulse response of a wire is a unit impulse
    assert!((live.impulse[0] - 1.0).abs() < 1e-9);
    for s in &live.impulse[1..] {
        assert!(s.abs() < 1e-9);
    }
}

#[test]
fn attenuator_measures_its_gain() {
    let (publisher, receiver) = FrameExchange::new().split();
    let mut assembler = WindowAssembler::new(WINDOW_LEN, publisher);
    let mut session = SessionManager::new(receiver, config(WindowKind::None));

    let mut generator = FunctionGenerator::new(48000.0);
    generator.set_kind(SignalKind::WhiteNoise);
    generator.set_volume(1.0);

    // The reference channel sees the source at half gain: H = 0.5
    for _ in 0..4 * WINDOW_LEN {
        let s = generator.next_sample();
        assembler.push_pair(0.5 * s, s);
    }

    let mut processed = 0;
    for _ in 0..4 {
        if session.update() {
            processed += 1;
        }
    }
    // All four windows were published before the first poll, so only the
    // last one is still available
    assert_eq!(processed, 1);

    let mag = session.live().avg_h_magnitude();
    for m in &mag {
        assert!((m - 0.5).abs() < 1e-9);
    }
    assert!((session.live().impulse[0] - 0.5).abs() < 1e-9);
}

#[test]
fn averaging_settles_over_windows() {
    let (publisher, receiver) = FrameExchange::new().split();
    let mut assembler = WindowAssembler::new(WINDOW_LEN, publisher);
    let mut session = SessionManager::new(receiver, config(WindowKind::None));

    let mut generator = FunctionGenerator::new(48000.0);
    generator.set_kind(SignalKind::PinkNoise);
    generator.set_volume(1.0);

    // Feed one window at a time and poll after each, so every window is
    // folded into the averages
    for _ in 0..8 {
        for _ in 0..WINDOW_LEN {
            let s = generator.next_sample();
            assembler.push_pair(s, s);
        }
        assert!(session.update());
    }

    assert_eq!(session.windows_averaged(), 8);

    // Identical channels per window: the averaged H of nonzero bins is 1
    let live = session.live();
    for (h, avg) in live.h.iter().zip(live.avg_h.iter()) {
        if h.norm() > 0.0 {
            assert!((avg.re - 1.0).abs() < 1e-6);
            assert!(avg.im.abs() < 1e-6);
        }
    }
}

#[test]
fn windowed_measurement_stays_finite() {
    let (publisher, receiver) = FrameExchange::new().split();
    let mut assembler = WindowAssembler::new(WINDOW_LEN, publisher);
    let mut session = SessionManager::new(receiver, config(WindowKind::Hamming));

    let mut generator = FunctionGenerator::new(48000.0);
    generator.set_kind(SignalKind::Sweep);
    generator.set_sweep_length(WINDOW_LEN as f64 / 48000.0);
    generator.set_volume(0.8);

    for _ in 0..WINDOW_LEN {
        let s = generator.next_sample();
        // A flat attenuator stands in for the device under test
        assembler.push_pair(s, s * 0.9);
    }
    assert!(session.update());

    for view in [
        session.live().reference_magnitude(),
        session.live().input_magnitude(),
        session.live().h_magnitude(),
        session.live().display_magnitude(true),
    ] {
        assert_eq!(view.len(), WINDOW_LEN / 2 + 1);
        assert!(view.iter().all(|&v| v >= 0.0 && v.is_finite()));
    }

    let axis = session.frequency_axis_hz();
    assert_eq!(axis.len(), WINDOW_LEN / 2 + 1);
    assert_eq!(axis[0], 0.0);
    assert!((axis[WINDOW_LEN / 2] - 24000.0).abs() < 1e-9);
}

#[test]
fn snapshots_survive_config_changes() {
    let (publisher, receiver) = FrameExchange::new().split();
    let mut assembler = WindowAssembler::new(WINDOW_LEN, publisher);
    let mut session = SessionManager::new(receiver, config(WindowKind::Hamming));

    let mut generator = FunctionGenerator::new(48000.0);
    generator.set_kind(SignalKind::WhiteNoise);
    generator.set_volume(1.0);

    for _ in 0..WINDOW_LEN {
        let s = generator.next_sample();
        assembler.push_pair(s, s);
    }
    session.update();

    let index = session.capture_snapshot();
    let frozen = session.saved()[index].avg_h.clone();

    // Reconfigure the live analysis; the snapshot keeps its data
    assert!(session.set_window_len(2048));
    session.set_window_kind(WindowKind::Blackman);
    session.reset_averages();

    assert_eq!(session.saved()[index].avg_h, frozen);
    assert_eq!(session.saved()[index].window_len, WINDOW_LEN);
}
