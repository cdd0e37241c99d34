//! End-to-end behaviour of the wave-field solver.

use phonowave_sim::prelude::*;
use phonowave_sim::COURANT_LIMIT_2D;

/// A 1 kHz point source in a tiny room, sampled at the centre.
///
/// At 44.1 kHz with 1 cm cells the Courant number is about 0.78. That passes
/// a 1D bound of 1 but not the 2D bound of 1/√2, and an unclamped run of this
/// scenario blows up to |p| ~ 1e35 within 100 steps. The solver therefore
/// clamps the time step here.
#[test]
fn test_point_source_scenario() {
    let config = SimulationConfig::new(8, 8)
        .with_cell_size(0.01)
        .with_speed_of_sound(343.0)
        .with_time_step(1.0 / 44_100.0);
    let mut solver = WaveFieldSolver::new(config).unwrap();

    // 343 * (1/44100) / 0.01 exceeds the 2D bound
    assert!(solver.cfl_clamped());
    assert!(solver.config().coefficient() <= 1.0);

    solver.add_source(SourceDescriptor::point(4, 4, 1000.0, 1000.0));
    solver.set_microphone(4, 4);

    let mut mic = Vec::new();
    solver.step(0.0);
    mic.push(solver.microphone_signal());
    // sin(0) = 0 so the first step leaves the field untouched
    assert_eq!(mic[0], 0.0);

    for _ in 1..100 {
        solver.advance();
        mic.push(solver.microphone_signal());
    }
    assert_ne!(mic[1], 0.0);

    let sign_changes = mic.windows(2).filter(|w| w[0] * w[1] < 0.0).count();
    assert!(sign_changes >= 1, "microphone never changed sign");

    let stats = solver.stats();
    assert!(stats.max_pressure.is_finite());
    assert!(stats.max_pressure < 1.0e4);
    assert_eq!(stats.step_count, 100);
}

#[test]
fn test_deterministic() {
    let build = || {
        let mut solver = WaveFieldSolver::new(SimulationConfig::new(24, 20)).unwrap();
        solver.add_source(SourceDescriptor::point(5, 5, 800.0, 2.0).with_waveform(Waveform::Square));
        solver.add_string_source(2, 15, 20, 12, 440.0, 0.5);
        solver.add_membrane_source(16, 8, 3.0, 600.0, 1.0);
        solver.inject_impulse(12, 10, 1.0);
        solver
    };

    let mut a = build();
    let mut b = build();
    for _ in 0..50 {
        assert_eq!(a.advance(), b.advance());
    }
    assert_eq!(a.pressure(), b.pressure());
    assert_eq!(a.velocity_x(), b.velocity_x());
    assert_eq!(a.velocity_y(), b.velocity_y());
}

/// With damping below one and no sources, the field only loses amplitude.
#[test]
fn test_damped_impulse_dissipates() {
    let config = SimulationConfig::new(32, 32)
        .with_cell_size(0.01)
        .with_speed_of_sound(343.0)
        .with_time_step(1.0e-3)
        .with_damping(0.95);
    let mut solver = WaveFieldSolver::new(config).unwrap();
    solver.inject_impulse(16, 16, 1.0);
    let initial = solver.pressure_snapshot().max_abs();

    let maxima: Vec<f32> = (0..120).map(|_| solver.advance().max_pressure).collect();
    assert!(maxima.iter().all(|&m| m <= initial));

    let windows: Vec<f32> = maxima
        .chunks(20)
        .map(|w| w.iter().copied().fold(0.0, f32::max))
        .collect();
    for pair in windows.windows(2) {
        assert!(pair[1] <= pair[0], "window maxima grew: {:?}", windows);
    }
}

/// A clamped, lossless run stays bounded over a long horizon.
#[test]
fn test_clamped_lossless_run_is_bounded() {
    let config = SimulationConfig::new(16, 16)
        .with_time_step(1.0)
        .with_damping(1.0);
    let mut solver = WaveFieldSolver::new(config).unwrap();
    assert!(solver.cfl_clamped());
    solver.inject_impulse(5, 9, 1.0);

    for _ in 0..1000 {
        let stats = solver.advance();
        assert!(stats.max_pressure.is_finite());
        assert!(stats.max_pressure <= 1.0);
    }
}

#[test]
fn test_effective_courant_number_within_limit() {
    let configs = [
        SimulationConfig::default(),
        SimulationConfig::small_room(),
        SimulationConfig::new(10, 10).with_time_step(0.5),
        SimulationConfig::new(10, 10).with_cell_size(0.001),
        SimulationConfig::new(10, 10).with_speed_of_sound(5000.0),
    ];

    for config in configs {
        let solver = WaveFieldSolver::new(config).unwrap();
        assert!(solver.config().courant_number() <= COURANT_LIMIT_2D + 1e-6);
        assert!(solver.config().coefficient() <= 1.0);
    }
}

#[test]
fn test_corner_impulse_stays_finite() {
    let mut solver = WaveFieldSolver::new(SimulationConfig::new(4, 4)).unwrap();
    solver.inject_impulse(0, 0, 1.0);
    solver.inject_impulse(3, 3, -1.0);
    for _ in 0..200 {
        solver.advance();
    }
    assert!(solver.pressure().iter().all(|p| p.is_finite()));
    assert!(solver.velocity_magnitude_snapshot().data.iter().all(|v| v.is_finite()));
}

#[test]
fn test_runner_audio_written_to_wav() {
    let mut solver = WaveFieldSolver::new(SimulationConfig::new(16, 16)).unwrap();
    solver.add_source(SourceDescriptor::point(8, 8, 1000.0, 1.0));

    let outcome = SimulationRunner::new(solver, 200)
        .with_progress_interval(50)
        .spawn()
        .unwrap()
        .join()
        .unwrap();
    assert_eq!(outcome.audio.len(), 200);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.wav");
    outcome.audio.write_wav(&path, outcome.sample_rate()).unwrap();

    let reader = hound::WavReader::open(&path).unwrap();
    assert_eq!(reader.spec().sample_rate, 88_200);
    assert_eq!(reader.len(), 200);
}

/// Geometry far outside the grid is skipped without overflow.
#[test]
fn test_extreme_geometry_steps() {
    let mut solver = WaveFieldSolver::new(SimulationConfig::new(8, 8)).unwrap();
    solver.add_membrane_source(4, 4, 50_000.0, 440.0, 1.0);
    solver.add_string_source(-2_000_000_000, 0, 2_000_000_000, 0, 440.0, 1.0);
    solver.add_string_source(0, 4, 200_000_000, 4, 440.0, 1.0);
    solver.add_membrane_source(i32::MIN, i32::MAX, f32::INFINITY, 440.0, 1.0);

    for _ in 0..10 {
        solver.advance();
    }
    assert!(solver.pressure().iter().all(|p| p.is_finite()));
    assert!(solver.stats().max_pressure > 0.0);
}
