//! Wave-field solver benchmarks
//!
//! Measures single-step cost across grid sizes, including the sizes where
//! row updates switch to the rayon pool.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use phonowave_sim::{SimulationConfig, SourceDescriptor, WaveFieldSolver};

fn solver(size: usize) -> WaveFieldSolver {
    let config = SimulationConfig::new(size, size);
    let mut solver = WaveFieldSolver::new(config).unwrap();
    let center = (size / 2) as i32;
    solver.add_source(SourceDescriptor::point(center, center, 1000.0, 1.0));
    solver.add_membrane_source(center / 2, center / 2, 4.0, 440.0, 0.5);
    solver
}

/// Benchmark one FDTD step
fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("solver/step");

    for size in [64usize, 128, 256, 512] {
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut solver = solver(size);
            b.iter(|| {
                let stats = solver.advance();
                black_box(stats);
            });
        });
    }

    group.finish();
}

/// Benchmark snapshot copies
fn bench_snapshots(c: &mut Criterion) {
    let mut group = c.benchmark_group("solver/snapshot");
    let mut solver = solver(256);
    for _ in 0..32 {
        solver.advance();
    }

    group.bench_function("pressure", |b| {
        b.iter(|| black_box(solver.pressure_snapshot()));
    });

    group.bench_function("velocity_magnitude", |b| {
        b.iter(|| black_box(solver.velocity_magnitude_snapshot()));
    });

    group.finish();
}

criterion_group!(benches, bench_step, bench_snapshots);
criterion_main!(benches);
