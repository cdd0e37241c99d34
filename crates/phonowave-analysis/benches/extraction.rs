//! Feature extraction benchmarks
//!
//! Measures full-clip extraction and the spectral engine in both
//! transform modes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use phonowave_analysis::prelude::*;

const SAMPLE_RATE: u32 = 44_100;

fn voiced_clip(seconds: f32) -> AudioClip {
    let len = (seconds * SAMPLE_RATE as f32) as usize;
    let samples = (0..len)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            0.5 * (2.0 * std::f32::consts::PI * 150.0 * t).sin()
                + 0.2 * (2.0 * std::f32::consts::PI * 750.0 * t).sin()
        })
        .collect();
    AudioClip::new(samples, SAMPLE_RATE).unwrap()
}

fn noise_clip(seconds: f32) -> AudioClip {
    let mut rng = StdRng::seed_from_u64(1);
    let len = (seconds * SAMPLE_RATE as f32) as usize;
    let samples = (0..len).map(|_| rng.gen_range(-0.5..0.5)).collect();
    AudioClip::new(samples, SAMPLE_RATE).unwrap()
}

/// Benchmark full extraction
fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract/clip");
    let extractor = FeatureExtractor::default();

    for seconds in [0.25f32, 1.0] {
        let clip = voiced_clip(seconds);
        group.throughput(Throughput::Elements(clip.len() as u64));
        group.bench_with_input(BenchmarkId::new("voiced", seconds), &clip, |b, clip| {
            b.iter(|| black_box(extractor.extract(clip)));
        });
    }

    let noise = noise_clip(0.25);
    group.bench_function("noise/0.25", |b| {
        b.iter(|| black_box(extractor.extract(&noise)));
    });

    group.finish();
}

/// Benchmark batch extraction across the rayon pool
fn bench_extract_many(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract/batch");
    let extractor = FeatureExtractor::default();
    let clips: Vec<AudioClip> = (0..8).map(|_| voiced_clip(0.25)).collect();

    group.bench_function("8_clips", |b| {
        b.iter(|| black_box(extractor.extract_many(&clips)));
    });

    group.finish();
}

/// Benchmark direct vs fast spectra
fn bench_spectrum(c: &mut Criterion) {
    let mut group = c.benchmark_group("spectral/analyze");
    let clip = noise_clip(0.1);

    for size in [256usize, 1024] {
        for kind in [TransformKind::Direct, TransformKind::Fast] {
            let engine = SpectralEngine::with_transform(size, SAMPLE_RATE, kind);
            group.bench_with_input(
                BenchmarkId::new(format!("{:?}", kind).to_lowercase(), size),
                &size,
                |b, _| b.iter(|| black_box(engine.analyze(clip.samples()))),
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_extract, bench_extract_many, bench_spectrum);
criterion_main!(benches);
