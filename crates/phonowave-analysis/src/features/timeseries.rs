//! Coarse level trace for display.

use serde::Serialize;

/// Level of one fixed-size block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    /// Block start in seconds.
    pub time: f64,
    /// Root mean square of the block.
    pub rms: f32,
    /// Largest absolute sample in the block.
    pub peak: f32,
}

/// Split `samples` into `block`-sample chunks (last one may be short).
pub fn time_series(samples: &[f32], sample_rate: u32, block: usize) -> Vec<TimeSeriesPoint> {
    let block = block.max(1);
    samples
        .chunks(block)
        .enumerate()
        .map(|(i, chunk)| {
            let sum_sq: f64 = chunk.iter().map(|&x| (x as f64) * (x as f64)).sum();
            TimeSeriesPoint {
                time: (i * block) as f64 / sample_rate.max(1) as f64,
                rms: (sum_sq / chunk.len() as f64).sqrt() as f32,
                peak: chunk.iter().fold(0.0f32, |p, s| p.max(s.abs())),
            }
        })
        .collect()
}
