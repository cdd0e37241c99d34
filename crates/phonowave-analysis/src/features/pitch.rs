//! Autocorrelation pitch tracking.

use serde::Serialize;

/// Guards the autocorrelation denominator.
const CORRELATION_EPSILON: f64 = 1e-10;

/// A candidate peak must reach this fraction of the strongest correlation.
const PEAK_RATIO: f32 = 0.9;

/// Autocorrelation at `lag`, normalized over the overlapping samples.
///
/// The frame mean is removed first, so DC content does not correlate. The
/// result lies in `[-1, 1]` and is 1 for a signal that repeats exactly every
/// `lag` samples. Returns 0 when `lag` does not fit in the frame or the frame
/// is constant.
pub fn normalized_autocorrelation(frame: &[f32], lag: usize) -> f32 {
    overlap_correlation(&centered(frame), lag)
}

fn centered(frame: &[f32]) -> Vec<f64> {
    if frame.is_empty() {
        return Vec::new();
    }
    let mean = frame.iter().map(|&x| x as f64).sum::<f64>() / frame.len() as f64;
    frame.iter().map(|&x| x as f64 - mean).collect()
}

fn overlap_correlation(centered: &[f64], lag: usize) -> f32 {
    if lag >= centered.len() {
        return 0.0;
    }
    let (head, tail) = (&centered[..centered.len() - lag], &centered[lag..]);
    let mut r = 0.0f64;
    let mut e_head = 0.0f64;
    let mut e_tail = 0.0f64;
    for (&a, &b) in head.iter().zip(tail) {
        r += a * b;
        e_head += a * a;
        e_tail += b * b;
    }
    (r / ((e_head * e_tail).sqrt() + CORRELATION_EPSILON)) as f32
}

/// Chosen autocorrelation lag within a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LagEstimate {
    /// Lag in samples.
    pub lag: usize,
    /// Normalized autocorrelation at `lag`.
    pub correlation: f32,
}

/// Lag range derived from a pitch range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PitchSearch {
    /// Shortest lag (highest pitch).
    pub min_lag: usize,
    /// Longest lag (lowest pitch).
    pub max_lag: usize,
}

impl PitchSearch {
    /// Lags for `max_pitch` down to `min_pitch` at `sample_rate`.
    ///
    /// Both ends round inwards, so every lag maps to a pitch inside the range.
    pub fn new(sample_rate: u32, min_pitch: f32, max_pitch: f32) -> Self {
        let sr = sample_rate as f32;
        let min_lag = ((sr / max_pitch).ceil() as usize).max(1);
        let max_lag = ((sr / min_pitch).floor() as usize).max(min_lag);
        Self { min_lag, max_lag }
    }

    /// First strong correlation peak in range, or `None` if no lag fits.
    ///
    /// Lags are limited so at least `min_lag` samples overlap. A peak is a
    /// lag no lower than its in-range neighbours that reaches 90% of the
    /// strongest correlation; taking the shortest such lag avoids locking onto
    /// multiples of the period.
    pub fn best_lag(&self, frame: &[f32]) -> Option<LagEstimate> {
        let max_lag = self.max_lag.min(frame.len().saturating_sub(self.min_lag));
        if max_lag < self.min_lag {
            return None;
        }

        let centered = centered(frame);
        let correlations: Vec<f32> = (self.min_lag..=max_lag)
            .map(|lag| overlap_correlation(&centered, lag))
            .collect();
        let strongest = correlations.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let floor = if strongest > 0.0 {
            strongest * PEAK_RATIO
        } else {
            strongest
        };

        let is_peak = |i: usize| {
            let c = correlations[i];
            let left = i.checked_sub(1).map_or(true, |j| c >= correlations[j]);
            let right = correlations.get(i + 1).map_or(true, |&n| c >= n);
            left && right && c >= floor
        };

        (0..correlations.len())
            .find(|&i| is_peak(i))
            .map(|i| LagEstimate {
                lag: self.min_lag + i,
                correlation: correlations[i],
            })
    }
}

/// Pitch contour and aggregates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PitchFeatures {
    /// Raw per-frame estimate in Hz (0 for silent or aperiodic frames).
    pub contour: Vec<f32>,
    /// Mean over estimates inside the pitch range (0 if none).
    pub mean: f32,
    /// Minimum over estimates inside the pitch range (0 if none).
    pub min: f32,
    /// Maximum over estimates inside the pitch range (0 if none).
    pub max: f32,
}

impl PitchFeatures {
    /// Aggregate a contour, ignoring estimates outside `[min_pitch, max_pitch]`.
    pub fn from_contour(contour: Vec<f32>, min_pitch: f32, max_pitch: f32) -> Self {
        let valid: Vec<f32> = contour
            .iter()
            .copied()
            .filter(|&f| f >= min_pitch && f <= max_pitch)
            .collect();

        if valid.is_empty() {
            return Self {
                contour,
                ..Self::default()
            };
        }

        Self {
            mean: valid.iter().sum::<f32>() / valid.len() as f32,
            min: valid.iter().copied().fold(f32::INFINITY, f32::min),
            max: valid.iter().copied().fold(0.0, f32::max),
            contour,
        }
    }
}
