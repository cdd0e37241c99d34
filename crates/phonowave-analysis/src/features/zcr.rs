//! Zero-crossing rate.

use serde::Serialize;

/// Fraction of adjacent sample pairs whose sign differs.
///
/// Zero counts as positive, so silence and DC have a rate of zero.
pub fn zero_crossing_rate(frame: &[f32]) -> f32 {
    if frame.len() < 2 {
        return 0.0;
    }
    let crossings = frame
        .windows(2)
        .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
        .count();
    crossings as f32 / (frame.len() - 1) as f32
}

/// Clip-level zero-crossing statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ZeroCrossingFeatures {
    /// Per-frame rate.
    pub series: Vec<f32>,
    /// Mean over frames.
    pub mean: f32,
    /// Mean above the fricative threshold.
    pub is_fricative: bool,
}

impl ZeroCrossingFeatures {
    /// Summarize per-frame rates.
    pub fn from_series(series: Vec<f32>, fricative_threshold: f32) -> Self {
        let mean = if series.is_empty() {
            0.0
        } else {
            series.iter().sum::<f32>() / series.len() as f32
        };
        Self {
            series,
            mean,
            is_fricative: mean > fricative_threshold,
        }
    }
}
