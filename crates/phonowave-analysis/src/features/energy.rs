//! Frame energy.

use serde::Serialize;

/// Floor added before taking logarithms of energies.
const ENERGY_EPSILON: f32 = 1e-10;

/// Mean squared amplitude of a frame.
pub fn frame_energy(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    let sum: f64 = frame.iter().map(|&x| (x as f64) * (x as f64)).sum();
    (sum / frame.len() as f64) as f32
}

/// Clip-level energy statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnergyFeatures {
    /// Per-frame energy divided by the clip maximum (all zero for silence).
    pub normalized: Vec<f32>,
    /// Mean raw frame energy.
    pub mean: f32,
    /// Smallest raw frame energy.
    pub min: f32,
    /// Largest raw frame energy.
    pub max: f32,
    /// `10 * log10(max)`, floored at -100 dB.
    pub max_db: f32,
    /// Largest absolute sample in the clip.
    pub peak_level: f32,
}

impl EnergyFeatures {
    /// Summarize per-frame energies of `samples`.
    pub fn from_frames(energies: &[f32], samples: &[f32]) -> Self {
        let max = energies.iter().copied().fold(0.0f32, f32::max);
        let min = energies.iter().copied().fold(f32::INFINITY, f32::min);
        let mean = if energies.is_empty() {
            0.0
        } else {
            energies.iter().sum::<f32>() / energies.len() as f32
        };

        let normalized = if max > 0.0 {
            energies.iter().map(|e| e / max).collect()
        } else {
            vec![0.0; energies.len()]
        };

        Self {
            normalized,
            mean,
            min: if min.is_finite() { min } else { 0.0 },
            max,
            max_db: (10.0 * (max + ENERGY_EPSILON).log10()).max(-100.0),
            peak_level: samples.iter().fold(0.0f32, |peak, s| peak.max(s.abs())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_energy() {
        assert_eq!(frame_energy(&[1.0, -1.0, 1.0, -1.0]), 1.0);
        assert_eq!(frame_energy(&[]), 0.0);
        assert!((frame_energy(&[0.5; 8]) - 0.25).abs() < 1e-7);
    }

    #[test]
    fn test_summary() {
        let energy = EnergyFeatures::from_frames(&[0.5, 1.0, 0.25], &[0.2, -0.9, 0.4]);
        assert_eq!(energy.normalized, vec![0.5, 1.0, 0.25]);
        assert_eq!(energy.max, 1.0);
        assert_eq!(energy.min, 0.25);
        assert!(energy.max_db.abs() < 1e-4);
        assert_eq!(energy.peak_level, 0.9);
    }

    #[test]
    fn test_silence() {
        let energy = EnergyFeatures::from_frames(&[0.0, 0.0], &[0.0; 4]);
        assert_eq!(energy.normalized, vec![0.0, 0.0]);
        assert_eq!(energy.max_db, -100.0);
        assert_eq!(energy.peak_level, 0.0);
    }
}
