//! Mel-frequency cepstral coefficients.

use crate::spectral::Spectrum;

/// Guards the logarithm of empty bands.
const LOG_EPSILON: f64 = 1e-10;

/// `2595 * log10(1 + f / 700)`.
pub fn hz_to_mel(frequency: f32) -> f32 {
    2595.0 * (1.0 + frequency / 700.0).log10()
}

/// Inverse of [`hz_to_mel`].
pub fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10f32.powf(mel / 2595.0) - 1.0)
}

/// Triangular filters evenly spaced on the mel scale.
#[derive(Debug, Clone)]
pub struct MelFilterbank {
    /// `bands + 2` edge frequencies in Hz.
    edges: Vec<f32>,
}

impl MelFilterbank {
    /// `bands` filters spanning `[min_frequency, max_frequency]`.
    pub fn new(bands: usize, min_frequency: f32, max_frequency: f32) -> Self {
        let lo = hz_to_mel(min_frequency);
        let hi = hz_to_mel(max_frequency.max(min_frequency));
        let step = (hi - lo) / (bands + 1) as f32;
        let edges = (0..bands + 2)
            .map(|i| mel_to_hz(lo + step * i as f32))
            .collect();
        Self { edges }
    }

    /// Number of filters.
    pub fn bands(&self) -> usize {
        self.edges.len() - 2
    }

    /// Weighted magnitude sum per filter.
    pub fn apply(&self, spectrum: &Spectrum) -> Vec<f32> {
        let magnitudes = spectrum.magnitudes();
        self.edges
            .windows(3)
            .map(|edge| {
                let (left, center, right) = (edge[0], edge[1], edge[2]);
                let mut sum = 0.0f64;
                for (bin, &m) in magnitudes.iter().enumerate() {
                    let f = spectrum.bin_frequency(bin);
                    let weight = if f > left && f <= center && center > left {
                        (f - left) / (center - left)
                    } else if f > center && f < right && right > center {
                        (right - f) / (right - center)
                    } else {
                        0.0
                    };
                    sum += (weight * m) as f64;
                }
                sum as f32
            })
            .collect()
    }
}

/// DCT-II of the log mel energies, always `num_coeffs` long.
pub fn mfcc(spectrum: &Spectrum, bands: usize, min_frequency: f32, num_coeffs: usize) -> Vec<f32> {
    let filterbank = MelFilterbank::new(bands.max(1), min_frequency, spectrum.nyquist());
    let log_energies: Vec<f64> = filterbank
        .apply(spectrum)
        .into_iter()
        .map(|e| (e as f64 + LOG_EPSILON).ln())
        .collect();
    dct_ii(&log_energies, num_coeffs)
}

/// Unnormalized DCT-II, first `count` coefficients.
fn dct_ii(input: &[f64], count: usize) -> Vec<f32> {
    let n = input.len() as f64;
    (0..count)
        .map(|k| {
            input
                .iter()
                .enumerate()
                .map(|(i, &x)| x * (std::f64::consts::PI * k as f64 * (i as f64 + 0.5) / n).cos())
                .sum::<f64>() as f32
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectral::SpectralEngine;

    #[test]
    fn test_mel_round_trip() {
        for f in [50.0f32, 440.0, 1000.0, 8000.0] {
            assert!((mel_to_hz(hz_to_mel(f)) - f).abs() < f * 1e-4);
        }
        assert!((hz_to_mel(1000.0) - 1000.0).abs() < 1.0);
    }

    #[test]
    fn test_filterbank_edges() {
        let bank = MelFilterbank::new(40, 50.0, 22_050.0);
        assert_eq!(bank.bands(), 40);
        assert!((bank.edges[0] - 50.0).abs() < 0.01);
        assert!((bank.edges[41] - 22_050.0).abs() < 1.0);
    }

    #[test]
    fn test_coefficient_count() {
        let engine = SpectralEngine::new(256, 8000);
        let spectrum = engine.analyze(&[0.25; 256]);
        for n in [1, 13, 20, 60] {
            assert_eq!(mfcc(&spectrum, 40, 50.0, n).len(), n);
        }
    }

    #[test]
    fn test_silence_is_finite() {
        let spectrum = SpectralEngine::new(128, 8000).analyze(&[0.0; 16]);
        let coeffs = mfcc(&spectrum, 40, 50.0, 13);
        assert!(coeffs.iter().all(|c| c.is_finite()));
        // Flat log spectrum: only the DC coefficient is nonzero
        assert!(coeffs[0] < 0.0);
        assert!(coeffs[1..].iter().all(|c| c.abs() < 1e-3));
    }

    #[test]
    fn test_dct_of_constant() {
        let coeffs = dct_ii(&[1.0; 8], 3);
        assert!((coeffs[0] - 8.0).abs() < 1e-6);
        assert!(coeffs[1].abs() < 1e-6);
        assert!(coeffs[2].abs() < 1e-6);
    }
}
