//! Formant picking on the clip spectrum.

use serde::Serialize;

use crate::spectral::Spectrum;

/// A spectral resonance. All-zero when absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Formant {
    /// Peak frequency in Hz.
    pub frequency: f32,
    /// Distance between the half-power points around the peak, in Hz.
    pub bandwidth: f32,
}

impl Formant {
    /// Check if a peak was found.
    pub fn is_present(&self) -> bool {
        self.frequency > 0.0
    }
}

/// First three formants in ascending frequency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Formants {
    /// Lowest formant.
    pub f1: Formant,
    /// Second formant.
    pub f2: Formant,
    /// Third formant.
    pub f3: Formant,
}

impl Formants {
    /// Pick the three strongest local maxima above `threshold * peak`.
    pub fn from_spectrum(spectrum: &Spectrum, threshold: f32) -> Self {
        let m = spectrum.magnitudes();
        if m.len() < 3 {
            return Self::default();
        }

        let peak = m.iter().copied().fold(0.0f32, f32::max);
        if peak <= 0.0 {
            return Self::default();
        }
        let floor = threshold * peak;

        let mut candidates: Vec<usize> = (1..m.len() - 1)
            .filter(|&i| m[i] > floor && m[i] > m[i - 1] && m[i] >= m[i + 1])
            .collect();
        candidates.sort_by(|&a, &b| m[b].total_cmp(&m[a]));
        candidates.truncate(3);
        candidates.sort_unstable();

        let mut found = candidates.into_iter().map(|bin| Formant {
            frequency: spectrum.bin_frequency(bin),
            bandwidth: half_power_bandwidth(spectrum, bin),
        });

        Self {
            f1: found.next().unwrap_or_default(),
            f2: found.next().unwrap_or_default(),
            f3: found.next().unwrap_or_default(),
        }
    }

    /// The formants as an array.
    pub fn as_array(&self) -> [Formant; 3] {
        [self.f1, self.f2, self.f3]
    }
}

/// Span between the nearest bins on either side that fall below peak/√2.
///
/// A side with no such bin extends to the spectrum edge.
fn half_power_bandwidth(spectrum: &Spectrum, bin: usize) -> f32 {
    let m = spectrum.magnitudes();
    let half_power = m[bin] * std::f32::consts::FRAC_1_SQRT_2;

    let low = (0..bin).rev().find(|&i| m[i] < half_power).unwrap_or(0);
    let high = (bin + 1..m.len())
        .find(|&i| m[i] < half_power)
        .unwrap_or(m.len() - 1);

    spectrum.bin_frequency(high) - spectrum.bin_frequency(low)
}
