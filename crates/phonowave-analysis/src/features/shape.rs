//! Spectral centroid and brightness.

use serde::Serialize;

use crate::spectral::Spectrum;

/// Where the spectral mass sits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SpectralShape {
    /// Magnitude-weighted mean frequency in Hz.
    pub centroid: f32,
    /// Centroid divided by Nyquist, in `[0, 1]`.
    pub brightness: f32,
}

impl SpectralShape {
    /// Centroid and brightness of a spectrum.
    pub fn from_spectrum(spectrum: &Spectrum) -> Self {
        let centroid = spectrum.centroid();
        let nyquist = spectrum.nyquist();
        Self {
            centroid,
            brightness: if nyquist > 0.0 { centroid / nyquist } else { 0.0 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectral::SpectralEngine;

    #[test]
    fn test_silence() {
        let spectrum = SpectralEngine::new(64, 8000).analyze(&[0.0; 64]);
        assert_eq!(SpectralShape::from_spectrum(&spectrum), SpectralShape::default());
    }

    #[test]
    fn test_higher_tone_is_brighter() {
        let engine = SpectralEngine::new(512, 8000);
        let tone = |f: f32| -> Vec<f32> {
            (0..2048)
                .map(|i| (2.0 * std::f32::consts::PI * f * i as f32 / 8000.0).sin())
                .collect()
        };
        let low = SpectralShape::from_spectrum(&engine.analyze_averaged(&tone(300.0)));
        let high = SpectralShape::from_spectrum(&engine.analyze_averaged(&tone(3000.0)));
        assert!(high.brightness > low.brightness);
        assert!(high.brightness <= 1.0);
    }
}
