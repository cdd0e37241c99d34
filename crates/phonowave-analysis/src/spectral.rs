//! Windowed magnitude spectra.
//!
//! [`SpectralEngine`] turns a buffer into a [`Spectrum`] holding the first
//! N/2 magnitude bins of a Hann-windowed transform, scaled by 2/N so a
//! full-scale sinusoid centred on a bin reads about 0.5 (the Hann coherent
//! gain). Peak, band and range queries are answered on the spectrum.

use std::sync::Arc;

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use serde::Serialize;

use crate::config::TransformKind;

/// Floor for dB conversion.
pub const MIN_DB: f32 = -100.0;

/// Lowest band centre used by [`Spectrum::frequency_bands`].
const BAND_FLOOR_HZ: f32 = 20.0;

/// Hann window `0.5 * (1 - cos(2πi / (N - 1)))`.
pub fn hann_window(size: usize) -> Vec<f32> {
    if size <= 1 {
        return vec![1.0; size];
    }
    let denom = (size - 1) as f64;
    (0..size)
        .map(|i| (0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / denom).cos())) as f32)
        .collect()
}

/// Spectrum analyzer with a fixed window length.
pub struct SpectralEngine {
    size: usize,
    sample_rate: u32,
    window: Vec<f32>,
    transform: TransformKind,
    fft: Option<Arc<dyn Fft<f32>>>,
}

impl SpectralEngine {
    /// Create an engine using the fast transform.
    pub fn new(size: usize, sample_rate: u32) -> Self {
        Self::with_transform(size, sample_rate, TransformKind::Fast)
    }

    /// Create an engine with a specific transform.
    pub fn with_transform(size: usize, sample_rate: u32, transform: TransformKind) -> Self {
        let size = size.max(1);
        let fft = match transform {
            TransformKind::Fast => Some(FftPlanner::new().plan_fft_forward(size)),
            TransformKind::Direct => None,
        };
        Self {
            size,
            sample_rate,
            window: hann_window(size),
            transform,
            fft,
        }
    }

    /// Window length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Transform in use.
    pub fn transform(&self) -> TransformKind {
        self.transform
    }

    /// Magnitude spectrum of `buffer`, truncated or zero-padded to the window length.
    pub fn analyze(&self, buffer: &[f32]) -> Spectrum {
        Spectrum {
            magnitudes: self.magnitudes(buffer),
            sample_rate: self.sample_rate,
            size: self.size,
        }
    }

    /// Mean magnitude spectrum over half-overlapping windows spanning `samples`.
    ///
    /// Buffers shorter than one window are analyzed as a single zero-padded block.
    pub fn analyze_averaged(&self, samples: &[f32]) -> Spectrum {
        let hop = (self.size / 2).max(1);
        let mut sum = vec![0.0f32; self.size / 2];
        let mut blocks = 0usize;

        let mut start = 0;
        loop {
            let end = (start + self.size).min(samples.len());
            for (acc, m) in sum.iter_mut().zip(self.magnitudes(&samples[start..end])) {
                *acc += m;
            }
            blocks += 1;
            if end >= samples.len() || start + hop >= samples.len() {
                break;
            }
            start += hop;
        }

        let scale = 1.0 / blocks as f32;
        Spectrum {
            magnitudes: sum.into_iter().map(|m| m * scale).collect(),
            sample_rate: self.sample_rate,
            size: self.size,
        }
    }

    fn windowed(&self, buffer: &[f32]) -> Vec<f32> {
        let mut frame = vec![0.0f32; self.size];
        for ((out, &x), &w) in frame.iter_mut().zip(buffer).zip(&self.window) {
            *out = x * w;
        }
        frame
    }

    fn magnitudes(&self, buffer: &[f32]) -> Vec<f32> {
        let frame = self.windowed(buffer);
        let bins = self.size / 2;
        let scale = 2.0 / self.size as f32;

        match &self.fft {
            Some(fft) => {
                let mut data: Vec<Complex<f32>> =
                    frame.iter().map(|&x| Complex::new(x, 0.0)).collect();
                fft.process(&mut data);
                data[..bins].iter().map(|c| c.norm() * scale).collect()
            }
            None => direct_dft(&frame, bins)
                .into_iter()
                .map(|m| m * scale)
                .collect(),
        }
    }
}

/// Unscaled DFT magnitudes of the first `bins` bins.
fn direct_dft(frame: &[f32], bins: usize) -> Vec<f32> {
    let n = frame.len();
    let step = 2.0 * std::f64::consts::PI / n as f64;
    (0..bins)
        .map(|k| {
            let mut re = 0.0f64;
            let mut im = 0.0f64;
            for (i, &x) in frame.iter().enumerate() {
                // Reduce k*i mod n first to keep the angle small.
                let angle = step * ((k * i) % n) as f64;
                re += x as f64 * angle.cos();
                im -= x as f64 * angle.sin();
            }
            (re * re + im * im).sqrt() as f32
        })
        .collect()
}

/// A spectral peak.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpectralPeak {
    /// Bin index.
    pub bin: usize,
    /// Bin centre frequency in Hz.
    pub frequency: f32,
    /// Linear magnitude.
    pub magnitude: f32,
    /// Magnitude in dB.
    pub magnitude_db: f32,
}

/// One log-spaced band sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrequencyBand {
    /// Band centre frequency in Hz.
    pub center_frequency: f32,
    /// Magnitude of the nearest bin.
    pub magnitude: f32,
    /// Magnitude in dB.
    pub magnitude_db: f32,
}

/// RMS and peak within a frequency range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RangeAnalysis {
    /// RMS of the bin magnitudes.
    pub rms: f32,
    /// Largest magnitude in the range.
    pub peak_magnitude: f32,
    /// Frequency of the largest magnitude.
    pub peak_frequency: f32,
}

/// Magnitude spectrum for the first N/2 bins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spectrum {
    magnitudes: Vec<f32>,
    sample_rate: u32,
    size: usize,
}

impl Spectrum {
    /// Magnitudes per bin.
    pub fn magnitudes(&self) -> &[f32] {
        &self.magnitudes
    }

    /// Number of bins.
    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    /// Check if the spectrum has no bins.
    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    /// Transform length the spectrum was computed with.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Nyquist frequency in Hz.
    pub fn nyquist(&self) -> f32 {
        self.sample_rate as f32 / 2.0
    }

    /// Centre frequency of a bin.
    pub fn bin_frequency(&self, bin: usize) -> f32 {
        bin as f32 * self.sample_rate as f32 / self.size as f32
    }

    /// Nearest bin to a frequency, clamped to the spectrum.
    pub fn frequency_bin(&self, frequency: f32) -> usize {
        let bin = (frequency.max(0.0) * self.size as f32 / self.sample_rate as f32).round() as usize;
        bin.min(self.magnitudes.len().saturating_sub(1))
    }

    /// `20 * log10(magnitude)`, floored at -100 dB. Out-of-range bins read as the floor.
    pub fn magnitude_db(&self, bin: usize) -> f32 {
        self.magnitudes
            .get(bin)
            .map_or(MIN_DB, |&m| to_db(m))
    }

    /// Bins above `threshold_db` that strictly dominate every bin within
    /// `±min_distance`, strongest first.
    pub fn find_peaks(&self, threshold_db: f32, min_distance: usize) -> Vec<SpectralPeak> {
        let m = &self.magnitudes;
        let mut peaks: Vec<SpectralPeak> = (0..m.len())
            .filter(|&i| self.magnitude_db(i) > threshold_db)
            .filter(|&i| {
                let lo = i.saturating_sub(min_distance);
                let hi = (i + min_distance).min(m.len() - 1);
                (lo..=hi).all(|j| j == i || m[i] > m[j])
            })
            .map(|i| SpectralPeak {
                bin: i,
                frequency: self.bin_frequency(i),
                magnitude: m[i],
                magnitude_db: self.magnitude_db(i),
            })
            .collect();

        peaks.sort_by(|a, b| b.magnitude.total_cmp(&a.magnitude));
        peaks
    }

    /// `count` log-spaced bands from 20 Hz to Nyquist, sampled at the nearest bin.
    pub fn frequency_bands(&self, count: usize) -> Vec<FrequencyBand> {
        if count == 0 || self.magnitudes.is_empty() {
            return Vec::new();
        }

        let ratio = (self.nyquist() / BAND_FLOOR_HZ).max(1.0);
        (0..count)
            .map(|i| {
                let t = if count > 1 {
                    i as f32 / (count - 1) as f32
                } else {
                    0.0
                };
                let center_frequency = BAND_FLOOR_HZ * ratio.powf(t);
                let bin = self.frequency_bin(center_frequency);
                FrequencyBand {
                    center_frequency,
                    magnitude: self.magnitudes[bin],
                    magnitude_db: self.magnitude_db(bin),
                }
            })
            .collect()
    }

    /// RMS and peak over the bins covering `[low, high]` Hz.
    pub fn analyze_frequency_range(&self, low: f32, high: f32) -> RangeAnalysis {
        if self.magnitudes.is_empty() {
            return RangeAnalysis::default();
        }
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        let start = self.frequency_bin(low);
        let end = self.frequency_bin(high);
        let range = &self.magnitudes[start..=end];

        let sum_sq: f64 = range.iter().map(|&m| (m as f64) * (m as f64)).sum();
        let (peak_bin, peak_magnitude) = range
            .iter()
            .enumerate()
            .fold((0, f32::MIN), |best, (i, &m)| if m > best.1 { (i, m) } else { best });

        RangeAnalysis {
            rms: (sum_sq / range.len() as f64).sqrt() as f32,
            peak_magnitude,
            peak_frequency: self.bin_frequency(start + peak_bin),
        }
    }

    /// Magnitude-weighted mean frequency.
    pub fn centroid(&self) -> f32 {
        let mut weighted = 0.0f64;
        let mut total = 0.0f64;
        for (i, &m) in self.magnitudes.iter().enumerate() {
            weighted += self.bin_frequency(i) as f64 * m as f64;
            total += m as f64;
        }
        (weighted / (total + 1e-10)) as f32
    }
}

/// Linear magnitude to dB, floored at [`MIN_DB`].
pub fn to_db(magnitude: f32) -> f32 {
    if magnitude > 0.0 {
        (20.0 * magnitude.log10()).max(MIN_DB)
    } else {
        MIN_DB
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn tone(frequency: f32, sample_rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * frequency * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn test_hann_window() {
        let w = hann_window(5);
        assert_eq!(w[0], 0.0);
        assert!((w[2] - 1.0).abs() < 1e-6);
        assert!(w[4].abs() < 1e-6);
        assert_eq!(hann_window(1), vec![1.0]);
    }

    #[test]
    fn test_direct_and_fast_agree() {
        let signal = tone(1000.0, 8000, 200);
        let direct = SpectralEngine::with_transform(256, 8000, TransformKind::Direct).analyze(&signal);
        let fast = SpectralEngine::with_transform(256, 8000, TransformKind::Fast).analyze(&signal);
        assert_eq!(direct.len(), 128);
        for (a, b) in direct.magnitudes().iter().zip(fast.magnitudes()) {
            assert!((a - b).abs() < 1e-4, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_tone_peak_bin() {
        // 1 kHz at 8 kHz with N = 256 lands exactly on bin 32
        let spectrum = SpectralEngine::new(256, 8000).analyze(&tone(1000.0, 8000, 256));
        let peaks = spectrum.find_peaks(-40.0, 3);
        assert_eq!(peaks[0].bin, 32);
        assert_eq!(peaks[0].frequency, 1000.0);
        assert!((peaks[0].magnitude - 0.5).abs() < 0.02);
    }

    #[test]
    fn test_peaks_sorted_descending() {
        let signal: Vec<f32> = tone(500.0, 8000, 256)
            .iter()
            .zip(tone(2000.0, 8000, 256))
            .map(|(a, b)| a + 0.3 * b)
            .collect();
        let peaks = SpectralEngine::new(256, 8000).analyze(&signal).find_peaks(-30.0, 2);
        assert!(peaks.len() >= 2);
        assert_eq!(peaks[0].bin, 16);
        assert_eq!(peaks[1].bin, 64);
        assert!(peaks.windows(2).all(|w| w[0].magnitude >= w[1].magnitude));
    }

    #[test]
    fn test_plateau_is_not_a_peak() {
        let spectrum = Spectrum {
            magnitudes: vec![0.0, 1.0, 1.0, 0.0],
            sample_rate: 8,
            size: 8,
        };
        assert!(spectrum.find_peaks(-50.0, 1).is_empty());
    }

    #[test]
    fn test_magnitude_db_floor() {
        let spectrum = SpectralEngine::new(64, 8000).analyze(&[0.0; 64]);
        assert_eq!(spectrum.magnitude_db(3), MIN_DB);
        assert_eq!(spectrum.magnitude_db(1000), MIN_DB);
        assert!((to_db(1.0)).abs() < 1e-6);
        assert!((to_db(0.1) + 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_frequency_bands() {
        let spectrum = SpectralEngine::new(1024, 44_100).analyze(&tone(440.0, 44_100, 1024));
        let bands = spectrum.frequency_bands(10);
        assert_eq!(bands.len(), 10);
        assert!((bands[0].center_frequency - 20.0).abs() < 1e-3);
        assert!((bands[9].center_frequency - 22_050.0).abs() < 1.0);
        assert!(bands.windows(2).all(|w| w[1].center_frequency > w[0].center_frequency));
        assert!(spectrum.frequency_bands(0).is_empty());
    }

    #[test]
    fn test_frequency_range() {
        let spectrum = SpectralEngine::new(256, 8000).analyze(&tone(1000.0, 8000, 256));
        let hit = spectrum.analyze_frequency_range(800.0, 1200.0);
        assert_eq!(hit.peak_frequency, 1000.0);
        assert!(hit.rms > 0.0);

        let miss = spectrum.analyze_frequency_range(3000.0, 2500.0);
        assert!(miss.peak_magnitude < hit.peak_magnitude * 0.01);
    }

    #[test]
    fn test_averaged_short_buffer() {
        let engine = SpectralEngine::new(512, 8000);
        let single = engine.analyze(&tone(1000.0, 8000, 100));
        let averaged = engine.analyze_averaged(&tone(1000.0, 8000, 100));
        assert_eq!(single, averaged);
    }

    #[test]
    fn test_centroid_of_tone() {
        let spectrum = SpectralEngine::new(1024, 8000).analyze_averaged(&tone(1000.0, 8000, 4096));
        assert!((spectrum.centroid() - 1000.0).abs() < 50.0);
    }

    #[test]
    fn test_engine_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SpectralEngine>();
    }
}
