//! Frame-based feature extraction.
//!
//! The clip is cut into overlapping frames (25 ms every 10 ms by default).
//! Energy, zero-crossing rate, voicing and pitch are measured per frame;
//! formants, spectral shape and MFCCs come from one averaged clip spectrum.

pub mod energy;
pub mod formants;
pub mod mfcc;
pub mod pitch;
pub mod shape;
pub mod timeseries;
pub mod voicing;
pub mod zcr;

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::classifier::{Classifier, Summary};
use crate::clip::AudioClip;
use crate::config::{AnalysisConfig, VoicingLag};
use crate::error::Result;
use crate::spectral::SpectralEngine;

pub use energy::EnergyFeatures;
pub use formants::{Formant, Formants};
pub use pitch::PitchFeatures;
pub use shape::SpectralShape;
pub use timeseries::TimeSeriesPoint;
pub use voicing::{VoicedInterval, VoicingFeatures};
pub use zcr::ZeroCrossingFeatures;

use pitch::{normalized_autocorrelation, PitchSearch};
use voicing::FrameVoicing;

/// Everything extracted from one clip.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureRecord {
    /// Clip length in seconds.
    pub duration: f64,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of samples analyzed.
    pub sample_count: usize,
    /// Frame energy statistics.
    pub energy: EnergyFeatures,
    /// Voiced frames and intervals.
    pub voicing: VoicingFeatures,
    /// Pitch contour and aggregates.
    pub pitch: PitchFeatures,
    /// F1 to F3.
    pub formants: Formants,
    /// Spectral centroid and brightness.
    pub spectral: SpectralShape,
    /// Zero-crossing statistics.
    pub zero_crossing: ZeroCrossingFeatures,
    /// Cepstral coefficients.
    pub mfcc: Vec<f32>,
    /// Coarse level trace.
    pub time_series: Vec<TimeSeriesPoint>,
    /// Sound type, quality and hints.
    pub summary: Summary,
}

/// Per-frame measurements.
#[derive(Debug, Clone, Copy, Default)]
struct FrameMeasure {
    energy: f32,
    zcr: f32,
    pitch: f32,
    voiced: bool,
}

/// Runs every analysis over a clip.
///
/// Holds only configuration, so one extractor can serve many threads.
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    config: AnalysisConfig,
    classifier: Classifier,
}

impl FeatureExtractor {
    /// Create an extractor after validating `config`.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            classifier: Classifier::new(config.classifier.clone()),
            config,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Extract a feature record. Never fails on a valid clip.
    pub fn extract(&self, clip: &AudioClip) -> FeatureRecord {
        let config = &self.config;
        let sample_rate = clip.sample_rate();
        let samples = clip.samples();

        let frame_len = config.frame_len(sample_rate);
        let hop = config.hop_len(sample_rate);
        let search = PitchSearch::new(sample_rate, config.min_pitch, config.max_pitch);

        let measures: Vec<FrameMeasure> = frames(samples, frame_len, hop)
            .map(|frame| self.measure_frame(frame, sample_rate, &search))
            .collect();

        let energies: Vec<f32> = measures.iter().map(|m| m.energy).collect();
        let hop_seconds = hop as f64 / sample_rate as f64;

        let engine = SpectralEngine::with_transform(config.spectrum_size, sample_rate, config.transform);
        let spectrum = engine.analyze_averaged(samples);

        let mut record = FeatureRecord {
            duration: clip.duration(),
            sample_rate,
            sample_count: samples.len(),
            energy: EnergyFeatures::from_frames(&energies, samples),
            voicing: VoicingFeatures::from_frames(
                measures.iter().map(|m| m.voiced).collect(),
                hop_seconds,
            ),
            pitch: PitchFeatures::from_contour(
                measures.iter().map(|m| m.pitch).collect(),
                config.min_pitch,
                config.max_pitch,
            ),
            formants: Formants::from_spectrum(&spectrum, config.formant_threshold),
            spectral: SpectralShape::from_spectrum(&spectrum),
            zero_crossing: ZeroCrossingFeatures::from_series(
                measures.iter().map(|m| m.zcr).collect(),
                config.fricative_zcr_threshold,
            ),
            mfcc: mfcc::mfcc(
                &spectrum,
                config.mel_bands,
                config.mel_min_frequency,
                config.num_mfcc,
            ),
            time_series: timeseries::time_series(samples, sample_rate, config.time_series_frame),
            summary: Summary::default(),
        };
        record.summary = self.classifier.summarize(&record);

        debug!(
            "Extracted {} frames from {:.3}s clip: voicing {:.2}, pitch {:.1} Hz, zcr {:.3} -> {}",
            measures.len(),
            record.duration,
            record.voicing.ratio,
            record.pitch.mean,
            record.zero_crossing.mean,
            record.summary.sound_type
        );

        record
    }

    /// Extract independent clips in parallel, preserving order.
    pub fn extract_many(&self, clips: &[AudioClip]) -> Vec<FeatureRecord> {
        clips.par_iter().map(|clip| self.extract(clip)).collect()
    }

    fn measure_frame(&self, frame: &[f32], sample_rate: u32, search: &PitchSearch) -> FrameMeasure {
        let config = &self.config;
        let energy = energy::frame_energy(frame);
        let zcr = zcr::zero_crossing_rate(frame);

        if energy < config.silence_threshold {
            return FrameMeasure {
                energy,
                zcr,
                ..FrameMeasure::default()
            };
        }

        let best = search.best_lag(frame);
        let pitch = match best {
            Some(b) if b.correlation > 0.0 => sample_rate as f32 / b.lag as f32,
            _ => 0.0,
        };
        let correlation = match config.voicing_lag {
            VoicingLag::Fixed(lag) => normalized_autocorrelation(frame, lag),
            VoicingLag::PitchRange => best.map_or(0.0, |b| b.correlation),
        };

        FrameMeasure {
            energy,
            zcr,
            pitch,
            voiced: FrameVoicing {
                energy,
                zcr,
                correlation,
            }
            .is_voiced(config),
        }
    }
}

/// Overlapping frames; a clip shorter than one frame is a single frame.
fn frames<'a>(samples: &'a [f32], frame_len: usize, hop: usize) -> impl Iterator<Item = &'a [f32]> {
    let count = if samples.len() <= frame_len {
        1
    } else {
        (samples.len() - frame_len) / hop + 1
    };
    let frame_len = frame_len.min(samples.len());
    (0..count).map(move |i| &samples[i * hop..i * hop + frame_len])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_count() {
        let samples = vec![0.0f32; 1000];
        assert_eq!(frames(&samples, 100, 50).count(), 19);
        assert_eq!(frames(&samples, 1000, 50).count(), 1);
        assert_eq!(frames(&samples[..10], 100, 50).next().map(<[f32]>::len), Some(10));
    }

    #[test]
    fn test_short_clip_is_one_frame() {
        let clip = AudioClip::new(vec![0.5, -0.5, 0.5], 44_100).unwrap();
        let record = FeatureExtractor::default().extract(&clip);
        assert_eq!(record.voicing.frames.len(), 1);
        assert_eq!(record.zero_crossing.series.len(), 1);
        assert_eq!(record.mfcc.len(), 13);
    }

    #[test]
    fn test_silence_is_well_formed() {
        let clip = AudioClip::new(vec![0.0; 4410], 44_100).unwrap();
        let record = FeatureExtractor::default().extract(&clip);
        assert!(!record.voicing.is_voiced);
        assert_eq!(record.pitch.mean, 0.0);
        assert!(record.pitch.contour.iter().all(|&p| p == 0.0));
        assert!(record.mfcc.iter().all(|c| c.is_finite()));
        assert_eq!(record.energy.max_db, -100.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AnalysisConfig::new().with_num_mfcc(0);
        assert!(FeatureExtractor::new(config).is_err());
    }

    #[test]
    fn test_extractor_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FeatureExtractor>();
    }
}
