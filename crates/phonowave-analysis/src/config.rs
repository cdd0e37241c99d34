//! Analysis and classification parameters.
//!
//! The voicing, fricative and quality thresholds are hand-tuned starting
//! points, not derived values. They are kept here so callers can retune them.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// How spectra are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    /// O(N²) direct DFT.
    Direct,
    /// rustfft.
    #[default]
    Fast,
}

/// Autocorrelation lag used by the voicing decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoicingLag {
    /// A fixed lag in samples (80 is the classic choice at 44.1 kHz).
    Fixed(usize),
    /// The strongest lag inside the pitch search range.
    #[default]
    PitchRange,
}

/// Thresholds for the sound-type summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Mean pitch (Hz) above which voiced frames count as a voiced sound.
    pub voiced_pitch_floor: f32,
    /// Peak level below which the clip is flagged as too quiet.
    pub quiet_threshold: f32,
    /// Peak level above which the clip is flagged as clipping.
    pub clipping_threshold: f32,
    /// Brightness (centroid / Nyquist) at or above which a clip is "bright".
    pub bright_threshold: f32,
    /// Brightness at or below which a clip is "dark".
    pub dark_threshold: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            voiced_pitch_floor: 80.0,
            quiet_threshold: 0.3,
            clipping_threshold: 0.95,
            bright_threshold: 0.2,
            dark_threshold: 0.05,
        }
    }
}

/// Feature-extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Analysis frame length in milliseconds.
    pub frame_ms: f32,
    /// Hop between frames in milliseconds.
    pub hop_ms: f32,
    /// Frame energy (mean square) below which a frame is silent.
    pub silence_threshold: f32,
    /// Frames with a zero-crossing rate above this are unvoiced.
    pub voicing_zcr_threshold: f32,
    /// Normalized autocorrelation a frame must exceed to be voiced.
    pub autocorrelation_threshold: f32,
    /// Mean zero-crossing rate above which the clip is fricative.
    pub fricative_zcr_threshold: f32,
    /// Lowest pitch searched, in Hz.
    pub min_pitch: f32,
    /// Highest pitch searched, in Hz.
    pub max_pitch: f32,
    /// Lag used for the voicing autocorrelation.
    pub voicing_lag: VoicingLag,
    /// Spectral peaks must exceed this fraction of the strongest bin to be formants.
    pub formant_threshold: f32,
    /// Number of cepstral coefficients returned.
    pub num_mfcc: usize,
    /// Number of mel bands.
    pub mel_bands: usize,
    /// Lower edge of the mel filterbank in Hz.
    pub mel_min_frequency: f32,
    /// Window length of clip-level spectra.
    pub spectrum_size: usize,
    /// Spectrum implementation.
    pub transform: TransformKind,
    /// Frame length of the display time series, in samples.
    pub time_series_frame: usize,
    /// Summary thresholds.
    pub classifier: ClassifierConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frame_ms: 25.0,
            hop_ms: 10.0,
            silence_threshold: 0.001,
            voicing_zcr_threshold: 0.2,
            autocorrelation_threshold: 0.5,
            fricative_zcr_threshold: 0.15,
            min_pitch: 50.0,
            max_pitch: 400.0,
            voicing_lag: VoicingLag::default(),
            formant_threshold: 0.1,
            num_mfcc: 13,
            mel_bands: 40,
            mel_min_frequency: 50.0,
            spectrum_size: 2048,
            transform: TransformKind::default(),
            time_series_frame: 512,
            classifier: ClassifierConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the frame and hop lengths in milliseconds.
    pub fn with_framing(mut self, frame_ms: f32, hop_ms: f32) -> Self {
        self.frame_ms = frame_ms;
        self.hop_ms = hop_ms;
        self
    }

    /// Set the pitch search range in Hz.
    pub fn with_pitch_range(mut self, min_pitch: f32, max_pitch: f32) -> Self {
        self.min_pitch = min_pitch;
        self.max_pitch = max_pitch;
        self
    }

    /// Set the voicing autocorrelation lag.
    pub fn with_voicing_lag(mut self, lag: VoicingLag) -> Self {
        self.voicing_lag = lag;
        self
    }

    /// Set the number of MFCCs.
    pub fn with_num_mfcc(mut self, num_mfcc: usize) -> Self {
        self.num_mfcc = num_mfcc;
        self
    }

    /// Set the clip spectrum window length.
    pub fn with_spectrum_size(mut self, size: usize) -> Self {
        self.spectrum_size = size;
        self
    }

    /// Set the spectrum implementation.
    pub fn with_transform(mut self, transform: TransformKind) -> Self {
        self.transform = transform;
        self
    }

    /// Set the summary thresholds.
    pub fn with_classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.classifier = classifier;
        self
    }

    /// Frame length in samples (at least one).
    pub fn frame_len(&self, sample_rate: u32) -> usize {
        ((self.frame_ms as f64 / 1000.0 * sample_rate as f64).floor() as usize).max(1)
    }

    /// Hop length in samples (at least one).
    pub fn hop_len(&self, sample_rate: u32) -> usize {
        ((self.hop_ms as f64 / 1000.0 * sample_rate as f64).floor() as usize).max(1)
    }

    /// Reject configurations the extractor cannot run with.
    pub fn validate(&self) -> Result<()> {
        let positive = |name: &str, value: f32| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(AnalysisError::config(format!(
                    "{} must be positive, got {}",
                    name, value
                )))
            }
        };
        positive("frame_ms", self.frame_ms)?;
        positive("hop_ms", self.hop_ms)?;
        positive("min_pitch", self.min_pitch)?;
        positive("max_pitch", self.max_pitch)?;
        positive("mel_min_frequency", self.mel_min_frequency)?;

        if self.min_pitch >= self.max_pitch {
            return Err(AnalysisError::config(format!(
                "min_pitch ({}) must be below max_pitch ({})",
                self.min_pitch, self.max_pitch
            )));
        }
        if self.num_mfcc == 0 {
            return Err(AnalysisError::config("num_mfcc must be at least 1"));
        }
        if self.mel_bands == 0 {
            return Err(AnalysisError::config("mel_bands must be at least 1"));
        }
        if self.spectrum_size < 4 {
            return Err(AnalysisError::config(format!(
                "spectrum_size must be at least 4, got {}",
                self.spectrum_size
            )));
        }
        if self.time_series_frame == 0 {
            return Err(AnalysisError::config("time_series_frame must be at least 1"));
        }
        if let VoicingLag::Fixed(0) = self.voicing_lag {
            return Err(AnalysisError::config("fixed voicing lag must be at least 1"));
        }
        Ok(())
    }
}
