//! Validated PCM input for the feature extractor.

use std::path::Path;

use tracing::{debug, info};

use crate::error::{AnalysisError, Result};

/// A nonempty, finite-valued mono PCM buffer with its sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioClip {
    /// Wrap a sample buffer, rejecting empty, non-finite or zero-rate input.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidSampleRate(sample_rate));
        }
        if samples.is_empty() {
            return Err(AnalysisError::EmptyClip);
        }
        if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
            return Err(AnalysisError::NonFiniteSample(index));
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Load a WAV file, mixing multichannel audio down to mono.
    pub fn from_wav<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        info!("Opening audio file: {}", path_str);

        let reader = hound::WavReader::open(path.as_ref())
            .map_err(|e| AnalysisError::wav(format!("{}: {}", path_str, e)))?;

        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;
        debug!(
            "File spec: {} Hz, {} channels, {} bits, {:?}",
            spec.sample_rate, channels, spec.bits_per_sample, spec.sample_format
        );

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<std::result::Result<_, _>>()?,
            hound::SampleFormat::Int => {
                let scale = 1.0 / (1u64 << (spec.bits_per_sample.max(1) - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|s| s as f32 * scale))
                    .collect::<std::result::Result<_, _>>()?
            }
        };

        let samples: Vec<f32> = interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect();

        info!(
            "Loaded {} samples ({:.2} seconds)",
            samples.len(),
            samples.len() as f64 / spec.sample_rate.max(1) as f64
        );

        Self::new(samples, spec.sample_rate)
    }

    /// Samples in time order.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; clips are never empty.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Nyquist frequency in Hz.
    pub fn nyquist(&self) -> f32 {
        self.sample_rate as f32 / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_degenerate_input() {
        assert!(matches!(
            AudioClip::new(Vec::new(), 44_100),
            Err(AnalysisError::EmptyClip)
        ));
        assert!(matches!(
            AudioClip::new(vec![0.0, f32::NAN], 44_100),
            Err(AnalysisError::NonFiniteSample(1))
        ));
        assert!(matches!(
            AudioClip::new(vec![0.0], 0),
            Err(AnalysisError::InvalidSampleRate(0))
        ));
    }

    #[test]
    fn test_duration() {
        let clip = AudioClip::new(vec![0.0; 22_050], 44_100).unwrap();
        assert_eq!(clip.duration(), 0.5);
        assert_eq!(clip.nyquist(), 22_050.0);
    }

    #[test]
    fn test_from_wav_stereo_mixdown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..100 {
            writer.write_sample(16384i16).unwrap();
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let clip = AudioClip::from_wav(&path).unwrap();
        assert_eq!(clip.sample_rate(), 8000);
        assert_eq!(clip.len(), 100);
        assert!((clip.samples()[0] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_from_wav_missing_file() {
        let result = AudioClip::from_wav("/nonexistent/clip.wav");
        assert!(matches!(result, Err(AnalysisError::Wav(_))));
    }
}
