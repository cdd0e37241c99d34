//! Collects microphone samples into a playable buffer.

use std::path::Path;

use tracing::info;

use crate::error::Result;

/// Headroom factor applied on normalization (peak maps to 1/1.1).
const HEADROOM: f32 = 1.1;

/// Append-only sample buffer with a running peak.
#[derive(Debug, Clone, Default)]
pub struct AudioAccumulator {
    samples: Vec<f32>,
    peak: f32,
}

impl AudioAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty accumulator with room for `capacity` samples.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
            peak: 0.0,
        }
    }

    /// Append a sample and update the running peak.
    pub fn add_sample(&mut self, value: f32) {
        self.samples.push(value);
        self.peak = self.peak.max(value.abs());
    }

    /// Raw samples in insertion order.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Largest absolute sample seen so far.
    pub fn peak(&self) -> f32 {
        self.peak
    }

    /// Number of samples collected.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if no samples were collected.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples scaled by `1 / (peak * 1.1)`; returned unchanged when the peak is zero.
    pub fn normalize(&self) -> Vec<f32> {
        if self.peak == 0.0 || !self.peak.is_finite() {
            return self.samples.clone();
        }
        let gain = 1.0 / (self.peak * HEADROOM);
        self.samples.iter().map(|s| s * gain).collect()
    }

    /// Normalized buffer ready for playback.
    pub fn to_pcm(&self) -> Vec<f32> {
        self.normalize()
    }

    /// Normalized buffer as signed 16-bit PCM.
    pub fn to_pcm_i16(&self) -> Vec<i16> {
        self.normalize()
            .into_iter()
            .map(|s| (s.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16)
            .collect()
    }

    /// Write the normalized buffer as a mono 32-bit float WAV file.
    pub fn write_wav<P: AsRef<Path>>(&self, path: P, sample_rate: u32) -> Result<()> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };

        let mut writer = hound::WavWriter::create(path.as_ref(), spec)?;
        for sample in self.to_pcm() {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;

        info!(
            "Wrote {} samples ({:.3} s) to {}",
            self.samples.len(),
            self.samples.len() as f64 / sample_rate.max(1) as f64,
            path.as_ref().display()
        );
        Ok(())
    }

    /// Drop all samples and reset the peak.
    pub fn clear(&mut self) {
        self.samples.clear();
        self.peak = 0.0;
    }
}
