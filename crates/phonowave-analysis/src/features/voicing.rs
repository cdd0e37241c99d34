//! Voiced/unvoiced decisions and voiced intervals.

use serde::Serialize;

use crate::config::AnalysisConfig;

/// Per-frame measurements the voicing decision is based on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameVoicing {
    /// Mean squared amplitude.
    pub energy: f32,
    /// Zero-crossing rate.
    pub zcr: f32,
    /// Normalized autocorrelation at the voicing lag.
    pub correlation: f32,
}

impl FrameVoicing {
    /// Silent or noisy frames are unvoiced; otherwise voiced on strong periodicity.
    pub fn is_voiced(&self, config: &AnalysisConfig) -> bool {
        if self.energy < config.silence_threshold || self.zcr > config.voicing_zcr_threshold {
            return false;
        }
        self.correlation > config.autocorrelation_threshold
    }
}

/// A contiguous run of voiced frames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VoicedInterval {
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds (exclusive).
    pub end: f64,
    /// `end - start`.
    pub duration: f64,
}

/// Clip-level voicing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VoicingFeatures {
    /// Voiced flag per frame.
    pub frames: Vec<bool>,
    /// Fraction of voiced frames.
    pub ratio: f32,
    /// Ratio above one half.
    pub is_voiced: bool,
    /// Runs of voiced frames.
    pub intervals: Vec<VoicedInterval>,
}

impl VoicingFeatures {
    /// Summarize per-frame flags; `hop_seconds` is the time between frame starts.
    pub fn from_frames(frames: Vec<bool>, hop_seconds: f64) -> Self {
        let voiced = frames.iter().filter(|&&v| v).count();
        let ratio = if frames.is_empty() {
            0.0
        } else {
            voiced as f32 / frames.len() as f32
        };
        Self {
            intervals: voiced_intervals(&frames, hop_seconds),
            frames,
            ratio,
            is_voiced: ratio > 0.5,
        }
    }

    /// Number of voiced segments.
    pub fn segment_count(&self) -> usize {
        self.intervals.len()
    }
}

/// Contiguous true-runs of `frames` as time intervals.
pub fn voiced_intervals(frames: &[bool], hop_seconds: f64) -> Vec<VoicedInterval> {
    let mut intervals = Vec::new();
    let mut run_start = None;

    for (i, &voiced) in frames.iter().chain(std::iter::once(&false)).enumerate() {
        match (voiced, run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(start)) => {
                let start = start as f64 * hop_seconds;
                let end = i as f64 * hop_seconds;
                intervals.push(VoicedInterval {
                    start,
                    end,
                    duration: end - start,
                });
                run_start = None;
            }
            _ => {}
        }
    }

    intervals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision() {
        let config = AnalysisConfig::default();
        let voiced = FrameVoicing {
            energy: 0.1,
            zcr: 0.01,
            correlation: 0.8,
        };
        assert!(voiced.is_voiced(&config));
        assert!(!FrameVoicing { energy: 0.0005, ..voiced }.is_voiced(&config));
        assert!(!FrameVoicing { zcr: 0.3, ..voiced }.is_voiced(&config));
        assert!(!FrameVoicing { correlation: 0.4, ..voiced }.is_voiced(&config));
    }

    #[test]
    fn test_intervals() {
        let frames = [false, true, true, false, true];
        let intervals = voiced_intervals(&frames, 0.01);
        assert_eq!(intervals.len(), 2);
        assert!((intervals[0].start - 0.01).abs() < 1e-12);
        assert!((intervals[0].end - 0.03).abs() < 1e-12);
        assert!((intervals[0].duration - 0.02).abs() < 1e-12);
        assert!((intervals[1].end - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_ratio() {
        let voicing = VoicingFeatures::from_frames(vec![true, true, false], 0.01);
        assert!((voicing.ratio - 2.0 / 3.0).abs() < 1e-6);
        assert!(voicing.is_voiced);
        assert_eq!(voicing.segment_count(), 1);

        let half = VoicingFeatures::from_frames(vec![true, false], 0.01);
        assert!(!half.is_voiced);
    }
}
