//! Heuristic sound-type summary.
//!
//! A pure decision table over voicing, frication and mean pitch, plus a
//! quality score from the clip's peak level and free-text hints for display.

use std::fmt;

use serde::Serialize;

use crate::config::ClassifierConfig;
use crate::features::FeatureRecord;

/// Penalty per quality issue.
const ISSUE_PENALTY: u8 = 20;

/// F1 below this suggests a close vowel.
const CLOSE_VOWEL_F1: f32 = 400.0;
/// F1 above this suggests an open vowel.
const OPEN_VOWEL_F1: f32 = 700.0;
/// Upper edge of the "low" pitch band.
const LOW_PITCH: f32 = 165.0;
/// Upper edge of the "mid" pitch band.
const MID_PITCH: f32 = 255.0;

/// Coarse phonetic category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SoundType {
    /// Aperiodic turbulence without voicing, e.g. /s/, /f/.
    #[serde(rename = "unvoiced fricative")]
    UnvoicedFricative,
    /// Turbulence over voicing, e.g. /z/, /v/.
    #[serde(rename = "voiced fricative")]
    VoicedFricative,
    /// Neither voiced nor fricative.
    #[serde(rename = "unvoiced stop")]
    UnvoicedStop,
    /// Voiced with a plausible pitch.
    #[serde(rename = "voiced sound (vowel/nasal/voiced stop)")]
    VoicedSound,
    /// Voiced but no usable pitch.
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
}

impl SoundType {
    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::UnvoicedFricative => "unvoiced fricative",
            Self::VoicedFricative => "voiced fricative",
            Self::UnvoicedStop => "unvoiced stop",
            Self::VoicedSound => "voiced sound (vowel/nasal/voiced stop)",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SoundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Recording quality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quality {
    /// 0 to 100.
    pub score: u8,
    /// Problems found.
    pub issues: Vec<String>,
}

impl Default for Quality {
    fn default() -> Self {
        Self {
            score: 100,
            issues: Vec::new(),
        }
    }
}

/// Classification result attached to a [`FeatureRecord`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    /// Sound type.
    pub sound_type: SoundType,
    /// Quality score and issues.
    pub quality: Quality,
    /// Short descriptive tags.
    pub characteristics: Vec<String>,
    /// Free-text guidance.
    pub hints: Vec<String>,
}

/// Summarizes feature records.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    config: ClassifierConfig,
}

impl Classifier {
    /// Create a classifier with the given thresholds.
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Thresholds in use.
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// The decision table.
    pub fn classify(&self, voiced: bool, fricative: bool, mean_pitch: f32) -> SoundType {
        match (voiced, fricative) {
            (false, true) => SoundType::UnvoicedFricative,
            (true, true) => SoundType::VoicedFricative,
            (false, false) => SoundType::UnvoicedStop,
            (true, false) if mean_pitch > self.config.voiced_pitch_floor => SoundType::VoicedSound,
            _ => SoundType::Unknown,
        }
    }

    /// `100 - 20 * issues`, floored at zero.
    pub fn quality(&self, peak_level: f32) -> Quality {
        let mut issues = Vec::new();
        if peak_level < self.config.quiet_threshold {
            issues.push("too quiet".to_string());
        }
        if peak_level > self.config.clipping_threshold {
            issues.push("clipping/distortion".to_string());
        }
        let penalty = (issues.len() as u32 * ISSUE_PENALTY as u32).min(100) as u8;
        Quality {
            score: 100 - penalty,
            issues,
        }
    }

    /// Full summary of a record.
    pub fn summarize(&self, record: &FeatureRecord) -> Summary {
        let voiced = record.voicing.is_voiced;
        let fricative = record.zero_crossing.is_fricative;
        let mean_pitch = record.pitch.mean;

        Summary {
            sound_type: self.classify(voiced, fricative, mean_pitch),
            quality: self.quality(record.energy.peak_level),
            characteristics: self.characteristics(record),
            hints: self.hints(record),
        }
    }

    fn characteristics(&self, record: &FeatureRecord) -> Vec<String> {
        let mut out = Vec::new();

        out.push(if record.voicing.is_voiced { "voiced" } else { "unvoiced" }.to_string());
        if record.zero_crossing.is_fricative {
            out.push("fricative".to_string());
        }

        let brightness = record.spectral.brightness;
        if brightness >= self.config.bright_threshold {
            out.push("bright".to_string());
        } else if brightness <= self.config.dark_threshold {
            out.push("dark".to_string());
        }

        match record.voicing.segment_count() {
            0 => {}
            1 => out.push("1 voiced segment".to_string()),
            n => out.push(format!("{} voiced segments", n)),
        }

        if record.pitch.mean > 0.0 {
            out.push(format!("pitch {:.0} Hz", record.pitch.mean));
        }

        out
    }

    fn hints(&self, record: &FeatureRecord) -> Vec<String> {
        let mut hints = Vec::new();
        let voiced = record.voicing.is_voiced;
        let fricative = record.zero_crossing.is_fricative;

        match (voiced, fricative) {
            (true, false) => hints.push(
                "Steady vocal-fold vibration: likely a vowel, nasal or voiced stop".to_string(),
            ),
            (true, true) => {
                hints.push("Voicing mixed with turbulent noise, as in /z/ or /v/".to_string())
            }
            (false, true) => {
                hints.push("Turbulent airflow without voicing, as in /s/ or /f/".to_string())
            }
            (false, false) => hints.push(
                "Little voicing or frication: possibly a stop burst or silence".to_string(),
            ),
        }

        let f1 = record.formants.f1;
        if voiced && f1.is_present() {
            if f1.frequency < CLOSE_VOWEL_F1 {
                hints.push(format!("Low F1 ({:.0} Hz) suggests a close vowel such as /i/ or /u/", f1.frequency));
            } else if f1.frequency > OPEN_VOWEL_F1 {
                hints.push(format!("High F1 ({:.0} Hz) suggests an open vowel such as /a/", f1.frequency));
            } else {
                hints.push(format!("Mid F1 ({:.0} Hz) suggests a mid vowel such as /e/ or /o/", f1.frequency));
            }
        } else if voiced {
            hints.push("No clear formant structure found".to_string());
        }

        let pitch = record.pitch.mean;
        if pitch > 0.0 {
            let band = if pitch < LOW_PITCH {
                "low"
            } else if pitch < MID_PITCH {
                "mid"
            } else {
                "high"
            };
            hints.push(format!("Mean pitch {:.0} Hz is in the {} range", pitch, band));
        }

        hints
    }
}
