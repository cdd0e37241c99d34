//! # Phonowave Analysis
//!
//! Phonetic feature extraction and heuristic sound-type classification for
//! short mono clips.
//!
//! ## Pipeline
//!
//! ```text
//! AudioClip -> frames -> {energy, zero crossings, voicing, pitch}
//!           -> averaged spectrum -> {formants, centroid, MFCC}
//!           -> Classifier -> FeatureRecord
//! ```
//!
//! Every stage guards its divisions and logarithms, so any nonempty,
//! finite clip (silence, DC, clipped input) yields a well-formed
//! [`FeatureRecord`].
//!
//! ## Example
//!
//! ```
//! use phonowave_analysis::prelude::*;
//!
//! let samples: Vec<f32> = (0..8820)
//!     .map(|i| (2.0 * std::f32::consts::PI * 150.0 * i as f32 / 44_100.0).sin() * 0.5)
//!     .collect();
//! let clip = AudioClip::new(samples, 44_100).unwrap();
//!
//! let record = FeatureExtractor::default().extract(&clip);
//! assert!(record.voicing.is_voiced);
//! assert_eq!(record.mfcc.len(), 13);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod classifier;
pub mod clip;
pub mod config;
pub mod error;
pub mod features;
pub mod spectral;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::classifier::{Classifier, Quality, SoundType, Summary};
    pub use crate::clip::AudioClip;
    pub use crate::config::{AnalysisConfig, ClassifierConfig, TransformKind, VoicingLag};
    pub use crate::error::{AnalysisError, Result};
    pub use crate::features::{FeatureExtractor, FeatureRecord};
    pub use crate::spectral::{SpectralEngine, Spectrum};
}

// Re-exports
pub use classifier::{Classifier, SoundType, Summary};
pub use clip::AudioClip;
pub use config::{AnalysisConfig, ClassifierConfig, TransformKind, VoicingLag};
pub use error::{AnalysisError, Result};
pub use features::{FeatureExtractor, FeatureRecord};
pub use spectral::{SpectralEngine, Spectrum};
