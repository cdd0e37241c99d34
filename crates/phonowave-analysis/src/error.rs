//! Error types for feature extraction.

use thiserror::Error;

/// Result type for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors that can occur before analysis starts.
///
/// Extraction itself never fails on a valid [`AudioClip`](crate::AudioClip):
/// silence, DC and clipped input all produce a record.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Clip with no samples.
    #[error("Audio clip is empty")]
    EmptyClip,

    /// NaN or infinite sample.
    #[error("Non-finite sample at index {0}")]
    NonFiniteSample(usize),

    /// Zero sample rate.
    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(u32),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error reading a WAV file.
    #[error("Failed to read audio file: {0}")]
    Wav(String),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AnalysisError {
    /// Create a config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a WAV read error.
    pub fn wav(msg: impl Into<String>) -> Self {
        Self::Wav(msg.into())
    }
}

impl From<hound::Error> for AnalysisError {
    fn from(e: hound::Error) -> Self {
        match e {
            hound::Error::IoError(io) => AnalysisError::IoError(io),
            other => AnalysisError::Wav(other.to_string()),
        }
    }
}
