//! Error types for the wave-field simulation.

use thiserror::Error;

/// Result type for simulation operations.
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors that can occur while configuring or driving a simulation.
///
/// Stepping itself never fails; every variant here comes from construction,
/// the background runner, or WAV export.
#[derive(Error, Debug)]
pub enum SimError {
    /// Physical constants or grid dimensions that cannot be simulated.
    #[error("Invalid simulation config: {0}")]
    InvalidConfig(String),

    /// The background runner thread could not be spawned or joined.
    #[error("Runner error: {0}")]
    RunnerError(String),

    /// Error writing a WAV file.
    #[error("WAV export error: {0}")]
    Wav(String),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SimError {
    /// Create an invalid config error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a runner error.
    pub fn runner(msg: impl Into<String>) -> Self {
        Self::RunnerError(msg.into())
    }

    /// Create a WAV export error.
    pub fn wav(msg: impl Into<String>) -> Self {
        Self::Wav(msg.into())
    }
}

impl From<hound::Error> for SimError {
    fn from(e: hound::Error) -> Self {
        SimError::Wav(e.to_string())
    }
}
