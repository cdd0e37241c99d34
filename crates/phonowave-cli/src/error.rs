//! Error types for the PhonoWave CLI.

use thiserror::Error;

use phonowave_analysis::AnalysisError;
use phonowave_sim::SimError;

/// CLI result type alias.
pub type CliResult<T> = Result<T, CliError>;

/// CLI error type.
#[derive(Error, Debug)]
pub enum CliError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid command-line argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Simulation failed.
    #[error("Simulation failed: {0}")]
    Simulation(#[from] SimError),

    /// Analysis failed.
    #[error("Analysis failed: {0}")]
    Analysis(#[from] AnalysisError),

    /// Output formatting error.
    #[error("Output error: {0}")]
    Output(String),

    /// A background task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(String),
}

impl From<toml::de::Error> for CliError {
    fn from(e: toml::de::Error) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(e.to_string())
    }
}

impl From<indicatif::style::TemplateError> for CliError {
    fn from(e: indicatif::style::TemplateError) -> Self {
        CliError::Output(e.to_string())
    }
}

impl From<tokio::task::JoinError> for CliError {
    fn from(e: tokio::task::JoinError) -> Self {
        CliError::Task(e.to_string())
    }
}
