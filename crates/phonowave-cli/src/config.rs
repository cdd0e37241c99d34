//! TOML configuration file.
//!
//! ```toml
//! [simulation]
//! width = 128
//! height = 96
//! damping_factor = 0.998
//! steps = 8820
//!
//! [[simulation.sources]]
//! type = "point"
//! x = 64
//! y = 48
//! frequency = 440.0
//! amplitude = 1.0
//!
//! [analysis]
//! num_mfcc = 20
//! voicing_lag = { fixed = 80 }
//! ```
//!
//! Every key is optional; command-line flags override file values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use phonowave_analysis::AnalysisConfig;
use phonowave_sim::{SimulationConfig, SourceDescriptor};

use crate::error::CliResult;

/// Whole configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// `[simulation]` section.
    pub simulation: SimulationSection,
    /// `[analysis]` section.
    pub analysis: AnalysisConfig,
}

/// `[simulation]` section: solver physics plus run settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SimulationSection {
    /// Solver physics and grid.
    #[serde(flatten)]
    pub solver: SimulationConfig,
    /// Number of steps to run.
    pub steps: Option<u64>,
    /// Steps between progress updates.
    pub progress_interval: Option<u64>,
    /// WAV output path.
    pub output: Option<PathBuf>,
    /// Sources registered before the run.
    pub sources: Vec<SourceDescriptor>,
}

impl FileConfig {
    /// Load `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        debug!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse TOML text.
    pub fn parse(content: &str) -> CliResult<Self> {
        Ok(toml::from_str(content)?)
    }
}
