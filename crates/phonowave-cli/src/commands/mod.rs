//! CLI command implementations.

pub mod analyze;
pub mod simulate;

use clap::ValueEnum;

/// Excitation geometry for `simulate --source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceShape {
    /// Single cell at the grid centre.
    Point,
    /// Horizontal string across the middle half of the grid.
    Line,
    /// Disc at the grid centre.
    Membrane,
}

/// Report format for `analyze`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Coloured human-readable report.
    #[default]
    Text,
    /// JSON array of feature records.
    Json,
}
