//! # Phonowave Sim
//!
//! 2D acoustic wave propagation using the FDTD (Finite-Difference
//! Time-Domain) method.
//!
//! A [`WaveFieldSolver`] owns a triple-buffered pressure grid, a derived
//! particle-velocity grid and a list of excitation sources (points, strings
//! and circular membranes). Every step advances the field by one time step,
//! after which a single monitor cell can be sampled as a microphone.
//!
//! ## Features
//!
//! - Five-point Laplacian with zero (soft) boundaries
//! - Automatic time-step clamping against the 2D CFL bound
//! - Sine, square, triangle and sawtooth sources with start time and duration
//! - Row-parallel updates on large grids
//! - Background runner with progress, snapshots and cancellation
//! - Normalized microphone audio with WAV export
//!
//! ## Example
//!
//! ```
//! use phonowave_sim::prelude::*;
//!
//! let config = SimulationConfig::new(32, 32);
//! let mut solver = WaveFieldSolver::new(config).unwrap();
//! solver.add_source(SourceDescriptor::point(16, 16, 1000.0, 1.0));
//!
//! let mut audio = AudioAccumulator::new();
//! for _ in 0..64 {
//!     solver.advance();
//!     audio.add_sample(solver.microphone_signal());
//! }
//! assert_eq!(audio.len(), 64);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod accumulator;
pub mod error;
pub mod field;
pub mod physics;
pub mod runner;
pub mod solver;
pub mod source;
pub mod stats;

pub use accumulator::AudioAccumulator;
pub use error::{Result, SimError};
pub use field::{FieldSnapshot, PressureField, VelocityField};
pub use physics::{SimulationConfig, COURANT_LIMIT_2D};
pub use runner::{Progress, RunOutcome, RunnerHandle, SimulationRunner};
pub use solver::WaveFieldSolver;
pub use source::{SourceDescriptor, SourceKind, Waveform};
pub use stats::SimulationStats;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::accumulator::AudioAccumulator;
    pub use crate::error::{Result, SimError};
    pub use crate::field::FieldSnapshot;
    pub use crate::physics::SimulationConfig;
    pub use crate::runner::{Progress, RunOutcome, SimulationRunner};
    pub use crate::solver::WaveFieldSolver;
    pub use crate::source::{SourceDescriptor, SourceKind, Waveform};
    pub use crate::stats::SimulationStats;
}
