//! Explicit FDTD solver for the 2D acoustic wave equation.
//!
//! Each step evaluates the active sources, advances the pressure field with
//! the five-point Laplacian, rotates the triple buffer, derives the particle
//! velocity and rescans the grid for statistics.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::Result;
use crate::field::{FieldSnapshot, PressureField, VelocityField};
use crate::physics::SimulationConfig;
use crate::source::SourceDescriptor;
use crate::stats::SimulationStats;

/// Grids with at least this many rows or columns update rows in parallel.
const PARALLEL_THRESHOLD: usize = 256;

/// The 2D wave-field solver.
///
/// Owns every grid it touches. Stepping mutates in place, so a reader that
/// needs a stable view while stepping continues must take a snapshot.
pub struct WaveFieldSolver {
    config: SimulationConfig,
    cfl_clamped: bool,
    pressure: PressureField,
    velocity: VelocityField,
    source_grid: Vec<f32>,
    sources: Vec<SourceDescriptor>,
    next_source_id: u32,
    microphone: (usize, usize),
    time: f64,
    stats: SimulationStats,
}

impl WaveFieldSolver {
    /// Create a solver, clamping the time step if it violates the CFL bound.
    ///
    /// Fails only for configurations that cannot be simulated at all
    /// (empty grid, non-positive physical constants).
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let (config, cfl_clamped) = config.stabilized()?;
        let (width, height) = (config.width, config.height);

        info!(
            "Wave-field solver: {}x{} cells, dx={}m, dt={:.3e}s, courant={:.3}",
            width,
            height,
            config.cell_size,
            config.time_step,
            config.courant_number()
        );

        Ok(Self {
            microphone: config.microphone_cell(),
            config,
            cfl_clamped,
            pressure: PressureField::new(width, height),
            velocity: VelocityField::new(width, height),
            source_grid: vec![0.0; width * height],
            sources: Vec::new(),
            next_source_id: 0,
            time: 0.0,
            stats: SimulationStats::default(),
        })
    }

    /// Effective configuration (after any time-step clamp).
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// True when construction had to clamp the requested time step.
    pub fn cfl_clamped(&self) -> bool {
        self.cfl_clamped
    }

    /// Grid width.
    pub fn width(&self) -> usize {
        self.config.width
    }

    /// Grid height.
    pub fn height(&self) -> usize {
        self.config.height
    }

    /// Simulation time that the next `advance` will evaluate sources at.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Statistics from the most recent step.
    pub fn stats(&self) -> SimulationStats {
        self.stats
    }

    /// Register a source and return its id.
    pub fn add_source(&mut self, mut source: SourceDescriptor) -> u32 {
        source.id = self.next_source_id;
        self.next_source_id += 1;
        debug!("Added source {}: {:?}", source.id, source.kind);
        let id = source.id;
        self.sources.push(source);
        id
    }

    /// Register a vibrating string from `(x0, y0)` to `(x1, y1)`.
    pub fn add_string_source(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        frequency: f32,
        amplitude: f32,
    ) -> u32 {
        self.add_source(SourceDescriptor::line(x0, y0, x1, y1, frequency, amplitude))
    }

    /// Register a circular membrane.
    pub fn add_membrane_source(
        &mut self,
        cx: i32,
        cy: i32,
        radius: f32,
        frequency: f32,
        amplitude: f32,
    ) -> u32 {
        self.add_source(SourceDescriptor::membrane(cx, cy, radius, frequency, amplitude))
    }

    /// Remove a source by id.
    pub fn remove_source(&mut self, id: u32) -> bool {
        if let Some(pos) = self.sources.iter().position(|s| s.id == id) {
            self.sources.remove(pos);
            true
        } else {
            false
        }
    }

    /// Registered sources.
    pub fn sources(&self) -> &[SourceDescriptor] {
        &self.sources
    }

    /// Add `amplitude` to the current pressure at `(x, y)`. Out-of-grid is ignored.
    pub fn inject_impulse(&mut self, x: usize, y: usize, amplitude: f32) {
        if x < self.config.width && y < self.config.height {
            let idx = y * self.config.width + x;
            self.pressure.current_mut()[idx] += amplitude;
        }
    }

    /// Move the microphone, clamping into the grid.
    pub fn set_microphone(&mut self, x: usize, y: usize) {
        self.microphone = (
            x.min(self.config.width - 1),
            y.min(self.config.height - 1),
        );
    }

    /// Microphone cell.
    pub fn microphone(&self) -> (usize, usize) {
        self.microphone
    }

    /// Current pressure at the microphone cell.
    pub fn microphone_signal(&self) -> f32 {
        let (x, y) = self.microphone;
        self.pressure.current()[y * self.config.width + x]
    }

    /// Advance one step with sources evaluated at the solver's own clock.
    pub fn advance(&mut self) -> SimulationStats {
        self.step(self.time)
    }

    /// Advance the field by one time step with sources evaluated at `time`.
    ///
    /// Afterwards the solver clock reads `time + dt`.
    pub fn step(&mut self, time: f64) -> SimulationStats {
        let width = self.config.width;
        let height = self.config.height;

        self.source_grid.fill(0.0);
        for source in self.sources.iter().filter(|s| s.is_active(time)) {
            let value = source.value_at(time);
            source.splat(value, &mut self.source_grid, width, height);
        }

        let coeff = self.config.coefficient();
        let damping = self.config.damping_factor;
        let (previous, current, next) = self.pressure.split();
        let update = FdtdUpdate {
            previous,
            current,
            source: &self.source_grid,
            width,
            height,
            coeff,
            damping,
        };

        if width >= PARALLEL_THRESHOLD || height >= PARALLEL_THRESHOLD {
            next.par_chunks_mut(width)
                .enumerate()
                .for_each(|(y, row)| update.row(y, row));
        } else {
            for (y, row) in next.chunks_mut(width).enumerate() {
                update.row(y, row);
            }
        }

        self.pressure.rotate();

        let scale = 1.0 / (self.config.air_density * self.config.cell_size);
        self.velocity
            .update(self.pressure.current(), width, height, scale);

        self.time = time + self.config.time_step as f64;
        self.stats = SimulationStats::compute(
            self.pressure.current(),
            &self.velocity.vx,
            &self.velocity.vy,
            self.config.air_density,
            self.time,
            self.stats.step_count + 1,
        );
        self.stats
    }

    /// Zero all grids, drop all sources and rewind the clock.
    pub fn reset(&mut self) {
        self.clear_field();
        self.sources.clear();
    }

    /// Zero all grids and rewind the clock, keeping registered sources.
    pub fn clear_field(&mut self) {
        self.pressure.clear();
        self.velocity.clear();
        self.source_grid.fill(0.0);
        self.time = 0.0;
        self.stats = SimulationStats::default();
    }

    /// Pressure at `(x, y)`, or `None` outside the grid.
    pub fn pressure_at(&self, x: usize, y: usize) -> Option<f32> {
        if x < self.config.width && y < self.config.height {
            Some(self.pressure.current()[y * self.config.width + x])
        } else {
            None
        }
    }

    /// Current pressure grid as a flat slice (row-major order).
    #[inline]
    pub fn pressure(&self) -> &[f32] {
        self.pressure.current()
    }

    /// X velocity grid (row-major order).
    pub fn velocity_x(&self) -> &[f32] {
        &self.velocity.vx
    }

    /// Y velocity grid (row-major order).
    pub fn velocity_y(&self) -> &[f32] {
        &self.velocity.vy
    }

    /// Owned copy of the pressure grid.
    pub fn pressure_snapshot(&self) -> FieldSnapshot {
        FieldSnapshot {
            width: self.config.width,
            height: self.config.height,
            data: self.pressure.current().to_vec(),
        }
    }

    /// Owned copy of the velocity magnitude grid.
    pub fn velocity_magnitude_snapshot(&self) -> FieldSnapshot {
        FieldSnapshot {
            width: self.config.width,
            height: self.config.height,
            data: self.velocity.magnitude(),
        }
    }
}

/// Read-only inputs of one FDTD pass, shared by all row workers.
struct FdtdUpdate<'a> {
    previous: &'a [f32],
    current: &'a [f32],
    source: &'a [f32],
    width: usize,
    height: usize,
    coeff: f32,
    damping: f32,
}

impl FdtdUpdate<'_> {
    /// p[n+1] = (2*p[n] - p[n-1] + c²*(p_N + p_S + p_E + p_W - 4*p) + s) * damping,
    /// with out-of-grid neighbours read as zero.
    #[inline]
    fn row(&self, y: usize, next_row: &mut [f32]) {
        let width = self.width;
        let row_start = y * width;
        let p = self.current;

        for (x, out) in next_row.iter_mut().enumerate() {
            let idx = row_start + x;
            let p_curr = p[idx];
            let p_north = if y > 0 { p[idx - width] } else { 0.0 };
            let p_south = if y + 1 < self.height { p[idx + width] } else { 0.0 };
            let p_west = if x > 0 { p[idx - 1] } else { 0.0 };
            let p_east = if x + 1 < width { p[idx + 1] } else { 0.0 };

            let laplacian = p_north + p_south + p_east + p_west - 4.0 * p_curr;
            let p_new = 2.0 * p_curr - self.previous[idx] + self.coeff * laplacian + self.source[idx];
            *out = p_new * self.damping;
        }
    }
}
