//! Simulation configuration and stability calculations.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, SimError};

/// Stability bound of the explicit five-point scheme in two dimensions:
/// c * dt / dx <= 1/sqrt(2).
pub const COURANT_LIMIT_2D: f32 = std::f32::consts::FRAC_1_SQRT_2;

/// Fraction of the stability bound used when a timestep has to be clamped.
const CLAMP_SAFETY: f32 = 0.9;

/// Parameters for the 2D acoustic wave simulation.
///
/// Uses the FDTD (Finite-Difference Time-Domain) method for solving
/// the 2D wave equation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Grid width in cells.
    pub width: usize,
    /// Grid height in cells.
    pub height: usize,
    /// Cell size (spatial step) in meters.
    pub cell_size: f32,
    /// Speed of sound in m/s.
    pub speed_of_sound: f32,
    /// Air density in kg/m³.
    pub air_density: f32,
    /// Time step in seconds.
    pub time_step: f32,
    /// Multiplier applied to every updated cell (1 = lossless).
    pub damping_factor: f32,
    /// Upper bound for the Courant number c * dt / dx.
    pub courant_limit: f32,
    /// Monitor cell for the microphone signal (grid centre when unset).
    pub microphone: Option<(usize, usize)>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 64,
            cell_size: 0.01,
            speed_of_sound: 343.0,
            air_density: 1.21,
            time_step: 1.0 / 88_200.0,
            damping_factor: 0.999,
            courant_limit: COURANT_LIMIT_2D,
            microphone: None,
        }
    }
}

impl SimulationConfig {
    /// Create a configuration for a `width` x `height` grid with default physics.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// A 4 m x 3 m room at 5 cm resolution.
    pub fn small_room() -> Self {
        let cell_size = 0.05;
        let speed_of_sound = 343.0;
        Self {
            width: 80,
            height: 60,
            cell_size,
            speed_of_sound,
            time_step: CLAMP_SAFETY * COURANT_LIMIT_2D * cell_size / speed_of_sound,
            damping_factor: 0.998,
            ..Self::default()
        }
    }

    /// Set the cell size in meters.
    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// Set the speed of sound in m/s.
    pub fn with_speed_of_sound(mut self, speed: f32) -> Self {
        self.speed_of_sound = speed;
        self
    }

    /// Set the air density in kg/m³.
    pub fn with_air_density(mut self, density: f32) -> Self {
        self.air_density = density;
        self
    }

    /// Set the time step in seconds.
    pub fn with_time_step(mut self, time_step: f32) -> Self {
        self.time_step = time_step;
        self
    }

    /// Set the damping factor, clamped to [0, 1].
    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping_factor = damping.clamp(0.0, 1.0);
        self
    }

    /// Set the microphone cell.
    pub fn with_microphone(mut self, x: usize, y: usize) -> Self {
        self.microphone = Some((x, y));
        self
    }

    /// Compute the Courant number (c * dt / dx).
    pub fn courant_number(&self) -> f32 {
        self.speed_of_sound * self.time_step / self.cell_size
    }

    /// Update coefficient (c * dt / dx)² applied to the Laplacian.
    pub fn coefficient(&self) -> f32 {
        self.courant_number().powi(2)
    }

    /// Check if the parameters satisfy the CFL stability condition.
    pub fn is_stable(&self) -> bool {
        self.courant_number() <= self.courant_limit + f32::EPSILON
    }

    /// Largest time step that satisfies the stability bound with a 10% margin.
    pub fn stable_time_step(&self) -> f32 {
        CLAMP_SAFETY * self.courant_limit * self.cell_size / self.speed_of_sound
    }

    /// Get the wavelength for a given frequency.
    pub fn wavelength(&self, frequency: f32) -> f32 {
        self.speed_of_sound / frequency
    }

    /// Get the number of cells per wavelength for a given frequency.
    pub fn cells_per_wavelength(&self, frequency: f32) -> f32 {
        self.wavelength(frequency) / self.cell_size
    }

    /// Microphone cell, defaulting to the grid centre and clamped into the grid.
    pub fn microphone_cell(&self) -> (usize, usize) {
        let (x, y) = self.microphone.unwrap_or((self.width / 2, self.height / 2));
        (
            x.min(self.width.saturating_sub(1)),
            y.min(self.height.saturating_sub(1)),
        )
    }

    /// Reject configurations that cannot be simulated at all.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SimError::invalid_config(format!(
                "grid must be at least 1x1, got {}x{}",
                self.width, self.height
            )));
        }

        let positive = |name: &str, value: f32| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(SimError::invalid_config(format!(
                    "{} must be positive and finite, got {}",
                    name, value
                )))
            }
        };
        positive("cell_size", self.cell_size)?;
        positive("speed_of_sound", self.speed_of_sound)?;
        positive("air_density", self.air_density)?;
        positive("time_step", self.time_step)?;

        let product = self.air_density * self.cell_size;
        if product == 0.0 || !product.is_finite() {
            return Err(SimError::invalid_config(format!(
                "air_density * cell_size must be nonzero, got {}",
                product
            )));
        }

        if !(self.courant_limit > 0.0 && self.courant_limit <= 1.0) {
            return Err(SimError::invalid_config(format!(
                "courant_limit must lie in (0, 1], got {}",
                self.courant_limit
            )));
        }

        if !self.damping_factor.is_finite() {
            return Err(SimError::invalid_config("damping_factor must be finite"));
        }

        Ok(())
    }

    /// Validate and return a configuration that satisfies the CFL condition.
    ///
    /// The second element is true when the time step had to be clamped.
    pub fn stabilized(mut self) -> Result<(Self, bool)> {
        self.validate()?;
        self.damping_factor = self.damping_factor.clamp(0.0, 1.0);

        if self.is_stable() {
            return Ok((self, false));
        }

        let requested = self.time_step;
        self.time_step = self.stable_time_step();
        warn!(
            "CFL condition violated (courant {:.3} > {:.3}); time step clamped {:.3e}s -> {:.3e}s",
            self.speed_of_sound * requested / self.cell_size,
            self.courant_limit,
            requested,
            self.time_step
        );
        Ok((self, true))
    }
}
