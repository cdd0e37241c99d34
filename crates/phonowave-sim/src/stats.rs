//! Per-step summary of the simulated field.

use serde::Serialize;

/// Field statistics, recomputed from the grids after every step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SimulationStats {
    /// Largest absolute pressure in the grid.
    pub max_pressure: f32,
    /// Σ(p² + ½·ρ·|v|²) over all cells.
    pub energy_content: f32,
    /// Simulation time after the last step (seconds).
    pub elapsed_time: f64,
    /// Number of steps taken since construction or reset.
    pub step_count: u64,
}

impl SimulationStats {
    /// Scan the grids and build fresh statistics.
    pub fn compute(
        pressure: &[f32],
        vx: &[f32],
        vy: &[f32],
        air_density: f32,
        elapsed_time: f64,
        step_count: u64,
    ) -> Self {
        let half_rho = 0.5 * air_density as f64;
        let mut max_pressure = 0.0f32;
        let mut energy = 0.0f64;

        for ((&p, &u), &v) in pressure.iter().zip(vx).zip(vy) {
            max_pressure = max_pressure.max(p.abs());
            let (p, u, v) = (p as f64, u as f64, v as f64);
            energy += p * p + half_rho * (u * u + v * v);
        }

        Self {
            max_pressure,
            energy_content: energy as f32,
            elapsed_time,
            step_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute() {
        let stats = SimulationStats::compute(&[1.0, -3.0], &[2.0, 0.0], &[0.0, 0.0], 1.0, 0.5, 7);
        assert_eq!(stats.max_pressure, 3.0);
        // 1 + 9 + 0.5 * 4
        assert!((stats.energy_content - 12.0).abs() < 1e-6);
        assert_eq!(stats.elapsed_time, 0.5);
        assert_eq!(stats.step_count, 7);
    }

    #[test]
    fn test_empty_field() {
        let stats = SimulationStats::compute(&[0.0; 4], &[0.0; 4], &[0.0; 4], 1.21, 0.0, 0);
        assert_eq!(stats, SimulationStats::default());
    }
}
