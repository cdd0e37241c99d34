//! Pressure and velocity storage for the wave-field solver.
//!
//! All grids use a flat row-major layout (`y * width + x`). The pressure
//! field is triple-buffered; rotation advances an index instead of moving
//! or aliasing buffers.

use serde::Serialize;

/// Owned copy of a 2D scalar grid, safe to hand to a renderer while the
/// solver keeps stepping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSnapshot {
    /// Grid width in cells.
    pub width: usize,
    /// Grid height in cells.
    pub height: usize,
    /// Row-major cell values.
    pub data: Vec<f32>,
}

impl FieldSnapshot {
    /// Value at `(x, y)`, or `None` outside the grid.
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x < self.width && y < self.height {
            self.data.get(y * self.width + x).copied()
        } else {
            None
        }
    }

    /// Largest absolute value in the grid.
    pub fn max_abs(&self) -> f32 {
        self.data.iter().map(|v| v.abs()).fold(0.0, f32::max)
    }

    /// The grid as a Vec of rows.
    pub fn rows(&self) -> Vec<Vec<f32>> {
        if self.width == 0 {
            return Vec::new();
        }
        self.data.chunks(self.width).map(<[f32]>::to_vec).collect()
    }
}

/// Previous / current / next pressure grids.
#[derive(Debug, Clone)]
pub struct PressureField {
    width: usize,
    height: usize,
    buffers: [Vec<f32>; 3],
    current: usize,
}

impl PressureField {
    /// Create a zeroed field.
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            buffers: [vec![0.0; size], vec![0.0; size], vec![0.0; size]],
            current: 0,
        }
    }

    /// Grid width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Current pressure values.
    #[inline]
    pub fn current(&self) -> &[f32] {
        &self.buffers[self.current]
    }

    /// Pressure values one step behind `current`.
    #[inline]
    pub fn previous(&self) -> &[f32] {
        &self.buffers[(self.current + 2) % 3]
    }

    /// Mutable access to the current grid (impulse injection).
    pub fn current_mut(&mut self) -> &mut [f32] {
        &mut self.buffers[self.current]
    }

    /// Borrow (previous, current, next) at once for an update pass.
    pub fn split(&mut self) -> (&[f32], &[f32], &mut [f32]) {
        let [a, b, c] = &mut self.buffers;
        match self.current {
            0 => (c.as_slice(), a.as_slice(), b.as_mut_slice()),
            1 => (a.as_slice(), b.as_slice(), c.as_mut_slice()),
            _ => (b.as_slice(), c.as_slice(), a.as_mut_slice()),
        }
    }

    /// previous <- current, current <- next.
    #[inline]
    pub fn rotate(&mut self) {
        self.current = (self.current + 1) % 3;
    }

    /// Zero all three grids.
    pub fn clear(&mut self) {
        for buffer in &mut self.buffers {
            buffer.fill(0.0);
        }
        self.current = 0;
    }
}

/// Particle velocity components derived from the pressure gradient.
#[derive(Debug, Clone)]
pub struct VelocityField {
    /// X component, row-major.
    pub vx: Vec<f32>,
    /// Y component, row-major.
    pub vy: Vec<f32>,
}

impl VelocityField {
    /// Create a zeroed field.
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            vx: vec![0.0; size],
            vy: vec![0.0; size],
        }
    }

    /// Recompute `v = -(1/rho) * grad(p) / dx` with forward differences.
    ///
    /// The last column has zero vx and the last row zero vy.
    pub fn update(&mut self, pressure: &[f32], width: usize, height: usize, scale: f32) {
        for y in 0..height {
            let row = y * width;
            for x in 0..width {
                let idx = row + x;
                let p = pressure[idx];
                self.vx[idx] = if x + 1 < width {
                    -scale * (pressure[idx + 1] - p)
                } else {
                    0.0
                };
                self.vy[idx] = if y + 1 < height {
                    -scale * (pressure[idx + width] - p)
                } else {
                    0.0
                };
            }
        }
    }

    /// Velocity magnitude per cell.
    pub fn magnitude(&self) -> Vec<f32> {
        self.vx
            .iter()
            .zip(&self.vy)
            .map(|(vx, vy)| (vx * vx + vy * vy).sqrt())
            .collect()
    }

    /// Zero both components.
    pub fn clear(&mut self) {
        self.vx.fill(0.0);
        self.vy.fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_moves_current_to_previous() {
        let mut field = PressureField::new(2, 2);
        field.current_mut()[0] = 1.0;
        {
            let (_, _, next) = field.split();
            next[0] = 2.0;
        }
        field.rotate();
        assert_eq!(field.previous()[0], 1.0);
        assert_eq!(field.current()[0], 2.0);
    }

    #[test]
    fn test_split_buffers_are_distinct() {
        let mut field = PressureField::new(3, 1);
        for _ in 0..3 {
            field.current_mut()[1] = 5.0;
            let (prev, cur, next) = field.split();
            next.fill(0.0);
            assert_eq!(cur[1], 5.0);
            assert_eq!(prev.len(), 3);
            field.rotate();
        }
    }

    #[test]
    fn test_clear() {
        let mut field = PressureField::new(2, 2);
        field.current_mut().fill(3.0);
        field.rotate();
        field.clear();
        assert!(field.current().iter().all(|&p| p == 0.0));
        assert!(field.previous().iter().all(|&p| p == 0.0));
    }

    #[test]
    fn test_velocity_forward_difference() {
        let mut velocity = VelocityField::new(2, 2);
        // p = [[0, 1], [2, 3]]
        let pressure = [0.0, 1.0, 2.0, 3.0];
        velocity.update(&pressure, 2, 2, 1.0);
        assert_eq!(velocity.vx, vec![-1.0, 0.0, -1.0, 0.0]);
        assert_eq!(velocity.vy, vec![-2.0, -2.0, 0.0, 0.0]);
    }

    #[test]
    fn test_snapshot_access() {
        let snapshot = FieldSnapshot {
            width: 2,
            height: 2,
            data: vec![0.5, -2.0, 0.0, 1.0],
        };
        assert_eq!(snapshot.get(1, 0), Some(-2.0));
        assert_eq!(snapshot.get(2, 0), None);
        assert_eq!(snapshot.max_abs(), 2.0);
        assert_eq!(snapshot.rows()[1], vec![0.0, 1.0]);
    }
}
