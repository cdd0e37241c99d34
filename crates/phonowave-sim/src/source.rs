//! Excitation sources for the wave-field solver.
//!
//! Supports three source geometries:
//! - Point (single cell, selectable waveform)
//! - Line (Bresenham-rasterized string of cells)
//! - Membrane (disc with a cosine taper towards the rim)
//!
//! Coordinates are signed so that sources may lie partly or fully outside the
//! grid; cells that fall outside are skipped when splatting.

use std::f32::consts::{FRAC_2_PI, PI, TAU};

use serde::{Deserialize, Serialize};

/// Periodic waveform of a point source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    /// Pure sinusoid.
    #[default]
    Sine,
    /// Sign of the sinusoid.
    Square,
    /// Symmetric triangle.
    Triangle,
    /// Rising ramp.
    Sawtooth,
}

impl Waveform {
    /// Evaluate the waveform at `phase` radians. Every shape is 0 at phase 0
    /// and spans [-1, 1].
    pub fn sample(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => phase.sin(),
            Waveform::Square => {
                let s = phase.sin();
                if s > 0.0 {
                    1.0
                } else if s < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            }
            Waveform::Triangle => FRAC_2_PI * phase.sin().asin(),
            Waveform::Sawtooth => {
                let cycle = (phase / TAU + 0.5).rem_euclid(1.0);
                2.0 * cycle - 1.0
            }
        }
    }
}

impl std::fmt::Display for Waveform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Waveform::Sine => write!(f, "sine"),
            Waveform::Square => write!(f, "square"),
            Waveform::Triangle => write!(f, "triangle"),
            Waveform::Sawtooth => write!(f, "sawtooth"),
        }
    }
}

/// Source geometry and signal parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceKind {
    /// Single-cell source.
    Point {
        /// Column.
        x: i32,
        /// Row.
        y: i32,
        /// Frequency in Hz.
        frequency: f32,
        /// Peak pressure added per step.
        amplitude: f32,
        /// Signal shape.
        #[serde(default)]
        waveform: Waveform,
    },
    /// Vibrating string between two cells.
    Line {
        /// Start column.
        x0: i32,
        /// Start row.
        y0: i32,
        /// End column.
        x1: i32,
        /// End row.
        y1: i32,
        /// Frequency in Hz.
        frequency: f32,
        /// Peak pressure added per cell and step.
        amplitude: f32,
    },
    /// Circular membrane centred on a cell.
    Membrane {
        /// Centre column.
        cx: i32,
        /// Centre row.
        cy: i32,
        /// Radius in cells.
        radius: f32,
        /// Frequency in Hz.
        frequency: f32,
        /// Peak pressure at the centre.
        amplitude: f32,
    },
}

/// A registered excitation source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Identifier assigned by the solver on registration.
    #[serde(skip)]
    pub id: u32,
    /// Geometry and signal.
    #[serde(flatten)]
    pub kind: SourceKind,
    /// Simulation time at which the source switches on (seconds).
    #[serde(default)]
    pub start_time: f64,
    /// How long the source stays on; `None` runs forever.
    #[serde(default)]
    pub duration: Option<f64>,
    /// Phase offset in radians.
    #[serde(default)]
    pub phase: f32,
}

impl SourceDescriptor {
    fn from_kind(kind: SourceKind) -> Self {
        Self {
            id: 0,
            kind,
            start_time: 0.0,
            duration: None,
            phase: 0.0,
        }
    }

    /// Create a sine point source.
    pub fn point(x: i32, y: i32, frequency: f32, amplitude: f32) -> Self {
        Self::from_kind(SourceKind::Point {
            x,
            y,
            frequency,
            amplitude,
            waveform: Waveform::Sine,
        })
    }

    /// Create a line (string) source from `(x0, y0)` to `(x1, y1)`.
    pub fn line(x0: i32, y0: i32, x1: i32, y1: i32, frequency: f32, amplitude: f32) -> Self {
        Self::from_kind(SourceKind::Line {
            x0,
            y0,
            x1,
            y1,
            frequency,
            amplitude,
        })
    }

    /// Create a membrane source of `radius` cells.
    pub fn membrane(cx: i32, cy: i32, radius: f32, frequency: f32, amplitude: f32) -> Self {
        Self::from_kind(SourceKind::Membrane {
            cx,
            cy,
            radius,
            frequency,
            amplitude,
        })
    }

    /// Set the waveform. Only point sources carry one; others are unchanged.
    pub fn with_waveform(mut self, shape: Waveform) -> Self {
        if let SourceKind::Point { waveform, .. } = &mut self.kind {
            *waveform = shape;
        }
        self
    }

    /// Switch the source on at `start_time` seconds.
    pub fn starting_at(mut self, start_time: f64) -> Self {
        self.start_time = start_time;
        self
    }

    /// Limit the source to `duration` seconds after its start.
    pub fn lasting(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Set the phase offset in radians.
    pub fn with_phase(mut self, phase: f32) -> Self {
        self.phase = phase;
        self
    }

    /// Source frequency in Hz.
    pub fn frequency(&self) -> f32 {
        match self.kind {
            SourceKind::Point { frequency, .. }
            | SourceKind::Line { frequency, .. }
            | SourceKind::Membrane { frequency, .. } => frequency,
        }
    }

    /// Peak amplitude.
    pub fn amplitude(&self) -> f32 {
        match self.kind {
            SourceKind::Point { amplitude, .. }
            | SourceKind::Line { amplitude, .. }
            | SourceKind::Membrane { amplitude, .. } => amplitude,
        }
    }

    /// Whether `time` falls inside `[start_time, start_time + duration)`.
    pub fn is_active(&self, time: f64) -> bool {
        if time < self.start_time {
            return false;
        }
        match self.duration {
            Some(duration) => time < self.start_time + duration,
            None => true,
        }
    }

    /// Signal value at `time`: `amplitude * wave(2π * frequency * time + phase)`.
    pub fn value_at(&self, time: f64) -> f32 {
        let phase = (std::f64::consts::TAU * self.frequency() as f64 * time) as f32 + self.phase;
        let waveform = match self.kind {
            SourceKind::Point { waveform, .. } => waveform,
            _ => Waveform::Sine,
        };
        self.amplitude() * waveform.sample(phase)
    }

    /// Add `value` onto every in-grid cell covered by this source.
    ///
    /// Only the part of the geometry overlapping the grid is visited, so the
    /// cost is bounded by the grid size however far a source reaches.
    pub fn splat(&self, value: f32, grid: &mut [f32], width: usize, height: usize) {
        let mut add = |x: i64, y: i64, weight: f32| {
            if x >= 0 && y >= 0 && (x as u64) < width as u64 && (y as u64) < height as u64 {
                grid[y as usize * width + x as usize] += value * weight;
            }
        };

        match self.kind {
            SourceKind::Point { x, y, .. } => add(x as i64, y as i64, 1.0),
            SourceKind::Line { x0, y0, x1, y1, .. } => {
                let clipped = clip_line(x0 as i64, y0 as i64, x1 as i64, y1 as i64, width, height);
                if let Some((x0, y0, x1, y1)) = clipped {
                    for_each_line_cell(x0, y0, x1, y1, |x, y| add(x, y, 1.0));
                }
            }
            SourceKind::Membrane { cx, cy, radius, .. } => {
                let (cx, cy) = (cx as i64, cy as i64);
                if !(radius > 0.0 && radius.is_finite()) {
                    add(cx, cy, 1.0);
                    return;
                }
                if width == 0 || height == 0 {
                    return;
                }
                let reach = radius.ceil() as i64;
                let x_lo = cx.saturating_sub(reach).max(0);
                let x_hi = cx.saturating_add(reach).min(width as i64 - 1);
                let y_lo = cy.saturating_sub(reach).max(0);
                let y_hi = cy.saturating_add(reach).min(height as i64 - 1);

                for y in y_lo..=y_hi {
                    for x in x_lo..=x_hi {
                        let (dx, dy) = ((x - cx) as f64, (y - cy) as f64);
                        let distance = (dx * dx + dy * dy).sqrt() as f32;
                        if distance <= radius {
                            let weight = (PI * distance / (2.0 * radius)).cos();
                            add(x, y, weight);
                        }
                    }
                }
            }
        }
    }
}

/// Clip the segment `(x0, y0)`-`(x1, y1)` to the cell rectangle of a
/// `width`×`height` grid (Liang-Barsky).
///
/// Returns `None` when the segment misses the grid. Endpoints already inside
/// the grid are returned unchanged; clipped endpoints are rounded to the
/// nearest cell.
pub fn clip_line(
    x0: i64,
    y0: i64,
    x1: i64,
    y1: i64,
    width: usize,
    height: usize,
) -> Option<(i64, i64, i64, i64)> {
    if width == 0 || height == 0 {
        return None;
    }
    let (x_max, y_max) = ((width - 1) as f64, (height - 1) as f64);
    let (fx, fy) = (x0 as f64, y0 as f64);
    let (dx, dy) = ((x1 - x0) as f64, (y1 - y0) as f64);

    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;
    for (p, q) in [(-dx, fx), (dx, x_max - fx), (-dy, fy), (dy, y_max - fy)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let at = |t: f64| {
        (
            (fx + t * dx).round().clamp(0.0, x_max) as i64,
            (fy + t * dy).round().clamp(0.0, y_max) as i64,
        )
    };
    let (cx0, cy0) = at(t0);
    let (cx1, cy1) = at(t1);
    Some((cx0, cy0, cx1, cy1))
}

/// Visit every cell on the Bresenham line from `(x0, y0)` to `(x1, y1)`,
/// endpoints included.
///
/// Visits `max(|dx|, |dy|) + 1` cells; clip with [`clip_line`] first when the
/// endpoints may be far off the grid.
pub fn for_each_line_cell(x0: i64, y0: i64, x1: i64, y1: i64, mut visit: impl FnMut(i64, i64)) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);

    loop {
        visit(x, y);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}
