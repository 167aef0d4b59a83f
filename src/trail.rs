use crate::geometry::Position;

/// Intensity written by a fresh deposit
pub const HOT: f32 = 255.0;
/// Resting intensity of an unvisited cell
pub const BASELINE: f32 = 0.0;

/// Dense per-cell trail buffer that agents deposit onto and sense from.
///
/// Every value stays within `[BASELINE, HOT]`: deposits overwrite with `HOT`
/// and `decay` never goes below `BASELINE`.
#[derive(Debug, Clone)]
pub struct TrailField {
    width: usize,
    height: usize,
    cells: Vec<f32>,
    decay_step: f32,
}

impl TrailField {
    pub fn new(width: usize, height: usize, decay_step: f32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            cells: vec![BASELINE; width * height],
            decay_step: decay_step.max(0.0),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn set_decay_step(&mut self, step: f32) {
        self.decay_step = step.max(0.0);
    }

    /// Index of the cell nearest `position`, clamped to the buffer
    fn index(&self, position: Position) -> usize {
        let x = clamp_axis(position.x, self.width);
        let y = clamp_axis(position.y, self.height);
        y * self.width + x
    }

    /// Mark the cell under `position` as freshly visited
    pub fn deposit(&mut self, position: Position) {
        let idx = self.index(position);
        self.cells[idx] = HOT;
    }

    /// Trail intensity at the cell nearest `position`
    pub fn sense(&self, position: Position) -> f32 {
        self.cells[self.index(position)]
    }

    /// Intensity at an integer cell, `None` outside the buffer
    pub fn value_at(&self, x: usize, y: usize) -> Option<f32> {
        if x < self.width && y < self.height {
            Some(self.cells[y * self.width + x])
        } else {
            None
        }
    }

    /// Fade every warm cell one step toward baseline (once per render frame)
    pub fn decay(&mut self) {
        let step = self.decay_step;
        for value in self.cells.iter_mut().filter(|v| **v > BASELINE) {
            *value = (*value - step).max(BASELINE);
        }
    }

    /// Number of cells above baseline
    pub fn warm_cells(&self) -> usize {
        self.cells.iter().filter(|v| **v > BASELINE).count()
    }
}

fn clamp_axis(coord: f32, dimension: usize) -> usize {
    // NaN maps to 0 through the saturating float->int cast
    let floored = coord.floor();
    if floored <= 0.0 {
        0
    } else {
        (floored as usize).min(dimension - 1)
    }
}
