use serde::{Deserialize, Serialize};

/// Continuous coordinate in field space (one unit = one trail cell)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// Integer cell a position falls into (floored, not rounded)
pub type CellKey = (i64, i64);

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn cell_key(&self) -> CellKey {
        (self.x.floor() as i64, self.y.floor() as i64)
    }

    pub fn distance(&self, other: Position) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Angle in radians pointing from `self` toward `other`
    pub fn angle_to(&self, other: Position) -> f32 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// Step `distance` units along `angle`
    pub fn offset(&self, angle: f32, distance: f32) -> Position {
        Position::new(self.x + distance * angle.cos(), self.y + distance * angle.sin())
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn within(&self, width: f32, height: f32) -> bool {
        self.x >= 0.0 && self.x < width && self.y >= 0.0 && self.y < height
    }

    /// Clamp into `[0, width - 1] x [0, height - 1]`
    pub fn clamped(&self, width: f32, height: f32) -> Position {
        Position::new(
            self.x.clamp(0.0, (width - 1.0).max(0.0)),
            self.y.clamp(0.0, (height - 1.0).max(0.0)),
        )
    }

    /// Toroidal wrap into `[0, width) x [0, height)`
    pub fn wrapped(&self, width: f32, height: f32) -> Position {
        Position::new(wrap_coord(self.x, width), wrap_coord(self.y, height))
    }
}

fn wrap_coord(value: f32, dimension: f32) -> f32 {
    let wrapped = value.rem_euclid(dimension);
    // rem_euclid can round up to exactly `dimension` for tiny negative inputs
    if wrapped >= dimension {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_key_floors() {
        assert_eq!(Position::new(2.9, 3.1).cell_key(), (2, 3));
        assert_eq!(Position::new(-0.5, 0.0).cell_key(), (-1, 0));
    }

    #[test]
    fn test_wrap_stays_in_range() {
        let p = Position::new(-1.0, 501.5).wrapped(500.0, 500.0);
        assert_eq!(p, Position::new(499.0, 1.5));

        let tiny = Position::new(-1e-9, 0.0).wrapped(500.0, 500.0);
        assert!(tiny.x >= 0.0 && tiny.x < 500.0);
    }

    #[test]
    fn test_clamp_keeps_last_cell() {
        let p = Position::new(1e9, -3.0).clamped(100.0, 50.0);
        assert_eq!(p, Position::new(99.0, 0.0));
    }
}
