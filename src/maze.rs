use crate::geometry::Position;
use rand::Rng;
use std::time::{Duration, Instant};

/// Source of elapsed wall-clock time for the generation budget
pub trait Clock {
    fn elapsed(&self) -> Duration;
}

impl Clock for Instant {
    fn elapsed(&self) -> Duration {
        Instant::elapsed(self)
    }
}

/// Passable/blocked grid produced by backtracking DFS.
///
/// Cells are `cell_size` field units square. Besides the passable flags the
/// grid remembers which walls were carved away so renderers can draw the maze
/// and solid-wall movement can respect it.
#[derive(Debug, Clone)]
pub struct MazeGrid {
    cols: usize,
    rows: usize,
    cell_size: f32,
    passable: Vec<bool>,
    /// Wall between (c, r) and (c + 1, r) removed
    open_east: Vec<bool>,
    /// Wall between (c, r) and (c, r + 1) removed
    open_south: Vec<bool>,
    complete: bool,
}

impl MazeGrid {
    fn blank(cols: usize, rows: usize, cell_size: f32) -> Self {
        let count = cols * rows;
        Self {
            cols,
            rows,
            cell_size,
            passable: vec![false; count],
            open_east: vec![false; count],
            open_south: vec![false; count],
            complete: false,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Field width covered by the grid
    pub fn width(&self) -> f32 {
        self.cols as f32 * self.cell_size
    }

    pub fn height(&self) -> f32 {
        self.rows as f32 * self.cell_size
    }

    /// False when generation ran out of time before the spanning tree closed
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    fn idx(&self, col: usize, row: usize) -> usize {
        row * self.cols + col
    }

    pub fn is_passable(&self, col: usize, row: usize) -> bool {
        col < self.cols && row < self.rows && self.passable[self.idx(col, row)]
    }

    pub fn passable_count(&self) -> usize {
        self.passable.iter().filter(|p| **p).count()
    }

    /// Grid cell containing a field position, `None` outside the grid
    pub fn cell_at(&self, position: Position) -> Option<(usize, usize)> {
        if !position.is_finite() || position.x < 0.0 || position.y < 0.0 {
            return None;
        }
        let col = (position.x / self.cell_size).floor() as usize;
        let row = (position.y / self.cell_size).floor() as usize;
        (col < self.cols && row < self.rows).then_some((col, row))
    }

    pub fn is_passable_at(&self, position: Position) -> bool {
        self.cell_at(position)
            .is_some_and(|(col, row)| self.is_passable(col, row))
    }

    /// Whether a carved passage joins two orthogonally adjacent cells
    pub fn has_passage(&self, a: (usize, usize), b: (usize, usize)) -> bool {
        let ((c0, r0), (c1, r1)) = (a, b);
        if !self.is_passable(c0, r0) || !self.is_passable(c1, r1) {
            return false;
        }
        if r0 == r1 && c0.abs_diff(c1) == 1 {
            self.open_east[self.idx(c0.min(c1), r0)]
        } else if c0 == c1 && r0.abs_diff(r1) == 1 {
            self.open_south[self.idx(c0, r0.min(r1))]
        } else {
            false
        }
    }

    /// Whether a step between two cells is allowed when walls are solid.
    /// Diagonal corner cuts need one carved L-shaped route.
    pub fn can_cross(&self, from: (usize, usize), to: (usize, usize)) -> bool {
        if from == to {
            return self.is_passable(to.0, to.1);
        }
        let dc = from.0.abs_diff(to.0);
        let dr = from.1.abs_diff(to.1);
        match (dc, dr) {
            (1, 0) | (0, 1) => self.has_passage(from, to),
            (1, 1) => {
                let via_col = (to.0, from.1);
                let via_row = (from.0, to.1);
                (self.has_passage(from, via_col) && self.has_passage(via_col, to))
                    || (self.has_passage(from, via_row) && self.has_passage(via_row, to))
            }
            _ => false,
        }
    }

    /// Number of carved walls
    pub fn passage_count(&self) -> usize {
        self.open_east.iter().chain(self.open_south.iter()).filter(|o| **o).count()
    }

    /// Whether the field point lies on an uncarved wall line, for drawing
    pub fn wall_at(&self, position: Position) -> bool {
        let Some((col, row)) = self.cell_at(position) else {
            return false;
        };
        if !self.is_passable(col, row) {
            return true;
        }
        let local_x = position.x - col as f32 * self.cell_size;
        let local_y = position.y - row as f32 * self.cell_size;
        let west = local_x < 1.0 && (col == 0 || !self.has_passage((col - 1, row), (col, row)));
        let north = local_y < 1.0 && (row == 0 || !self.has_passage((col, row - 1), (col, row)));
        let east = local_x >= self.cell_size - 1.0 && col + 1 == self.cols;
        let south = local_y >= self.cell_size - 1.0 && row + 1 == self.rows;
        west || north || east || south
    }

    /// Hand-built grid: `open` cells passable, `passages` carved between pairs
    #[cfg(test)]
    pub(crate) fn with_cells(
        cols: usize,
        rows: usize,
        cell_size: f32,
        open: &[(usize, usize)],
        passages: &[((usize, usize), (usize, usize))],
    ) -> Self {
        let mut grid = Self::blank(cols, rows, cell_size);
        for &(col, row) in open {
            let i = grid.idx(col, row);
            grid.passable[i] = true;
        }
        for &(a, b) in passages {
            grid.carve(a, b);
        }
        grid.complete = true;
        grid
    }

    fn carve(&mut self, a: (usize, usize), b: (usize, usize)) {
        let ia = self.idx(a.0, a.1);
        let ib = self.idx(b.0, b.1);
        self.passable[ia] = true;
        self.passable[ib] = true;
        if a.1 == b.1 {
            let i = self.idx(a.0.min(b.0), a.1);
            self.open_east[i] = true;
        } else {
            let i = self.idx(a.0, a.1.min(b.1));
            self.open_south[i] = true;
        }
    }
}

/// Build a maze with the recursive backtracker, starting at cell (0, 0).
///
/// `time_budget = None` never times out. On timeout the partial grid is
/// returned with `is_complete() == false`; unreached cells stay blocked.
pub fn generate<R: Rng + ?Sized, C: Clock>(
    cols: usize,
    rows: usize,
    cell_size: f32,
    time_budget: Option<Duration>,
    rng: &mut R,
    clock: &C,
) -> MazeGrid {
    let mut grid = MazeGrid::blank(cols, rows, cell_size);
    if cols == 0 || rows == 0 {
        return grid;
    }

    let start = (0usize, 0usize);
    grid.passable[0] = true;
    let mut stack = vec![start];
    let mut current = start;
    let mut neighbors: Vec<(usize, usize)> = Vec::with_capacity(4);

    while !stack.is_empty() {
        if let Some(budget) = time_budget {
            if clock.elapsed() > budget {
                log::warn!(
                    "maze generation exceeded {:?}; using partial {}x{} grid ({} cells open)",
                    budget,
                    cols,
                    rows,
                    grid.passable_count()
                );
                return grid;
            }
        }

        let (x, y) = current;
        neighbors.clear();
        if x > 0 && !grid.is_passable(x - 1, y) {
            neighbors.push((x - 1, y));
        }
        if x + 1 < cols && !grid.is_passable(x + 1, y) {
            neighbors.push((x + 1, y));
        }
        if y > 0 && !grid.is_passable(x, y - 1) {
            neighbors.push((x, y - 1));
        }
        if y + 1 < rows && !grid.is_passable(x, y + 1) {
            neighbors.push((x, y + 1));
        }

        if neighbors.is_empty() {
            // Stack is non-empty here
            current = stack.pop().unwrap_or(start);
        } else {
            let next = neighbors[rng.gen_range(0..neighbors.len())];
            stack.push(current);
            grid.carve(current, next);
            current = next;
        }
    }

    grid.complete = true;
    log::debug!("generated {}x{} maze with {} passages", cols, rows, grid.passage_count());
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::Cell;
    use std::collections::VecDeque;

    /// Reports zero until `ticks_before_timeout` reads have happened
    struct ScriptedClock {
        reads: Cell<usize>,
        ticks_before_timeout: usize,
    }

    impl Clock for ScriptedClock {
        fn elapsed(&self) -> Duration {
            let n = self.reads.get();
            self.reads.set(n + 1);
            if n >= self.ticks_before_timeout {
                Duration::from_secs(3600)
            } else {
                Duration::ZERO
            }
        }
    }

    fn reachable_from_origin(grid: &MazeGrid) -> Vec<bool> {
        let mut seen = vec![false; grid.cols() * grid.rows()];
        let mut queue = VecDeque::new();
        if grid.is_passable(0, 0) {
            seen[0] = true;
            queue.push_back((0usize, 0usize));
        }
        while let Some((c, r)) = queue.pop_front() {
            let mut candidates = vec![(c + 1, r), (c, r + 1)];
            if c > 0 {
                candidates.push((c - 1, r));
            }
            if r > 0 {
                candidates.push((c, r - 1));
            }
            for (nc, nr) in candidates {
                if grid.has_passage((c, r), (nc, nr)) && !seen[nr * grid.cols() + nc] {
                    seen[nr * grid.cols() + nc] = true;
                    queue.push_back((nc, nr));
                }
            }
        }
        seen
    }

    #[test]
    fn test_full_maze_is_spanning_tree() {
        let mut rng = StdRng::seed_from_u64(7);
        let grid = generate(5, 5, 20.0, None, &mut rng, &Instant::now());

        assert!(grid.is_complete());
        assert_eq!(grid.passable_count(), 25);
        // A spanning tree over 25 cells has exactly 24 edges
        assert_eq!(grid.passage_count(), 24);

        let seen = reachable_from_origin(&grid);
        for row in 0..5 {
            for col in 0..5 {
                if grid.is_passable(col, row) {
                    assert!(seen[row * 5 + col], "cell ({col}, {row}) unreachable");
                }
            }
        }
    }

    #[test]
    fn test_single_cell_maze() {
        let mut rng = StdRng::seed_from_u64(1);
        let grid = generate(1, 1, 20.0, None, &mut rng, &Instant::now());
        assert!(grid.is_complete());
        assert!(grid.is_passable(0, 0));
        assert_eq!(grid.passable_count(), 1);
        assert_eq!(grid.passage_count(), 0);
    }

    #[test]
    fn test_timeout_returns_partial_grid() {
        let mut rng = StdRng::seed_from_u64(3);
        let clock = ScriptedClock {
            reads: Cell::new(0),
            ticks_before_timeout: 6,
        };
        let grid = generate(25, 25, 20.0, Some(Duration::from_millis(10)), &mut rng, &clock);

        assert!(!grid.is_complete());
        assert!(grid.is_passable(0, 0));
        assert!(grid.passable_count() < 25 * 25);
        assert!(grid.passable_count() <= 7);

        // What was carved is still connected to the start
        let seen = reachable_from_origin(&grid);
        for row in 0..25 {
            for col in 0..25 {
                if grid.is_passable(col, row) {
                    assert!(seen[row * 25 + col]);
                }
            }
        }
    }

    #[test]
    fn test_same_seed_same_maze() {
        let a = generate(8, 6, 10.0, None, &mut StdRng::seed_from_u64(42), &Instant::now());
        let b = generate(8, 6, 10.0, None, &mut StdRng::seed_from_u64(42), &Instant::now());
        for row in 0..6 {
            for col in 0..7 {
                assert_eq!(a.has_passage((col, row), (col + 1, row)), b.has_passage((col, row), (col + 1, row)));
            }
        }
    }

    #[test]
    fn test_cell_lookup_and_bounds() {
        let grid = generate(3, 2, 10.0, None, &mut StdRng::seed_from_u64(5), &Instant::now());
        assert_eq!(grid.width(), 30.0);
        assert_eq!(grid.height(), 20.0);
        assert_eq!(grid.cell_at(Position::new(25.0, 15.0)), Some((2, 1)));
        assert_eq!(grid.cell_at(Position::new(30.0, 5.0)), None);
        assert_eq!(grid.cell_at(Position::new(-0.1, 5.0)), None);
        assert!(!grid.is_passable_at(Position::new(-1.0, -1.0)));
    }

    #[test]
    fn test_crossing_needs_carved_passage() {
        let grid = generate(4, 4, 10.0, None, &mut StdRng::seed_from_u64(11), &Instant::now());
        for row in 0..4 {
            for col in 0..3 {
                let a = (col, row);
                let b = (col + 1, row);
                assert_eq!(grid.can_cross(a, b), grid.has_passage(a, b));
            }
        }
        assert!(!grid.can_cross((0, 0), (2, 0)));
    }

    #[test]
    fn test_outer_border_is_wall() {
        let grid = generate(3, 3, 10.0, None, &mut StdRng::seed_from_u64(2), &Instant::now());
        assert!(grid.wall_at(Position::new(0.5, 15.0)));
        assert!(grid.wall_at(Position::new(15.0, 0.5)));
        assert!(grid.wall_at(Position::new(29.5, 15.0)));
        assert!(!grid.wall_at(Position::new(15.0, 15.0)));
    }
}
