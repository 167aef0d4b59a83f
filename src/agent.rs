use crate::geometry::Position;
use crate::goals::GoalSet;
use crate::maze::MazeGrid;
use crate::settings::{BoundaryBehavior, SwarmSettings};
use crate::trail::TrailField;

/// Bias subtracted from the centre probe so ties keep the agent going straight
const CENTER_BIAS: f32 = 1.0;

/// Read-only surroundings an agent steers and moves against
#[derive(Debug, Clone, Copy)]
pub struct Terrain<'a> {
    pub width: f32,
    pub height: f32,
    pub boundary: BoundaryBehavior,
    pub maze: Option<&'a MazeGrid>,
    /// Walls between cells block movement, not only blocked cells
    pub solid_walls: bool,
    pub goals: &'a GoalSet,
}

impl Terrain<'_> {
    /// Apply the edge rule: clamp for bounded fields, wrap for toroidal ones
    pub fn settle(&self, position: Position) -> Position {
        match self.boundary {
            BoundaryBehavior::Clamp => position.clamped(self.width, self.height),
            BoundaryBehavior::Wrap => position.wrapped(self.width, self.height),
        }
    }

    /// Whether a unit move from `from` to `candidate` must be rejected.
    /// Only a maze rejects moves; open fields clamp or wrap instead.
    pub fn move_blocked(&self, from: Position, candidate: Position) -> bool {
        let Some(maze) = self.maze else {
            return false;
        };
        let Some(cell) = maze.cell_at(candidate) else {
            return true;
        };
        if !maze.is_passable(cell.0, cell.1) {
            return true;
        }
        if self.solid_walls {
            if let Some(prev) = maze.cell_at(from) {
                if prev != cell && !maze.can_cross(prev, cell) {
                    return true;
                }
            }
        }
        false
    }
}

/// Pick the turn for three probe readings.
///
/// Builds `(left, center - 1, right)` and takes the first minimum, so exact
/// ties go left before centre before right.
pub fn choose_turn(left: f32, center: f32, right: f32, turn_angle: f32) -> f32 {
    let readings = [left, center - CENTER_BIAS, right];
    let mut winner = 0;
    for (i, reading) in readings.iter().enumerate().skip(1) {
        if *reading < readings[winner] {
            winner = i;
        }
    }
    turn_angle * (winner as f32 - 1.0)
}

/// One steering agent
#[derive(Debug, Clone)]
pub struct Agent {
    position: Position,
    heading: f32,
    goal_reached: bool,
    /// Every position held so far, starting with the spawn point (maze variant)
    path: Option<Vec<Position>>,
}

impl Agent {
    pub fn new(start: Position, heading: f32, record_path: bool) -> Self {
        Self {
            position: start,
            heading,
            goal_reached: false,
            path: record_path.then(|| vec![start]),
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn heading(&self) -> f32 {
        self.heading
    }

    pub fn has_reached_goal(&self) -> bool {
        self.goal_reached
    }

    pub fn path(&self) -> Option<&[Position]> {
        self.path.as_deref()
    }

    /// Trail reading at one probe point, clamped or wrapped into the field
    fn probe(&self, angle_offset: f32, terrain: &Terrain, field: &TrailField, settings: &SwarmSettings) -> f32 {
        let target = self.position.offset(self.heading + angle_offset, settings.sensor_offset);
        field.sense(terrain.settle(target))
    }

    /// Update the heading. Returns true on the tick the goal is first detected.
    pub fn steer(&mut self, terrain: &Terrain, field: &TrailField, settings: &SwarmSettings) -> bool {
        if !self.goal_reached {
            if let Some(goal) = terrain.goals.detect(self.position) {
                self.goal_reached = true;
                self.heading = self.position.angle_to(goal);
                return true;
            }
        }

        let left = self.probe(-settings.sensor_angle, terrain, field, settings);
        let center = self.probe(0.0, terrain, field, settings);
        let right = self.probe(settings.sensor_angle, terrain, field, settings);
        self.heading += choose_turn(left, center, right, settings.turn_angle);
        false
    }

    /// Take one unit step, deposit, and record the new position
    pub fn advance(&mut self, terrain: &Terrain, field: &mut TrailField) {
        let candidate = self.position.offset(self.heading, 1.0);
        if !terrain.move_blocked(self.position, candidate) {
            self.position = candidate;
        }
        self.position = terrain.settle(self.position);

        field.deposit(self.position);
        if let Some(path) = self.path.as_mut() {
            path.push(self.position);
        }
    }

    /// Steer then move. Returns true on the tick the goal is first detected.
    pub fn tick(&mut self, terrain: &Terrain, field: &mut TrailField, settings: &SwarmSettings) -> bool {
        let reached = self.steer(terrain, field, settings);
        self.advance(terrain, field);
        reached
    }
}
