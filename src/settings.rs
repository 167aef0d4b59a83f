use crate::error::{Result, SimError};
use crate::geometry::Position;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Which of the two simulation layouts is running
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Variant {
    /// Random maze, bounded field, path histories and route extraction
    #[default]
    Maze,
    /// Free goal placement on a toroidal field
    OpenField,
}

impl Variant {
    pub fn name(&self) -> &str {
        match self {
            Variant::Maze => "Maze",
            Variant::OpenField => "Open Field",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Variant::Maze => Variant::OpenField,
            Variant::OpenField => Variant::Maze,
        }
    }

    /// Default edge handling for the layout
    pub fn boundary(&self) -> BoundaryBehavior {
        match self {
            Variant::Maze => BoundaryBehavior::Clamp,
            Variant::OpenField => BoundaryBehavior::Wrap,
        }
    }

    /// Whether agents keep their full position history
    pub fn records_paths(&self) -> bool {
        matches!(self, Variant::Maze)
    }
}

/// Boundary behavior - what happens when agents reach the field edge
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum BoundaryBehavior {
    /// Stop at edge
    #[default]
    Clamp,
    /// Wrap to opposite side (toroidal)
    Wrap,
}

impl BoundaryBehavior {
    pub fn name(&self) -> &str {
        match self {
            BoundaryBehavior::Clamp => "Clamp",
            BoundaryBehavior::Wrap => "Wrap",
        }
    }
}

/// Steering constants shared by every agent in a swarm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwarmSettings {
    /// Number of agents (fixed for a run)
    pub agent_count: usize,
    /// Distance ahead of the agent where probes sample the trail
    pub sensor_offset: f32,
    /// Half-spread between the centre probe and the side probes (radians)
    pub sensor_angle: f32,
    /// Heading change applied when a side probe wins (radians)
    pub turn_angle: f32,
    /// Goal-seek trigger radius
    pub food_detection_range: f32,
    /// Goal-reached fraction that stops the run
    pub agents_reached_threshold: f32,
}

impl Default for SwarmSettings {
    fn default() -> Self {
        Self {
            agent_count: 2500,
            sensor_offset: 15.0,
            sensor_angle: PI / 7.0,
            turn_angle: PI / 5.0,
            food_detection_range: 10.0,
            agents_reached_threshold: 0.0001,
        }
    }
}

impl SwarmSettings {
    pub fn adjust_agent_count(&mut self, delta: i32) {
        self.agent_count = (self.agent_count as i64 + delta as i64).clamp(1, 20_000) as usize;
    }

    pub fn adjust_sensor_offset(&mut self, delta: f32) {
        self.sensor_offset = (self.sensor_offset + delta).clamp(1.0, 60.0);
    }

    /// Adjust in degrees, stored in radians
    pub fn adjust_sensor_angle(&mut self, delta_degrees: f32) {
        let degrees = (self.sensor_angle.to_degrees() + delta_degrees).clamp(1.0, 90.0);
        self.sensor_angle = degrees.to_radians();
    }

    pub fn adjust_turn_angle(&mut self, delta_degrees: f32) {
        let degrees = (self.turn_angle.to_degrees() + delta_degrees).clamp(1.0, 90.0);
        self.turn_angle = degrees.to_radians();
    }

    pub fn adjust_food_detection_range(&mut self, delta: f32) {
        self.food_detection_range = (self.food_detection_range + delta).clamp(1.0, 200.0);
    }

    pub fn adjust_agents_reached_threshold(&mut self, delta: f32) {
        self.agents_reached_threshold = (self.agents_reached_threshold + delta).clamp(0.0001, 1.0);
    }

    pub fn validate(&self) -> Result<()> {
        if self.agent_count == 0 {
            return Err(invalid("agent count must be at least 1"));
        }
        if !(self.sensor_offset.is_finite() && self.sensor_offset > 0.0) {
            return Err(invalid(format!("sensor offset must be positive, got {}", self.sensor_offset)));
        }
        if !self.sensor_angle.is_finite() || !self.turn_angle.is_finite() {
            return Err(invalid("sensor and turn angles must be finite"));
        }
        if !(self.food_detection_range.is_finite() && self.food_detection_range > 0.0) {
            return Err(invalid(format!(
                "food detection range must be positive, got {}",
                self.food_detection_range
            )));
        }
        let t = self.agents_reached_threshold;
        if !(t > 0.0 && t <= 1.0) {
            return Err(invalid(format!("agents reached threshold must be in (0, 1], got {t}")));
        }
        Ok(())
    }
}

/// Maze grid parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MazeSettings {
    pub cols: usize,
    pub rows: usize,
    /// Field units per maze cell
    pub cell_size: usize,
    /// Generation budget in milliseconds, `None` = unbounded
    pub time_budget_ms: Option<u64>,
    /// Reject moves through uncarved walls, not only into blocked cells
    pub solid_walls: bool,
}

impl Default for MazeSettings {
    fn default() -> Self {
        Self {
            cols: 25,
            rows: 25,
            cell_size: 20,
            time_budget_ms: Some(10_000),
            solid_walls: false,
        }
    }
}

impl MazeSettings {
    pub fn field_size(&self) -> (usize, usize) {
        (self.cols * self.cell_size, self.rows * self.cell_size)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cols == 0 || self.rows == 0 {
            return Err(invalid(format!(
                "maze needs at least one column and row, got {}x{}",
                self.cols, self.rows
            )));
        }
        if self.cell_size == 0 {
            return Err(invalid("maze cell size must be at least 1"));
        }
        Ok(())
    }
}

/// Everything needed to build a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    pub variant: Variant,
    pub swarm: SwarmSettings,
    pub maze: MazeSettings,
    /// Field size for the open-field variant (the maze variant derives it)
    pub field_width: usize,
    pub field_height: usize,
    /// Start position, `None` = variant default
    pub start: Option<Position>,
    /// Goal points, empty = variant default
    pub goals: Vec<Position>,
    /// Trail intensity removed per render frame
    pub trail_decay_step: f32,
    /// RNG seed, `None` = entropy
    pub seed: Option<u64>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            variant: Variant::Maze,
            swarm: SwarmSettings::default(),
            maze: MazeSettings::default(),
            field_width: 720,
            field_height: 720,
            start: None,
            goals: Vec::new(),
            trail_decay_step: 5.0,
            seed: None,
        }
    }
}

impl SimulationSettings {
    /// Field dimensions in trail cells
    pub fn field_size(&self) -> (usize, usize) {
        match self.variant {
            Variant::Maze => self.maze.field_size(),
            Variant::OpenField => (self.field_width, self.field_height),
        }
    }

    pub fn boundary(&self) -> BoundaryBehavior {
        self.variant.boundary()
    }

    /// Start position, falling back to the layout's conventional spot
    pub fn resolved_start(&self) -> Position {
        self.start.unwrap_or_else(|| match self.variant {
            // Centre of the first maze cell
            Variant::Maze => {
                let half = self.maze.cell_size as f32 / 2.0;
                Position::new(half, half)
            }
            Variant::OpenField => {
                let (w, h) = self.field_size();
                Position::new(w as f32 / 2.0, h as f32 / 2.0)
            }
        })
    }

    /// Goal points, falling back to three quarters across the field
    pub fn resolved_goals(&self) -> Vec<Position> {
        if !self.goals.is_empty() {
            return self.goals.clone();
        }
        let (w, h) = self.field_size();
        vec![Position::new(0.75 * w as f32, 0.75 * h as f32)]
    }

    pub fn adjust_trail_decay_step(&mut self, delta: f32) {
        self.trail_decay_step = (self.trail_decay_step + delta).clamp(0.0, 255.0);
    }

    pub fn validate(&self) -> Result<()> {
        self.swarm.validate()?;
        if self.variant == Variant::Maze {
            self.maze.validate()?;
        }
        let (w, h) = self.field_size();
        if w == 0 || h == 0 {
            return Err(invalid(format!("field must be non-empty, got {w}x{h}")));
        }
        let start = self.resolved_start();
        if !start.is_finite() || !start.within(w as f32, h as f32) {
            return Err(invalid(format!(
                "start ({}, {}) lies outside the {w}x{h} field",
                start.x, start.y
            )));
        }
        for goal in self.resolved_goals() {
            if !goal.is_finite() || !goal.within(w as f32, h as f32) {
                return Err(invalid(format!(
                    "goal ({}, {}) lies outside the {w}x{h} field",
                    goal.x, goal.y
                )));
            }
        }
        if !(self.trail_decay_step.is_finite() && self.trail_decay_step >= 0.0) {
            return Err(invalid("trail decay step must be non-negative"));
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> SimError {
    SimError::InvalidConfig(message.into())
}
