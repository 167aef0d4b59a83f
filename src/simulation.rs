use crate::agent::Terrain;
use crate::error::Result;
use crate::geometry::Position;
use crate::goals::GoalSet;
use crate::maze::{self, MazeGrid};
use crate::path::{self, ExtractedPath};
use crate::settings::{SimulationSettings, Variant};
use crate::swarm::Swarm;
use crate::trail::TrailField;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunState {
    Running,
    /// Reached-fraction threshold crossed
    Converged,
    /// Halted by the user before converging
    Stopped,
}

impl RunState {
    pub fn name(&self) -> &'static str {
        match self {
            RunState::Running => "RUNNING",
            RunState::Converged => "CONVERGED",
            RunState::Stopped => "STOPPED",
        }
    }
}

/// Outcome of a run, for headless output
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub variant: Variant,
    pub state: RunState,
    pub ticks: u64,
    pub agents: usize,
    pub agents_reached: usize,
    pub goal_reached_fraction: f32,
    pub maze_complete: Option<bool>,
    /// Trail cells still above baseline
    pub warm_cells: usize,
    pub route_length: f32,
    pub route: ExtractedPath,
}

/// Slime-mold pathfinding run: field, optional maze, goals and swarm
pub struct PathSimulation {
    pub settings: SimulationSettings,
    field: TrailField,
    maze: Option<MazeGrid>,
    goals: GoalSet,
    start: Position,
    swarm: Swarm,
    route: Option<ExtractedPath>,
    state: RunState,
    ticks: u64,
    pub paused: bool,
    rng: StdRng,
}

impl PathSimulation {
    pub fn new(settings: SimulationSettings) -> Result<Self> {
        settings.validate()?;
        let mut rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let parts = Self::build(&settings, &mut rng)?;
        Ok(Self {
            settings,
            field: parts.field,
            maze: parts.maze,
            goals: parts.goals,
            start: parts.start,
            swarm: parts.swarm,
            route: None,
            state: RunState::Running,
            ticks: 0,
            paused: false,
            rng,
        })
    }

    fn build(settings: &SimulationSettings, rng: &mut StdRng) -> Result<Parts> {
        let (width, height) = settings.field_size();
        let goals = GoalSet::new(settings.resolved_goals(), settings.swarm.food_detection_range)?;
        let start = settings.resolved_start();

        let maze = match settings.variant {
            Variant::Maze => {
                let m = &settings.maze;
                let budget = m.time_budget_ms.map(Duration::from_millis);
                let grid = maze::generate(m.cols, m.rows, m.cell_size as f32, budget, rng, &Instant::now());
                log::debug!("maze covers {}x{} field units", grid.width(), grid.height());
                if !grid.is_passable_at(start) {
                    log::warn!("start ({}, {}) sits in a blocked maze cell", start.x, start.y);
                }
                Some(grid)
            }
            Variant::OpenField => None,
        };

        let swarm = Swarm::new(settings.swarm.clone(), start, settings.variant.records_paths(), rng)?;
        log::info!(
            "{} run: {} agents on {}x{} field, {} goal(s), start ({}, {})",
            settings.variant.name(),
            swarm.len(),
            width,
            height,
            goals.points().len(),
            start.x,
            start.y
        );

        Ok(Parts {
            field: TrailField::new(width, height, settings.trail_decay_step),
            maze,
            goals,
            start,
            swarm,
        })
    }

    /// Advance every agent one tick.
    /// Returns true if the run should continue, false once halted or paused.
    pub fn step(&mut self) -> bool {
        if self.paused || self.state != RunState::Running {
            return false;
        }

        // Built from disjoint fields so the trail can be borrowed mutably
        let terrain = Terrain {
            width: self.field.width() as f32,
            height: self.field.height() as f32,
            boundary: self.settings.boundary(),
            maze: self.maze.as_ref(),
            solid_walls: self.settings.maze.solid_walls,
            goals: &self.goals,
        };
        self.swarm.update(&terrain, &mut self.field);
        self.ticks += 1;

        if self.swarm.has_converged() {
            log::info!(
                "converged after {} ticks: {}/{} agents reached a goal",
                self.ticks,
                self.swarm.reached_count(),
                self.swarm.len()
            );
            self.state = RunState::Converged;
            self.finish();
            return false;
        }
        true
    }

    /// Run up to `steps` ticks, stopping early at the threshold
    pub fn run_frame(&mut self, steps: usize) -> usize {
        let mut done = 0;
        for _ in 0..steps {
            if !self.step() {
                break;
            }
            done += 1;
        }
        done
    }

    /// Change the fade rate without restarting the run
    pub fn adjust_trail_decay_step(&mut self, delta: f32) {
        self.settings.adjust_trail_decay_step(delta);
        self.field.set_decay_step(self.settings.trail_decay_step);
    }

    /// Once-per-frame trail fade
    pub fn render_tick(&mut self) {
        self.field.decay();
    }

    /// Halt by hand; the maze variant still extracts what it has
    pub fn stop(&mut self) {
        if self.state == RunState::Running {
            log::info!("stopped by user after {} ticks", self.ticks);
            self.state = RunState::Stopped;
            self.finish();
        }
    }

    fn finish(&mut self) {
        if self.route.is_some() || !self.settings.variant.records_paths() {
            return;
        }
        let route = path::extract(self.swarm.agents());
        if route.is_empty() {
            log::info!("no agent reached a goal; nothing to draw");
        } else {
            log::info!("extracted route: {} points, length {:.1}", route.len(), route.length());
        }
        self.route = Some(route);
    }

    /// Tick until halted or `max_ticks` elapse, then stop and summarise
    pub fn run_to_completion(&mut self, max_ticks: u64) -> RunSummary {
        while self.ticks < max_ticks && self.step() {}
        self.stop();
        self.summary()
    }

    pub fn summary(&self) -> RunSummary {
        let route = self.route.clone().unwrap_or_default();
        RunSummary {
            variant: self.settings.variant,
            state: self.state,
            ticks: self.ticks,
            agents: self.swarm.len(),
            agents_reached: self.swarm.reached_count(),
            goal_reached_fraction: self.swarm.goal_reached_fraction(),
            maze_complete: self.maze.as_ref().map(MazeGrid::is_complete),
            warm_cells: self.field.warm_cells(),
            route_length: route.length(),
            route,
        }
    }

    /// Rebuild everything from the current settings
    pub fn reset(&mut self) -> Result<()> {
        self.settings.validate()?;
        if let Some(seed) = self.settings.seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        let parts = Self::build(&self.settings, &mut self.rng)?;
        self.field = parts.field;
        self.maze = parts.maze;
        self.goals = parts.goals;
        self.start = parts.start;
        self.swarm = parts.swarm;
        self.route = None;
        self.state = RunState::Running;
        self.ticks = 0;
        self.paused = false;
        Ok(())
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn field(&self) -> &TrailField {
        &self.field
    }

    pub fn maze(&self) -> Option<&MazeGrid> {
        self.maze.as_ref()
    }

    pub fn goals(&self) -> &GoalSet {
        &self.goals
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn swarm(&self) -> &Swarm {
        &self.swarm
    }

    /// Extracted route, `None` until the run halts
    pub fn route(&self) -> Option<&ExtractedPath> {
        self.route.as_ref()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Progress toward the stop threshold (0.0 to 1.0)
    pub fn progress(&self) -> f32 {
        let threshold = self.swarm.settings().agents_reached_threshold;
        (self.swarm.goal_reached_fraction() / threshold).min(1.0)
    }

    pub fn is_complete(&self) -> bool {
        self.state != RunState::Running
    }

    /// Whether a maze wall covers the field point
    pub fn is_wall(&self, position: Position) -> bool {
        self.maze.as_ref().is_some_and(|m| m.wall_at(position))
    }
}

struct Parts {
    field: TrailField,
    maze: Option<MazeGrid>,
    goals: GoalSet,
    start: Position,
    swarm: Swarm,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{MazeSettings, SwarmSettings};

    fn maze_scenario(seed: u64) -> SimulationSettings {
        SimulationSettings {
            variant: Variant::Maze,
            swarm: SwarmSettings {
                agent_count: 50,
                food_detection_range: 10.0,
                ..Default::default()
            },
            maze: MazeSettings {
                cols: 25,
                rows: 25,
                cell_size: 20,
                time_budget_ms: None,
                solid_walls: false,
            },
            start: Some(Position::new(10.0, 10.0)),
            seed: Some(seed),
            ..Default::default()
        }
    }

    #[test]
    fn test_end_to_end_maze_run() {
        let mut sim = PathSimulation::new(maze_scenario(2024)).unwrap();
        let goal = Position::new(0.75 * 500.0, 0.75 * 500.0);
        assert_eq!(sim.goals().points(), &[goal]);

        let mut last_fraction = 0.0;
        for _ in 0..5000 {
            if !sim.step() {
                break;
            }
            let fraction = sim.swarm().goal_reached_fraction();
            assert!(fraction >= last_fraction);
            last_fraction = fraction;
        }

        assert!(sim.swarm().goal_reached_fraction() > 0.0);
        assert_eq!(sim.state(), RunState::Converged);

        let route = sim.route().expect("route extracted on convergence");
        assert!(!route.is_empty());
        assert_eq!(route.first().map(|p| p.cell_key()), Some((10, 10)));
        let last = route.last().unwrap();
        assert!(last.distance(goal) <= 10.0);
    }

    #[test]
    fn test_halted_run_does_not_advance() {
        let mut sim = PathSimulation::new(maze_scenario(5)).unwrap();
        sim.run_frame(3);
        assert_eq!(sim.ticks(), 3);

        sim.stop();
        assert_eq!(sim.state(), RunState::Stopped);
        let route = sim.route().cloned();
        assert!(!sim.step());
        assert_eq!(sim.run_frame(10), 0);
        assert_eq!(sim.ticks(), 3);
        // Extracted once and left alone
        assert_eq!(sim.route().cloned(), route);
    }

    #[test]
    fn test_pause_blocks_ticks() {
        let mut sim = PathSimulation::new(maze_scenario(6)).unwrap();
        sim.toggle_pause();
        assert_eq!(sim.run_frame(5), 0);
        sim.toggle_pause();
        assert_eq!(sim.run_frame(5), 5);
    }

    #[test]
    fn test_open_field_run_wraps_and_keeps_no_route() {
        let settings = SimulationSettings {
            variant: Variant::OpenField,
            swarm: SwarmSettings {
                agent_count: 30,
                food_detection_range: 100.0,
                agents_reached_threshold: 0.5,
                ..Default::default()
            },
            field_width: 300,
            field_height: 200,
            goals: vec![Position::new(40.0, 40.0), Position::new(260.0, 160.0)],
            seed: Some(17),
            ..Default::default()
        };
        let mut sim = PathSimulation::new(settings).unwrap();
        assert_eq!(sim.start(), Position::new(150.0, 100.0));

        for _ in 0..200 {
            sim.run_frame(10);
            sim.render_tick();
            for agent in sim.swarm().agents() {
                assert!(agent.position().within(300.0, 200.0));
                assert!(agent.path().is_none());
            }
        }
        sim.stop();
        assert!(sim.route().is_none());
    }

    #[test]
    fn test_reset_with_seed_reproduces_run() {
        let mut sim = PathSimulation::new(maze_scenario(99)).unwrap();
        sim.run_frame(50);
        let before: Vec<Position> = sim.swarm().agents().iter().map(|a| a.position()).collect();

        sim.reset().unwrap();
        assert_eq!(sim.ticks(), 0);
        assert!(sim.route().is_none());
        sim.run_frame(50);
        let after: Vec<Position> = sim.swarm().agents().iter().map(|a| a.position()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut settings = maze_scenario(1);
        settings.maze.rows = 0;
        assert!(PathSimulation::new(settings).is_err());
    }

    #[test]
    fn test_summary_reports_maze_state() {
        let mut sim = PathSimulation::new(maze_scenario(8)).unwrap();
        let summary = sim.run_to_completion(20);
        assert_eq!(summary.agents, 50);
        assert!(summary.ticks <= 20);
        assert_eq!(summary.maze_complete, Some(true));
        assert!(sim.is_complete());
    }
}
