use crate::config::AppConfig;
use crate::export::{self, GifRecorder};
use crate::simulation::PathSimulation;
use std::path::PathBuf;

/// Focus state for parameter editing in the sidebar
/// Alphabetically ordered for consistent UI display
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Focus {
    #[default]
    None,
    // Alphabetical order
    Agents,
    Decay,
    FoodRange,
    SensorAngle,
    SensorOffset,
    Speed,
    Threshold,
    TurnAngle,
    // Controls box (not a param)
    Controls,
}

impl Focus {
    /// Tab cycles through parameters in alphabetical order
    pub fn next(&self) -> Focus {
        match self {
            Focus::None | Focus::Controls => Focus::Agents,
            Focus::Agents => Focus::Decay,
            Focus::Decay => Focus::FoodRange,
            Focus::FoodRange => Focus::SensorAngle,
            Focus::SensorAngle => Focus::SensorOffset,
            Focus::SensorOffset => Focus::Speed,
            Focus::Speed => Focus::Threshold,
            Focus::Threshold => Focus::TurnAngle,
            Focus::TurnAngle => Focus::Agents, // Loop back
        }
    }

    /// Shift+Tab cycles through parameters in reverse alphabetical order
    pub fn prev(&self) -> Focus {
        match self {
            Focus::None | Focus::Controls => Focus::TurnAngle,
            Focus::Agents => Focus::TurnAngle, // Loop back
            Focus::Decay => Focus::Agents,
            Focus::FoodRange => Focus::Decay,
            Focus::SensorAngle => Focus::FoodRange,
            Focus::SensorOffset => Focus::SensorAngle,
            Focus::Speed => Focus::SensorOffset,
            Focus::Threshold => Focus::Speed,
            Focus::TurnAngle => Focus::Threshold,
        }
    }

    /// Get the line index in the parameters box for this focus
    pub fn line_index(&self) -> u16 {
        match self {
            Focus::None | Focus::Controls => 0,
            Focus::Agents => 0,
            Focus::Decay => 1,
            Focus::FoodRange => 2,
            Focus::SensorAngle => 3,
            Focus::SensorOffset => 4,
            Focus::Speed => 5,
            Focus::Threshold => 6,
            Focus::TurnAngle => 7,
        }
    }

    /// Check if focus is on a parameter (not Controls or None)
    pub fn is_param(&self) -> bool {
        !matches!(self, Focus::None | Focus::Controls)
    }

    /// Swarm parameters only take effect when the swarm is rebuilt
    pub fn needs_reset(&self) -> bool {
        matches!(
            self,
            Focus::Agents | Focus::FoodRange | Focus::SensorAngle | Focus::SensorOffset | Focus::Threshold | Focus::TurnAngle
        )
    }
}

/// Main application state
pub struct App {
    pub simulation: PathSimulation,
    pub focus: Focus,
    pub fullscreen_mode: bool,
    pub ticks_per_frame: usize,
    pub show_help: bool,
    pub help_scroll: u16,
    pub controls_scroll: u16,
    /// One-line feedback shown in the status box
    pub status_message: Option<String>,
    pub recorder: Option<GifRecorder>,
    pub config_path: PathBuf,
}

impl App {
    pub fn new(simulation: PathSimulation, ticks_per_frame: usize) -> Self {
        Self {
            simulation,
            focus: Focus::Controls,
            fullscreen_mode: false,
            ticks_per_frame: ticks_per_frame.clamp(1, 200),
            show_help: false,
            help_scroll: 0,
            controls_scroll: 0,
            status_message: None,
            recorder: None,
            config_path: PathBuf::from("slime-path.json"),
        }
    }

    /// Run simulation ticks for the current frame, then fade the trail
    pub fn tick(&mut self) {
        if self.simulation.paused {
            return;
        }
        let was_running = !self.simulation.is_complete();
        self.simulation.run_frame(self.ticks_per_frame);
        self.simulation.render_tick();

        if was_running {
            self.record_frame();
            if self.simulation.is_complete() {
                self.finish_recording();
            }
        }
    }

    fn record_frame(&mut self) {
        let Some(recorder) = self.recorder.as_mut() else {
            return;
        };
        if let Err(e) = recorder.capture(&self.simulation) {
            log::error!("GIF capture failed, recording stopped: {}", e);
            self.status_message = Some(format!("recording stopped: {e}"));
            self.recorder = None;
        }
    }

    /// Close the GIF, if one is being written
    pub fn finish_recording(&mut self) {
        if let Some(recorder) = self.recorder.take() {
            let frames = recorder.frames();
            match recorder.finish() {
                Ok(()) => self.status_message = Some(format!("GIF saved ({frames} frames)")),
                Err(e) => {
                    log::error!("could not finish GIF: {}", e);
                    self.status_message = Some(format!("GIF failed: {e}"));
                }
            }
        }
    }

    /// Handle adjusting the currently focused parameter
    pub fn adjust_focused_up(&mut self) {
        self.adjust_focused(1.0);
    }

    /// Handle adjusting the currently focused parameter
    pub fn adjust_focused_down(&mut self) {
        self.adjust_focused(-1.0);
    }

    fn adjust_focused(&mut self, sign: f32) {
        let swarm = &mut self.simulation.settings.swarm;
        match self.focus {
            Focus::None | Focus::Controls => {}
            Focus::Agents => swarm.adjust_agent_count(sign as i32 * 250),
            Focus::FoodRange => swarm.adjust_food_detection_range(sign),
            Focus::SensorAngle => swarm.adjust_sensor_angle(sign),
            Focus::SensorOffset => swarm.adjust_sensor_offset(sign),
            Focus::Threshold => swarm.adjust_agents_reached_threshold(sign * 0.01),
            Focus::TurnAngle => swarm.adjust_turn_angle(sign),
            Focus::Decay => self.simulation.adjust_trail_decay_step(sign * 0.5),
            Focus::Speed => {
                if sign > 0.0 {
                    self.increase_speed();
                } else {
                    self.decrease_speed();
                }
            }
        }
        if self.focus.needs_reset() {
            self.status_message = Some("press R to apply".into());
        }
    }

    /// Cycle to next focus
    pub fn next_focus(&mut self) {
        self.focus = self.focus.next();
    }

    /// Navigate to previous parameter (Shift+Tab)
    pub fn prev_focus(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Toggle pause state
    pub fn toggle_pause(&mut self) {
        self.simulation.toggle_pause();
    }

    /// Rebuild the run from the current settings
    pub fn reset(&mut self) {
        self.finish_recording();
        match self.simulation.reset() {
            Ok(()) => self.status_message = None,
            Err(e) => {
                log::warn!("reset rejected: {}", e);
                self.status_message = Some(e.to_string());
            }
        }
    }

    /// Halt the run and extract whatever route exists
    pub fn stop(&mut self) {
        self.simulation.stop();
        self.finish_recording();
        self.status_message = Some(match self.simulation.route() {
            Some(route) if !route.is_empty() => format!("route: {} points", route.len()),
            Some(_) => "no route found".into(),
            None => "stopped".into(),
        });
    }

    /// Switch between maze and open field and restart
    pub fn cycle_variant(&mut self) {
        let settings = &mut self.simulation.settings;
        settings.variant = settings.variant.next();
        self.reset();
    }

    /// Solid walls are read every tick, so this applies immediately
    pub fn toggle_solid_walls(&mut self) {
        let maze = &mut self.simulation.settings.maze;
        maze.solid_walls = !maze.solid_walls;
    }

    /// Write a PNG of the current state next to the config file
    pub fn save_snapshot(&mut self) {
        let path = self
            .config_path
            .with_file_name(format!("slime-path-{}.png", self.simulation.ticks()));
        self.status_message = Some(match export::save_snapshot(&self.simulation, &path) {
            Ok(()) => format!("saved {}", path.display()),
            Err(e) => format!("snapshot failed: {e}"),
        });
    }

    /// Persist the current settings to `config_path`
    pub fn save_config(&mut self) {
        let config = AppConfig {
            settings: self.simulation.settings.clone(),
            ticks_per_frame: self.ticks_per_frame,
            ..Default::default()
        };
        self.status_message = Some(match config.save_to_file(&self.config_path) {
            Ok(()) => format!("saved {}", self.config_path.display()),
            Err(e) => format!("save failed: {e}"),
        });
    }

    /// Toggle fullscreen mode
    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen_mode = !self.fullscreen_mode;
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
        if self.show_help {
            self.help_scroll = 0; // Reset scroll when opening
        }
    }

    /// Scroll help content up
    pub fn scroll_help_up(&mut self) {
        self.help_scroll = self.help_scroll.saturating_sub(1);
    }

    /// Scroll help content down
    pub fn scroll_help_down(&mut self, max_scroll: u16) {
        self.help_scroll = (self.help_scroll + 1).min(max_scroll);
    }

    /// Scroll controls box up
    pub fn scroll_controls_up(&mut self) {
        self.controls_scroll = self.controls_scroll.saturating_sub(1);
    }

    /// Scroll controls box down
    pub fn scroll_controls_down(&mut self, max_scroll: u16) {
        self.controls_scroll = (self.controls_scroll + 1).min(max_scroll);
    }

    /// Increase simulation speed
    pub fn increase_speed(&mut self) {
        self.ticks_per_frame = (self.ticks_per_frame + 5).min(200);
    }

    /// Decrease simulation speed
    pub fn decrease_speed(&mut self) {
        self.ticks_per_frame = self.ticks_per_frame.saturating_sub(5).max(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{MazeSettings, SimulationSettings, SwarmSettings, Variant};
    use crate::simulation::RunState;
    use tempfile::TempDir;

    fn app() -> App {
        let settings = SimulationSettings {
            swarm: SwarmSettings {
                agent_count: 30,
                ..Default::default()
            },
            maze: MazeSettings {
                cols: 6,
                rows: 6,
                cell_size: 10,
                time_budget_ms: None,
                solid_walls: false,
            },
            seed: Some(12),
            ..Default::default()
        };
        App::new(PathSimulation::new(settings).unwrap(), 10)
    }

    #[test]
    fn test_focus_cycle_round_trips() {
        let mut focus = Focus::Agents;
        for _ in 0..8 {
            focus = focus.next();
        }
        assert_eq!(focus, Focus::Agents);
        assert_eq!(Focus::Agents.next().prev(), Focus::Agents);
        assert_eq!(Focus::Controls.next(), Focus::Agents);
        assert!(!Focus::Controls.is_param());
    }

    #[test]
    fn test_tick_runs_a_frame_of_ticks() {
        let mut app = app();
        app.tick();
        assert!(app.simulation.ticks() <= 10);
        assert!(app.simulation.ticks() > 0 || app.simulation.is_complete());

        app.toggle_pause();
        let ticks = app.simulation.ticks();
        app.tick();
        assert_eq!(app.simulation.ticks(), ticks);
    }

    #[test]
    fn test_speed_bounds() {
        let mut app = app();
        for _ in 0..100 {
            app.decrease_speed();
        }
        assert_eq!(app.ticks_per_frame, 1);
        for _ in 0..100 {
            app.increase_speed();
        }
        assert_eq!(app.ticks_per_frame, 200);
    }

    #[test]
    fn test_swarm_params_wait_for_reset() {
        let mut app = app();
        app.focus = Focus::Agents;
        app.adjust_focused_up();
        assert_eq!(app.simulation.settings.swarm.agent_count, 280);
        assert_eq!(app.simulation.swarm().len(), 30);

        app.reset();
        assert_eq!(app.simulation.swarm().len(), 280);
    }

    #[test]
    fn test_stop_and_variant_switch() {
        let mut app = app();
        app.stop();
        assert_eq!(app.simulation.state(), RunState::Stopped);
        assert!(app.status_message.is_some());

        app.cycle_variant();
        assert_eq!(app.simulation.settings.variant, Variant::OpenField);
        assert_eq!(app.simulation.state(), RunState::Running);
        assert!(app.simulation.maze().is_none());
    }

    #[test]
    fn test_save_config_and_snapshot() {
        let dir = TempDir::new().unwrap();
        let mut app = app();
        app.config_path = dir.path().join("run.json");
        app.save_config();
        let loaded = AppConfig::load_from_file(&app.config_path).unwrap();
        assert_eq!(loaded.settings, app.simulation.settings);
        assert_eq!(loaded.ticks_per_frame, 10);

        app.save_snapshot();
        assert!(dir.path().join("slime-path-0.png").exists());
    }
}
