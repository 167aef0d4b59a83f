use crate::error::{Result, SimError};
use crate::geometry::Position;
use crate::settings::{MazeSettings, SimulationSettings, SwarmSettings, Variant};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::fs;
use std::path::{Path, PathBuf};

/// A named preset containing simulation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub description: String,
    pub settings: SimulationSettings,
}

impl Preset {
    pub fn new(name: impl Into<String>, description: impl Into<String>, settings: SimulationSettings) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            settings,
        }
    }
}

/// Manager for loading and saving presets
pub struct PresetManager {
    /// Built-in presets that ship with the app
    pub builtin: Vec<Preset>,
    /// User-created presets loaded from disk
    pub user: Vec<Preset>,
    dir: Option<PathBuf>,
}

impl Default for PresetManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PresetManager {
    pub fn new() -> Self {
        Self::with_dir(Self::presets_dir())
    }

    /// Manager backed by a specific presets directory (`None` = built-ins only)
    pub fn with_dir(dir: Option<PathBuf>) -> Self {
        let mut manager = Self {
            builtin: builtin_presets(),
            user: Vec::new(),
            dir,
        };
        manager.load_user_presets();
        manager
    }

    /// Get the presets directory path
    fn presets_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("slime-path").join("presets"))
    }

    /// Load user presets from disk
    fn load_user_presets(&mut self) {
        let Some(dir) = self.dir.as_ref() else {
            return;
        };
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.extension().is_some_and(|e| e == "json") {
                continue;
            }
            match fs::read_to_string(&path)
                .map_err(SimError::from)
                .and_then(|content| serde_json::from_str::<Preset>(&content).map_err(SimError::from))
            {
                Ok(preset) => self.user.push(preset),
                Err(e) => log::warn!("skipping preset {}: {}", path.display(), e),
            }
        }
        self.user.sort_by(|a, b| a.name.cmp(&b.name));
    }

    fn preset_path(dir: &Path, name: &str) -> PathBuf {
        let filename = name
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect::<String>();
        dir.join(format!("{}.json", filename))
    }

    fn require_dir(&self) -> Result<&Path> {
        self.dir
            .as_deref()
            .ok_or_else(|| SimError::InvalidConfig("could not determine config directory".into()))
    }

    /// Save a preset to disk, replacing a user preset of the same name
    pub fn save_preset(&mut self, preset: Preset) -> Result<()> {
        preset.settings.validate()?;
        let dir = self.require_dir()?;
        fs::create_dir_all(dir)?;

        let path = Self::preset_path(dir, &preset.name);
        fs::write(&path, serde_json::to_string_pretty(&preset)?)?;
        log::info!("saved preset '{}' to {}", preset.name, path.display());

        match self.user.iter_mut().find(|p| p.name == preset.name) {
            Some(existing) => *existing = preset,
            None => self.user.push(preset),
        }
        Ok(())
    }

    /// Delete a user preset
    pub fn delete_preset(&mut self, name: &str) -> Result<()> {
        let dir = self.require_dir()?;
        let path = Self::preset_path(dir, name);

        if let Some(pos) = self.user.iter().position(|p| p.name == name) {
            self.user.remove(pos);
        }
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// Get all presets (builtin + user)
    pub fn all_presets(&self) -> impl Iterator<Item = &Preset> {
        self.builtin.iter().chain(self.user.iter())
    }

    /// Find a preset by name
    pub fn find(&self, name: &str) -> Option<&Preset> {
        self.all_presets().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Get preset names for display
    pub fn preset_names(&self) -> Vec<&str> {
        self.all_presets().map(|p| p.name.as_str()).collect()
    }
}

fn builtin_presets() -> Vec<Preset> {
    vec![
        // Maze Solver - stock maze run
        Preset::new(
            "Maze Solver",
            "25x25 maze, 2500 agents, stop on first arrival",
            SimulationSettings::default(),
        ),
        // Solid Maze - walls block movement
        Preset::new(
            "Solid Maze",
            "Agents must follow carved passages",
            SimulationSettings {
                maze: MazeSettings {
                    cols: 15,
                    rows: 15,
                    cell_size: 24,
                    solid_walls: true,
                    ..Default::default()
                },
                swarm: SwarmSettings {
                    sensor_offset: 8.0,
                    ..Default::default()
                },
                ..Default::default()
            },
        ),
        // Route Builder - open field with several goals
        Preset::new(
            "Route Builder",
            "Open toroidal field with four goal points",
            SimulationSettings {
                variant: Variant::OpenField,
                goals: vec![
                    Position::new(100.0, 200.0),
                    Position::new(300.0, 400.0),
                    Position::new(550.0, 150.0),
                    Position::new(600.0, 600.0),
                ],
                ..Default::default()
            },
        ),
        // Dense Swarm - many agents, slow fade
        Preset::new(
            "Dense Swarm",
            "Heavy swarm with long-lived trails",
            SimulationSettings {
                variant: Variant::OpenField,
                swarm: SwarmSettings {
                    agent_count: 8000,
                    agents_reached_threshold: 0.25,
                    ..Default::default()
                },
                trail_decay_step: 1.0,
                ..Default::default()
            },
        ),
        // Narrow Sensors - tight, twitchy steering
        Preset::new(
            "Narrow Sensors",
            "Short, narrow probes with sharp turns",
            SimulationSettings {
                swarm: SwarmSettings {
                    sensor_offset: 6.0,
                    sensor_angle: PI / 16.0,
                    turn_angle: PI / 3.0,
                    ..Default::default()
                },
                ..Default::default()
            },
        ),
    ]
}
