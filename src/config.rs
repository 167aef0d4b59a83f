use crate::error::Result;
use crate::settings::SimulationSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete application configuration for export/import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version field for future compatibility
    pub version: u32,
    /// All simulation settings
    pub settings: SimulationSettings,
    /// Ticks per frame (app-level)
    pub ticks_per_frame: usize,
}

impl AppConfig {
    /// Export config to a JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("saved config to {}", path.display());
        Ok(())
    }

    /// Import config from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.settings.validate()?;
        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            settings: SimulationSettings::default(),
            ticks_per_frame: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;
    use crate::geometry::Position;
    use crate::settings::{MazeSettings, SwarmSettings, Variant};
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_file_save_and_load() {
        let config = AppConfig::default();

        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();

        config.save_to_file(&path).unwrap();
        let loaded = AppConfig::load_from_file(&path).unwrap();

        assert_eq!(loaded.version, config.version);
        assert_eq!(loaded.ticks_per_frame, config.ticks_per_frame);
        assert_eq!(loaded.settings, config.settings);
    }

    #[test]
    fn test_all_fields_preserved() {
        let original = AppConfig {
            version: 1,
            settings: SimulationSettings {
                variant: Variant::OpenField,
                swarm: SwarmSettings {
                    agent_count: 800,
                    sensor_offset: 9.0,
                    sensor_angle: 0.3,
                    turn_angle: 0.4,
                    food_detection_range: 25.0,
                    agents_reached_threshold: 0.5,
                },
                maze: MazeSettings {
                    cols: 12,
                    rows: 9,
                    cell_size: 15,
                    time_budget_ms: None,
                    solid_walls: true,
                },
                field_width: 400,
                field_height: 300,
                start: Some(Position::new(20.0, 30.0)),
                goals: vec![Position::new(100.0, 200.0), Position::new(300.0, 40.0)],
                trail_decay_step: 2.5,
                seed: Some(77),
            },
            ticks_per_frame: 25,
        };

        let json = serde_json::to_string(&original).unwrap();
        let restored: AppConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.settings, original.settings);
        assert_eq!(restored.ticks_per_frame, 25);
        assert_eq!(restored.settings.maze.time_budget_ms, None);
        assert_eq!(restored.settings.goals.len(), 2);
    }

    #[test]
    fn test_invalid_config_file() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "not valid json").unwrap();

        let result = AppConfig::load_from_file(temp_file.path());
        assert!(matches!(result, Err(SimError::Json(_))));
    }

    #[test]
    fn test_config_with_bad_values_rejected() {
        let mut config = AppConfig::default();
        config.settings.swarm.agent_count = 0;
        let temp_file = NamedTempFile::new().unwrap();
        config.save_to_file(temp_file.path()).unwrap();

        let result = AppConfig::load_from_file(temp_file.path());
        assert!(matches!(result, Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_missing_config_file() {
        let result = AppConfig::load_from_file(Path::new("/nonexistent/path/config.json"));
        assert!(matches!(result, Err(SimError::Io(_))));
    }
}
