//! Top-level configuration and the arena challenge presets.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::fusion::FusionConfig;
use crate::geometry::GeometryConfig;
use crate::navigation::NavConfig;

use super::error::ConfigLoadError;

/// Default config file location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "configs/pathik.yaml";

/// Arena challenge; selects the navigation preset and tick rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Challenge {
    /// Markers, unpark at the start, park at the end
    Obstacle,
    /// Three plain laps, stop in the start section
    Open,
}

impl Challenge {
    pub fn nav_config(self) -> NavConfig {
        match self {
            Challenge::Obstacle => NavConfig::obstacle(),
            Challenge::Open => NavConfig::open(),
        }
    }

    pub fn tick_period_ms(self) -> u64 {
        match self {
            Challenge::Obstacle => 33,
            Challenge::Open => 16,
        }
    }
}

/// Control loop and buffer settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub tick_period_ms: u64,
    pub lidar_capacity: usize,
    pub motion_capacity: usize,
    pub camera_capacity: usize,
    /// Binary run logs go here; no log when unset
    pub log_dir: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: Challenge::Obstacle.tick_period_ms(),
            lidar_capacity: 10,
            motion_capacity: 30,
            camera_capacity: 30,
            log_dir: None,
        }
    }
}

/// Full Pathik configuration loaded from YAML
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PathikConfig {
    /// Wall extraction and marker clustering
    #[serde(default)]
    pub geometry: GeometryConfig,

    /// Pose estimation and marker fusion
    #[serde(default)]
    pub fusion: FusionConfig,

    /// State machine tables
    #[serde(default)]
    pub navigation: NavConfig,

    /// Control loop
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

impl PathikConfig {
    /// Defaults for a challenge.
    pub fn for_challenge(challenge: Challenge) -> Self {
        let mut config = Self::default();
        config.apply_challenge(challenge);
        config
    }

    /// Replace the navigation tables and tick period with a challenge preset.
    pub fn apply_challenge(&mut self, challenge: Challenge) {
        self.navigation = challenge.nav_config();
        self.runtime.tick_period_ms = challenge.tick_period_ms();
    }

    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigLoadError::Io(e.to_string()))?;
        Self::from_yaml(&contents)
    }

    /// Load from the default config path, falling back to defaults
    pub fn load_default() -> Result<Self, ConfigLoadError> {
        let path = Path::new(DEFAULT_CONFIG_PATH);
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigLoadError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        self.navigation.validate().map_err(ConfigLoadError::Invalid)?;

        let rt = &self.runtime;
        if rt.tick_period_ms == 0 {
            return Err(ConfigLoadError::Invalid("tick_period_ms must be positive".into()));
        }
        if rt.lidar_capacity == 0 || rt.motion_capacity == 0 || rt.camera_capacity == 0 {
            return Err(ConfigLoadError::Invalid(
                "sample buffer capacities must be positive".into(),
            ));
        }
        if self.fusion.debounce.capacity == 0 {
            return Err(ConfigLoadError::Invalid("debounce capacity must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::{FinishMode, StartMode};
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = PathikConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.runtime.lidar_capacity, 10);
        assert_eq!(config.navigation.start, StartMode::Unpark);
    }

    #[test]
    fn test_challenge_presets() {
        let open = PathikConfig::for_challenge(Challenge::Open);
        assert_eq!(open.runtime.tick_period_ms, 16);
        assert!(matches!(open.navigation.finish, FinishMode::StopAhead { .. }));
        assert!(!open.navigation.use_markers);
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = "runtime:\n  tick_period_ms: 20\nfusion:\n  max_heading_rate: 15.0\n";
        let config = PathikConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.runtime.tick_period_ms, 20);
        assert_eq!(config.runtime.motion_capacity, 30);
        assert_eq!(config.fusion.max_heading_rate, 15.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = PathikConfig::from_yaml("runtime:\n  lidar_capacity: 0\n").unwrap_err();
        assert!(matches!(err, ConfigLoadError::Invalid(_)));

        let err = PathikConfig::from_yaml("navigation:\n  final_turn_count: 0\n").unwrap_err();
        assert!(matches!(err, ConfigLoadError::Invalid(_)));

        let err = PathikConfig::from_yaml("runtime: [1, 2]\n").unwrap_err();
        assert!(matches!(err, ConfigLoadError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "navigation:\n  use_markers: false").unwrap();
        let config = PathikConfig::load(file.path()).unwrap();
        assert!(!config.navigation.use_markers);

        let missing = PathikConfig::load(Path::new("/nonexistent/pathik.yaml"));
        assert!(matches!(missing, Err(ConfigLoadError::Io(_))));
    }

    #[test]
    fn test_shipped_config_parses() {
        let yaml = include_str!("../../configs/pathik.yaml");
        assert!(PathikConfig::from_yaml(yaml).is_ok());
    }
}
