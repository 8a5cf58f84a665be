//! Viewer configuration
//!
//! Loaded from a RON file, with fallback to defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fov::FovSettings;

/// Name of the config file looked up in the config directory and the working directory
pub const CONFIG_FILE: &str = "viewer.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Settings for the interactive viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Sight radius in rings; 0 is unlimited
    pub radius: u32,
    /// Draw the walls at the edge of sight
    pub light_walls: bool,
    pub cave_width: i32,
    pub cave_height: i32,
    /// Chance of a cave cell starting out open
    pub cave_fill: f64,
    /// Fixed seed for generated caves, random when unset
    pub seed: Option<u64>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            radius: 10,
            light_walls: true,
            cave_width: 80,
            cave_height: 45,
            cave_fill: 0.45,
            seed: None,
        }
    }
}

impl ViewerConfig {
    /// Parse a config from RON text. Missing fields take their defaults.
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let mut config: ViewerConfig = ron::from_str(text)?;
        config.sanitize();
        Ok(config)
    }

    /// Read a config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&text)
    }

    /// Load from the first config file found, or use defaults
    pub fn load() -> Self {
        for path in config_paths() {
            if !path.exists() {
                continue;
            }
            match Self::from_file(&path) {
                Ok(config) => {
                    log::info!("Config loaded from {:?}", path);
                    return config;
                }
                Err(e) => {
                    log::warn!("{}, using defaults", e);
                    return Self::default();
                }
            }
        }

        log::info!("No config file found, using defaults");
        Self::default()
    }

    /// Options passed to the field of view engine
    pub fn fov_settings(&self) -> FovSettings {
        FovSettings {
            max_radius: self.radius,
            light_walls: self.light_walls,
        }
    }

    /// Clamp values the generator cannot use
    fn sanitize(&mut self) {
        let defaults = Self::default();
        if !(0.0..=1.0).contains(&self.cave_fill) {
            log::warn!("cave_fill {} out of range, using {}", self.cave_fill, defaults.cave_fill);
            self.cave_fill = defaults.cave_fill;
        }
        if self.cave_width < 3 || self.cave_height < 3 {
            log::warn!(
                "Cave size {}x{} too small, using {}x{}",
                self.cave_width,
                self.cave_height,
                defaults.cave_width,
                defaults.cave_height
            );
            self.cave_width = defaults.cave_width;
            self.cave_height = defaults.cave_height;
        }
    }
}

/// Candidate config locations, most specific first
fn config_paths() -> Vec<PathBuf> {
    use directories::ProjectDirs;

    let mut paths = Vec::new();
    if let Some(proj_dirs) = ProjectDirs::from("com", "shadowsight", "Shadowsight") {
        paths.push(proj_dirs.config_dir().join(CONFIG_FILE));
    }
    paths.push(PathBuf::from(".").join(CONFIG_FILE));
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.radius, 10);
        assert!(config.light_walls);
        assert_eq!(
            config.fov_settings(),
            FovSettings { max_radius: 10, light_walls: true }
        );
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config = ViewerConfig::from_ron("(radius: 0, seed: Some(42))").unwrap();
        assert_eq!(config.radius, 0);
        assert_eq!(config.seed, Some(42));
        assert!(config.light_walls);
        assert_eq!(config.cave_width, 80);
    }

    #[test]
    fn test_out_of_range_values_are_replaced() {
        let config = ViewerConfig::from_ron("(cave_fill: 1.5, cave_width: 1)").unwrap();
        assert_eq!(config.cave_fill, 0.45);
        assert_eq!(config.cave_width, 80);
        assert_eq!(config.cave_height, 45);
    }

    #[test]
    fn test_parse_error() {
        let err = ViewerConfig::from_ron("(radius: \"far\")").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = ViewerConfig::from_file(Path::new("does/not/exist.ron")).unwrap_err();
        assert!(format!("{err}").contains("does/not/exist.ron"));
    }

    #[test]
    fn test_serialized_defaults_parse_back() {
        let text = ron::ser::to_string_pretty(&ViewerConfig::default(), ron::ser::PrettyConfig::default())
            .unwrap();
        assert_eq!(ViewerConfig::from_ron(&text).unwrap(), ViewerConfig::default());
    }
}
