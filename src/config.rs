//! Render configuration
//!
//! Uses RON (Rusty Object Notation) for human-readable config files.
//! Every field is optional in the file; missing ones take the defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::rasterizer::{Camera, Pipeline, Transform, Vec3};

/// Error type for config loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),

    #[error("image size must be non-zero, got {width}x{height}")]
    InvalidSize { width: usize, height: usize },
}

/// Everything fixed at device construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: usize,
    pub height: usize,
    pub camera: Camera,
    /// Direction towards the light; normalized when the pipeline is built
    pub light_dir: Vec3,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            camera: Camera::default(),
            light_dir: Vec3::new(0.0, 1.0, 5.0),
        }
    }
}

impl RenderConfig {
    /// Load a config from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_ron(&contents)
    }

    /// Parse a config from a RON string
    pub fn from_ron(s: &str) -> Result<Self, ConfigError> {
        let config: RenderConfig = ron::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the config to a RON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .indentor("  ".to_string());

        let contents = ron::ser::to_string_pretty(self, pretty)?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidSize {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(
            Transform::from_camera(&self.camera, self.width, self.height),
            self.light_dir,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = RenderConfig::from_ron("()").unwrap();
        assert_eq!(config, RenderConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let config = RenderConfig::from_ron(
            "(width: 320, height: 240, camera: (eye: (x: 0.0, y: 0.0, z: 4.0)))",
        )
        .unwrap();
        assert_eq!(config.width, 320);
        assert_eq!(config.height, 240);
        assert_eq!(config.camera.eye, Vec3::new(0.0, 0.0, 4.0));
        assert_eq!(config.camera.near, Camera::default().near);
        assert_eq!(config.light_dir, RenderConfig::default().light_dir);
    }

    #[test]
    fn test_zero_size_rejected() {
        let err = RenderConfig::from_ron("(width: 0)").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSize { width: 0, height: 800 }));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            RenderConfig::from_ron("(width: \"wide\")"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("yasr.ron");

        let config = RenderConfig {
            width: 64,
            height: 48,
            light_dir: Vec3::new(1.0, 0.0, 0.0),
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(RenderConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            RenderConfig::load(dir.path().join("nope.ron")),
            Err(ConfigError::Io(_))
        ));
    }
}
