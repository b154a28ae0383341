//! Configuration loading for the simulated AR session.
//!
//! All tunables are loaded from an optional TOML file; every section falls
//! back to its defaults when omitted.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Complete simulation configuration.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArConfig {
    /// Seed for the point cloud generator
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Fake plane discovery settings
    #[serde(default)]
    pub planes: PlaneConfig,
    /// Point cloud generation settings
    #[serde(default)]
    pub point_cloud: PointCloudConfig,
    /// Debug fly-camera settings
    #[serde(default)]
    pub fly_camera: FlyCameraConfig,
    /// Passthrough capture settings
    #[serde(default)]
    pub capture: CaptureConfig,
    /// Background compositing settings
    #[serde(default)]
    pub background: BackgroundConfig,
    /// Plane visualizer settings
    #[serde(default)]
    pub visualizer: VisualizerConfig,
}

fn default_seed() -> u64 {
    42
}

impl Default for ArConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            planes: PlaneConfig::default(),
            point_cloud: PointCloudConfig::default(),
            fly_camera: FlyCameraConfig::default(),
            capture: CaptureConfig::default(),
            background: BackgroundConfig::default(),
            visualizer: VisualizerConfig::default(),
        }
    }
}

impl ArConfig {
    /// Loads and validates configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration as pretty TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Rejects values the provider cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.planes.delay_seconds.is_finite() || self.planes.delay_seconds < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "planes.delay_seconds must be a non-negative number, got {}",
                self.planes.delay_seconds
            )));
        }
        if self.point_cloud.half_extents.iter().any(|h| !h.is_finite() || *h < 0.0) {
            return Err(ConfigError::Invalid(
                "point_cloud.half_extents must be non-negative".to_string(),
            ));
        }
        let fly = &self.fly_camera;
        if !fly.speed_divisor.is_finite() || fly.speed_divisor <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "fly_camera.speed_divisor must be a positive number, got {}",
                fly.speed_divisor
            )));
        }
        if !fly.turn_speed.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "fly_camera.turn_speed must be finite, got {}",
                fly.turn_speed
            )));
        }
        if self.capture.width == 0 || self.capture.height == 0 {
            return Err(ConfigError::Invalid(
                "capture.width and capture.height must be non-zero".to_string(),
            ));
        }
        if self.visualizer.plane_layer.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "visualizer.plane_layer must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Fake plane discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaneConfig {
    /// Seconds to wait in each waiting state before publishing a plane
    pub delay_seconds: f32,
    /// Attach a rectangular boundary polygon to the fake planes
    pub include_boundary: bool,
}

impl Default for PlaneConfig {
    fn default() -> Self {
        Self {
            delay_seconds: 1.0,
            include_boundary: true,
        }
    }
}

/// Random point cloud generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointCloudConfig {
    /// Number of points generated at start
    pub count: usize,
    /// Half-size of the box the points are drawn from
    pub half_extents: [f32; 3],
}

impl Default for PointCloudConfig {
    fn default() -> Self {
        Self {
            count: 20,
            half_extents: [2.0, 0.5, 2.0],
        }
    }
}

/// Debug fly-camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlyCameraConfig {
    /// Degrees per pixel-second of pointer movement
    pub turn_speed: f32,
    /// Movement speed is the rig's parent scale divided by this
    pub speed_divisor: f32,
}

impl Default for FlyCameraConfig {
    fn default() -> Self {
        Self {
            turn_speed: 10.0,
            speed_divisor: 10.0,
        }
    }
}

/// Passthrough capture request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub width: u32,
    pub height: u32,
    pub target_frame_rate: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            target_frame_rate: 30,
        }
    }
}

/// Background compositing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    /// Resource path of the background material
    pub material: String,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            material: crate::background::BACKGROUND_MATERIAL_PATH.to_string(),
        }
    }
}

/// Plane boundary visualizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    /// Render layer assigned to plane colliders
    pub plane_layer: String,
    /// Initial capacity of the boundary scratch buffer
    pub boundary_capacity: usize,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            plane_layer: "ARGameObject".to_string(),
            boundary_capacity: 30,
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Error parsing TOML config
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Error writing TOML config
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// A value was out of range
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Simulated AR session configuration

seed = 42

[planes]
delay_seconds = 1.0
include_boundary = true

[point_cloud]
count = 20
half_extents = [2.0, 0.5, 2.0]

[fly_camera]
turn_speed = 10.0
speed_divisor = 10.0

[capture]
width = 1280
height = 720
target_frame_rate = 30

[background]
material = "Materials/ARBackground"

[visualizer]
plane_layer = "ARGameObject"
boundary_capacity = 30
"#
    .to_string()
}
