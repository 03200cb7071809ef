//! Preview and export settings, read from a TOML file.

use crate::error::ConfigError;
use crate::uv::TessellationFactor;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "skybox.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PreviewConfig {
    pub window: WindowConfig,
    pub preview: PreviewSettings,
    pub staging: StagingConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            title: "Skybox Preview".to_string(),
        }
    }
}

/// Camera and mesh settings of the 3D preview. Angles are in degrees.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PreviewSettings {
    pub tessellation: u32,
    pub initial_pitch: f32,
    pub initial_yaw: f32,
    /// Degrees of rotation per pixel of pointer drag.
    pub sensitivity: f32,
    pub fov_y: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            tessellation: TessellationFactor::DEFAULT.get(),
            initial_pitch: 20.0,
            initial_yaw: -30.0,
            sensitivity: 1.0,
            fov_y: 60.0,
            z_near: 0.1,
            z_far: 100.0,
        }
    }
}

impl PreviewSettings {
    pub fn tessellation(&self) -> TessellationFactor {
        TessellationFactor::new(self.tessellation).unwrap_or_else(|| {
            log::warn!(
                "tessellation {} is out of range, using {}",
                self.tessellation,
                TessellationFactor::DEFAULT.get()
            );
            TessellationFactor::DEFAULT
        })
    }

    /// Vertical field of view, near and far plane, checked against what a perspective projection
    /// accepts: `0 < fov_y < 180` and `0 < z_near < z_far`. Invalid values fall back to the
    /// defaults with a warning.
    pub fn frustum(&self) -> (f32, f32, f32) {
        let defaults = Self::default();

        let fov_y = if self.fov_y.is_finite() && self.fov_y > 0.0 && self.fov_y < 180.0 {
            self.fov_y
        } else {
            log::warn!("fov_y {} is out of range, using {}", self.fov_y, defaults.fov_y);
            defaults.fov_y
        };

        let planes_valid = self.z_near.is_finite()
            && self.z_far.is_finite()
            && self.z_near > 0.0
            && self.z_near < self.z_far;
        let (z_near, z_far) = if planes_valid {
            (self.z_near, self.z_far)
        } else {
            log::warn!(
                "clip planes {}..{} are invalid, using {}..{}",
                self.z_near,
                self.z_far,
                defaults.z_near,
                defaults.z_far
            );
            (defaults.z_near, defaults.z_far)
        };

        (fov_y, z_near, z_far)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StagingConfig {
    /// Folder holding the resized working copies of every loaded image.
    pub temp_dir: PathBuf,
    /// Edge length every imported image is resized to.
    pub face_size: u32,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            temp_dir: PathBuf::from("temp_skybox_images"),
            face_size: 512,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    pub output_root: PathBuf,
    pub file_prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("."),
            file_prefix: "sky512_".to_string(),
        }
    }
}

impl PreviewConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Like [`PreviewConfig::load`], but a missing file means defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("no config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            result => result,
        }
    }
}
