use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Light index slots in a cluster record `texture_height` texels tall. The
/// first of its `4 * texture_height` scalars holds the count.
pub const fn cluster_capacity(texture_height: u32) -> u32 {
    4 * texture_height - 1
}

/// How view space is partitioned into clusters, and how many light slots each
/// cluster record holds. Shared by whoever writes the cluster buffer and the
/// shading pass that reads it.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct ClusterSettings {
    pub x_slices: u32,
    pub y_slices: u32,
    pub z_slices: u32,
    pub max_lights_per_cluster: u32,
}

impl Default for ClusterSettings {
    fn default() -> Self {
        Self {
            x_slices: 15,
            y_slices: 15,
            z_slices: 15,
            max_lights_per_cluster: 100,
        }
    }
}

impl ClusterSettings {
    /// Number of cluster records, one per texel column of the cluster buffer.
    pub fn cluster_count(&self) -> u32 {
        self.x_slices * self.y_slices * self.z_slices
    }

    /// Texels per cluster record: one count slot plus the index slots, 4 per texel.
    pub fn texture_height(&self) -> u32 {
        (self.max_lights_per_cluster + 1).div_ceil(4)
    }

    /// Most light indices a single record can hold.
    pub fn capacity(&self) -> u32 {
        cluster_capacity(self.texture_height())
    }
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct CameraSettings {
    pub fov_degrees: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            aspect_ratio: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub num_lights: u32,
    /// 0 = one worker per core
    pub compute_threads: usize,
    pub camera: CameraSettings,
    pub clusters: ClusterSettings,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            num_lights: 100,
            compute_threads: 0,
            camera: CameraSettings::default(),
            clusters: ClusterSettings::default(),
        }
    }
}

impl RenderSettings {
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        log::debug!("Loading render settings from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Buffer shapes derived from these values are trusted by the shading
    /// loop, so everything is checked once here instead of per pixel.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let invalid =
            |msg: &str| -> Result<(), SettingsError> { Err(SettingsError::Invalid(msg.to_owned())) };

        if self.width == 0 || self.height == 0 {
            return invalid("output resolution must be non-zero");
        }
        if self.num_lights == 0 {
            return invalid("num_lights must be at least 1");
        }

        let c = &self.clusters;
        if c.x_slices == 0 || c.y_slices == 0 || c.z_slices == 0 {
            return invalid("slice counts must be non-zero");
        }
        if c.max_lights_per_cluster == 0 {
            return invalid("max_lights_per_cluster must be at least 1");
        }

        let cam = &self.camera;
        if !(cam.near > 0.0 && cam.near < cam.far) {
            return invalid("clip planes must satisfy 0 < near < far");
        }
        if !(cam.fov_degrees > 0.0 && cam.fov_degrees < 180.0) {
            return invalid("fov_degrees must be in (0, 180)");
        }
        if !(cam.aspect_ratio > 0.0) {
            return invalid("aspect_ratio must be positive");
        }

        Ok(())
    }
}
