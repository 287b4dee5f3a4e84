use beacon_core::{Camera, RenderSettings};
use glam::Vec3;

use crate::cluster::ClusterGrid;

/// Per-frame constants shared by every pixel of the deferred pass.
#[derive(Copy, Clone, Debug)]
pub struct ShadingUniforms {
    /// Clip planes, frustum extents and slice counts.
    pub grid: ClusterGrid,
    /// Added to the light direction before normalizing into the half vector.
    pub eye_position: Vec3,
}

impl ShadingUniforms {
    pub fn new(camera: &Camera, settings: &RenderSettings, eye_position: Vec3) -> Self {
        Self {
            grid: ClusterGrid::new(camera, &settings.clusters),
            eye_position,
        }
    }
}
