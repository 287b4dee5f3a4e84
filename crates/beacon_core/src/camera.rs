use crate::settings::CameraSettings;

#[derive(Clone, Debug)]
pub struct Camera {
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov: 45.0f32.to_radians(),
            aspect_ratio: 16.0 / 9.0, // Standard monitor
            near: 0.1,
            far: 100.0,
        }
    }
}

/// Width and height of the view frustum cross-section at the clip planes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrustumExtents {
    pub near_width: f32,
    pub near_height: f32,
    pub far_width: f32,
    pub far_height: f32,
}

impl From<&CameraSettings> for Camera {
    fn from(settings: &CameraSettings) -> Self {
        Self {
            fov: settings.fov_degrees.to_radians(),
            aspect_ratio: settings.aspect_ratio,
            near: settings.near,
            far: settings.far,
        }
    }
}

impl Camera {
    /// Height of the frustum slice at view distance `depth`.
    pub fn height_at(&self, depth: f32) -> f32 {
        2.0 * depth * (self.fov * 0.5).tan()
    }

    pub fn width_at(&self, depth: f32) -> f32 {
        self.height_at(depth) * self.aspect_ratio
    }

    pub fn frustum_extents(&self) -> FrustumExtents {
        FrustumExtents {
            near_width: self.width_at(self.near),
            near_height: self.height_at(self.near),
            far_width: self.width_at(self.far),
            far_height: self.height_at(self.far),
        }
    }
}
