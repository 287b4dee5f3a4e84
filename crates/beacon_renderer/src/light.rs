use glam::Vec3;

use crate::texture::{TexelBuffer, TextureError};

/// Texels per light record: position + radius, then color.
pub const LIGHT_TEXELS: u32 = 2;

// Normalized row coordinates of the two texels of a light record.
const POSITION_ROW: f64 = 0.3;
const COLOR_ROW: f64 = 0.6;

// Scalar component holding the radius (w of the position texel).
const RADIUS_COMPONENT: u32 = 3;

/// A decoded point light. Only lives for the duration of one pixel's shading.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    /// Contribution reaches zero at this distance.
    pub radius: f32,
    pub color: Vec3,
}

/// The packed light list: one column per light, `LIGHT_TEXELS` rows.
///
/// ```text
/// row 0: position.x  position.y  position.z  radius
/// row 1: color.r     color.g     color.b     (unused)
/// ```
#[derive(Clone, Debug)]
pub struct LightBuffer {
    texture: TexelBuffer,
}

impl LightBuffer {
    pub fn from_texture(texture: TexelBuffer) -> Result<Self, TextureError> {
        if texture.height() != LIGHT_TEXELS {
            return Err(TextureError::Height {
                expected: LIGHT_TEXELS,
                actual: texture.height(),
            });
        }
        Ok(Self { texture })
    }

    /// Packs `lights` into a fresh buffer. Upstream side of the layout.
    pub fn encode(lights: &[PointLight]) -> Result<Self, TextureError> {
        let mut texture = TexelBuffer::new(lights.len() as u32, LIGHT_TEXELS)?;
        for (slot, light) in lights.iter().enumerate() {
            let slot = slot as u32;
            let values = [
                light.position.x,
                light.position.y,
                light.position.z,
                light.radius,
                light.color.x,
                light.color.y,
                light.color.z,
                0.0,
            ];
            for (component, value) in values.into_iter().enumerate() {
                texture.write_float(slot, component as u32, value);
            }
        }
        Ok(Self { texture })
    }

    pub fn num_lights(&self) -> u32 {
        self.texture.width()
    }

    pub fn texture(&self) -> &TexelBuffer {
        &self.texture
    }

    /// Decodes the light stored in `slot`.
    #[inline]
    pub fn unpack(&self, slot: u32) -> PointLight {
        debug_assert!(slot < self.num_lights(), "light slot {slot} out of range");

        let u = (slot as f64 + 1.0) / (self.num_lights() as f64 + 1.0);
        let v1 = self.texture.sample(u, POSITION_ROW);
        let v2 = self.texture.sample(u, COLOR_ROW);

        // The radius sits right there in v1.w; the extractor reads the same
        // float through the generic record addressing.
        let radius = self.texture.extract_float(slot, RADIUS_COMPONENT);

        PointLight {
            position: Vec3::new(v1[0], v1[1], v1[2]),
            radius,
            color: Vec3::new(v2[0], v2[1], v2[2]),
        }
    }
}
