use glam::{Vec3, Vec4};

use crate::texture::TextureError;

/// Number of geometry targets written by the geometry pass.
pub const NUM_GBUFFERS: usize = 3;

/// Geometry pass output consumed by the deferred shading pass.
///
/// The view-space position is split across the alpha channels:
/// ```text
/// target 0: normal.xyz    view.x
/// target 1: albedo.rgb    view.y
/// target 2: position.xyz  view.z
/// ```
#[derive(Clone, Debug)]
pub struct GBuffers {
    width: u32,
    height: u32,
    targets: [Vec<Vec4>; NUM_GBUFFERS],
}

/// Everything the shading pass needs from one pixel of the G-buffers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GBufferSample {
    pub normal: Vec3,
    pub albedo: Vec3,
    /// Same space as the light positions.
    pub position: Vec3,
    pub view_position: Vec3,
}

impl GBufferSample {
    pub fn pack(&self) -> [Vec4; NUM_GBUFFERS] {
        [
            self.normal.extend(self.view_position.x),
            self.albedo.extend(self.view_position.y),
            self.position.extend(self.view_position.z),
        ]
    }

    pub fn unpack(gb0: Vec4, gb1: Vec4, gb2: Vec4) -> Self {
        Self {
            normal: gb0.truncate(),
            albedo: gb1.truncate(),
            position: gb2.truncate(),
            view_position: Vec3::new(gb0.w, gb1.w, gb2.w),
        }
    }
}

impl GBuffers {
    pub fn new(width: u32, height: u32, targets: [Vec<Vec4>; NUM_GBUFFERS]) -> Result<Self, TextureError> {
        let expected = width as usize * height as usize;
        if expected == 0 {
            return Err(TextureError::Empty { width, height });
        }
        if let Some(bad) = targets.iter().find(|t| t.len() != expected) {
            return Err(TextureError::SizeMismatch {
                width,
                height,
                expected,
                actual: bad.len(),
            });
        }
        Ok(Self { width, height, targets })
    }

    /// Packs per-pixel samples (row-major) into the three targets.
    pub fn from_samples(width: u32, height: u32, samples: &[GBufferSample]) -> Result<Self, TextureError> {
        let mut targets: [Vec<Vec4>; NUM_GBUFFERS] = Default::default();
        for t in &mut targets {
            t.reserve(samples.len());
        }
        for sample in samples {
            for (target, value) in targets.iter_mut().zip(sample.pack()) {
                target.push(value);
            }
        }
        Self::new(width, height, targets)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn sample(&self, x: u32, y: u32) -> GBufferSample {
        let i = (y * self.width + x) as usize;
        GBufferSample::unpack(self.targets[0][i], self.targets[1][i], self.targets[2][i])
    }
}
