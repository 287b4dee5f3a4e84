use std::time::Instant;

use beacon_core::{Camera, RenderSettings, rayon::prelude::*};
use glam::{Vec3, Vec4};

use crate::{
    cluster::ClusterBuffer,
    gbuffer::GBuffers,
    global_uniform::ShadingUniforms,
    light::LightBuffer,
    shading::shade,
};

/// Shaded output of one deferred pass. Values are linear and unclamped.
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Vec4>, // row-major
}

impl Frame {
    pub fn pixel(&self, x: u32, y: u32) -> Vec4 {
        self.pixels[(y * self.width + x) as usize]
    }

    /// 8-bit RGBA for display or export. Clamps here, never in the pass.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|p| {
                p.clamp(Vec4::ZERO, Vec4::ONE)
                    .to_array()
                    .map(|c| (c * 255.0).round() as u8)
            })
            .collect()
    }
}

/// The clustered deferred shading pass.
///
/// Holds only per-frame constants; the G-buffers and the light/cluster
/// buffers are borrowed read-only for the duration of `render`.
pub struct DeferredPass {
    pub uniforms: ShadingUniforms,
}

impl DeferredPass {
    pub fn new(uniforms: ShadingUniforms) -> Self {
        Self { uniforms }
    }

    pub fn from_settings(settings: &RenderSettings, eye_position: Vec3) -> Self {
        let camera = Camera::from(&settings.camera);
        Self::new(ShadingUniforms::new(&camera, settings, eye_position))
    }

    /// Shades every pixel. Rows are independent and run in parallel.
    pub fn render(&self, gbuffers: &GBuffers, clusters: &ClusterBuffer, lights: &LightBuffer) -> Frame {
        let width = gbuffers.width();
        let height = gbuffers.height();
        let started = Instant::now();

        let mut pixels = vec![Vec4::ZERO; width as usize * height as usize];
        pixels
            .par_chunks_mut(width as usize)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, out) in row.iter_mut().enumerate() {
                    let sample = gbuffers.sample(x as u32, y as u32);
                    *out = shade(&sample, clusters, lights, &self.uniforms);
                }
            });

        log::debug!(
            "Shaded {}x{} pixels against {} lights in {:.2?}",
            width,
            height,
            lights.num_lights(),
            started.elapsed()
        );

        Frame { width, height, pixels }
    }
}

#[cfg(test)]
mod tests {
    use beacon_core::ClusterSettings;

    use super::*;
    use crate::{gbuffer::GBufferSample, light::PointLight};

    fn settings() -> RenderSettings {
        let mut settings = RenderSettings::default();
        settings.width = 16;
        settings.height = 8;
        settings.camera.far = 50.0;
        settings.clusters = ClusterSettings {
            x_slices: 4,
            y_slices: 4,
            z_slices: 4,
            max_lights_per_cluster: 7,
        };
        settings
    }

    fn flat_wall(width: u32, height: u32, depth: f32) -> GBuffers {
        let samples: Vec<GBufferSample> = (0..height)
            .flat_map(|y| {
                (0..width).map(move |x| {
                    let view = Vec3::new(x as f32 * 0.1 - 0.8, y as f32 * 0.1 - 0.4, -depth);
                    GBufferSample {
                        normal: Vec3::Z,
                        albedo: Vec3::ONE,
                        position: view,
                        view_position: view,
                    }
                })
            })
            .collect();
        GBuffers::from_samples(width, height, &samples).unwrap()
    }

    #[test]
    fn test_empty_clusters_render_ambient() {
        let settings = settings();
        let pass = DeferredPass::from_settings(&settings, Vec3::ZERO);
        let lights = LightBuffer::encode(&[PointLight {
            position: Vec3::new(0.0, 0.0, -5.0),
            radius: 10.0,
            color: Vec3::ONE,
        }])
        .unwrap();
        let clusters = ClusterBuffer::new(&settings.clusters).unwrap();

        let frame = pass.render(&flat_wall(16, 8, 6.0), &clusters, &lights);
        assert_eq!(frame.pixels.len(), 128);
        assert!(frame.pixels.iter().all(|p| *p == Vec4::new(0.025, 0.025, 0.025, 1.0)));
    }

    #[test]
    fn test_parallel_matches_serial() {
        let settings = settings();
        let pass = DeferredPass::from_settings(&settings, Vec3::new(0.0, 0.0, 1.0));
        let lights = LightBuffer::encode(&[
            PointLight {
                position: Vec3::new(-0.3, 0.0, -5.5),
                radius: 3.0,
                color: Vec3::new(1.0, 0.2, 0.2),
            },
            PointLight {
                position: Vec3::new(0.4, 0.1, -5.0),
                radius: 2.0,
                color: Vec3::new(0.1, 0.1, 1.0),
            },
        ])
        .unwrap();

        // Every cluster sees both lights
        let mut clusters = ClusterBuffer::new(&settings.clusters).unwrap();
        for cluster in 0..settings.clusters.cluster_count() {
            clusters.write_cluster(cluster, &[0, 1]);
        }

        let gbuffers = flat_wall(16, 8, 6.0);
        let frame = pass.render(&gbuffers, &clusters, &lights);

        for y in 0..8 {
            for x in 0..16 {
                let expected = shade(&gbuffers.sample(x, y), &clusters, &lights, &pass.uniforms);
                assert_eq!(frame.pixel(x, y), expected);
            }
        }
        assert!(frame.pixels.iter().any(|p| p.x > 0.1));
    }

    #[test]
    fn test_rgba8_clamps_for_export_only() {
        let frame = Frame {
            width: 2,
            height: 1,
            pixels: vec![Vec4::new(2.0, 0.5, -1.0, 1.0), Vec4::new(0.0, 1.0, 0.25, 1.0)],
        };
        assert_eq!(frame.to_rgba8(), vec![255, 128, 0, 255, 0, 255, 64, 255]);
        assert_eq!(frame.pixel(0, 0).x, 2.0);
    }
}
