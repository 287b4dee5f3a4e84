use glam::{Vec3, Vec4};

use crate::{
    cluster::ClusterBuffer,
    gbuffer::GBufferSample,
    global_uniform::ShadingUniforms,
    light::{LightBuffer, PointLight},
};

/// Constant ambient term, scaled by albedo.
pub const AMBIENT_LIGHT: Vec3 = Vec3::splat(0.025);

pub const SPECULAR_EXPONENT: f32 = 64.0;

/// Cubic approximation of a gaussian over `h = 2 * distance / radius`.
///
/// Falls off smoothly to exactly 0 at `h = 2` (distance == radius) and stays
/// there, so lights never leak past their radius.
#[inline]
pub fn cubic_gaussian(h: f32) -> f32 {
    if h < 1.0 {
        0.25 * (2.0 - h).powi(3) - (1.0 - h).powi(3)
    } else if h < 2.0 {
        0.25 * (2.0 - h).powi(3)
    } else {
        0.0
    }
}

/// Diffuse + specular contribution of one light at one surface point.
#[inline]
pub fn light_contribution(light: &PointLight, sample: &GBufferSample, eye_position: Vec3) -> Vec3 {
    let to_light = light.position - sample.position;
    let distance = to_light.length();
    // Zero when the light sits exactly on the surface point
    let light_dir = to_light.normalize_or_zero();

    let half = ((light_dir + eye_position) / 2.0).normalize_or_zero();
    let spec = sample.normal.dot(half).max(0.0).powf(SPECULAR_EXPONENT);

    let lambert = light_dir.dot(sample.normal).max(0.0) + spec;
    let intensity = cubic_gaussian(2.0 * distance / light.radius);

    sample.albedo * lambert * light.color * intensity
}

/// Final color of one pixel: every light of its cluster plus ambient.
///
/// Pixels outside the sliced volume have no cluster and only get ambient.
/// Output is not clamped or tone mapped.
#[inline]
pub fn shade(
    sample: &GBufferSample,
    clusters: &ClusterBuffer,
    lights: &LightBuffer,
    uniforms: &ShadingUniforms,
) -> Vec4 {
    let mut color = Vec3::ZERO;

    if let Some(cluster) = uniforms.grid.cluster_index(sample.view_position) {
        for slot in clusters.lights(cluster) {
            let light = lights.unpack(slot);
            color += light_contribution(&light, sample, uniforms.eye_position);
        }
    }

    color += sample.albedo * AMBIENT_LIGHT;
    color.extend(1.0)
}
