//! Stand-ins for the stages around the shading pass: a ray-cast "geometry
//! pass" over a small room, light placement, and a conservative
//! light-to-cluster assignment that writes the two packed buffers.

use beacon_core::{Camera, RenderSettings};
use beacon_renderer::{ClusterBuffer, ClusterGrid, GBufferSample, GBuffers, PointLight, TextureError};
use glam::{IVec3, Vec3};

struct Plane {
    normal: Vec3,
    offset: f32, // dot(point, normal) for any point on the plane
    albedo: fn(Vec3) -> Vec3,
}

fn checker(p: Vec3) -> Vec3 {
    let cell = (p.x.floor() as i32 + p.z.floor() as i32).rem_euclid(2);
    if cell == 0 { Vec3::splat(0.9) } else { Vec3::splat(0.35) }
}

fn plaster(_: Vec3) -> Vec3 {
    Vec3::new(0.8, 0.75, 0.7)
}

fn red(_: Vec3) -> Vec3 {
    Vec3::new(0.7, 0.2, 0.2)
}

fn green(_: Vec3) -> Vec3 {
    Vec3::new(0.2, 0.7, 0.2)
}

const ROOM: [Plane; 4] = [
    // Floor
    Plane { normal: Vec3::Y, offset: -2.0, albedo: checker },
    // Back wall
    Plane { normal: Vec3::Z, offset: -40.0, albedo: plaster },
    // Left / right walls
    Plane { normal: Vec3::X, offset: -15.0, albedo: red },
    Plane { normal: Vec3::NEG_X, offset: -15.0, albedo: green },
];

/// Ray-casts the room from a camera at the origin looking down -Z.
/// View space and world space coincide, so positions double as view positions.
pub fn build_gbuffers(settings: &RenderSettings, camera: &Camera) -> Result<GBuffers, TextureError> {
    let (width, height) = (settings.width, settings.height);
    let tan_half = (camera.fov * 0.5).tan();

    let mut samples = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        for x in 0..width {
            let ndc_x = 2.0 * (x as f32 + 0.5) / width as f32 - 1.0;
            let ndc_y = 1.0 - 2.0 * (y as f32 + 0.5) / height as f32;
            let dir = Vec3::new(ndc_x * tan_half * camera.aspect_ratio, ndc_y * tan_half, -1.0);

            let hit = ROOM
                .iter()
                .filter_map(|plane| {
                    let denom = dir.dot(plane.normal);
                    let t = plane.offset / denom;
                    (denom < 0.0 && t > 0.0).then_some((t, plane))
                })
                .min_by(|a, b| a.0.total_cmp(&b.0));

            samples.push(match hit {
                Some((t, plane)) => {
                    let position = dir * t;
                    GBufferSample {
                        normal: plane.normal,
                        albedo: (plane.albedo)(position),
                        position,
                        view_position: position,
                    }
                }
                // Nothing hit: push it behind the far plane so it gets no cluster
                None => GBufferSample {
                    normal: Vec3::Z,
                    albedo: Vec3::ZERO,
                    position: Vec3::ZERO,
                    view_position: Vec3::new(0.0, 0.0, -2.0 * camera.far),
                },
            });
        }
    }

    GBuffers::from_samples(width, height, &samples)
}

/// Lays `count` lights out on a grid hovering over the floor.
pub fn place_lights(count: u32) -> Vec<PointLight> {
    let columns = (count as f32).sqrt().ceil().max(1.0) as u32;
    let rows = count.div_ceil(columns);

    (0..count)
        .map(|i| {
            let (col, row) = (i % columns, i / columns);
            let fx = (col as f32 + 0.5) / columns as f32;
            let fz = (row as f32 + 0.5) / rows as f32;
            PointLight {
                position: Vec3::new(-13.0 + 26.0 * fx, -1.0, -5.0 - 32.0 * fz),
                radius: 5.0,
                color: hue(i as f32 * 0.618_034),
            }
        })
        .collect()
}

/// Fully saturated color at hue `t` (wraps every 1.0).
fn hue(t: f32) -> Vec3 {
    let h = t.fract() * 6.0;
    Vec3::new(
        (h - 3.0).abs() - 1.0,
        2.0 - (h - 2.0).abs(),
        2.0 - (h - 4.0).abs(),
    )
    .clamp(Vec3::ZERO, Vec3::ONE)
}

/// Writes each light into every cluster its bounding box touches.
/// Clusters collecting more lights than fit keep the first ones.
pub fn assign_lights(
    grid: &ClusterGrid,
    buffer: &mut ClusterBuffer,
    lights: &[PointLight],
) -> usize {
    let mut lists: Vec<Vec<u32>> = vec![Vec::new(); grid.cluster_count() as usize];

    for (slot, light) in lights.iter().enumerate() {
        let r = Vec3::splat(light.radius);
        let (lo, hi) = (light.position - r, light.position + r);

        let mut min = IVec3::MAX;
        let mut max = IVec3::MIN;
        for corner in 0..8 {
            let p = Vec3::new(
                if corner & 1 == 0 { lo.x } else { hi.x },
                if corner & 2 == 0 { lo.y } else { hi.y },
                if corner & 4 == 0 { lo.z } else { hi.z },
            );
            let coords = grid.slice_coords(p);
            min = min.min(coords);
            max = max.max(coords);
        }

        let upper = IVec3::new(grid.x_slices as i32, grid.y_slices as i32, grid.z_slices as i32) - 1;
        let min = min.clamp(IVec3::ZERO, upper);
        let max = max.clamp(IVec3::ZERO, upper);

        for z in min.z..=max.z {
            for y in min.y..=max.y {
                for x in min.x..=max.x {
                    if let Some(cluster) = grid.linear_index(IVec3::new(x, y, z)) {
                        lists[cluster as usize].push(slot as u32);
                    }
                }
            }
        }
    }

    let mut dropped = 0;
    for (cluster, list) in lists.iter().enumerate() {
        let stored = buffer.write_cluster(cluster as u32, list);
        dropped += list.len() - stored as usize;
    }
    dropped
}
