use beacon_core::{Camera, ClusterSettings, FrustumExtents, cluster_capacity};
use glam::{IVec3, Vec3};

use crate::texture::{TexelBuffer, TextureError};

/// Linear view-depth slicing of the camera frustum into a 3D cluster grid.
#[derive(Clone, Copy, Debug)]
pub struct ClusterGrid {
    pub near: f32,
    pub far: f32,
    pub extents: FrustumExtents,
    pub x_slices: u32,
    pub y_slices: u32,
    pub z_slices: u32,
}

impl ClusterGrid {
    pub fn new(camera: &Camera, clusters: &ClusterSettings) -> Self {
        Self {
            near: camera.near,
            far: camera.far,
            extents: camera.frustum_extents(),
            x_slices: clusters.x_slices,
            y_slices: clusters.y_slices,
            z_slices: clusters.z_slices,
        }
    }

    /// Slice coordinates of the cell containing view-space point `view`.
    /// Points outside the sliced volume produce coordinates outside the grid.
    #[inline]
    pub fn slice_coords(&self, view: Vec3) -> IVec3 {
        let depth = view.z.abs();
        let proportion = (depth - self.near) / (self.far - self.near);

        let e = &self.extents;
        let slice_width = e.near_width + (e.far_width - e.near_width) * proportion;
        let slice_height = e.near_height + (e.far_height - e.near_height) * proportion;

        let x = ((view.x + 0.5 * slice_width) / (slice_width / self.x_slices as f32)).floor();
        let y = ((view.y + 0.5 * slice_height) / (slice_height / self.y_slices as f32)).floor();
        let z = ((depth - self.near) / ((self.far - self.near) / self.z_slices as f32)).floor();

        IVec3::new(x as i32, y as i32, z as i32)
    }

    /// Linear index `x + y * xs + z * xs * ys` without any range check.
    #[inline]
    pub fn raw_index(&self, coords: IVec3) -> i64 {
        let xs = self.x_slices as i64;
        let ys = self.y_slices as i64;
        coords.x as i64 + coords.y as i64 * xs + coords.z as i64 * xs * ys
    }

    /// Linear index of `coords`, or `None` if the cell is outside the grid.
    #[inline]
    pub fn linear_index(&self, coords: IVec3) -> Option<u32> {
        let inside = (0..self.x_slices as i32).contains(&coords.x)
            && (0..self.y_slices as i32).contains(&coords.y)
            && (0..self.z_slices as i32).contains(&coords.z);
        inside.then(|| self.raw_index(coords) as u32)
    }

    #[inline]
    pub fn cluster_index(&self, view: Vec3) -> Option<u32> {
        self.linear_index(self.slice_coords(view))
    }

    pub fn cluster_count(&self) -> u32 {
        self.x_slices * self.y_slices * self.z_slices
    }
}

/// Per-cluster light index lists, one record per texel column.
///
/// Component 0 of a record is the light count, components `1..=count` are
/// slots into the light buffer. Everything is stored as floats holding
/// exact integers.
#[derive(Clone, Debug)]
pub struct ClusterBuffer {
    texture: TexelBuffer,
}

impl ClusterBuffer {
    /// Zeroed buffer shaped for `settings` (every cluster starts empty).
    pub fn new(settings: &ClusterSettings) -> Result<Self, TextureError> {
        let texture = TexelBuffer::new(settings.cluster_count(), settings.texture_height())?;
        Ok(Self { texture })
    }

    pub fn from_texture(texture: TexelBuffer) -> Self {
        Self { texture }
    }

    pub fn texture(&self) -> &TexelBuffer {
        &self.texture
    }

    /// Light slots a record can hold: every component after the count.
    pub fn capacity(&self) -> u32 {
        cluster_capacity(self.texture.height())
    }

    /// Writes the light list of `cluster`, dropping whatever does not fit.
    /// Returns the number of slots stored.
    pub fn write_cluster(&mut self, cluster: u32, slots: &[u32]) -> u32 {
        let count = (slots.len() as u32).min(self.capacity());
        self.texture.write_float(cluster, 0, count as f32);
        for (position, &slot) in slots.iter().take(count as usize).enumerate() {
            self.texture.write_float(cluster, position as u32 + 1, slot as f32);
        }
        count
    }

    /// The encoded light count of `cluster`, before capping.
    #[inline]
    pub fn light_count(&self, cluster: u32) -> u32 {
        self.texture.extract_float(cluster, 0) as u32
    }

    /// Light slots assigned to `cluster`, at most `capacity()` of them.
    #[inline]
    pub fn lights(&self, cluster: u32) -> ClusterLights<'_> {
        let count = self.light_count(cluster);
        ClusterLights {
            texture: &self.texture,
            cluster,
            position: 1,
            last: count.min(self.capacity()),
        }
    }
}

/// Iterator over one cluster's light slots. Never reads past the stored count.
pub struct ClusterLights<'a> {
    texture: &'a TexelBuffer,
    cluster: u32,
    position: u32,
    last: u32,
}

impl Iterator for ClusterLights<'_> {
    type Item = u32;

    #[inline]
    fn next(&mut self) -> Option<u32> {
        if self.position > self.last {
            return None;
        }
        let slot = self.texture.extract_float(self.cluster, self.position) as u32;
        self.position += 1;
        Some(slot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.last + 1).saturating_sub(self.position) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ClusterLights<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> ClusterGrid {
        ClusterGrid {
            near: 1.0,
            far: 11.0,
            extents: FrustumExtents {
                near_width: 2.0,
                near_height: 1.0,
                far_width: 22.0,
                far_height: 11.0,
            },
            x_slices: 4,
            y_slices: 2,
            z_slices: 5,
        }
    }

    fn small_settings() -> ClusterSettings {
        ClusterSettings {
            x_slices: 2,
            y_slices: 2,
            z_slices: 2,
            max_lights_per_cluster: 6, // 2 texels, capacity 7
        }
    }

    #[test]
    fn test_frustum_center_near_plane() {
        let grid = grid();
        // Dead center maps to the middle column/row boundary, first depth slice
        assert_eq!(grid.slice_coords(Vec3::new(0.0, 0.0, -1.0)), IVec3::new(2, 1, 0));
        assert_eq!(grid.cluster_index(Vec3::new(0.0, 0.0, -1.0)), Some(2 + 4));
    }

    #[test]
    fn test_slices_follow_depth() {
        let grid = grid();
        // Halfway: slice width 12, height 6, depth slice 2 of 5
        let coords = grid.slice_coords(Vec3::new(-5.9, 2.9, -6.0));
        assert_eq!(coords, IVec3::new(0, 1, 2));
        assert_eq!(grid.cluster_index(Vec3::new(-5.9, 2.9, -6.0)), Some(0 + 4 + 2 * 8));
    }

    #[test]
    fn test_depth_sign_is_ignored() {
        let grid = grid();
        let a = grid.slice_coords(Vec3::new(0.3, -0.2, -7.5));
        let b = grid.slice_coords(Vec3::new(0.3, -0.2, 7.5));
        assert_eq!(a, b);
    }

    #[test]
    fn test_outside_volume_is_guarded() {
        let grid = grid();
        // Beyond the far plane
        let far = Vec3::new(0.0, 0.0, -20.0);
        assert_eq!(grid.slice_coords(far).z, 9);
        assert_eq!(grid.cluster_index(far), None);
        // Left of the frustum
        let left = Vec3::new(-8.0, 0.0, -6.0);
        assert!(grid.slice_coords(left).x < 0);
        assert_eq!(grid.cluster_index(left), None);
        // The unguarded index is still computed
        assert_eq!(grid.raw_index(IVec3::new(0, 0, 9)), 72);
    }

    #[test]
    fn test_every_cell_center_resolves_to_itself() {
        let grid = grid();
        for z in 0..5 {
            let depth = 1.0 + (z as f32 + 0.5) * 2.0;
            let proportion = (depth - 1.0) / 10.0;
            let width = 2.0 + 20.0 * proportion;
            let height = 1.0 + 10.0 * proportion;
            for y in 0..2 {
                for x in 0..4 {
                    let view = Vec3::new(
                        -0.5 * width + (x as f32 + 0.5) * width / 4.0,
                        -0.5 * height + (y as f32 + 0.5) * height / 2.0,
                        -depth,
                    );
                    assert_eq!(grid.cluster_index(view), Some(x + y * 4 + z * 8));
                }
            }
        }
    }

    #[test]
    fn test_list_roundtrip() {
        let mut buffer = ClusterBuffer::new(&small_settings()).unwrap();
        assert_eq!(buffer.capacity(), 7);

        assert_eq!(buffer.write_cluster(3, &[4, 9, 2]), 3);
        assert_eq!(buffer.light_count(3), 3);
        assert_eq!(buffer.lights(3).collect::<Vec<_>>(), vec![4, 9, 2]);

        // Neighbours untouched
        assert_eq!(buffer.lights(2).count(), 0);
        assert_eq!(buffer.lights(4).count(), 0);
    }

    #[test]
    fn test_buffer_capacity_matches_settings() {
        for max in 1..40 {
            let settings = ClusterSettings {
                max_lights_per_cluster: max,
                ..small_settings()
            };
            let buffer = ClusterBuffer::new(&settings).unwrap();
            assert_eq!(buffer.capacity(), settings.capacity(), "max {max}");
            assert!(buffer.capacity() >= max);
        }
    }

    #[test]
    fn test_writer_caps_to_capacity() {
        let mut buffer = ClusterBuffer::new(&small_settings()).unwrap();
        let slots: Vec<u32> = (10..30).collect();
        assert_eq!(buffer.write_cluster(0, &slots), 7);
        assert_eq!(buffer.lights(0).collect::<Vec<_>>(), (10..17).collect::<Vec<_>>());
    }

    #[test]
    fn test_oversized_count_is_capped() {
        let settings = small_settings();
        let mut texture = TexelBuffer::new(settings.cluster_count(), settings.texture_height()).unwrap();
        texture.write_float(1, 0, 1000.0);
        for position in 1..8 {
            texture.write_float(1, position, position as f32 * 2.0);
        }
        let buffer = ClusterBuffer::from_texture(texture);

        assert_eq!(buffer.light_count(1), 1000);
        let lights = buffer.lights(1);
        assert_eq!(lights.len(), 7);
        assert_eq!(lights.collect::<Vec<_>>(), vec![2, 4, 6, 8, 10, 12, 14]);
    }

    #[test]
    fn test_stops_at_count() {
        let settings = small_settings();
        let mut texture = TexelBuffer::new(settings.cluster_count(), settings.texture_height()).unwrap();
        texture.write_float(5, 0, 2.0);
        // Stale entries past the count must never be yielded
        for position in 1..8 {
            texture.write_float(5, position, 40.0 + position as f32);
        }
        let buffer = ClusterBuffer::from_texture(texture);

        let mut lights = buffer.lights(5);
        assert_eq!(lights.len(), 2);
        assert_eq!(lights.next(), Some(41));
        assert_eq!(lights.next(), Some(42));
        assert_eq!(lights.next(), None);
        assert_eq!(lights.next(), None);
    }

    #[test]
    fn test_negative_count_reads_nothing() {
        let settings = small_settings();
        let mut texture = TexelBuffer::new(settings.cluster_count(), settings.texture_height()).unwrap();
        texture.write_float(0, 0, -3.0);
        let buffer = ClusterBuffer::from_texture(texture);
        assert_eq!(buffer.lights(0).count(), 0);
    }

    #[test]
    fn test_slot_floats_truncate() {
        let settings = small_settings();
        let mut texture = TexelBuffer::new(settings.cluster_count(), settings.texture_height()).unwrap();
        texture.write_float(0, 0, 1.0);
        texture.write_float(0, 1, 12.0);
        let buffer = ClusterBuffer::from_texture(texture);
        assert_eq!(buffer.lights(0).next(), Some(12));
    }
}
