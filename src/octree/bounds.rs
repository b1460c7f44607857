//! Integer node bounds in finest-voxel units.

use glam::{IVec3, Vec3};

/// Inclusive axis-aligned box on the finest voxel lattice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoxelBounds {
  /// Minimum corner (inclusive).
  pub min: IVec3,
  /// Maximum corner (inclusive).
  pub max: IVec3,
}

impl VoxelBounds {
  pub fn new(min: IVec3, max: IVec3) -> Self {
    Self { min, max }
  }

  /// Cube of `extent` voxels centered on `center`.
  pub fn from_center_extent(center: IVec3, extent: i32) -> Self {
    let half = extent >> 1;
    Self {
      min: center - IVec3::splat(half),
      max: center - IVec3::splat(half) + IVec3::splat(extent),
    }
  }

  /// An inverted box contains nothing.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.min.cmpgt(self.max).any()
  }

  /// Boundary contact counts as intersection.
  #[inline]
  pub fn intersects(&self, other: &VoxelBounds) -> bool {
    !self.is_empty()
      && !other.is_empty()
      && self.min.cmple(other.max).all()
      && self.max.cmpge(other.min).all()
  }

  #[inline]
  pub fn contains_point(&self, point: IVec3) -> bool {
    self.min.cmple(point).all() && self.max.cmpge(point).all()
  }

  /// World-space corners.
  #[inline]
  pub fn to_world(&self, voxel_size: f32) -> (Vec3, Vec3) {
    (self.min.as_vec3() * voxel_size, self.max.as_vec3() * voxel_size)
  }

  /// Distance from a world-space point to the closest point of the box;
  /// zero inside.
  pub fn distance_to_point(&self, point: Vec3, voxel_size: f32) -> f32 {
    let (min, max) = self.to_world(voxel_size);
    point.clamp(min, max).distance(point)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_from_center_extent() {
    let bounds = VoxelBounds::from_center_extent(IVec3::new(16, 0, -16), 32);
    assert_eq!(bounds.min, IVec3::new(0, -16, -32));
    assert_eq!(bounds.max, IVec3::new(32, 16, 0));

    // Odd extents keep the brush footprint convention: min = center - (m >> 1).
    let odd = VoxelBounds::from_center_extent(IVec3::ZERO, 5);
    assert_eq!(odd.min, IVec3::splat(-2));
    assert_eq!(odd.max, IVec3::splat(3));
  }

  #[test]
  fn test_intersects_touching() {
    let a = VoxelBounds::new(IVec3::ZERO, IVec3::splat(10));
    let b = VoxelBounds::new(IVec3::splat(10), IVec3::splat(20));
    let c = VoxelBounds::new(IVec3::splat(11), IVec3::splat(20));
    assert!(a.intersects(&b));
    assert!(b.intersects(&a));
    assert!(!a.intersects(&c));
  }

  #[test]
  fn test_negative_extent_is_empty() {
    let query = VoxelBounds::from_center_extent(IVec3::ZERO, -4);
    let node = VoxelBounds::new(IVec3::splat(-100), IVec3::splat(100));
    assert!(query.is_empty());
    assert!(!node.intersects(&query));
  }

  #[test]
  fn test_distance_to_point() {
    let bounds = VoxelBounds::new(IVec3::ZERO, IVec3::splat(10));
    assert_eq!(bounds.distance_to_point(Vec3::splat(5.0), 1.0), 0.0);
    assert_eq!(bounds.distance_to_point(Vec3::new(13.0, 5.0, 5.0), 1.0), 3.0);
    // Voxel size scales the box, not the query point.
    assert_eq!(bounds.distance_to_point(Vec3::new(26.0, 5.0, 5.0), 2.0), 6.0);
  }

  #[test]
  fn test_contains_point() {
    let bounds = VoxelBounds::new(IVec3::ZERO, IVec3::splat(10));
    assert!(bounds.contains_point(IVec3::ZERO));
    assert!(bounds.contains_point(IVec3::splat(10)));
    assert!(!bounds.contains_point(IVec3::new(11, 0, 0)));
  }
}
