//! Additive brush operator.
//!
//! Brush and field lattices are placed independently in finest-voxel units:
//!
//! ```text
//! brush_min = hit - (M >> 1)             brush point j at brush_min + j
//! field_min = center - ((N >> 1) << lod) field point i at field_min + i * stride
//!
//! field[i] += amount * brush[field_min + i * stride - brush_min]
//!             for every i whose brush index lies in [0, M]^3
//! ```
//!
//! A coarse field picks every `stride`-th brush sample, so the same edit
//! applied to every LOD of a region agrees wherever the lattices coincide.

use glam::{IVec3, Vec3};

use super::Brush;
use crate::compute::{ComputeBackend, ComputeOp};
use crate::density::{DensityField, FieldLayout};

/// Voxel cell containing a world point.
#[inline]
pub fn hit_coord(point: Vec3, voxel_size: f32) -> IVec3 {
  (point / voxel_size).floor().as_ivec3()
}

/// Inclusive range of field lattice indices covered by a brush box, or
/// `None` when the box misses every sample.
pub fn footprint(
  layout: &FieldLayout,
  hit: IVec3,
  brush_voxels: usize,
) -> Option<([usize; 3], [usize; 3])> {
  let brush_min = hit - IVec3::splat((brush_voxels >> 1) as i32);
  let brush_max = brush_min + IVec3::splat(brush_voxels as i32);
  let field_min = layout.min_coord();
  let stride = layout.stride();
  let last = layout.voxels_per_axis as i32;

  let mut lo = [0usize; 3];
  let mut hi = [0usize; 3];
  for axis in 0..3 {
    // ceil / floor of the box ends in lattice steps.
    let first = -(field_min[axis] - brush_min[axis]).div_euclid(stride);
    let end = (brush_max[axis] - field_min[axis]).div_euclid(stride);
    let (first, end) = (first.max(0), end.min(last));
    if first > end {
      return None;
    }
    lo[axis] = first as usize;
    hi[axis] = end as usize;
  }
  Some((lo, hi))
}

/// Stamp `amount * brush` into a field. Returns `false`, leaving the field
/// untouched, when the brush misses it.
pub fn apply_brush(
  backend: &dyn ComputeBackend,
  layout: &FieldLayout,
  field: &mut DensityField,
  brush: &Brush,
  hit: IVec3,
  amount: f32,
) -> bool {
  let m = brush.voxels_per_axis();
  let Some((lo, hi)) = footprint(layout, hit, m) else {
    return false;
  };

  let brush_min = hit - IVec3::splat((m >> 1) as i32);
  let points = field.points_per_axis();
  backend.update_points(ComputeOp::ApplyBrush, [points; 3], field.samples_mut(), &|p, value| {
    if (0..3).any(|a| p[a] < lo[a] || p[a] > hi[a]) {
      return value;
    }
    let j = layout.point_coord(p) - brush_min;
    value + amount * brush.get(j.x as usize, j.y as usize, j.z as usize)
  });
  true
}

#[cfg(test)]
#[path = "stamp_test.rs"]
mod stamp_test;
