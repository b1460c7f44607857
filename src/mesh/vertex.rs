//! Cell corners, gradients and edge interpolation.
//!
//! Every mesher builds its vertices through these functions, so a vertex on
//! an edge shared by two cells (regular/regular, regular/transition, or
//! transition/finer regular) is computed from the same inputs in the same
//! order and comes out bit-identical.

use glam::{IVec3, Vec3};

use crate::density::{DensityField, FieldLayout};
use crate::octree::LodMask;
use crate::types::Vertex;

/// One cell vertex with everything interpolation needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Corner {
  /// Finest-voxel lattice coordinate; orders edge endpoints.
  pub lattice: IVec3,
  /// World position, after transition compression.
  pub position: Vec3,
  pub value: f32,
  /// Density gradient in lattice steps of the source field.
  pub gradient: Vec3,
}

impl Corner {
  /// Corner read from a field at a lattice point.
  #[inline]
  pub fn from_field(
    layout: &FieldLayout,
    field: &DensityField,
    point: [usize; 3],
    position: Vec3,
  ) -> Self {
    Self {
      lattice: layout.point_coord(point),
      position,
      value: field.get(point[0], point[1], point[2]),
      gradient: gradient(field, point),
    }
  }
}

/// Central-difference gradient, one-sided on the field boundary.
pub fn gradient(field: &DensityField, point: [usize; 3]) -> Vec3 {
  let last = field.points_per_axis() - 1;
  let mut g = Vec3::ZERO;
  for axis in 0..3 {
    let mut lo = point;
    let mut hi = point;
    if point[axis] > 0 {
      lo[axis] -= 1;
    }
    if point[axis] < last {
      hi[axis] += 1;
    }
    let steps = (hi[axis] - lo[axis]) as f32;
    if steps > 0.0 {
      g[axis] = (field.get(hi[0], hi[1], hi[2]) - field.get(lo[0], lo[1], lo[2])) / steps;
    }
  }
  g
}

/// World position of a lattice point, pulled inward by `width` along every
/// flagged face the point lies on.
pub fn compressed_position(
  layout: &FieldLayout,
  point: [usize; 3],
  mask: LodMask,
  width: f32,
  voxel_size: f32,
) -> Vec3 {
  let mut position = layout.point_coord(point).as_vec3() * voxel_size;
  for face in mask.iter() {
    let axis = face.axis();
    let boundary = if face.is_positive() {
      layout.voxels_per_axis
    } else {
      0
    };
    if point[axis] == boundary {
      position[axis] -= face.sign() as f32 * width;
    }
  }
  position
}

/// Iso-crossing on the edge `a`-`b`.
///
/// Endpoints are ordered by lattice coordinate before interpolating. Equal
/// densities take the midpoint; a vanishing gradient falls back to the edge
/// direction from the inside endpoint to the outside one.
pub fn edge_vertex(a: &Corner, b: &Corner, iso_level: f32) -> Vertex {
  let (c0, c1) = if a.lattice.to_array() <= b.lattice.to_array() {
    (a, b)
  } else {
    (b, a)
  };

  let t = if c0.value == c1.value {
    0.5
  } else {
    ((iso_level - c0.value) / (c1.value - c0.value)).clamp(0.0, 1.0)
  };

  let position = c0.position + (c1.position - c0.position) * t;
  let normal = (c0.gradient + (c1.gradient - c0.gradient) * t)
    .try_normalize()
    .or_else(|| {
      let (inside, outside) = if c0.value < iso_level { (c0, c1) } else { (c1, c0) };
      (outside.position - inside.position).try_normalize()
    })
    .unwrap_or(Vec3::Y);

  Vertex {
    position: position.to_array(),
    normal: normal.to_array(),
  }
}

#[cfg(test)]
#[path = "vertex_test.rs"]
mod vertex_test;
