//! Transition-cell extraction along one flagged face.
//!
//! The flagged chunk (LOD `l`) borders four half-size chunks (LOD `l - 1`)
//! across the face. Each finer chunk covers one quadrant of the face, and
//! every coarse face cell in that quadrant becomes one transition cell:
//!
//! ```text
//!   high-res face: 3×3 samples from the finer field, on the chunk face
//!   low-res face:  2×2 coarse corners, pushed inward by the slab width
//! ```
//!
//! The high-res face reproduces the vertices of the finer chunk's own
//! boundary cells; the low-res face reproduces the compressed regular cells
//! of this chunk.
//!
//! # Face Frames
//!
//! Cells are built in a frame `(a, b, h)` with `a × b = h` and `h` along the
//! outward normal, so one table serves all six faces:
//!
//! ```text
//!   face   a   b        face   a   b
//!   -X     z   y        +X     y   z
//!   -Y     x   z        +Y     z   x
//!   -Z     y   x        +Z     x   y
//! ```

use glam::{IVec3, Vec3};
use tracing::warn;

use crate::compute::{ComputeBackend, ComputeOp};
use crate::density::{DensityField, FieldLayout};
use crate::octree::{Face, LodMask};
use crate::types::{MeshConfig, Triangle};

use super::tables::{TRANSITION_HIGH_RES, TRANSITION_TABLE};
use super::vertex::{compressed_position, edge_vertex, gradient, Corner};

/// Tangent axes `(a, b)` of a face.
#[inline]
pub const fn face_axes(face: Face) -> (usize, usize) {
  match face {
    Face::NegX => (2, 1),
    Face::PosX => (1, 2),
    Face::NegY => (0, 2),
    Face::PosY => (2, 0),
    Face::NegZ => (1, 0),
    Face::PosZ => (0, 1),
  }
}

/// Lattice index on an axis, or `None` when `coord` is off the field's grid.
fn lattice_index(layout: &FieldLayout, coord: IVec3, axis: usize) -> Option<usize> {
  let offset = coord[axis] - layout.min_coord()[axis];
  let stride = layout.stride();
  if offset < 0 || offset % stride != 0 {
    return None;
  }
  let index = (offset / stride) as usize;
  (index <= layout.voxels_per_axis).then_some(index)
}

fn lattice_point(layout: &FieldLayout, coord: IVec3) -> Option<[usize; 3]> {
  Some([
    lattice_index(layout, coord, 0)?,
    lattice_index(layout, coord, 1)?,
    lattice_index(layout, coord, 2)?,
  ])
}

/// Transition triangles for the part of `face` bordered by one finer field.
///
/// `mask` is the coarse chunk's full LOD mask; low-res corners are
/// compressed along every flagged axis, the high-res face never is. A finer
/// field that is not an LOD `l - 1` neighbor across `face` yields nothing.
#[allow(clippy::too_many_arguments)]
pub fn extract_transition(
  backend: &dyn ComputeBackend,
  config: &MeshConfig,
  face: Face,
  layout: &FieldLayout,
  field: &DensityField,
  mask: LodMask,
  fine_layout: &FieldLayout,
  fine_field: &DensityField,
) -> Vec<Triangle> {
  let n = layout.voxels_per_axis;
  let half = n / 2;
  let axis = face.axis();
  let (ta, tb) = face_axes(face);
  let fine_stride = fine_layout.stride();
  let plane = if face.is_positive() { n } else { 0 };

  let quadrant = (fine_layout.min_coord() - layout.min_coord()) / layout.stride();
  let touches = if face.is_positive() {
    fine_layout.min_coord()[axis] == layout.max_coord()[axis]
  } else {
    fine_layout.max_coord()[axis] == layout.min_coord()[axis]
  };
  let adjacent = fine_layout.lod + 1 == layout.lod
    && touches
    && fine_layout.voxels_per_axis == n
    && (quadrant[ta] == 0 || quadrant[ta] == half as i32)
    && (quadrant[tb] == 0 || quadrant[tb] == half as i32);
  if !adjacent {
    warn!(?face, coarse = ?layout.center, fine = ?fine_layout.center, "field is not a finer face neighbor");
    return Vec::new();
  }
  let (qa, qb) = (quadrant[ta] as usize, quadrant[tb] as usize);

  let iso = config.iso_level;
  let voxel_size = config.voxel_size;
  let width = config.transition_width * layout.stride() as f32 * voxel_size;
  let table = &*TRANSITION_TABLE;

  backend.collect_cells(ComputeOp::ExtractTransition(face), [half, half, 1], &|[i, j, _], out| {
    let (ca, cb) = (qa + i, qb + j);
    let coarse_point = |a: usize, b: usize| {
      let mut point = [0usize; 3];
      point[axis] = plane;
      point[ta] = ca + a;
      point[tb] = cb + b;
      point
    };

    let origin = layout.point_coord(coarse_point(0, 0));
    let mut high = [[0usize; 3]; TRANSITION_HIGH_RES];
    for (v, slot) in high.iter_mut().enumerate() {
      let mut coord = origin;
      coord[ta] += (v % 3) as i32 * fine_stride;
      coord[tb] += (v / 3) as i32 * fine_stride;
      match lattice_point(fine_layout, coord) {
        Some(point) => *slot = point,
        None => return,
      }
    }

    let mut values = [0.0f32; TRANSITION_HIGH_RES];
    let mut case = 0usize;
    for (v, point) in high.iter().enumerate() {
      values[v] = fine_field.get(point[0], point[1], point[2]);
      if values[v] < iso {
        case |= 1 << v;
      }
    }
    if case == 0 || case == 511 {
      return;
    }

    let mut corners = [Corner {
      lattice: IVec3::ZERO,
      position: Vec3::ZERO,
      value: 0.0,
      gradient: Vec3::ZERO,
    }; 13];
    for (v, point) in high.iter().enumerate() {
      let lattice = fine_layout.point_coord(*point);
      corners[v] = Corner {
        lattice,
        position: lattice.as_vec3() * voxel_size,
        value: values[v],
        gradient: gradient(fine_field, *point),
      };
    }
    for (k, (a, b)) in [(0, 0), (1, 0), (0, 1), (1, 1)].into_iter().enumerate() {
      let point = coarse_point(a, b);
      corners[TRANSITION_HIGH_RES + k] = Corner {
        lattice: layout.point_coord(point),
        position: compressed_position(layout, point, mask, width, voxel_size),
        value: values[b * 6 + a * 2],
        gradient: gradient(field, point),
      };
    }

    for &tri in table.triangles(case) {
      out.push(Triangle(tri.map(|edge| {
        let [a, b] = table.edge(edge);
        edge_vertex(&corners[a as usize], &corners[b as usize], iso)
      })));
    }
  })
}
