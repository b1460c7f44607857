//! Regular-cell extraction over a chunk's own field.
//!
//! One cell per voxel, `N^3` cells. Corners on a face flagged in the LOD
//! mask are pulled inward by the transition width, leaving a slab for the
//! transition cells of that face.
//!
//! ```text
//!   flagged +X face
//!          │
//!   ┌──┬──┬┤░┐
//!   │  │  │┤░│   ░ = transition slab (width w)
//!   ├──┼──┼┤░┤   boundary corners moved from x = N to x = N - w
//!   │  │  │┤░│
//!   └──┴──┴┤░┘
//! ```

use crate::compute::{ComputeBackend, ComputeOp};
use crate::constants::CORNER_OFFSETS;
use crate::density::{DensityField, FieldLayout};
use crate::edge_table::case_index;
use crate::octree::LodMask;
use crate::types::{MeshConfig, Triangle};

use super::tables::REGULAR_TABLE;
use super::vertex::{compressed_position, edge_vertex, Corner};

/// Triangles of every regular cell of a chunk.
pub fn extract_regular(
  backend: &dyn ComputeBackend,
  config: &MeshConfig,
  layout: &FieldLayout,
  field: &DensityField,
  mask: LodMask,
) -> Vec<Triangle> {
  let n = layout.voxels_per_axis;
  let iso = config.iso_level;
  let width = config.transition_width * layout.stride() as f32 * config.voxel_size;
  let table = &*REGULAR_TABLE;

  backend.collect_cells(ComputeOp::ExtractRegular, [n; 3], &|[x, y, z], out| {
    let mut values = [0.0f32; 8];
    for (value, offset) in values.iter_mut().zip(&CORNER_OFFSETS) {
      *value = field.get(x + offset[0], y + offset[1], z + offset[2]);
    }
    let case = case_index(&values, iso);
    if case == 0 || case == 255 {
      return;
    }

    let corners: [Corner; 8] = std::array::from_fn(|c| {
      let o = CORNER_OFFSETS[c];
      let point = [x + o[0], y + o[1], z + o[2]];
      let position = compressed_position(layout, point, mask, width, config.voxel_size);
      Corner::from_field(layout, field, point, position)
    });

    for &tri in table.triangles(case) {
      out.push(Triangle(tri.map(|edge| {
        let [a, b] = table.edge(edge);
        edge_vertex(&corners[a as usize], &corners[b as usize], iso)
      })));
    }
  })
}
