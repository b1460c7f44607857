//! Cube topology shared by the regular-cell mesher and its case table.
//!
//! # Cube Topology
//!
//! ```text
//!       6──────7         Corners (binary ZYX):
//!      /│     /│           0=(0,0,0)  1=(1,0,0)  2=(0,1,0)  3=(1,1,0)
//!     4─┼────5 │           4=(0,0,1)  5=(1,0,1)  6=(0,1,1)  7=(1,1,1)
//!     │ 2────┼─3
//!     │/     │/          +Y
//!     0──────1            │  +Z
//!                         │ /
//!                         └───+X
//! ```
//!
//! # Edges
//!
//! Every edge lists its lower corner first. Zero-crossings are always
//! interpolated from the first endpoint to the second, so two cells that
//! share an edge compute bit-identical vertices.
//!
//! ```text
//! X-axis edges:  0=[0,1]  5=[2,3]  8=[4,5]  11=[6,7]
//! Y-axis edges:  1=[0,2]  3=[1,3]  9=[4,6]  10=[5,7]
//! Z-axis edges:  2=[0,4]  4=[1,5]  6=[2,6]   7=[3,7]
//! ```
//!
//! # Case Index
//!
//! Bit `c` of the case index is set when corner `c` is inside the surface
//! (`density < iso_level`). An edge is crossed when its endpoints disagree.
//!
//! ```text
//! Case:    0b00000001 (only corner 0 inside)
//! Crossed: edges 0, 1, 2
//! ```

/// Edge endpoint corner indices, lower corner first.
pub const EDGE_CORNERS: [[u8; 2]; 12] = [
  [0, 1], // Edge 0:  X axis at Y=0, Z=0
  [0, 2], // Edge 1:  Y axis at X=0, Z=0
  [0, 4], // Edge 2:  Z axis at X=0, Y=0
  [1, 3], // Edge 3:  Y axis at X=1, Z=0
  [1, 5], // Edge 4:  Z axis at X=1, Y=0
  [2, 3], // Edge 5:  X axis at Y=1, Z=0
  [2, 6], // Edge 6:  Z axis at X=0, Y=1
  [3, 7], // Edge 7:  Z axis at X=1, Y=1
  [4, 5], // Edge 8:  X axis at Y=0, Z=1
  [4, 6], // Edge 9:  Y axis at X=0, Z=1
  [5, 7], // Edge 10: Y axis at X=1, Z=1
  [6, 7], // Edge 11: X axis at Y=1, Z=1
];

/// The six cube faces as corner cycles (orientation fixed up by the table
/// generator).
pub const CUBE_FACES: [[u8; 4]; 6] = [
  [0, 2, 6, 4], // -X
  [1, 3, 7, 5], // +X
  [0, 1, 5, 4], // -Y
  [2, 3, 7, 6], // +Y
  [0, 1, 3, 2], // -Z
  [4, 5, 7, 6], // +Z
];

/// Build the case index from 8 corner densities.
#[inline]
pub fn case_index(samples: &[f32; 8], iso_level: f32) -> usize {
  let mut case = 0usize;
  for (corner, &density) in samples.iter().enumerate() {
    if density < iso_level {
      case |= 1 << corner;
    }
  }
  case
}

/// Get corner position within unit cube.
#[inline(always)]
pub const fn corner_position(corner: u8) -> [f32; 3] {
  [
    (corner & 1) as f32,
    ((corner >> 1) & 1) as f32,
    ((corner >> 2) & 1) as f32,
  ]
}

#[cfg(test)]
#[path = "edge_table_test.rs"]
mod edge_table_test;
