//! Case tables for regular and transition cells.
//!
//! Both tables are produced once, on first use, by tracing the iso-contour
//! over the faces of the cell polyhedron:
//!
//! ```text
//! for each face (oriented outward):
//!   walk vertices cyclically, record sign-change crossings
//!   pair each out→in crossing with the next in→out crossing
//!     (inside runs stay separated on ambiguous faces)
//! chain segments into closed loops, fan-triangulate each loop
//! ```
//!
//! Two cells sharing a face see the same samples on it and apply the same
//! pairing rule, so their contours agree edge for edge. Loops come out
//! counter-clockwise when viewed from the outside (higher density) region.
//!
//! # Transition Cell
//!
//! ```text
//!  high-res face (h = 1)            low-res face (h = 0)
//!
//!   6 ── 7 ── 8                       11 ─────── 12
//!   │    │    │                        │          │
//!   3 ── 4 ── 5         b              │          │
//!   │    │    │         │              │          │
//!   0 ── 1 ── 2         └── a          9 ──────── 10
//! ```
//!
//! Low-res vertices 9, 10, 11, 12 carry the samples of 0, 2, 6, 8, so a case
//! is fully described by the 9 high-res signs (512 cases).

use std::sync::LazyLock;

use glam::Vec3;
use smallvec::SmallVec;

use crate::edge_table::{corner_position, CUBE_FACES, EDGE_CORNERS};

/// Triangles of one case as edge index triples.
pub type CaseTriangles = SmallVec<[[u8; 3]; 8]>;

/// Number of high-res samples of a transition cell.
pub const TRANSITION_HIGH_RES: usize = 9;

/// High-res sample duplicated by each low-res vertex.
pub const LOW_RES_SOURCE: [u8; 4] = [0, 2, 6, 8];

/// Per-case triangle lists over a cell's edges.
pub struct CaseTable {
  /// Cell edges as vertex index pairs.
  pub edges: Vec<[u8; 2]>,
  /// Triangles per case.
  pub cases: Vec<CaseTriangles>,
}

impl CaseTable {
  #[inline]
  pub fn triangles(&self, case: usize) -> &[[u8; 3]] {
    &self.cases[case]
  }

  #[inline]
  pub fn edge(&self, edge: u8) -> [u8; 2] {
    self.edges[edge as usize]
  }
}

/// 256 regular cases over [`EDGE_CORNERS`].
pub static REGULAR_TABLE: LazyLock<CaseTable> = LazyLock::new(|| {
  let vertices: Vec<Vec3> = (0..8).map(|c| Vec3::from_array(corner_position(c))).collect();
  let faces = CUBE_FACES.iter().map(|f| f.to_vec()).collect();
  let shape = CellShape::new(vertices, faces, EDGE_CORNERS.to_vec());

  let cases = (0..256usize)
    .map(|case| shape.trace(|v| case >> v & 1 == 1))
    .collect();
  CaseTable {
    edges: shape.edges,
    cases,
  }
});

/// 512 transition cases over the 13-vertex transition cell.
pub static TRANSITION_TABLE: LazyLock<CaseTable> = LazyLock::new(|| {
  let mut vertices: Vec<Vec3> = (0..TRANSITION_HIGH_RES)
    .map(|i| Vec3::new((i % 3) as f32 * 0.5, (i / 3) as f32 * 0.5, 1.0))
    .collect();
  vertices.extend([
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(1.0, 0.0, 0.0),
    Vec3::new(0.0, 1.0, 0.0),
    Vec3::new(1.0, 1.0, 0.0),
  ]);

  let faces = vec![
    vec![0, 1, 4, 3],
    vec![1, 2, 5, 4],
    vec![3, 4, 7, 6],
    vec![4, 5, 8, 7],
    vec![9, 10, 12, 11],
    vec![0, 1, 2, 10, 9],
    vec![2, 5, 8, 12, 10],
    vec![8, 7, 6, 11, 12],
    vec![6, 3, 0, 9, 11],
  ];
  let edges = edges_of(&faces);
  let shape = CellShape::new(vertices, faces, edges);

  let cases = (0..512usize)
    .map(|case| shape.trace(|v| transition_inside(case, v)))
    .collect();
  CaseTable {
    edges: shape.edges,
    cases,
  }
});

/// Inside flag of a transition vertex for a 9-bit case.
#[inline]
pub fn transition_inside(case: usize, vertex: u8) -> bool {
  let source = if (vertex as usize) < TRANSITION_HIGH_RES {
    vertex
  } else {
    LOW_RES_SOURCE[vertex as usize - TRANSITION_HIGH_RES]
  };
  case >> source & 1 == 1
}

/// Unique undirected edges in order of first appearance.
fn edges_of(faces: &[Vec<u8>]) -> Vec<[u8; 2]> {
  let mut edges: Vec<[u8; 2]> = Vec::new();
  for face in faces {
    for i in 0..face.len() {
      let (a, b) = (face[i], face[(i + 1) % face.len()]);
      let edge = [a.min(b), a.max(b)];
      if !edges.contains(&edge) {
        edges.push(edge);
      }
    }
  }
  edges
}

/// Convex cell polyhedron with outward-oriented faces.
struct CellShape {
  faces: Vec<Vec<u8>>,
  edges: Vec<[u8; 2]>,
}

impl CellShape {
  fn new(vertices: Vec<Vec3>, mut faces: Vec<Vec<u8>>, edges: Vec<[u8; 2]>) -> Self {
    let cell_center = vertices.iter().copied().sum::<Vec3>() / vertices.len() as f32;
    for face in &mut faces {
      let points: Vec<Vec3> = face.iter().map(|&v| vertices[v as usize]).collect();
      let face_center = points.iter().copied().sum::<Vec3>() / points.len() as f32;
      // Newell normal.
      let normal: Vec3 = (0..points.len())
        .map(|i| points[i].cross(points[(i + 1) % points.len()]))
        .sum();
      if normal.dot(face_center - cell_center) < 0.0 {
        face.reverse();
      }
    }
    Self { faces, edges }
  }

  fn edge_index(&self, a: u8, b: u8) -> Option<u8> {
    let edge = [a.min(b), a.max(b)];
    self.edges.iter().position(|&e| e == edge).map(|i| i as u8)
  }

  fn trace(&self, inside: impl Fn(u8) -> bool) -> CaseTriangles {
    // (from, to) edge pairs, directed out→in to in→out.
    let mut segments: SmallVec<[(u8, u8); 16]> = SmallVec::new();
    for face in &self.faces {
      let n = face.len();
      let crossings: SmallVec<[(u8, bool); 8]> = (0..n)
        .filter_map(|i| {
          let (a, b) = (face[i], face[(i + 1) % n]);
          if inside(a) == inside(b) {
            return None;
          }
          let edge = self.edge_index(a, b);
          debug_assert!(edge.is_some(), "face edge {a}-{b} missing from edge list");
          edge.map(|e| (e, inside(b)))
        })
        .collect();

      let m = crossings.len();
      for j in 0..m {
        let (edge, entering) = crossings[j];
        if entering {
          segments.push((edge, crossings[(j + 1) % m].0));
        }
      }
    }

    let mut triangles = CaseTriangles::new();
    let mut used: SmallVec<[bool; 16]> = SmallVec::from_elem(false, segments.len());
    while let Some(mut current) = (0..segments.len())
      .filter(|&s| !used[s])
      .min_by_key(|&s| segments[s].0)
    {
      let mut chain: SmallVec<[u8; 16]> = SmallVec::new();
      loop {
        used[current] = true;
        chain.push(segments[current].0);
        let to = segments[current].1;
        match (0..segments.len()).find(|&s| !used[s] && segments[s].0 == to) {
          Some(next) => current = next,
          None => break,
        }
      }
      for i in 1..chain.len().saturating_sub(1) {
        triangles.push([chain[0], chain[i], chain[i + 1]]);
      }
    }
    triangles
  }
}

#[cfg(test)]
#[path = "tables_test.rs"]
mod tables_test;
