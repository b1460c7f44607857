//! Surface extraction for one chunk.
//!
//! # Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  INPUT                                                          │
//! │  field:     (N+1)^3 density samples at the chunk's LOD          │
//! │  lod_mask:  faces bordering finer chunks                        │
//! │  neighbors: finer fields across each flagged face (up to 4)     │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  REGULAR CELLS  (N^3)                                           │
//! │    8 corners → case → REGULAR_TABLE → edge vertices             │
//! │    corners on flagged faces pulled inward by the slab width     │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  TRANSITION CELLS  (per flagged face, per finer neighbor)       │
//! │    9 high-res samples → case → TRANSITION_TABLE                 │
//! │    high-res face matches the finer chunk's boundary vertices    │
//! │    low-res face matches this chunk's compressed regular cells   │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  OUTPUT                                                         │
//! │  MeshOutput: unindexed positions + normals, 3 per triangle      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Conventions
//!
//! - A sample is inside when `density < iso_level`.
//! - Triangles wind counter-clockwise seen from outside; normals point
//!   toward increasing density.
//! - Vertices are computed per edge from lattice-ordered endpoints, so the
//!   same edge always yields the same bits, in whichever chunk or cell.

pub mod regular;
pub mod tables;
pub mod transition;
pub mod vertex;

use tracing::{debug, debug_span};
use web_time::Instant;

use crate::compute::ComputeBackend;
use crate::density::{DensityField, FieldLayout};
use crate::octree::{Face, LodMask};
use crate::types::{MeshConfig, MeshOutput};

pub use regular::extract_regular;
pub use tables::{CaseTable, REGULAR_TABLE, TRANSITION_TABLE};
pub use transition::{extract_transition, face_axes};
pub use vertex::{compressed_position, edge_vertex, gradient, Corner};

/// Finer field bordering a chunk across one face.
#[derive(Clone, Copy, Debug)]
pub struct NeighborField<'a> {
  pub face: Face,
  pub layout: FieldLayout,
  pub field: &'a DensityField,
}

/// Everything needed to mesh one chunk.
#[derive(Clone, Debug)]
pub struct ChunkFields<'a> {
  pub layout: FieldLayout,
  pub field: &'a DensityField,
  pub lod_mask: LodMask,
  pub neighbors: Vec<NeighborField<'a>>,
}

impl<'a> ChunkFields<'a> {
  /// Chunk without transition faces.
  pub fn new(layout: FieldLayout, field: &'a DensityField) -> Self {
    Self {
      layout,
      field,
      lod_mask: LodMask::EMPTY,
      neighbors: Vec::new(),
    }
  }

  pub fn with_lod_mask(mut self, mask: LodMask) -> Self {
    self.lod_mask = mask;
    self
  }

  pub fn with_neighbor(mut self, face: Face, layout: FieldLayout, field: &'a DensityField) -> Self {
    self.neighbors.push(NeighborField { face, layout, field });
    self
  }
}

/// Regular cells plus transition cells of every flagged face.
///
/// Neighbors across faces that are not in the mask are ignored. A flagged
/// face with fewer than four neighbor fields gets transition cells only
/// where a neighbor is present.
pub fn extract_mesh(
  backend: &dyn ComputeBackend,
  config: &MeshConfig,
  chunk: &ChunkFields,
) -> MeshOutput {
  let _span = debug_span!("extract_mesh", center = ?chunk.layout.center, lod = chunk.layout.lod).entered();
  let start = Instant::now();

  let mut triangles = extract_regular(backend, config, &chunk.layout, chunk.field, chunk.lod_mask);
  let regular = triangles.len();

  for neighbor in &chunk.neighbors {
    if !chunk.lod_mask.contains(neighbor.face) {
      continue;
    }
    triangles.extend(extract_transition(
      backend,
      config,
      neighbor.face,
      &chunk.layout,
      chunk.field,
      chunk.lod_mask,
      &neighbor.layout,
      neighbor.field,
    ));
  }

  let output = MeshOutput::from_triangles(&triangles);
  debug!(
    regular,
    transition = triangles.len() - regular,
    elapsed_us = start.elapsed().as_micros() as u64,
    "extracted chunk mesh"
  );
  output
}
