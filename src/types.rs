//! Core data types shared by extraction, storage and the scene hand-off.

use glam::{IVec3, Vec3};

use crate::config::ChunkSettings;

/// Chunk identifier: the node center in finest-level voxel units.
///
/// Sole key for caching, persistence and equality.
pub type ChunkCoord = IVec3;

/// Mesh vertex: one per triangle corner, never shared.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
  /// World-space position.
  pub position: [f32; 3],

  /// Surface normal (unit vector, pointing toward increasing density).
  pub normal: [f32; 3],
}

impl Default for Vertex {
  fn default() -> Self {
    Self {
      position: [0.0; 3],
      normal: [0.0, 1.0, 0.0],
    }
  }
}

/// One emitted triangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle(pub [Vertex; 3]);

impl Triangle {
  /// Geometric normal from winding, or `None` for a degenerate triangle.
  pub fn face_normal(&self) -> Option<Vec3> {
    let [a, b, c] = self.0.map(|v| Vec3::from_array(v.position));
    (b - a).cross(c - a).try_normalize()
  }
}

/// Axis-aligned bounding box.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinMaxAABB {
  pub min: [f32; 3],
  pub max: [f32; 3],
}

impl MinMaxAABB {
  /// Create AABB with inverted extents (ready for encapsulation).
  pub fn empty() -> Self {
    Self {
      min: [f32::INFINITY; 3],
      max: [f32::NEG_INFINITY; 3],
    }
  }

  /// Expand AABB to include a point.
  #[inline]
  pub fn encapsulate(&mut self, point: [f32; 3]) {
    for i in 0..3 {
      self.min[i] = self.min[i].min(point[i]);
      self.max[i] = self.max[i].max(point[i]);
    }
  }

  /// Check if AABB is valid (min <= max on all axes).
  pub fn is_valid(&self) -> bool {
    self.min[0] <= self.max[0] && self.min[1] <= self.max[1] && self.min[2] <= self.max[2]
  }
}

impl Default for MinMaxAABB {
  fn default() -> Self {
    Self::empty()
  }
}

/// Renderable mesh: unindexed positions and normals.
///
/// Corner `i` of the stream belongs to triangle `i / 3`, and the index
/// sequence is implicitly `0, 1, 2, 3, ...`. Zero triangles is a valid,
/// empty mesh; a chunk that has not been extracted has no `MeshOutput` at
/// all.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshOutput {
  pub positions: Vec<[f32; 3]>,
  pub normals: Vec<[f32; 3]>,
  pub bounds: MinMaxAABB,
}

impl MeshOutput {
  pub fn new() -> Self {
    Self::default()
  }

  /// Flatten a triangle stream into the renderable layout.
  pub fn from_triangles(triangles: &[Triangle]) -> Self {
    let mut output = Self {
      positions: Vec::with_capacity(triangles.len() * 3),
      normals: Vec::with_capacity(triangles.len() * 3),
      bounds: MinMaxAABB::empty(),
    };
    for triangle in triangles {
      for vertex in &triangle.0 {
        output.positions.push(vertex.position);
        output.normals.push(vertex.normal);
        output.bounds.encapsulate(vertex.position);
      }
    }
    output
  }

  /// Clear all buffers, preserving capacity.
  pub fn clear(&mut self) {
    self.positions.clear();
    self.normals.clear();
    self.bounds = MinMaxAABB::empty();
  }

  /// Returns true if no geometry was generated.
  pub fn is_empty(&self) -> bool {
    self.positions.is_empty()
  }

  /// Number of triangles in the mesh.
  pub fn triangle_count(&self) -> usize {
    self.positions.len() / 3
  }

  /// The implicit index sequence.
  pub fn indices(&self) -> impl Iterator<Item = u32> {
    0..self.positions.len() as u32
  }

  /// Iterate triangles as vertex triples.
  pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
    self
      .positions
      .chunks_exact(3)
      .zip(self.normals.chunks_exact(3))
      .map(|(p, n)| {
        Triangle([
          Vertex {
            position: p[0],
            normal: n[0],
          },
          Vertex {
            position: p[1],
            normal: n[1],
          },
          Vertex {
            position: p[2],
            normal: n[2],
          },
        ])
      })
  }
}

/// Configuration for surface extraction.
#[derive(Clone, Debug)]
pub struct MeshConfig {
  /// Voxels per chunk axis.
  pub voxels_per_axis: usize,

  /// World size of a finest-level voxel.
  pub voxel_size: f32,

  /// Density threshold of the surface.
  pub iso_level: f32,

  /// Transition slab depth as a fraction of one coarse cell.
  pub transition_width: f32,
}

impl Default for MeshConfig {
  fn default() -> Self {
    Self::from(&ChunkSettings::default())
  }
}

impl From<&ChunkSettings> for MeshConfig {
  fn from(chunk: &ChunkSettings) -> Self {
    Self {
      voxels_per_axis: chunk.voxels_per_axis(),
      voxel_size: chunk.voxel_size,
      iso_level: chunk.iso_level,
      transition_width: chunk.transition_width,
    }
  }
}

impl MeshConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_voxels_per_axis(mut self, voxels: usize) -> Self {
    self.voxels_per_axis = voxels;
    self
  }

  pub fn with_voxel_size(mut self, size: f32) -> Self {
    self.voxel_size = size;
    self
  }

  pub fn with_iso_level(mut self, iso_level: f32) -> Self {
    self.iso_level = iso_level;
    self
  }

  pub fn with_transition_width(mut self, width: f32) -> Self {
    self.transition_width = width;
    self
  }

  /// Density samples per chunk axis.
  #[inline]
  pub fn points_per_axis(&self) -> usize {
    self.voxels_per_axis + 1
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
