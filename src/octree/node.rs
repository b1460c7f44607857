//! OctreeNode - owned recursive node of the LOD octree.
//!
//! Nodes are identified by their center on the finest voxel lattice.
//! LOD 0 = finest detail (smallest cells), higher LOD = coarser.
//!
//! ```text
//! voxels_per_axis = chunk_voxels << lod      (extent in finest voxels)
//! child center    = center ± voxels_per_axis / 4 on each axis
//! ```

use glam::IVec3;

use super::bounds::VoxelBounds;
use super::lod_mask::LodMask;
use crate::types::ChunkCoord;

/// Child slot. Bits represent +X, +Y, +Z offsets:
/// - bit 0: X offset (0 = -, 1 = +)
/// - bit 1: Y offset
/// - bit 2: Z offset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Octant(pub u8);

impl Octant {
  pub const ALL: [Octant; 8] = [
    Octant(0),
    Octant(1),
    Octant(2),
    Octant(3),
    Octant(4),
    Octant(5),
    Octant(6),
    Octant(7),
  ];

  /// Per-axis offset direction, each component -1 or +1.
  #[inline]
  pub const fn offset_signs(self) -> IVec3 {
    IVec3::new(
      if self.0 & 1 != 0 { 1 } else { -1 },
      if self.0 & 2 != 0 { 1 } else { -1 },
      if self.0 & 4 != 0 { 1 } else { -1 },
    )
  }
}

/// Copyable descriptor of a node: what extraction and editing need.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeInfo {
  pub center: ChunkCoord,
  pub voxels_per_axis: i32,
  pub lod: u32,
  pub lod_mask: LodMask,
}

impl NodeInfo {
  #[inline]
  pub fn bounds(&self) -> VoxelBounds {
    VoxelBounds::from_center_extent(self.center, self.voxels_per_axis)
  }
}

/// Octree node.
///
/// A node with `lod == 0` never has children. When present, the 8 children
/// partition this node exactly.
#[derive(Clone, Debug, PartialEq)]
pub struct OctreeNode {
  /// Center in finest-voxel units.
  pub center: ChunkCoord,
  /// Extent in finest-voxel units.
  pub voxels_per_axis: i32,
  /// Level of detail (0 = finest, higher = coarser).
  pub lod: u32,
  pub children: Option<Box<[OctreeNode; 8]>>,
  /// Set while the node is a visible leaf.
  pub render: bool,
  /// Faces across which finer leaves are visible.
  pub lod_mask: LodMask,
}

impl OctreeNode {
  pub fn new(center: ChunkCoord, voxels_per_axis: i32, lod: u32) -> Self {
    Self {
      center,
      voxels_per_axis,
      lod,
      children: None,
      render: false,
      lod_mask: LodMask::EMPTY,
    }
  }

  /// Create 8 children. No-op at LOD 0 or when already subdivided.
  pub fn subdivide(&mut self) {
    if self.lod == 0 || self.children.is_some() {
      return;
    }
    let quarter = self.voxels_per_axis >> 2;
    let half = self.voxels_per_axis >> 1;
    let lod = self.lod - 1;
    let center = self.center;
    self.children = Some(Box::new(
      Octant::ALL.map(|octant| OctreeNode::new(center + octant.offset_signs() * quarter, half, lod)),
    ));
  }

  /// Discard the subtree below this node.
  #[inline]
  pub fn merge(&mut self) {
    self.children = None;
  }

  #[inline]
  pub fn is_leaf(&self) -> bool {
    self.children.is_none()
  }

  pub fn child(&self, octant: Octant) -> Option<&OctreeNode> {
    self.children.as_deref().map(|children| &children[octant.0 as usize])
  }

  #[inline]
  pub fn bounds(&self) -> VoxelBounds {
    VoxelBounds::from_center_extent(self.center, self.voxels_per_axis)
  }

  pub fn info(&self) -> NodeInfo {
    NodeInfo {
      center: self.center,
      voxels_per_axis: self.voxels_per_axis,
      lod: self.lod,
      lod_mask: self.lod_mask,
    }
  }

  /// Nodes in this subtree, including this one.
  pub fn count(&self) -> usize {
    1 + self
      .children
      .as_deref()
      .map_or(0, |children| children.iter().map(OctreeNode::count).sum())
  }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
