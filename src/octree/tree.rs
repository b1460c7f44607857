//! Octree LOD index: visible-leaf selection and neighbor masks.
//!
//! # Visible Leaves
//!
//! ```text
//! for each node (stack, root first):
//!   outside frustum           → merge, skip
//!   distance >= threshold[lod] → merge, visible leaf
//!   lod == 0                   → visible leaf
//!   otherwise                  → subdivide, push children
//! ```
//!
//! # Neighbor Mask
//!
//! A leaf is flagged on a face when the four half-size leaves across that
//! face are visible. Their centers relative to the leaf are:
//!
//! ```text
//!   face axis:   ±(half + quarter)
//!   other axes:  ±quarter            (2 × 2 positions)
//!
//!   ┌─────────┬────┬────┐
//!   │         │ n  │ n  │
//!   │    c    ├────┼────┤   c = flagged leaf (lod)
//!   │         │ n  │ n  │   n = finer neighbors (lod - 1)
//!   └─────────┴────┴────┘
//! ```
//!
//! The flagged leaf stitches its face to those neighbors with transition
//! cells.

use std::collections::{HashMap, VecDeque};

use glam::{IVec3, Vec3};
use tracing::debug;
use web_time::Instant;

use super::bounds::VoxelBounds;
use super::frustum::Frustum;
use super::lod_mask::{Face, LodMask};
use super::node::{NodeInfo, OctreeNode};
use crate::config::{ChunkSettings, LodSettings};
use crate::types::ChunkCoord;

/// Visible leaves keyed by chunk coordinate.
pub type VisibleLeaves = HashMap<ChunkCoord, NodeInfo>;

/// LOD octree rooted at the origin.
#[derive(Clone, Debug)]
pub struct Octree {
  root: OctreeNode,
  chunk_voxels: i32,
  voxel_size: f32,
  lod: LodSettings,
}

impl Octree {
  pub fn new(chunk: &ChunkSettings, lod: LodSettings) -> Self {
    let chunk_voxels = chunk.voxels_per_axis() as i32;
    Self {
      root: OctreeNode::new(IVec3::ZERO, chunk_voxels << lod.max_lod, lod.max_lod),
      chunk_voxels,
      voxel_size: chunk.voxel_size,
      lod,
    }
  }

  pub fn root(&self) -> &OctreeNode {
    &self.root
  }

  /// Voxels per chunk axis (identical at every LOD).
  pub fn chunk_voxels(&self) -> i32 {
    self.chunk_voxels
  }

  pub fn node_count(&self) -> usize {
    self.root.count()
  }

  /// Re-evaluate the tree for a camera and return the visible leaves with
  /// their neighbor masks.
  pub fn update_visible_leaves(&mut self, frustum: &Frustum, camera: Vec3) -> VisibleLeaves {
    let start = Instant::now();
    let voxel_size = self.voxel_size;
    let mut leaves = VisibleLeaves::new();

    let mut stack: Vec<&mut OctreeNode> = vec![&mut self.root];
    while let Some(node) = stack.pop() {
      node.render = false;
      node.lod_mask = LodMask::EMPTY;

      let bounds = node.bounds();
      let (min, max) = bounds.to_world(voxel_size);
      if !frustum.intersects_aabb(min, max) {
        node.merge();
        continue;
      }

      let distance = bounds.distance_to_point(camera, voxel_size);
      if node.lod == 0 || distance >= self.lod.threshold(node.lod) {
        node.merge();
        node.render = true;
        leaves.insert(node.center, node.info());
        continue;
      }

      node.subdivide();
      if let Some(children) = node.children.as_deref_mut() {
        stack.extend(children.iter_mut());
      }
    }

    compute_lod_masks(&mut leaves);
    apply_lod_masks(&mut self.root, &leaves);

    debug!(
      leaves = leaves.len(),
      nodes = self.node_count(),
      elapsed_us = start.elapsed().as_micros() as u64,
      "updated visible leaves"
    );
    leaves
  }

  /// Every node whose bounds touch a cube of `extent` voxels centered on
  /// `center`, coarsest first.
  ///
  /// Intersected nodes are subdivided down to LOD 0 so the query reaches
  /// every resolution. A negative extent yields nothing.
  pub fn get_intersecting_nodes(&mut self, center: IVec3, extent: i32) -> Vec<NodeInfo> {
    let query = VoxelBounds::from_center_extent(center, extent);
    let mut found = Vec::new();
    if query.is_empty() {
      return found;
    }

    let mut queue: VecDeque<&mut OctreeNode> = VecDeque::from([&mut self.root]);
    while let Some(node) = queue.pop_front() {
      if !node.bounds().intersects(&query) {
        continue;
      }
      found.push(node.info());
      node.subdivide();
      if let Some(children) = node.children.as_deref_mut() {
        queue.extend(children.iter_mut());
      }
    }
    found
  }
}

/// Centers of the four finer leaves across `face` of a leaf.
pub fn finer_neighbor_centers(center: IVec3, voxels_per_axis: i32, face: Face) -> [IVec3; 4] {
  let half = voxels_per_axis >> 1;
  let quarter = voxels_per_axis >> 2;
  let axis = face.axis();
  let (u, v) = ((axis + 1) % 3, (axis + 2) % 3);

  let mut centers = [center; 4];
  for (i, neighbor) in centers.iter_mut().enumerate() {
    neighbor[axis] += face.sign() * (half + quarter);
    neighbor[u] += if i & 1 == 0 { -quarter } else { quarter };
    neighbor[v] += if i & 2 == 0 { -quarter } else { quarter };
  }
  centers
}

/// Recompute the neighbor mask of every leaf from the set alone.
pub fn compute_lod_masks(leaves: &mut VisibleLeaves) {
  let masks: Vec<(ChunkCoord, LodMask)> = leaves
    .values()
    .map(|leaf| {
      let mut mask = LodMask::EMPTY;
      if leaf.lod > 0 {
        for face in Face::ALL {
          let finer = finer_neighbor_centers(leaf.center, leaf.voxels_per_axis, face);
          let visible = finer
            .iter()
            .any(|c| leaves.get(c).is_some_and(|n| n.lod + 1 == leaf.lod));
          if visible {
            mask.insert(face);
          }
        }
      }
      (leaf.center, mask)
    })
    .collect();

  for (center, mask) in masks {
    if let Some(leaf) = leaves.get_mut(&center) {
      leaf.lod_mask = mask;
    }
  }
}

fn apply_lod_masks(root: &mut OctreeNode, leaves: &VisibleLeaves) {
  let mut stack = vec![root];
  while let Some(node) = stack.pop() {
    if node.render {
      if let Some(leaf) = leaves.get(&node.center) {
        node.lod_mask = leaf.lod_mask;
      }
    }
    if let Some(children) = node.children.as_deref_mut() {
      stack.extend(children.iter_mut());
    }
  }
}

#[cfg(test)]
#[path = "tree_test.rs"]
mod tree_test;
