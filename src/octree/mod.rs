//! Octree module for LOD-based spatial subdivision.
//!
//! The tree is an owned recursive structure rebuilt lazily every camera
//! update: nodes subdivide when the camera comes closer than their level's
//! threshold and merge when it moves away or they leave the frustum.
//!
//! # LOD Convention
//!
//! LOD 0 = finest detail (smallest cells), higher LOD = coarser.
//!
//! ```text
//! Node extent = chunk_voxels * 2^LOD   (finest voxels)
//!             = chunk_voxels * voxel_size * 2^LOD   (world units)
//! ```
//!
//! # Module Structure
//!
//! - [`node`]: `OctreeNode`, `Octant`, `NodeInfo`
//! - [`bounds`]: `VoxelBounds` - inclusive integer boxes
//! - [`frustum`]: `Frustum` - view culling
//! - [`lod_mask`]: `Face`, `LodMask` - neighbor resolution bits
//! - [`tree`]: `Octree` - visible leaves, masks, edit queries

pub mod bounds;
pub mod frustum;
pub mod lod_mask;
pub mod node;
pub mod tree;

// Re-exports
pub use bounds::VoxelBounds;
pub use frustum::Frustum;
pub use lod_mask::{Face, LodMask};
pub use node::{NodeInfo, Octant, OctreeNode};
pub use tree::{compute_lod_masks, finer_neighbor_centers, Octree, VisibleLeaves};
