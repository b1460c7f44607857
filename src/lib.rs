//! voxel_terrain - Engine independent LOD voxel terrain with brush editing
//!
//! The terrain is a scalar density field split into chunks that an octree
//! refines around the camera. Every visible leaf is meshed with a
//! marching-cubes style extractor plus transition cells toward finer
//! neighbors, so adjacent levels of detail meet without cracks.
//!
//! # Features
//!
//! - **Octree LOD index**: distance and frustum driven refinement with
//!   per-leaf neighbor masks
//! - **Density store**: edited overlay, cache, files and procedural
//!   generation resolved in that order
//! - **Regular + transition meshing**: 256 and 512 case tables generated
//!   from one contour tracer, shared edge placement on both sides of a seam
//! - **Brush editing**: Sphere, Cube and Custom brushes with undo/redo
//! - **Incremental streaming**: create, release, load and save queues
//!   drained under a per-tick budget
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use voxel_terrain::{CpuBackend, Frustum, SceneEvent, TerrainConfig, VoxelTerrain};
//!
//! let config = TerrainConfig::load("terrain.toml".as_ref())?;
//! let (mut terrain, events) = VoxelTerrain::from_config(config, Arc::new(CpuBackend));
//!
//! // Once per frame:
//! terrain.update_camera(camera_position, Frustum::from_view_projection(&view_proj));
//! terrain.tick();
//! for event in events.try_iter() {
//!   match event {
//!     SceneEvent::Show { coord, mesh, .. } => { /* upload mesh */ }
//!     SceneEvent::Hide { coord } => { /* destroy object */ }
//!   }
//! }
//! ```

pub mod constants;
pub mod edge_table;
pub mod error;
pub mod types;

// Re-export commonly used items
pub use error::{Result, TerrainError};
pub use types::{ChunkCoord, MeshConfig, MeshOutput, MinMaxAABB, Triangle, Vertex};

// Configuration loaded from TOML
pub mod config;
pub use config::{ConfigWarning, TerrainConfig};

// Blocking parallel compute capability
pub mod compute;
pub use compute::{ComputeBackend, ComputeOp, CpuBackend, SerialBackend};

// Octree module for LOD-based spatial subdivision
pub mod octree;
pub use octree::{Face, Frustum, LodMask, NodeInfo, Octree, OctreeNode};

// Density fields, generation and persistence
pub mod density;
pub use density::{DensityField, DensitySource, DensityStore};

// Regular and transition cell extraction
pub mod mesh;
pub use mesh::{extract_mesh, ChunkFields};

// Brushes and edit history
pub mod brush;
pub use brush::{Brush, BrushEditor, BrushShape, EditInfo};

// Budgeted work queues
pub mod streaming;
pub use streaming::{StreamingCoordinator, TickReport};

// Command surface
pub mod terrain;
pub use terrain::{EditorMode, SceneEvent, TerrainStats, VoxelTerrain};
