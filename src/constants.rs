//! Chunk layout constants and lattice indexing.
//!
//! A chunk of `N` voxels per axis stores `N + 1` density samples per axis:
//! the point lattice encloses the voxel lattice, so two neighboring chunks at
//! the same LOD share their boundary plane of samples.
//!
//! # Point Lattice
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      DENSITY FIELD (N = 4 shown)                        │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Sample index:  0     1     2     3     4                               │
//! │                 │     │     │     │     │                               │
//! │                 ●─────●─────●─────●─────●   ← N + 1 points              │
//! │                 └──┬──┘                                                 │
//! │                  voxel (cell)                  ← N cells                │
//! │                                                                         │
//! │  World voxel coordinate of sample i:                                    │
//! │    min_coord + i * stride                                               │
//! │    min_coord = center - ((N >> 1) << lod)                               │
//! │    stride    = 1 << lod                                                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Memory Layout
//!
//! ```text
//! index = (x * P + y) * P + z        P = N + 1
//!
//! Optimal access: Sequential Z, then Y, then X
//! ```
//!
//! # Coordinate System
//!
//! ```text
//!         +Y
//!          │
//!          │
//!          └───────── +X
//!         /
//!       +Z
//!
//! Cell corner indices (binary: ZYX):
//!   0 = (0,0,0)    4 = (0,0,1)
//!   1 = (1,0,0)    5 = (1,0,1)
//!   2 = (0,1,0)    6 = (0,1,1)
//!   3 = (1,1,0)    7 = (1,1,1)
//! ```

/// Default chunk resolution exponent (2^5 = 32 voxels per axis).
pub const DEFAULT_POWER_VOXELS_PER_AXIS: u32 = 5;

/// Smallest supported chunk resolution exponent.
pub const MIN_POWER_VOXELS_PER_AXIS: u32 = 2;

/// Largest supported chunk resolution exponent.
pub const MAX_POWER_VOXELS_PER_AXIS: u32 = 9;

/// Seed shared by the noise builder's offset sequence and noise function.
pub const NOISE_SEED: u32 = 1;

/// Octave count of the noise builder.
pub const NOISE_OCTAVES: usize = 8;

/// Per-octave offsets are drawn from `[-range, range]` on each axis.
pub const NOISE_OFFSET_RANGE: f64 = 1000.0;

/// Prefix of persisted density field file names.
pub const FIELD_FILE_PREFIX: &str = "density";

/// Extension shared by density field and brush asset files.
pub const ASSET_EXTENSION: &str = "asset";

/// Convert lattice coordinates to a linear index.
///
/// Layout: X is major axis, Y is middle, Z is minor (stride 1).
#[inline(always)]
pub const fn point_index(x: usize, y: usize, z: usize, points_per_axis: usize) -> usize {
  (x * points_per_axis + y) * points_per_axis + z
}

/// Lattice offsets for the 8 cube corners relative to the cell origin.
///
/// Corner layout (binary: ZYX):
/// - 0 = (0,0,0)
/// - 1 = (1,0,0)
/// - 2 = (0,1,0)
/// - 3 = (1,1,0)
/// - 4 = (0,0,1)
/// - 5 = (1,0,1)
/// - 6 = (0,1,1)
/// - 7 = (1,1,1)
pub const CORNER_OFFSETS: [[usize; 3]; 8] = [
  [0, 0, 0],
  [1, 0, 0],
  [0, 1, 0],
  [1, 1, 0],
  [0, 0, 1],
  [1, 0, 1],
  [0, 1, 1],
  [1, 1, 1],
];

#[cfg(test)]
#[path = "constants_test.rs"]
mod constants_test;
