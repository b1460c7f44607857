//! Per-chunk density samples and their placement on the voxel lattice.

use glam::IVec3;

use crate::constants::point_index;
use crate::types::ChunkCoord;

/// Placement of a chunk's sample lattice in finest-voxel units.
///
/// ```text
/// sample i → min_coord + i * stride
/// min_coord = center - ((N >> 1) << lod)
/// stride    = 1 << lod
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FieldLayout {
  pub center: ChunkCoord,
  pub lod: u32,
  /// Voxels per chunk axis (`N`).
  pub voxels_per_axis: usize,
}

impl FieldLayout {
  pub fn new(center: ChunkCoord, lod: u32, voxels_per_axis: usize) -> Self {
    Self {
      center,
      lod,
      voxels_per_axis,
    }
  }

  #[inline]
  pub fn stride(&self) -> i32 {
    1 << self.lod
  }

  #[inline]
  pub fn points_per_axis(&self) -> usize {
    self.voxels_per_axis + 1
  }

  /// Lattice coordinate of sample `(0, 0, 0)`.
  #[inline]
  pub fn min_coord(&self) -> IVec3 {
    self.center - IVec3::splat(((self.voxels_per_axis >> 1) as i32) << self.lod)
  }

  /// Lattice coordinate of the last sample on every axis.
  #[inline]
  pub fn max_coord(&self) -> IVec3 {
    self.min_coord() + IVec3::splat(self.voxels_per_axis as i32 * self.stride())
  }

  /// Finest-voxel coordinate of a sample.
  #[inline]
  pub fn point_coord(&self, point: [usize; 3]) -> IVec3 {
    self.min_coord() + IVec3::new(point[0] as i32, point[1] as i32, point[2] as i32) * self.stride()
  }
}

/// Flattened `(N + 1)^3` sample grid, `index = (x * P + y) * P + z`.
#[derive(Clone, Debug, PartialEq)]
pub struct DensityField {
  samples: Vec<f32>,
  points_per_axis: usize,
}

impl DensityField {
  /// Field with every sample set to `value`.
  pub fn filled(points_per_axis: usize, value: f32) -> Self {
    Self {
      samples: vec![value; points_per_axis.pow(3)],
      points_per_axis,
    }
  }

  /// Wrap existing samples. Returns `None` when the length is not a cube of
  /// `points_per_axis`.
  pub fn from_samples(points_per_axis: usize, samples: Vec<f32>) -> Option<Self> {
    (samples.len() == points_per_axis.pow(3)).then_some(Self {
      samples,
      points_per_axis,
    })
  }

  #[inline]
  pub fn points_per_axis(&self) -> usize {
    self.points_per_axis
  }

  #[inline]
  pub fn voxels_per_axis(&self) -> usize {
    self.points_per_axis - 1
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.samples.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.samples.is_empty()
  }

  #[inline]
  pub fn get(&self, x: usize, y: usize, z: usize) -> f32 {
    self.samples[point_index(x, y, z, self.points_per_axis)]
  }

  #[inline]
  pub fn set(&mut self, x: usize, y: usize, z: usize, value: f32) {
    let idx = point_index(x, y, z, self.points_per_axis);
    self.samples[idx] = value;
  }

  pub fn samples(&self) -> &[f32] {
    &self.samples
  }

  pub fn samples_mut(&mut self) -> &mut [f32] {
    &mut self.samples
  }

  pub fn into_samples(self) -> Vec<f32> {
    self.samples
  }

  pub fn min_value(&self) -> f32 {
    self.samples.iter().copied().fold(f32::INFINITY, f32::min)
  }
}
