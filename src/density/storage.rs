//! On-disk density fields.
//!
//! One headerless file per chunk, holding `(N + 1)^3` little-endian `f32`
//! samples in lattice order:
//!
//! ```text
//! {dir}/density_{x}_{y}_{z}.asset
//! ```
//!
//! Directory creation is left to the caller.

use std::path::{Path, PathBuf};

use super::field::DensityField;
use crate::constants::{ASSET_EXTENSION, FIELD_FILE_PREFIX};
use crate::error::{Result, TerrainError};
use crate::types::ChunkCoord;

/// Path of a chunk's field file.
pub fn field_path(dir: &Path, coord: ChunkCoord) -> PathBuf {
  dir.join(format!(
    "{}_{}_{}_{}.{}",
    FIELD_FILE_PREFIX, coord.x, coord.y, coord.z, ASSET_EXTENSION
  ))
}

pub fn field_exists(dir: &Path, coord: ChunkCoord) -> bool {
  field_path(dir, coord).is_file()
}

/// Read a chunk's field; the file must hold exactly `points_per_axis^3`
/// samples.
pub fn load_field(dir: &Path, coord: ChunkCoord, points_per_axis: usize) -> Result<DensityField> {
  let path = field_path(dir, coord);
  let expected = points_per_axis.pow(3);
  let samples = read_samples(&path, expected)?;
  let actual = samples.len() * 4;
  DensityField::from_samples(points_per_axis, samples).ok_or(TerrainError::FieldSize {
    path,
    expected: expected * 4,
    actual,
  })
}

pub fn save_field(dir: &Path, coord: ChunkCoord, field: &DensityField) -> Result<()> {
  write_samples(&field_path(dir, coord), field.samples())
}

/// Read a raw little-endian `f32` file of known length.
pub fn read_samples(path: &Path, expected_len: usize) -> Result<Vec<f32>> {
  let bytes = std::fs::read(path).map_err(|source| TerrainError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  if bytes.len() != expected_len * 4 {
    return Err(TerrainError::FieldSize {
      path: path.to_path_buf(),
      expected: expected_len * 4,
      actual: bytes.len(),
    });
  }
  Ok(
    bytes
      .chunks_exact(4)
      .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
      .collect(),
  )
}

/// Write a raw little-endian `f32` file.
pub fn write_samples(path: &Path, samples: &[f32]) -> Result<()> {
  let bytes: Vec<u8> = samples.iter().flat_map(|v| v.to_le_bytes()).collect();
  std::fs::write(path, bytes).map_err(|source| TerrainError::Write {
    path: path.to_path_buf(),
    source,
  })
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;
