//! Brush assets.
//!
//! Assets use the density field format (headerless little-endian `f32`)
//! and live in one directory:
//!
//! ```text
//! {dir}/{shape}_{size}.asset    e.g. sphere_6.asset
//! {dir}/{name}.asset            named custom brushes
//! ```
//!
//! A missing Sphere or Cube asset is built procedurally. A Custom brush has
//! no procedural form and must come from an asset.

use std::path::{Path, PathBuf};

use tracing::trace;

use super::{Brush, BrushShape};
use crate::compute::ComputeBackend;
use crate::constants::ASSET_EXTENSION;
use crate::density::storage::{read_samples, write_samples};
use crate::density::DensityField;
use crate::error::{Result, TerrainError};

/// Asset name of a sized brush.
pub fn asset_name(shape: BrushShape, voxels_per_axis: usize) -> String {
  format!("{}_{}", shape, voxels_per_axis)
}

/// Directory-backed brush assets.
#[derive(Clone, Debug, Default)]
pub struct BrushLibrary {
  dir: Option<PathBuf>,
}

impl BrushLibrary {
  pub fn new(dir: Option<PathBuf>) -> Self {
    Self { dir }
  }

  pub fn dir(&self) -> Option<&Path> {
    self.dir.as_deref()
  }

  fn asset_path(&self, name: &str) -> Option<PathBuf> {
    self
      .dir
      .as_ref()
      .map(|dir| dir.join(format!("{}.{}", name, ASSET_EXTENSION)))
  }

  /// Asset for `(shape, size)`, else a procedural brush.
  pub fn brush(&self, backend: &dyn ComputeBackend, shape: BrushShape, voxels_per_axis: usize) -> Result<Brush> {
    let name = asset_name(shape, voxels_per_axis);
    if let Some(path) = self.asset_path(&name).filter(|p| p.is_file()) {
      trace!(%name, "brush from asset");
      let samples = read_samples(&path, (voxels_per_axis + 1).pow(3))?;
      return Ok(Brush::new(shape, field_from(&path, voxels_per_axis + 1, samples)?));
    }
    trace!(%name, "procedural brush");
    Brush::build(backend, shape, voxels_per_axis).ok_or(TerrainError::MissingBrushAsset { name })
  }

  /// Store a brush under its `{shape}_{size}` name.
  pub fn save(&self, brush: &Brush) -> Result<PathBuf> {
    self.save_named(brush, &asset_name(brush.shape(), brush.voxels_per_axis()))
  }

  pub fn save_named(&self, brush: &Brush, name: &str) -> Result<PathBuf> {
    let path = self.asset_path(name).ok_or(TerrainError::NoAssetDirectory)?;
    if let Some(parent) = path.parent().filter(|p| !p.is_dir()) {
      return Err(TerrainError::MissingDirectory(parent.to_path_buf()));
    }
    write_samples(&path, brush.samples().samples())?;
    Ok(path)
  }

  /// Load a named asset as a Custom brush; its size follows from the file
  /// length.
  pub fn load_named(&self, name: &str) -> Result<Brush> {
    let path = self
      .asset_path(name)
      .filter(|p| p.is_file())
      .ok_or_else(|| TerrainError::MissingBrushAsset { name: name.to_owned() })?;

    let len = std::fs::metadata(&path)
      .map_err(|source| TerrainError::Read {
        path: path.clone(),
        source,
      })?
      .len() as usize;
    let points = cube_root(len / 4);
    if points == 0 {
      return Err(TerrainError::FieldSize {
        path,
        expected: 4,
        actual: len,
      });
    }
    let samples = read_samples(&path, points.pow(3))?;
    Ok(Brush::new(BrushShape::Custom, field_from(&path, points, samples)?))
  }
}

fn field_from(path: &Path, points: usize, samples: Vec<f32>) -> Result<DensityField> {
  let actual = samples.len() * 4;
  DensityField::from_samples(points, samples).ok_or(TerrainError::FieldSize {
    path: path.to_path_buf(),
    expected: points.pow(3) * 4,
    actual,
  })
}

/// Largest `p` with `p^3 <= n`.
fn cube_root(n: usize) -> usize {
  let mut p = (n as f64).cbrt().round() as usize;
  while p > 0 && p.pow(3) > n {
    p -= 1;
  }
  while (p + 1).pow(3) <= n {
    p += 1;
  }
  p
}

#[cfg(test)]
#[path = "library_test.rs"]
mod library_test;
