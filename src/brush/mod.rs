//! Shaped density brushes and the edit history built on them.
//!
//! A brush is a small point lattice in finest-voxel units, sampled at
//! `M + 1` points per axis for a brush of `M` voxels. Samples are in
//! `[-1, 0]`; stamping adds `weight * delta * sample` to every field sample
//! the brush covers, so a positive weight adds material.
//!
//! ```text
//!   Sphere (M = 4), slice through the center:
//!
//!    0     0     0     0     0
//!    0   -.29  -.5   -.29    0
//!    0   -.5    -1   -.5     0
//!    0   -.29  -.5   -.29    0
//!    0     0     0     0     0
//! ```
//!
//! - [`stamp`]: footprint mapping and the additive operator
//! - [`library`]: brush assets on disk
//! - [`editor`]: current brush selection and undo/redo history

pub mod editor;
pub mod library;
pub mod stamp;

use std::fmt;
use std::sync::Arc;

use glam::Vec3;

use crate::compute::{ComputeBackend, ComputeOp};
use crate::density::DensityField;

pub use editor::BrushEditor;
pub use library::BrushLibrary;
pub use stamp::{apply_brush, footprint, hit_coord};

/// Brush kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BrushShape {
  #[default]
  Sphere,
  Cube,
  /// Asset produced by external tooling; never built procedurally.
  Custom,
}

impl BrushShape {
  pub const fn name(self) -> &'static str {
    match self {
      BrushShape::Sphere => "sphere",
      BrushShape::Cube => "cube",
      BrushShape::Custom => "custom",
    }
  }
}

impl fmt::Display for BrushShape {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// Immutable brush lattice.
#[derive(Clone, Debug, PartialEq)]
pub struct Brush {
  shape: BrushShape,
  samples: DensityField,
}

impl Brush {
  pub fn new(shape: BrushShape, samples: DensityField) -> Self {
    Self { shape, samples }
  }

  /// Procedural brush, or `None` for [`BrushShape::Custom`].
  pub fn build(backend: &dyn ComputeBackend, shape: BrushShape, voxels_per_axis: usize) -> Option<Self> {
    let points = voxels_per_axis + 1;
    let mut samples = DensityField::filled(points, 0.0);
    match shape {
      BrushShape::Sphere => {
        let center = Vec3::splat((voxels_per_axis >> 1) as f32);
        let radius = (voxels_per_axis as f32 * 0.5).max(f32::EPSILON);
        backend.update_points(ComputeOp::BuildBrush, [points; 3], samples.samples_mut(), &|[x, y, z], _| {
          let dist = Vec3::new(x as f32, y as f32, z as f32).distance(center);
          -(1.0 - dist / radius).clamp(0.0, 1.0)
        });
      }
      BrushShape::Cube => {
        backend.update_points(ComputeOp::BuildBrush, [points; 3], samples.samples_mut(), &|_, _| -1.0);
      }
      BrushShape::Custom => return None,
    }
    Some(Self { shape, samples })
  }

  #[inline]
  pub fn shape(&self) -> BrushShape {
    self.shape
  }

  /// Brush extent `M` in finest voxels.
  #[inline]
  pub fn voxels_per_axis(&self) -> usize {
    self.samples.voxels_per_axis()
  }

  #[inline]
  pub fn samples(&self) -> &DensityField {
    &self.samples
  }

  #[inline]
  pub fn get(&self, x: usize, y: usize, z: usize) -> f32 {
    self.samples.get(x, y, z)
  }
}

/// One recorded brush application.
///
/// Undo re-applies the record with the weight negated; redo re-applies it
/// as recorded. Sphere and Cube records are rebuilt from shape and size;
/// Custom records keep the brush they stamped.
#[derive(Clone, Debug, PartialEq)]
pub struct EditInfo {
  pub shape: BrushShape,
  pub voxels_per_axis: usize,
  /// World-space edit point.
  pub point: Vec3,
  /// Signed strength, +1 adds material and -1 removes it.
  pub weight: f32,
  /// Time step the edit was applied with.
  pub delta: f32,
  /// Stamped brush of a Custom edit.
  pub custom: Option<Arc<Brush>>,
}

impl EditInfo {
  /// Scale applied to brush samples.
  #[inline]
  pub fn amount(&self) -> f32 {
    self.weight * self.delta
  }

  /// The same edit with the weight negated.
  pub fn inverse(&self) -> Self {
    Self {
      weight: -self.weight,
      ..self.clone()
    }
  }
}
