//! Procedural density sources.
//!
//! Generation is a pure function of the chunk coordinate, the LOD and the
//! source parameters: building the same chunk twice yields bit-identical
//! samples on every backend.
//!
//! # Noise Builder
//!
//! ```text
//! density(p) = p.y - height
//!            - amplitude * Σ_i persistence^i * simplex(p * frequency * lacunarity^i + offset_i)
//!
//! offset_i = (r * 2 - 1) * offset_range     (3 draws per octave)
//! ```
//!
//! `r` comes from a PCG generator (an LCG with a permuted output) seeded
//! with the noise seed, so the offsets are the same on every run.

use std::sync::Arc;

use noise::{NoiseFn, Simplex};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use tracing::debug_span;

use super::field::{DensityField, FieldLayout};
use crate::compute::{ComputeBackend, ComputeOp};
use crate::config::{GeneratorSettings, NoiseSettings};
use crate::types::ChunkCoord;

/// Scalar field evaluated at world-space positions.
///
/// Positive values are outside the surface, negative values inside.
pub trait DensitySource: Send + Sync {
  fn density_at(&self, position: [f64; 3]) -> f32;

  /// Backend operation label for chunk builds.
  fn op(&self) -> ComputeOp {
    ComputeOp::BuildDensity
  }
}

/// Blanket impl for boxed trait objects.
impl DensitySource for Box<dyn DensitySource> {
  fn density_at(&self, position: [f64; 3]) -> f32 {
    (**self).density_at(position)
  }

  fn op(&self) -> ComputeOp {
    (**self).op()
  }
}

/// Build the source selected by configuration.
pub fn source_from_settings(settings: &GeneratorSettings) -> Box<dyn DensitySource> {
  match settings {
    GeneratorSettings::Plane { height, thickness } => Box::new(PlaneBuilder {
      height: *height as f64,
      thickness: thickness.map(f64::from),
    }),
    GeneratorSettings::Noise(noise) => Box::new(NoiseBuilder::new(noise.clone())),
  }
}

/// Horizontal ground plane.
///
/// SDF: `y - height`. With a thickness the solid part is limited to the slab
/// `[height - thickness, height]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlaneBuilder {
  pub height: f64,
  pub thickness: Option<f64>,
}

impl PlaneBuilder {
  pub fn new(height: f64) -> Self {
    Self {
      height,
      thickness: None,
    }
  }

  pub fn with_thickness(mut self, thickness: f64) -> Self {
    self.thickness = Some(thickness);
    self
  }
}

impl DensitySource for PlaneBuilder {
  #[inline]
  fn density_at(&self, position: [f64; 3]) -> f32 {
    let y = position[1];
    let top = y - self.height;
    match self.thickness {
      Some(thickness) => top.max((self.height - thickness) - y) as f32,
      None => top as f32,
    }
  }
}

/// Multi-octave simplex terrain.
#[derive(Clone)]
pub struct NoiseBuilder {
  settings: NoiseSettings,
  noise: Simplex,
  offsets: Vec<[f64; 3]>,
}

impl NoiseBuilder {
  pub fn new(settings: NoiseSettings) -> Self {
    let mut rng = offset_rng(settings.seed);
    let offsets = octave_offsets(&mut rng, settings.octaves, settings.offset_range);
    Self {
      noise: Simplex::new(settings.seed),
      settings,
      offsets,
    }
  }

  pub fn settings(&self) -> &NoiseSettings {
    &self.settings
  }

  /// Per-octave sample offsets.
  pub fn offsets(&self) -> &[[f64; 3]] {
    &self.offsets
  }

  /// Sum of octaves at a world position, roughly in `[-2, 2]`.
  pub fn fractal(&self, position: [f64; 3]) -> f64 {
    let mut frequency = self.settings.frequency;
    let mut weight = 1.0;
    let mut sum = 0.0;
    for offset in &self.offsets {
      sum += weight
        * self.noise.get([
          position[0] * frequency + offset[0],
          position[1] * frequency + offset[1],
          position[2] * frequency + offset[2],
        ]);
      frequency *= self.settings.lacunarity;
      weight *= self.settings.persistence;
    }
    sum
  }
}

/// Generator behind the per-octave offsets.
pub fn offset_rng(seed: u32) -> Pcg64 {
  Pcg64::seed_from_u64(seed as u64)
}

fn octave_offsets(rng: &mut impl Rng, octaves: usize, range: f64) -> Vec<[f64; 3]> {
  (0..octaves)
    .map(|_| std::array::from_fn(|_| (rng.random::<f64>() * 2.0 - 1.0) * range))
    .collect()
}

impl DensitySource for NoiseBuilder {
  fn density_at(&self, position: [f64; 3]) -> f32 {
    let ground = position[1] - self.settings.height as f64;
    (ground - self.settings.amplitude as f64 * self.fractal(position)) as f32
  }

  fn op(&self) -> ComputeOp {
    ComputeOp::BuildNoiseDensity
  }
}

/// Produces chunk fields from a source through the compute backend.
pub struct DensityGenerator {
  source: Box<dyn DensitySource>,
  backend: Arc<dyn ComputeBackend>,
  voxels_per_axis: usize,
  voxel_size: f32,
}

impl DensityGenerator {
  pub fn new(
    source: Box<dyn DensitySource>,
    backend: Arc<dyn ComputeBackend>,
    voxels_per_axis: usize,
    voxel_size: f32,
  ) -> Self {
    Self {
      source,
      backend,
      voxels_per_axis,
      voxel_size,
    }
  }

  pub fn voxels_per_axis(&self) -> usize {
    self.voxels_per_axis
  }

  pub fn source(&self) -> &dyn DensitySource {
    self.source.as_ref()
  }

  /// Sample the source at every lattice point of a chunk.
  pub fn build(&self, coord: ChunkCoord, lod: u32) -> DensityField {
    let _span = debug_span!("build_density", ?coord, lod).entered();
    let layout = FieldLayout::new(coord, lod, self.voxels_per_axis);
    let points = layout.points_per_axis();
    let voxel_size = self.voxel_size as f64;
    let source = self.source.as_ref();

    let mut field = DensityField::filled(points, 0.0);
    self.backend.update_points(
      source.op(),
      [points; 3],
      field.samples_mut(),
      &|point, _| {
        let c = layout.point_coord(point);
        source.density_at([
          c.x as f64 * voxel_size,
          c.y as f64 * voxel_size,
          c.z as f64 * voxel_size,
        ])
      },
    );
    field
  }
}

#[cfg(test)]
#[path = "generator_test.rs"]
mod generator_test;
