//! Terrain configuration, loadable from TOML.
//!
//! Every field has a default, so an empty document is a valid configuration:
//!
//! ```toml
//! [chunk]
//! power_voxels_per_axis = 5
//! voxel_size = 1.0
//!
//! [lod]
//! max_lod = 4
//! thresholds = [0.0, 96.0, 192.0, 384.0, 768.0]
//!
//! [generator]
//! kind = "noise"
//! seed = 1
//! octaves = 8
//! ```
//!
//! Values are never rejected. [`TerrainConfig::validate`] reports settings
//! that produce incoherent LOD falloff or no-op edits.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::constants::{
  DEFAULT_POWER_VOXELS_PER_AXIS, MAX_POWER_VOXELS_PER_AXIS, MIN_POWER_VOXELS_PER_AXIS, NOISE_OCTAVES,
  NOISE_OFFSET_RANGE, NOISE_SEED,
};
use crate::error::{Result, TerrainError};

/// Root configuration.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
  pub chunk: ChunkSettings,
  pub lod: LodSettings,
  pub brush: BrushSettings,
  pub streaming: StreamingSettings,
  pub storage: StorageSettings,
  pub generator: GeneratorSettings,
}

/// Per-chunk lattice settings.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChunkSettings {
  /// Voxels per axis = 2^power.
  pub power_voxels_per_axis: u32,
  /// World size of one finest-level voxel.
  pub voxel_size: f32,
  /// Density threshold of the surface.
  pub iso_level: f32,
  /// Depth of transition cells as a fraction of one coarse cell.
  pub transition_width: f32,
}

impl Default for ChunkSettings {
  fn default() -> Self {
    Self {
      power_voxels_per_axis: DEFAULT_POWER_VOXELS_PER_AXIS,
      voxel_size: 1.0,
      iso_level: 0.0,
      transition_width: 0.5,
    }
  }
}

impl ChunkSettings {
  /// Voxels per chunk axis.
  #[inline]
  pub fn voxels_per_axis(&self) -> usize {
    1usize << self.power_voxels_per_axis
  }

  /// Density samples per chunk axis.
  #[inline]
  pub fn points_per_axis(&self) -> usize {
    self.voxels_per_axis() + 1
  }

  /// Density samples per chunk.
  #[inline]
  pub fn points_per_chunk(&self) -> usize {
    let points = self.points_per_axis();
    points * points * points
  }
}

/// Octree depth and per-level refinement distances.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LodSettings {
  /// LOD of the root node.
  pub max_lod: u32,
  /// A node at level `l` is a visible leaf once the camera is at least
  /// `thresholds[l]` world units from its bounds.
  pub thresholds: Vec<f32>,
}

impl Default for LodSettings {
  fn default() -> Self {
    Self {
      max_lod: 4,
      thresholds: vec![0.0, 96.0, 192.0, 384.0, 768.0],
    }
  }
}

impl LodSettings {
  /// Threshold for a level; levels missing from the table never refine.
  #[inline]
  pub fn threshold(&self, lod: u32) -> f32 {
    self.thresholds.get(lod as usize).copied().unwrap_or(0.0)
  }
}

/// Brush sizing and history.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct BrushSettings {
  pub min_size: usize,
  pub max_size: usize,
  pub initial_size: usize,
  /// Undo records kept before the oldest is dropped.
  pub history_limit: usize,
  /// Directory holding brush assets. Without one every brush is built
  /// procedurally.
  pub asset_dir: Option<PathBuf>,
}

impl Default for BrushSettings {
  fn default() -> Self {
    Self {
      min_size: 2,
      max_size: 14,
      initial_size: 2,
      history_limit: 256,
      asset_dir: None,
    }
  }
}

/// Incremental queue draining.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamingSettings {
  /// Completed items per queue per tick.
  pub items_per_tick: usize,
}

impl Default for StreamingSettings {
  fn default() -> Self {
    Self { items_per_tick: 1 }
  }
}

/// Where persisted density fields are read from before any save/load
/// command picks a directory.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageSettings {
  pub field_dir: Option<PathBuf>,
}

/// Procedural density builder selection.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeneratorSettings {
  /// Horizontal ground plane, optionally a slab of finite thickness.
  Plane {
    #[serde(default)]
    height: f32,
    #[serde(default)]
    thickness: Option<f32>,
  },
  /// Multi-octave noise terrain.
  Noise(NoiseSettings),
}

impl Default for GeneratorSettings {
  fn default() -> Self {
    GeneratorSettings::Plane {
      height: 0.0,
      thickness: None,
    }
  }
}

/// Noise builder parameters.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct NoiseSettings {
  pub seed: u32,
  pub octaves: usize,
  /// Base frequency in cycles per world unit.
  pub frequency: f64,
  pub lacunarity: f64,
  pub persistence: f64,
  /// World-unit displacement of the ground height at full noise.
  pub amplitude: f32,
  pub height: f32,
  pub offset_range: f64,
}

impl Default for NoiseSettings {
  fn default() -> Self {
    Self {
      seed: NOISE_SEED,
      octaves: NOISE_OCTAVES,
      frequency: 0.005,
      lacunarity: 2.0,
      persistence: 0.5,
      amplitude: 48.0,
      height: 0.0,
      offset_range: NOISE_OFFSET_RANGE,
    }
  }
}

/// A setting that is accepted but likely produces incoherent results.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigWarning {
  #[error("lod threshold {lod} ({value}) is smaller than threshold {prev_lod} ({prev_value})")]
  NonMonotonicThreshold {
    lod: u32,
    value: f32,
    prev_lod: u32,
    prev_value: f32,
  },
  #[error("lod thresholds cover {len} levels but max_lod is {max_lod}")]
  ShortThresholdTable { len: usize, max_lod: u32 },
  #[error("power_voxels_per_axis {0} is outside the supported range")]
  ChunkPowerOutOfRange(u32),
  #[error("voxel_size {0} must be positive")]
  NonPositiveVoxelSize(f32),
  #[error("transition_width {0} should lie strictly between 0 and 1")]
  TransitionWidthOutOfRange(f32),
  #[error("brush size range {min}..={max} is empty or zero-sized")]
  DegenerateBrushRange { min: usize, max: usize },
  #[error("plane thickness {0} must be positive")]
  NonPositiveThickness(f32),
  #[error("noise builder needs at least one octave")]
  NoOctaves,
  #[error("items_per_tick is 0, queues will never drain")]
  StalledStreaming,
}

impl TerrainConfig {
  /// Load configuration from a TOML file.
  pub fn load(path: &Path) -> Result<Self> {
    let content = std::fs::read_to_string(path).map_err(|source| TerrainError::ConfigRead {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_toml_str(&content)
  }

  /// Parse configuration from TOML text.
  pub fn from_toml_str(content: &str) -> Result<Self> {
    Ok(toml::from_str(content)?)
  }

  /// Check settings and log every finding at `warn` level.
  pub fn validate(&self) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    let power = self.chunk.power_voxels_per_axis;
    if !(MIN_POWER_VOXELS_PER_AXIS..=MAX_POWER_VOXELS_PER_AXIS).contains(&power) {
      warnings.push(ConfigWarning::ChunkPowerOutOfRange(power));
    }
    if self.chunk.voxel_size <= 0.0 {
      warnings.push(ConfigWarning::NonPositiveVoxelSize(self.chunk.voxel_size));
    }
    let width = self.chunk.transition_width;
    if !(width > 0.0 && width < 1.0) {
      warnings.push(ConfigWarning::TransitionWidthOutOfRange(width));
    }

    let thresholds = &self.lod.thresholds;
    if thresholds.len() < self.lod.max_lod as usize + 1 {
      warnings.push(ConfigWarning::ShortThresholdTable {
        len: thresholds.len(),
        max_lod: self.lod.max_lod,
      });
    }
    // Level 0 never subdivides, so its entry does not take part in ordering.
    for lod in 2..thresholds.len() {
      if thresholds[lod] < thresholds[lod - 1] {
        warnings.push(ConfigWarning::NonMonotonicThreshold {
          lod: lod as u32,
          value: thresholds[lod],
          prev_lod: lod as u32 - 1,
          prev_value: thresholds[lod - 1],
        });
      }
    }

    let brush = &self.brush;
    if brush.min_size == 0 || brush.min_size > brush.max_size {
      warnings.push(ConfigWarning::DegenerateBrushRange {
        min: brush.min_size,
        max: brush.max_size,
      });
    }

    match &self.generator {
      GeneratorSettings::Plane {
        thickness: Some(thickness),
        ..
      } if *thickness <= 0.0 => {
        warnings.push(ConfigWarning::NonPositiveThickness(*thickness));
      }
      GeneratorSettings::Noise(noise) if noise.octaves == 0 => {
        warnings.push(ConfigWarning::NoOctaves);
      }
      _ => {}
    }

    if self.streaming.items_per_tick == 0 {
      warnings.push(ConfigWarning::StalledStreaming);
    }

    for warning in &warnings {
      warn!(%warning, "terrain configuration");
    }
    warnings
  }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
