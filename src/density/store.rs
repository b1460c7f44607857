//! Density field store: the authoritative voxel data per chunk.
//!
//! # Resolution Order
//!
//! ```text
//! get_field(coord, lod):
//!   1. edited overlay   → return as-is
//!   2. cache            → return as-is
//!   3. file in dir      → load, insert into cache
//!   4. procedural       → build, insert into cache
//! ```
//!
//! A coordinate lives in at most one of {overlay, cache}. Edits move the
//! field out of whichever tier holds it and commit it to the overlay; the
//! overlay keeps it until a load replaces it or the store is cleared.
//! Nothing is evicted implicitly.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::trace;

use super::field::DensityField;
use super::generator::DensityGenerator;
use super::storage;
use crate::error::Result;
use crate::types::ChunkCoord;

/// Overlay + cache + file + procedural field store.
pub struct DensityStore {
  generator: DensityGenerator,
  overlay: HashMap<ChunkCoord, DensityField>,
  cache: HashMap<ChunkCoord, DensityField>,
  /// Directory consulted by the file tier.
  field_dir: Option<PathBuf>,
}

impl DensityStore {
  pub fn new(generator: DensityGenerator, field_dir: Option<PathBuf>) -> Self {
    Self {
      generator,
      overlay: HashMap::new(),
      cache: HashMap::new(),
      field_dir,
    }
  }

  pub fn generator(&self) -> &DensityGenerator {
    &self.generator
  }

  #[inline]
  pub fn points_per_axis(&self) -> usize {
    self.generator.voxels_per_axis() + 1
  }

  pub fn field_dir(&self) -> Option<&Path> {
    self.field_dir.as_deref()
  }

  pub fn set_field_dir(&mut self, dir: Option<PathBuf>) {
    self.field_dir = dir;
  }

  /// Resolve a field through every tier.
  pub fn get_field(&mut self, coord: ChunkCoord, lod: u32) -> Result<&DensityField> {
    if let Some(field) = self.overlay.get(&coord) {
      return Ok(field);
    }
    match self.cache.entry(coord) {
      Entry::Occupied(entry) => Ok(entry.into_mut()),
      Entry::Vacant(entry) => {
        let field = produce(&self.generator, self.field_dir.as_deref(), coord, lod)?;
        Ok(entry.insert(field))
      }
    }
  }

  /// Make sure a field is resident without borrowing it.
  pub fn ensure_field(&mut self, coord: ChunkCoord, lod: u32) -> Result<()> {
    self.get_field(coord, lod).map(|_| ())
  }

  /// Resident field, if any. Never loads or generates.
  pub fn peek(&self, coord: ChunkCoord) -> Option<&DensityField> {
    self.overlay.get(&coord).or_else(|| self.cache.get(&coord))
  }

  /// Move a field out of its tier for mutation. Pair with
  /// [`commit_edit`](Self::commit_edit).
  pub fn take_for_edit(&mut self, coord: ChunkCoord, lod: u32) -> Result<DensityField> {
    if let Some(field) = self.overlay.remove(&coord) {
      return Ok(field);
    }
    if let Some(field) = self.cache.remove(&coord) {
      return Ok(field);
    }
    produce(&self.generator, self.field_dir.as_deref(), coord, lod)
  }

  /// Store an edited field in the overlay.
  pub fn commit_edit(&mut self, coord: ChunkCoord, field: DensityField) {
    self.cache.remove(&coord);
    self.overlay.insert(coord, field);
  }

  /// Replace whatever is resident with a field read from disk.
  pub fn insert_loaded(&mut self, coord: ChunkCoord, field: DensityField) {
    self.overlay.remove(&coord);
    self.cache.insert(coord, field);
  }

  /// Drop a clean cached field. Edited fields are kept.
  pub fn evict_cached(&mut self, coord: ChunkCoord) -> bool {
    self.cache.remove(&coord).is_some()
  }

  /// Discard overlay and cache.
  pub fn clear_all(&mut self) {
    self.overlay.clear();
    self.cache.clear();
  }

  pub fn is_edited(&self, coord: ChunkCoord) -> bool {
    self.overlay.contains_key(&coord)
  }

  pub fn is_cached(&self, coord: ChunkCoord) -> bool {
    self.cache.contains_key(&coord)
  }

  pub fn edited_count(&self) -> usize {
    self.overlay.len()
  }

  pub fn cached_count(&self) -> usize {
    self.cache.len()
  }

  /// Coordinates to persist: overlay first, then cache, each sorted.
  pub fn saveable_coords(&self) -> Vec<ChunkCoord> {
    let mut edited: Vec<ChunkCoord> = self.overlay.keys().copied().collect();
    let mut cached: Vec<ChunkCoord> = self.cache.keys().copied().collect();
    edited.sort_by_key(|c| c.to_array());
    cached.sort_by_key(|c| c.to_array());
    edited.extend(cached);
    edited
  }

  /// Write one resident field. Absent fields are skipped.
  pub fn save_field(&self, dir: &Path, coord: ChunkCoord) -> Result<bool> {
    match self.peek(coord) {
      Some(field) => storage::save_field(dir, coord, field).map(|_| true),
      None => Ok(false),
    }
  }
}

fn produce(
  generator: &DensityGenerator,
  field_dir: Option<&Path>,
  coord: ChunkCoord,
  lod: u32,
) -> Result<DensityField> {
  if let Some(dir) = field_dir {
    if storage::field_exists(dir, coord) {
      trace!(?coord, lod, "field from file");
      return storage::load_field(dir, coord, generator.voxels_per_axis() + 1);
    }
  }
  trace!(?coord, lod, "field from generator");
  Ok(generator.build(coord, lod))
}

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;
