//! Brush selection and linear edit history.
//!
//! ```text
//! set_brush(shape, size) ──► same as current? ──yes──► no-op
//!                                │ no
//!                                ▼
//!                     library asset or procedural build
//!
//! record(edit):   undo.push(edit), redo.clear()
//! peek_undo():    top of undo        (caller applies the inverse)
//! finish_undo():  undo.pop() → redo.push()
//! peek_redo():    top of redo        (caller applies it as recorded)
//! finish_redo():  redo.pop() → undo.push()
//! ```
//!
//! A record only moves between stacks once its edit has landed, so a failed
//! undo or redo leaves the history as it was. The undo stack is bounded; the
//! oldest record is dropped first.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::debug;

use super::library::{asset_name, BrushLibrary};
use super::{Brush, BrushShape, EditInfo};
use crate::compute::ComputeBackend;
use crate::config::BrushSettings;
use crate::error::{Result, TerrainError};

pub struct BrushEditor {
  backend: Arc<dyn ComputeBackend>,
  library: BrushLibrary,
  min_size: usize,
  max_size: usize,
  history_limit: usize,

  shape: BrushShape,
  size: usize,
  current: Option<Brush>,
  /// Brush stamped in model mode.
  custom: Option<Arc<Brush>>,
  rebuilds: usize,

  undo: VecDeque<EditInfo>,
  redo: Vec<EditInfo>,
}

impl BrushEditor {
  pub fn new(settings: &BrushSettings, backend: Arc<dyn ComputeBackend>) -> Self {
    let max_size = settings.max_size.max(settings.min_size);
    Self {
      backend,
      library: BrushLibrary::new(settings.asset_dir.clone()),
      min_size: settings.min_size,
      max_size,
      history_limit: settings.history_limit,
      shape: BrushShape::Sphere,
      size: settings.initial_size.clamp(settings.min_size, max_size),
      current: None,
      custom: None,
      rebuilds: 0,
      undo: VecDeque::new(),
      redo: Vec::new(),
    }
  }

  pub fn shape(&self) -> BrushShape {
    self.shape
  }

  pub fn size(&self) -> usize {
    self.size
  }

  pub fn library(&self) -> &BrushLibrary {
    &self.library
  }

  /// How many times a brush has been built or loaded for selection.
  pub fn rebuild_count(&self) -> usize {
    self.rebuilds
  }

  /// Select a brush; the size is clamped to the configured range.
  ///
  /// Returns `Ok(false)` when the selection is unchanged. On error the
  /// previous selection stays.
  pub fn set_brush(&mut self, shape: BrushShape, size: usize) -> Result<bool> {
    self.select(shape, size.clamp(self.min_size, self.max_size))
  }

  pub fn grow(&mut self) -> Result<bool> {
    self.set_brush(self.shape, self.size + 1)
  }

  pub fn shrink(&mut self) -> Result<bool> {
    self.set_brush(self.shape, self.size.saturating_sub(1))
  }

  fn select(&mut self, shape: BrushShape, size: usize) -> Result<bool> {
    if (shape, size) == (self.shape, self.size) && self.current.is_some() {
      return Ok(false);
    }
    let previous = (self.shape, self.size);
    self.shape = shape;
    self.size = size;
    if let Err(err) = self.brush() {
      (self.shape, self.size) = previous;
      return Err(err);
    }
    Ok(previous != (shape, size))
  }

  /// The selected brush, built on first use after a selection change.
  pub fn brush(&mut self) -> Result<&Brush> {
    let fresh = self
      .current
      .as_ref()
      .is_some_and(|b| b.shape() == self.shape && b.voxels_per_axis() == self.size);
    if !fresh {
      let brush = self.library.brush(self.backend.as_ref(), self.shape, self.size)?;
      self.rebuilds += 1;
      debug!(shape = %self.shape, size = self.size, "brush rebuilt");
      self.current = Some(brush);
    }
    self.current.as_ref().ok_or_else(|| TerrainError::MissingBrushAsset {
      name: asset_name(self.shape, self.size),
    })
  }

  /// Load a named Custom brush for model mode.
  pub fn load_custom(&mut self, name: &str) -> Result<&Brush> {
    let brush = self.library.load_named(name)?;
    debug!(name, size = brush.voxels_per_axis(), "custom brush loaded");
    Ok(&**self.custom.insert(Arc::new(brush)))
  }

  /// Loaded Custom brush, shared with the records of edits made with it.
  pub fn custom(&self) -> Option<&Arc<Brush>> {
    self.custom.as_ref()
  }

  /// Brush a recorded edit was made with. Custom records carry their own
  /// brush; Sphere and Cube are reselected when the selection differs.
  pub fn brush_for<'a>(&'a mut self, edit: &'a EditInfo) -> Result<&'a Brush> {
    if edit.shape == BrushShape::Custom {
      return edit.custom.as_deref().ok_or_else(|| TerrainError::MissingBrushAsset {
        name: asset_name(edit.shape, edit.voxels_per_axis),
      });
    }
    self.select(edit.shape, edit.voxels_per_axis)?;
    self.brush()
  }

  /// Push a new edit; clears the redo stack.
  pub fn record(&mut self, edit: EditInfo) {
    self.redo.clear();
    self.push_undo(edit);
  }

  fn push_undo(&mut self, edit: EditInfo) {
    self.undo.push_back(edit);
    while self.undo.len() > self.history_limit {
      self.undo.pop_front();
    }
  }

  /// Most recent edit.
  pub fn peek_undo(&self) -> Option<&EditInfo> {
    self.undo.back()
  }

  /// Move the most recent edit to the redo stack once its inverse landed.
  pub fn finish_undo(&mut self) {
    if let Some(edit) = self.undo.pop_back() {
      self.redo.push(edit);
    }
  }

  /// Most recently undone edit.
  pub fn peek_redo(&self) -> Option<&EditInfo> {
    self.redo.last()
  }

  /// Move the most recently undone edit back once it was re-applied.
  pub fn finish_redo(&mut self) {
    if let Some(edit) = self.redo.pop() {
      self.push_undo(edit);
    }
  }

  pub fn undo_len(&self) -> usize {
    self.undo.len()
  }

  pub fn redo_len(&self) -> usize {
    self.redo.len()
  }

  pub fn clear_history(&mut self) {
    self.undo.clear();
    self.redo.clear();
  }
}

#[cfg(test)]
#[path = "editor_test.rs"]
mod editor_test;
