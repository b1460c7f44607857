//! Terrain facade: octree, density store, meshing, brush editing and
//! streaming behind one command surface.
//!
//! # Data Flow
//!
//! ```text
//! update_camera ──► Octree::update_visible_leaves ──► create / release queues
//!                                                          │
//! tick ──► StreamingCoordinator ──► TerrainCore (StreamingHost)
//!                                       │
//!                                       ├─ create:  fields ─► extract_mesh ─► SceneEvent::Show
//!                                       ├─ release: SceneEvent::Hide, evict cached field
//!                                       ├─ load:    file ─► cache, re-mesh if presented
//!                                       └─ save:    overlay / cache ─► file
//!
//! apply_brush ──► get_intersecting_nodes ──► stamp every LOD ──► re-mesh presented leaves
//! ```
//!
//! Meshes leave the crate through a `crossbeam_channel` of [`SceneEvent`]s.
//! The receiving side owns scene objects; it never calls back into the
//! terrain.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossbeam_channel::{self as channel, Receiver, Sender};
use glam::Vec3;
use tracing::{debug, trace, warn};
use web_time::Instant;

use crate::brush::{apply_brush, footprint, hit_coord, Brush, BrushEditor, BrushShape, EditInfo};
use crate::compute::ComputeBackend;
use crate::config::TerrainConfig;
use crate::density::{source_from_settings, storage, DensityGenerator, DensitySource, DensityStore, FieldLayout};
use crate::error::{Result, TerrainError};
use crate::mesh::{extract_mesh, ChunkFields};
use crate::octree::{finer_neighbor_centers, Frustum, LodMask, NodeInfo, Octree, VisibleLeaves};
use crate::streaming::{StreamingCoordinator, StreamingHost, TickReport, WorkOutcome};
use crate::types::{ChunkCoord, MeshConfig, MeshOutput};

/// Which brush, if any, `apply_brush` stamps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EditorMode {
  /// Edits are ignored.
  #[default]
  View,
  /// The selected Sphere or Cube brush.
  Edit,
  /// The loaded Custom brush.
  Model,
}

/// Scene changes for the embedding application.
#[derive(Clone, Debug, PartialEq)]
pub enum SceneEvent {
  /// Create or replace the object of a chunk.
  Show {
    coord: ChunkCoord,
    lod: u32,
    mesh: MeshOutput,
  },
  /// Destroy the object of a chunk.
  Hide { coord: ChunkCoord },
}

/// What the scene currently shows for a chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PresentedChunk {
  pub lod: u32,
  /// Mask the mesh was extracted with.
  pub lod_mask: LodMask,
  pub triangles: usize,
  /// The field changed but re-meshing failed; the shown mesh is outdated
  /// until the chunk is created again.
  pub stale: bool,
}

/// Status counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TerrainStats {
  pub presented: usize,
  pub triangles: usize,
  pub creating: usize,
  pub releasing: usize,
  pub loading: usize,
  pub saving: usize,
  pub cached_fields: usize,
  pub edited_fields: usize,
}

/// State touched by queued work and edits.
pub struct TerrainCore {
  mesh_config: MeshConfig,
  voxel_size: f32,
  backend: Arc<dyn ComputeBackend>,
  octree: Octree,
  store: DensityStore,
  leaves: VisibleLeaves,
  presented: HashMap<ChunkCoord, PresentedChunk>,
  events: Sender<SceneEvent>,
}

impl TerrainCore {
  /// Mesh a chunk from its field and, for every face in `lod_mask`, the
  /// visible finer neighbors across it.
  fn mesh_chunk(&mut self, info: &NodeInfo, lod_mask: LodMask) -> Result<MeshOutput> {
    let voxels = self.mesh_config.voxels_per_axis;
    self.store.ensure_field(info.center, info.lod)?;

    let mut neighbors = Vec::new();
    for face in lod_mask.iter() {
      for center in finer_neighbor_centers(info.center, info.voxels_per_axis, face) {
        if let Some(neighbor) = self.leaves.get(&center).filter(|n| n.lod + 1 == info.lod) {
          neighbors.push((face, center, neighbor.lod));
        }
      }
    }
    for &(_, center, lod) in &neighbors {
      self.store.ensure_field(center, lod)?;
    }

    let Some(field) = self.store.peek(info.center) else {
      warn!(coord = ?info.center, "chunk field missing after resolve");
      return Ok(MeshOutput::new());
    };
    let mut chunk =
      ChunkFields::new(FieldLayout::new(info.center, info.lod, voxels), field).with_lod_mask(lod_mask);
    for (face, center, lod) in neighbors {
      if let Some(neighbor) = self.store.peek(center) {
        chunk = chunk.with_neighbor(face, FieldLayout::new(center, lod, voxels), neighbor);
      }
    }
    Ok(extract_mesh(self.backend.as_ref(), &self.mesh_config, &chunk))
  }

  /// Mesh a chunk and hand it to the scene.
  fn present(&mut self, info: &NodeInfo, lod_mask: LodMask) -> Result<()> {
    let mesh = self.mesh_chunk(info, lod_mask)?;
    self.presented.insert(
      info.center,
      PresentedChunk {
        lod: info.lod,
        lod_mask,
        triangles: mesh.triangle_count(),
        stale: false,
      },
    );
    let event = SceneEvent::Show {
      coord: info.center,
      lod: info.lod,
      mesh,
    };
    if self.events.send(event).is_err() {
      trace!(coord = ?info.center, "scene receiver dropped, show discarded");
    }
    Ok(())
  }

  /// Visible leaf at `coord` whose mesh is on screen.
  fn presented_leaf(&self, coord: ChunkCoord, lod: u32) -> Option<NodeInfo> {
    let leaf = self.leaves.get(&coord).filter(|leaf| leaf.lod == lod)?;
    self.presented.contains_key(&coord).then_some(*leaf)
  }

  /// Stamp an edit into every node the brush box touches, at every LOD,
  /// then re-mesh the presented leaves among them. Returns the presented
  /// chunks whose re-mesh failed; they are marked stale and need creating
  /// again.
  ///
  /// Every field is resolved before the first one is stamped, so a read
  /// error leaves all of them untouched. Once stamped the edit stands:
  /// re-mesh errors are logged, not returned.
  fn apply_edit(&mut self, edit: &EditInfo, brush: &Brush) -> Result<Vec<ChunkCoord>> {
    let start = Instant::now();
    let voxels = self.mesh_config.voxels_per_axis;
    let hit = hit_coord(edit.point, self.voxel_size);
    let amount = edit.amount();

    let nodes = self
      .octree
      .get_intersecting_nodes(hit, brush.voxels_per_axis() as i32);
    let targets: Vec<(NodeInfo, FieldLayout)> = nodes
      .iter()
      .map(|node| (*node, FieldLayout::new(node.center, node.lod, voxels)))
      .filter(|(_, layout)| footprint(layout, hit, brush.voxels_per_axis()).is_some())
      .collect();
    for (node, _) in &targets {
      self.store.ensure_field(node.center, node.lod)?;
    }

    let mut remesh = Vec::new();
    for (node, layout) in &targets {
      // Resident after the pass above; this never reads or generates.
      let mut field = self.store.take_for_edit(node.center, node.lod)?;
      apply_brush(self.backend.as_ref(), layout, &mut field, brush, hit, amount);
      self.store.commit_edit(node.center, field);

      if let Some(leaf) = self.presented_leaf(node.center, node.lod) {
        remesh.push(leaf);
      }
    }
    let edited = targets.len();

    let mut unmeshed = Vec::new();
    for leaf in &remesh {
      if let Err(err) = self.present(leaf, leaf.lod_mask) {
        warn!(coord = ?leaf.center, %err, "re-mesh after edit failed");
        if let Some(presented) = self.presented.get_mut(&leaf.center) {
          presented.stale = true;
        }
        unmeshed.push(leaf.center);
      }
    }

    debug!(
      ?hit,
      amount,
      nodes = nodes.len(),
      edited,
      remeshed = remesh.len() - unmeshed.len(),
      unmeshed = unmeshed.len(),
      elapsed_us = start.elapsed().as_micros() as u64,
      "brush applied"
    );
    Ok(unmeshed)
  }
}

impl StreamingHost for TerrainCore {
  fn create_chunk(&mut self, coord: ChunkCoord) -> Result<WorkOutcome> {
    let Some(info) = self.leaves.get(&coord).copied() else {
      return Ok(WorkOutcome::Stale);
    };
    let current = self
      .presented
      .get(&coord)
      .is_some_and(|p| !p.stale && p.lod == info.lod && p.lod_mask == info.lod_mask);
    if current {
      return Ok(WorkOutcome::Stale);
    }
    self.present(&info, info.lod_mask)?;
    Ok(WorkOutcome::Done)
  }

  fn release_chunk(&mut self, coord: ChunkCoord) -> Result<WorkOutcome> {
    if self.leaves.contains_key(&coord) || self.presented.remove(&coord).is_none() {
      return Ok(WorkOutcome::Stale);
    }
    self.store.evict_cached(coord);
    if self.events.send(SceneEvent::Hide { coord }).is_err() {
      trace!(?coord, "scene receiver dropped, hide discarded");
    }
    Ok(WorkOutcome::Done)
  }

  fn load_field(&mut self, dir: &Path, coord: ChunkCoord) -> Result<WorkOutcome> {
    let Some(info) = self.leaves.get(&coord).copied() else {
      return Ok(WorkOutcome::Stale);
    };
    if !storage::field_exists(dir, coord) {
      return Ok(WorkOutcome::Stale);
    }
    let field = storage::load_field(dir, coord, self.store.points_per_axis())?;
    self.store.insert_loaded(coord, field);
    if self.presented.contains_key(&coord) {
      self.present(&info, LodMask::EMPTY)?;
    }
    Ok(WorkOutcome::Done)
  }

  fn save_field(&mut self, dir: &Path, coord: ChunkCoord) -> Result<WorkOutcome> {
    Ok(match self.store.save_field(dir, coord)? {
      true => WorkOutcome::Done,
      false => WorkOutcome::Stale,
    })
  }
}

/// LOD terrain with brush editing and incremental streaming.
///
/// Drive it with [`update_camera`](Self::update_camera) and
/// [`tick`](Self::tick) once per frame; consume the returned
/// [`SceneEvent`] receiver on the scene side.
pub struct VoxelTerrain {
  config: TerrainConfig,
  core: TerrainCore,
  streaming: StreamingCoordinator,
  editor: BrushEditor,
  mode: EditorMode,
  /// Camera waiting for the create queue to drain.
  pending_camera: Option<(Vec3, Frustum)>,
}

impl VoxelTerrain {
  pub fn new(
    config: TerrainConfig,
    source: Box<dyn DensitySource>,
    backend: Arc<dyn ComputeBackend>,
  ) -> (Self, Receiver<SceneEvent>) {
    config.validate();
    let (sender, receiver) = channel::unbounded();

    let chunk = &config.chunk;
    let generator = DensityGenerator::new(source, backend.clone(), chunk.voxels_per_axis(), chunk.voxel_size);
    let core = TerrainCore {
      mesh_config: MeshConfig::from(chunk),
      voxel_size: chunk.voxel_size,
      backend: backend.clone(),
      octree: Octree::new(chunk, config.lod.clone()),
      store: DensityStore::new(generator, config.storage.field_dir.clone()),
      leaves: VisibleLeaves::new(),
      presented: HashMap::new(),
      events: sender,
    };

    let terrain = Self {
      streaming: StreamingCoordinator::new(&config.streaming),
      editor: BrushEditor::new(&config.brush, backend),
      mode: EditorMode::default(),
      pending_camera: None,
      core,
      config,
    };
    (terrain, receiver)
  }

  /// Terrain whose density source comes from `config.generator`.
  pub fn from_config(config: TerrainConfig, backend: Arc<dyn ComputeBackend>) -> (Self, Receiver<SceneEvent>) {
    let source = source_from_settings(&config.generator);
    Self::new(config, source, backend)
  }

  pub fn config(&self) -> &TerrainConfig {
    &self.config
  }

  pub fn mode(&self) -> EditorMode {
    self.mode
  }

  pub fn set_mode(&mut self, mode: EditorMode) {
    if mode != self.mode {
      debug!(?mode, "editor mode");
      self.mode = mode;
    }
  }

  pub fn editor(&self) -> &BrushEditor {
    &self.editor
  }

  /// Select the edit brush. `Ok(false)` when nothing changed.
  pub fn set_brush(&mut self, shape: BrushShape, size: usize) -> Result<bool> {
    self.editor.set_brush(shape, size)
  }

  pub fn grow_brush(&mut self) -> Result<bool> {
    self.editor.grow()
  }

  pub fn shrink_brush(&mut self) -> Result<bool> {
    self.editor.shrink()
  }

  /// Load the Custom brush stamped in [`EditorMode::Model`].
  pub fn load_custom_brush(&mut self, name: &str) -> Result<()> {
    self.editor.load_custom(name).map(|_| ())
  }

  /// Stamp the active brush at `point`; `sign` +1 adds material, -1
  /// removes it. Returns `Ok(false)` in [`EditorMode::View`].
  pub fn apply_brush(&mut self, point: Vec3, sign: f32) -> Result<bool> {
    self.apply_brush_with_delta(point, sign, 1.0)
  }

  /// [`apply_brush`](Self::apply_brush) scaled by a frame delta.
  pub fn apply_brush_with_delta(&mut self, point: Vec3, sign: f32, delta: f32) -> Result<bool> {
    let (brush, custom) = match self.mode {
      EditorMode::View => return Ok(false),
      EditorMode::Edit => (self.editor.brush()?, None),
      EditorMode::Model => {
        let custom = self.editor.custom().ok_or_else(|| TerrainError::MissingBrushAsset {
          name: BrushShape::Custom.to_string(),
        })?;
        (&**custom, Some(custom.clone()))
      }
    };
    let edit = EditInfo {
      shape: brush.shape(),
      voxels_per_axis: brush.voxels_per_axis(),
      point,
      weight: sign,
      delta,
      custom,
    };
    let unmeshed = self.core.apply_edit(&edit, brush)?;
    self.streaming.queue_create(unmeshed);
    self.editor.record(edit);
    Ok(true)
  }

  /// Revert the most recent edit by stamping its inverse. On error the
  /// edit stays on the undo stack.
  pub fn undo(&mut self) -> Result<bool> {
    let Some(edit) = self.editor.peek_undo().cloned() else {
      return Ok(false);
    };
    let brush = self.editor.brush_for(&edit)?;
    let unmeshed = self.core.apply_edit(&edit.inverse(), brush)?;
    self.streaming.queue_create(unmeshed);
    self.editor.finish_undo();
    Ok(true)
  }

  /// Re-apply the most recently undone edit. On error the edit stays on
  /// the redo stack.
  pub fn redo(&mut self) -> Result<bool> {
    let Some(edit) = self.editor.peek_redo().cloned() else {
      return Ok(false);
    };
    let brush = self.editor.brush_for(&edit)?;
    let unmeshed = self.core.apply_edit(&edit, brush)?;
    self.streaming.queue_create(unmeshed);
    self.editor.finish_redo();
    Ok(true)
  }

  /// Queue every resident field for saving into `dir`: edited fields
  /// first, then cached ones. `Ok(false)` while a previous save drains.
  pub fn save(&mut self, dir: impl Into<PathBuf>) -> Result<bool> {
    let dir = dir.into();
    if !dir.is_dir() {
      return Err(TerrainError::MissingDirectory(dir));
    }
    let coords = self.core.store.saveable_coords();
    let count = coords.len();
    if !self.streaming.queue_save(dir.clone(), coords) {
      debug!(dir = %dir.display(), "save already in progress");
      return Ok(false);
    }
    debug!(dir = %dir.display(), count, "save queued");
    self.core.store.set_field_dir(Some(dir));
    Ok(true)
  }

  /// Drop every resident field and reload the visible leaves from `dir`.
  /// Chunks without a file keep their mesh and regenerate on demand.
  /// `Ok(false)` while a previous load drains.
  pub fn load(&mut self, dir: impl Into<PathBuf>) -> Result<bool> {
    let dir = dir.into();
    if !dir.is_dir() {
      return Err(TerrainError::MissingDirectory(dir));
    }
    if self.streaming.load_pending() > 0 {
      debug!(dir = %dir.display(), "load already in progress");
      return Ok(false);
    }
    let mut coords: Vec<ChunkCoord> = self.core.leaves.keys().copied().collect();
    coords.sort_by_key(|c| c.to_array());

    self.core.store.clear_all();
    self.core.store.set_field_dir(Some(dir.clone()));
    debug!(dir = %dir.display(), count = coords.len(), "load queued");
    Ok(self.streaming.queue_load(dir, coords))
  }

  /// Re-evaluate visibility for a camera. Deferred, returning `false`,
  /// while chunks from the previous update are still being created; the
  /// latest deferred camera is applied by [`tick`](Self::tick).
  pub fn update_camera(&mut self, position: Vec3, frustum: Frustum) -> bool {
    if self.streaming.create_pending() > 0 {
      self.pending_camera = Some((position, frustum));
      return false;
    }
    self.pending_camera = None;
    self.refresh_leaves(position, &frustum);
    true
  }

  fn refresh_leaves(&mut self, position: Vec3, frustum: &Frustum) {
    let core = &mut self.core;
    core.leaves = core.octree.update_visible_leaves(frustum, position);

    let voxel_size = self.config.chunk.voxel_size;
    let distance = |c: &ChunkCoord| (c.as_vec3() * voxel_size - position).length_squared();

    let mut create: Vec<ChunkCoord> = core
      .leaves
      .values()
      .filter(|leaf| {
        core
          .presented
          .get(&leaf.center)
          .map_or(true, |p| p.stale || p.lod != leaf.lod || p.lod_mask != leaf.lod_mask)
      })
      .map(|leaf| leaf.center)
      .collect();
    create.sort_by(|a, b| distance(a).total_cmp(&distance(b)));

    let mut release: Vec<ChunkCoord> = core
      .presented
      .keys()
      .filter(|c| !core.leaves.contains_key(c))
      .copied()
      .collect();
    release.sort_by_key(|c| c.to_array());

    debug!(
      leaves = core.leaves.len(),
      create = create.len(),
      release = release.len(),
      "camera updated"
    );
    self.streaming.queue_create(create);
    self.streaming.queue_release(release);
  }

  /// Run one budgeted round of queued work.
  pub fn tick(&mut self) -> TickReport {
    if self.streaming.create_pending() == 0 {
      if let Some((position, frustum)) = self.pending_camera.take() {
        self.refresh_leaves(position, &frustum);
      }
    }
    self.streaming.tick(&mut self.core)
  }

  pub fn visible_leaves(&self) -> &VisibleLeaves {
    &self.core.leaves
  }

  pub fn presented(&self) -> &HashMap<ChunkCoord, PresentedChunk> {
    &self.core.presented
  }

  pub fn density_store(&self) -> &DensityStore {
    &self.core.store
  }

  pub fn octree(&self) -> &Octree {
    &self.core.octree
  }

  pub fn streaming(&self) -> &StreamingCoordinator {
    &self.streaming
  }

  pub fn stats(&self) -> TerrainStats {
    let store = &self.core.store;
    TerrainStats {
      presented: self.core.presented.len(),
      triangles: self.core.presented.values().map(|p| p.triangles).sum(),
      creating: self.streaming.create_pending(),
      releasing: self.streaming.release_pending(),
      loading: self.streaming.load_pending(),
      saving: self.streaming.save_pending(),
      cached_fields: store.cached_count(),
      edited_fields: store.edited_count(),
    }
  }
}

#[cfg(test)]
#[path = "terrain_test.rs"]
mod terrain_test;
