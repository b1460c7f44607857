use glam::IVec3;

use super::*;
use crate::compute::CpuBackend;
use crate::config::{ChunkSettings, GeneratorSettings, LodSettings, StreamingSettings};
use crate::density::PlaneBuilder;
use crate::octree::Face;

/// 8-voxel chunks under a LOD 2 root spanning [-16, 16].
fn test_config(items_per_tick: usize) -> TerrainConfig {
  TerrainConfig {
    chunk: ChunkSettings {
      power_voxels_per_axis: 3,
      ..Default::default()
    },
    lod: LodSettings {
      max_lod: 2,
      thresholds: vec![0.0, 8.0, 64.0],
    },
    streaming: StreamingSettings { items_per_tick },
    generator: GeneratorSettings::Plane {
      height: 0.5,
      thickness: None,
    },
    ..Default::default()
  }
}

fn terrain(items_per_tick: usize) -> (VoxelTerrain, Receiver<SceneEvent>) {
  terrain_with(test_config(items_per_tick))
}

fn terrain_with(config: TerrainConfig) -> (VoxelTerrain, Receiver<SceneEvent>) {
  VoxelTerrain::new(config, Box::new(PlaneBuilder::new(0.5)), Arc::new(CpuBackend))
}

/// Close to the -X half: 32 LOD 0 leaves there, 4 LOD 1 leaves at +X.
fn near_camera() -> Vec3 {
  Vec3::new(-12.0, 0.5, 0.5)
}

fn settle(terrain: &mut VoxelTerrain) {
  while !terrain.streaming().is_idle() {
    terrain.tick();
  }
}

fn presented_terrain() -> (VoxelTerrain, Receiver<SceneEvent>) {
  presented_with(test_config(100))
}

fn presented_with(config: TerrainConfig) -> (VoxelTerrain, Receiver<SceneEvent>) {
  let (mut terrain, events) = terrain_with(config);
  assert!(terrain.update_camera(near_camera(), Frustum::infinite()));
  settle(&mut terrain);
  events.try_iter().for_each(drop);
  (terrain, events)
}

fn count_shows(events: &Receiver<SceneEvent>) -> usize {
  events
    .try_iter()
    .filter(|e| matches!(e, SceneEvent::Show { .. }))
    .count()
}

fn assert_samples_close(a: &[f32], b: &[f32]) {
  assert_eq!(a.len(), b.len());
  for (i, (x, y)) in a.iter().zip(b).enumerate() {
    assert!((x - y).abs() < 1e-5, "sample {} differs: {} vs {}", i, x, y);
  }
}

/// LOD 0 chunk holding the edit point used below.
const EDITED_CHUNK: IVec3 = IVec3::new(-12, 4, -12);

fn edit_point() -> Vec3 {
  Vec3::new(-12.3, 0.7, -11.6)
}

/// Presented terrain whose brush assets live in `dir`.
fn presented_with_assets(dir: &Path) -> (VoxelTerrain, Receiver<SceneEvent>) {
  let mut config = test_config(100);
  config.brush.asset_dir = Some(dir.to_path_buf());
  presented_with(config)
}

fn save_custom(terrain: &VoxelTerrain, shape: BrushShape, name: &str) {
  let brush = Brush::build(&CpuBackend, shape, 4).unwrap();
  terrain.editor().library().save_named(&brush, name).unwrap();
}

/// Root field file too short to load.
fn write_broken_root(dir: &Path) {
  std::fs::write(storage::field_path(dir, IVec3::ZERO), [0u8; 8]).unwrap();
}

#[test]
fn test_camera_update_presents_visible_leaves() {
  let (mut terrain, events) = terrain(100);
  assert!(terrain.update_camera(near_camera(), Frustum::infinite()));
  assert_eq!(terrain.visible_leaves().len(), 36);
  assert_eq!(terrain.stats().creating, 36);

  let report = terrain.tick();
  assert_eq!(report.created, 36);
  assert!(report.failures.is_empty());
  assert!(terrain.streaming().is_idle());
  assert_eq!(count_shows(&events), 36);

  let stats = terrain.stats();
  assert_eq!(stats.presented, 36);
  assert!(stats.triangles > 0);
}

#[test]
fn test_dropped_receiver_does_not_fail_work() {
  let (mut terrain, events) = terrain(100);
  drop(events);
  assert!(terrain.update_camera(near_camera(), Frustum::infinite()));
  let report = terrain.tick();
  assert_eq!(report.created, 36);
  assert!(report.failures.is_empty());

  assert!(terrain.update_camera(Vec3::new(500.0, 0.0, 0.0), Frustum::infinite()));
  settle(&mut terrain);
  assert_eq!(terrain.presented().len(), 1);
}

#[test]
fn test_coarse_leaves_mesh_with_their_mask() {
  let (terrain, _events) = presented_terrain();

  let coarse: Vec<&NodeInfo> = terrain.visible_leaves().values().filter(|l| l.lod == 1).collect();
  assert_eq!(coarse.len(), 4);
  for leaf in coarse {
    assert!(leaf.lod_mask.contains(Face::NegX));
    let presented = terrain.presented()[&leaf.center];
    assert_eq!(presented.lod, 1);
    assert_eq!(presented.lod_mask, leaf.lod_mask);
  }
}

#[test]
fn test_camera_update_waits_for_creation() {
  let (mut terrain, events) = terrain(4);
  assert!(terrain.update_camera(near_camera(), Frustum::infinite()));
  terrain.tick();
  assert!(terrain.stats().creating > 0);

  // Far enough for the root to be the only leaf.
  assert!(!terrain.update_camera(Vec3::new(500.0, 0.0, 0.0), Frustum::infinite()));
  assert_eq!(terrain.visible_leaves().len(), 36);

  while terrain.streaming().create_pending() > 0 {
    terrain.tick();
  }
  assert_eq!(terrain.presented().len(), 36);

  // The queues are idle now; the next tick applies the waiting camera.
  terrain.tick();
  settle(&mut terrain);
  assert_eq!(terrain.visible_leaves().len(), 1);
  assert_eq!(terrain.presented().len(), 1);
  assert_eq!(terrain.presented()[&IVec3::ZERO].lod, 2);

  let hides = events
    .try_iter()
    .filter(|e| matches!(e, SceneEvent::Hide { .. }))
    .count();
  assert_eq!(hides, 36);
  // Released leaves drop their clean fields; only the root's stays.
  assert_eq!(terrain.density_store().cached_count(), 1);
}

#[test]
fn test_view_mode_ignores_edits() {
  let (mut terrain, _events) = presented_terrain();
  assert!(!terrain.apply_brush(edit_point(), 1.0).unwrap());
  assert_eq!(terrain.density_store().edited_count(), 0);
  assert_eq!(terrain.editor().undo_len(), 0);
}

#[test]
fn test_model_mode_requires_custom_brush() {
  let (mut terrain, _events) = presented_terrain();
  terrain.set_mode(EditorMode::Model);
  let err = terrain.apply_brush(edit_point(), 1.0).unwrap_err();
  assert!(matches!(err, TerrainError::MissingBrushAsset { .. }));
}

#[test]
fn test_model_mode_stamps_custom_brush() {
  let assets = tempfile::tempdir().unwrap();
  let (mut terrain, events) = presented_with_assets(assets.path());
  save_custom(&terrain, BrushShape::Sphere, "boulder");

  terrain.set_mode(EditorMode::Model);
  terrain.load_custom_brush("boulder").unwrap();
  let before = terrain.density_store().peek(EDITED_CHUNK).unwrap().clone();
  assert!(terrain.apply_brush(edit_point(), 1.0).unwrap());

  let after = terrain.density_store().peek(EDITED_CHUNK).unwrap();
  assert!(after.min_value() < before.min_value());
  assert!(count_shows(&events) > 0);
  assert_eq!(terrain.editor().undo_len(), 1);
}

#[test]
fn test_model_undo_uses_the_stamped_brush() {
  let assets = tempfile::tempdir().unwrap();
  let (mut terrain, _events) = presented_with_assets(assets.path());
  save_custom(&terrain, BrushShape::Sphere, "boulder");
  save_custom(&terrain, BrushShape::Cube, "block");

  terrain.set_mode(EditorMode::Model);
  terrain.load_custom_brush("boulder").unwrap();
  let before = terrain.density_store().peek(EDITED_CHUNK).unwrap().clone();
  terrain.apply_brush(edit_point(), 1.0).unwrap();
  let edited = terrain.density_store().peek(EDITED_CHUNK).unwrap().clone();

  // Same size, different samples.
  terrain.load_custom_brush("block").unwrap();
  assert!(terrain.undo().unwrap());
  let undone = terrain.density_store().peek(EDITED_CHUNK).unwrap();
  assert_samples_close(undone.samples(), before.samples());

  assert!(terrain.redo().unwrap());
  let redone = terrain.density_store().peek(EDITED_CHUNK).unwrap();
  assert_samples_close(redone.samples(), edited.samples());
}

#[test]
fn test_failed_undo_keeps_history() {
  let dir = tempfile::tempdir().unwrap();
  let (mut terrain, _events) = presented_terrain();
  terrain.set_mode(EditorMode::Edit);
  // Wide enough to reach the root lattice.
  terrain.set_brush(BrushShape::Sphere, 4).unwrap();
  terrain.apply_brush(edit_point(), 1.0).unwrap();

  write_broken_root(dir.path());
  assert!(terrain.load(dir.path()).unwrap());
  let err = terrain.undo().unwrap_err();
  assert!(matches!(err, TerrainError::FieldSize { .. }));
  assert_eq!((terrain.editor().undo_len(), terrain.editor().redo_len()), (1, 0));
  assert_eq!(terrain.density_store().edited_count(), 0);
  assert!(!terrain.redo().unwrap());

  std::fs::remove_file(storage::field_path(dir.path(), IVec3::ZERO)).unwrap();
  assert!(terrain.undo().unwrap());
  assert_eq!((terrain.editor().undo_len(), terrain.editor().redo_len()), (0, 1));
}

#[test]
fn test_failed_edit_changes_nothing() {
  let dir = tempfile::tempdir().unwrap();
  let (mut terrain, _events) = presented_terrain();
  terrain.set_mode(EditorMode::Edit);
  // Wide enough to reach the root lattice.
  terrain.set_brush(BrushShape::Sphere, 4).unwrap();
  let before = terrain.density_store().peek(EDITED_CHUNK).unwrap().clone();

  write_broken_root(dir.path());
  assert!(terrain.load(dir.path()).unwrap());
  let err = terrain.apply_brush(edit_point(), 1.0).unwrap_err();
  assert!(matches!(err, TerrainError::FieldSize { .. }));

  let store = terrain.density_store();
  assert_eq!(store.edited_count(), 0);
  assert!(store.peek(EDITED_CHUNK).map_or(true, |field| field == &before));
  assert_eq!(terrain.editor().undo_len(), 0);
}

#[test]
fn test_remesh_failure_keeps_the_edit_undoable() {
  let dir = tempfile::tempdir().unwrap();
  let (mut terrain, _events) = presented_terrain();
  terrain.set_mode(EditorMode::Edit);
  terrain.set_brush(BrushShape::Sphere, 4).unwrap();

  let coarse = IVec3::new(8, -8, 8);
  let leaf = terrain.visible_leaves()[&coarse];
  assert_eq!(leaf.lod, 1);
  assert!(leaf.lod_mask.contains(Face::NegX));
  let finer = IVec3::new(-4, -12, 4);
  assert!(finer_neighbor_centers(coarse, leaf.voxels_per_axis, Face::NegX).contains(&finer));
  let before = terrain.density_store().peek(coarse).unwrap().clone();

  // Only the finer neighbor has a file, and it is too short.
  std::fs::write(storage::field_path(dir.path(), finer), [0u8; 8]).unwrap();
  assert!(terrain.load(dir.path()).unwrap());

  assert!(terrain.apply_brush(Vec3::new(10.0, 0.7, 10.0), 1.0).unwrap());
  assert_eq!(terrain.editor().undo_len(), 1);
  assert!(terrain.density_store().is_edited(coarse));
  assert!(terrain.presented()[&coarse].stale);
  assert_eq!(terrain.stats().creating, 1);

  assert!(terrain.undo().unwrap());
  assert_eq!((terrain.editor().undo_len(), terrain.editor().redo_len()), (0, 1));
  let undone = terrain.density_store().peek(coarse).unwrap();
  assert_samples_close(undone.samples(), before.samples());
  assert_eq!(terrain.stats().creating, 1);

  std::fs::remove_file(storage::field_path(dir.path(), finer)).unwrap();
  settle(&mut terrain);
  assert!(!terrain.presented()[&coarse].stale);
}

#[test]
fn test_edit_changes_every_lod_and_remeshes() {
  let (mut terrain, events) = presented_terrain();
  terrain.set_mode(EditorMode::Edit);
  terrain.set_brush(BrushShape::Sphere, 4).unwrap();

  let before = terrain.density_store().peek(EDITED_CHUNK).unwrap().clone();
  assert!(terrain.apply_brush(edit_point(), 1.0).unwrap());

  let store = terrain.density_store();
  assert!(store.is_edited(EDITED_CHUNK));
  assert!(store.is_edited(IVec3::ZERO), "root field is edited too");
  let after = store.peek(EDITED_CHUNK).unwrap();
  assert!(after.min_value() < before.min_value());
  assert!(count_shows(&events) > 0);
  assert_eq!(terrain.editor().undo_len(), 1);
}

#[test]
fn test_undo_and_redo_restore_fields() {
  let (mut terrain, _events) = presented_terrain();
  terrain.set_mode(EditorMode::Edit);
  terrain.set_brush(BrushShape::Sphere, 4).unwrap();

  let before = terrain.density_store().peek(EDITED_CHUNK).unwrap().clone();
  terrain.apply_brush(edit_point(), 1.0).unwrap();
  let edited = terrain.density_store().peek(EDITED_CHUNK).unwrap().clone();

  // Undo rebuilds the recorded brush after a selection change.
  terrain.set_brush(BrushShape::Cube, 6).unwrap();
  assert!(terrain.undo().unwrap());
  let undone = terrain.density_store().peek(EDITED_CHUNK).unwrap();
  assert_samples_close(undone.samples(), before.samples());

  assert!(terrain.redo().unwrap());
  let redone = terrain.density_store().peek(EDITED_CHUNK).unwrap();
  assert_samples_close(redone.samples(), edited.samples());

  assert!(terrain.redo().is_ok_and(|applied| !applied));
}

#[test]
fn test_undo_with_empty_history() {
  let (mut terrain, _events) = terrain(1);
  assert!(!terrain.undo().unwrap());
  assert!(!terrain.redo().unwrap());
}

#[test]
fn test_brush_size_is_clamped() {
  let (mut terrain, _events) = terrain(1);
  assert!(terrain.set_brush(BrushShape::Cube, 100).unwrap());
  assert_eq!(terrain.editor().size(), 14);
  assert!(!terrain.set_brush(BrushShape::Cube, 14).unwrap());
  assert!(terrain.shrink_brush().unwrap());
  assert_eq!(terrain.editor().size(), 13);
}

#[test]
fn test_save_then_load_restores_edits() {
  let dir = tempfile::tempdir().unwrap();
  let (mut terrain, events) = presented_terrain();
  terrain.set_mode(EditorMode::Edit);
  terrain.apply_brush(edit_point(), 1.0).unwrap();
  let edited = terrain.density_store().peek(EDITED_CHUNK).unwrap().clone();
  let saveable = terrain.density_store().saveable_coords();

  assert!(terrain.save(dir.path()).unwrap());
  let mut saved = 0;
  while !terrain.streaming().is_idle() {
    saved += terrain.tick().saved;
  }
  assert_eq!(saved, saveable.len());
  assert!(saveable.iter().all(|c| storage::field_exists(dir.path(), *c)));
  assert_eq!(terrain.density_store().field_dir(), Some(dir.path()));
  events.try_iter().for_each(drop);

  assert!(terrain.load(dir.path()).unwrap());
  let stats = terrain.stats();
  assert_eq!((stats.cached_fields, stats.edited_fields), (0, 0));
  assert_eq!(stats.loading, 36);

  let mut loaded = 0;
  while !terrain.streaming().is_idle() {
    loaded += terrain.tick().loaded;
  }
  assert_eq!(loaded, 36);
  assert_eq!(count_shows(&events), 36);

  let store = terrain.density_store();
  assert!(store.is_cached(EDITED_CHUNK));
  assert!(!store.is_edited(EDITED_CHUNK));
  assert_eq!(store.peek(EDITED_CHUNK).unwrap(), &edited);
}

#[test]
fn test_save_and_load_need_existing_directory() {
  let dir = tempfile::tempdir().unwrap();
  let missing = dir.path().join("missing");
  let (mut terrain, _events) = terrain(1);

  assert!(matches!(terrain.save(&missing), Err(TerrainError::MissingDirectory(_))));
  assert!(matches!(terrain.load(&missing), Err(TerrainError::MissingDirectory(_))));
  assert!(terrain.streaming().is_idle());
}
