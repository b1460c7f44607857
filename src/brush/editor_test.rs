use glam::Vec3;

use super::*;
use crate::compute::CpuBackend;

fn editor(settings: BrushSettings) -> BrushEditor {
  BrushEditor::new(&settings, Arc::new(CpuBackend))
}

fn edit(n: usize) -> EditInfo {
  EditInfo {
    shape: BrushShape::Sphere,
    voxels_per_axis: 4,
    point: Vec3::splat(n as f32),
    weight: 1.0,
    delta: 1.0,
    custom: None,
  }
}

#[test]
fn test_initial_selection() {
  let mut editor = editor(BrushSettings::default());
  assert_eq!(editor.shape(), BrushShape::Sphere);
  assert_eq!(editor.size(), 2);
  assert_eq!(editor.rebuild_count(), 0);
  assert_eq!(editor.brush().unwrap().voxels_per_axis(), 2);
  assert_eq!(editor.rebuild_count(), 1);
}

#[test]
fn test_rebuild_only_on_change() {
  let mut editor = editor(BrushSettings::default());
  editor.brush().unwrap();

  assert!(!editor.set_brush(BrushShape::Sphere, 2).unwrap());
  assert_eq!(editor.rebuild_count(), 1);

  assert!(editor.set_brush(BrushShape::Cube, 2).unwrap());
  assert_eq!(editor.rebuild_count(), 2);
  assert!(!editor.set_brush(BrushShape::Cube, 2).unwrap());
  editor.brush().unwrap();
  assert_eq!(editor.rebuild_count(), 2);

  assert!(editor.set_brush(BrushShape::Cube, 6).unwrap());
  assert_eq!(editor.rebuild_count(), 3);
  assert_eq!(editor.brush().unwrap().voxels_per_axis(), 6);
}

#[test]
fn test_size_is_clamped() {
  let mut editor = editor(BrushSettings::default());
  editor.set_brush(BrushShape::Sphere, 100).unwrap();
  assert_eq!(editor.size(), 14);
  assert!(!editor.grow().unwrap());
  assert!(editor.shrink().unwrap());
  assert_eq!(editor.size(), 13);

  editor.set_brush(BrushShape::Sphere, 0).unwrap();
  assert_eq!(editor.size(), 2);
  assert!(!editor.shrink().unwrap());
  assert_eq!(editor.size(), 2);
}

#[test]
fn test_failed_selection_keeps_previous() {
  let mut editor = editor(BrushSettings::default());
  editor.set_brush(BrushShape::Cube, 4).unwrap();
  assert!(editor.set_brush(BrushShape::Custom, 4).is_err());
  assert_eq!(editor.shape(), BrushShape::Cube);
  assert_eq!(editor.size(), 4);
  assert_eq!(editor.brush().unwrap().shape(), BrushShape::Cube);
}

#[test]
fn test_undo_redo_stacks() {
  let mut editor = editor(BrushSettings::default());
  for n in 0..3 {
    editor.record(edit(n));
  }
  assert_eq!(editor.peek_undo(), Some(&edit(2)));
  editor.finish_undo();
  editor.finish_undo();
  assert_eq!(editor.peek_undo(), Some(&edit(0)));
  assert_eq!(editor.redo_len(), 2);

  assert_eq!(editor.peek_redo(), Some(&edit(1)));
  editor.finish_redo();
  assert_eq!(editor.undo_len(), 2);
  assert_eq!(editor.redo_len(), 1);
  assert_eq!(editor.peek_undo(), Some(&edit(1)));

  // A new edit invalidates the redo stack.
  editor.record(edit(7));
  assert_eq!(editor.redo_len(), 0);
  assert_eq!(editor.peek_redo(), None);
  assert_eq!(editor.peek_undo(), Some(&edit(7)));
}

#[test]
fn test_peek_leaves_history_alone() {
  let mut editor = editor(BrushSettings::default());
  editor.record(edit(1));
  assert_eq!(editor.peek_undo(), Some(&edit(1)));
  assert_eq!(editor.peek_undo(), Some(&edit(1)));
  assert_eq!((editor.undo_len(), editor.redo_len()), (1, 0));

  editor.finish_redo();
  assert_eq!((editor.undo_len(), editor.redo_len()), (1, 0));
  editor.finish_undo();
  editor.finish_undo();
  assert_eq!((editor.undo_len(), editor.redo_len()), (0, 1));
}

#[test]
fn test_history_limit_drops_oldest() {
  let mut editor = editor(BrushSettings {
    history_limit: 2,
    ..Default::default()
  });
  for n in 0..3 {
    editor.record(edit(n));
  }
  assert_eq!(editor.undo_len(), 2);
  assert_eq!(editor.peek_undo(), Some(&edit(2)));
  editor.finish_undo();
  assert_eq!(editor.peek_undo(), Some(&edit(1)));
  editor.finish_undo();
  assert_eq!(editor.peek_undo(), None);
}

#[test]
fn test_brush_for_reselects() {
  let mut editor = editor(BrushSettings::default());
  let recorded = EditInfo {
    shape: BrushShape::Cube,
    voxels_per_axis: 6,
    ..edit(0)
  };
  let brush = editor.brush_for(&recorded).unwrap();
  assert_eq!(brush.shape(), BrushShape::Cube);
  assert_eq!(brush.voxels_per_axis(), 6);
  assert_eq!(editor.shape(), BrushShape::Cube);
  assert_eq!(editor.size(), 6);
}

#[test]
fn test_custom_record_keeps_its_brush() {
  let dir = tempfile::tempdir().unwrap();
  let mut editor = editor(BrushSettings {
    asset_dir: Some(dir.path().to_path_buf()),
    ..Default::default()
  });
  let rock = Brush::build(&CpuBackend, BrushShape::Sphere, 20).unwrap();
  let block = Brush::build(&CpuBackend, BrushShape::Cube, 20).unwrap();
  editor.library().save_named(&rock, "rock").unwrap();
  editor.library().save_named(&block, "block").unwrap();

  assert_eq!(editor.load_custom("rock").unwrap().voxels_per_axis(), 20);
  let recorded = EditInfo {
    shape: BrushShape::Custom,
    voxels_per_axis: 20,
    custom: editor.custom().cloned(),
    ..edit(0)
  };

  // Same size, different samples.
  editor.load_custom("block").unwrap();
  assert_eq!(editor.brush_for(&recorded).unwrap().samples(), rock.samples());
  // Selection untouched.
  assert_eq!(editor.shape(), BrushShape::Sphere);
}

#[test]
fn test_custom_record_without_brush_fails() {
  let mut editor = editor(BrushSettings::default());
  let recorded = EditInfo {
    shape: BrushShape::Custom,
    voxels_per_axis: 4,
    ..edit(0)
  };
  let err = editor.brush_for(&recorded).unwrap_err();
  assert!(matches!(err, TerrainError::MissingBrushAsset { .. }));
}
