use super::*;

fn vertex(position: [f32; 3]) -> Vertex {
  Vertex {
    position,
    normal: [0.0, 1.0, 0.0],
  }
}

#[test]
fn test_aabb_encapsulate() {
  let mut aabb = MinMaxAABB::empty();
  assert!(!aabb.is_valid());
  aabb.encapsulate([1.0, 2.0, 3.0]);
  aabb.encapsulate([-1.0, -2.0, -3.0]);

  assert_eq!(aabb.min, [-1.0, -2.0, -3.0]);
  assert_eq!(aabb.max, [1.0, 2.0, 3.0]);
  assert!(aabb.is_valid());
}

#[test]
fn test_triangle_face_normal_follows_winding() {
  let ccw = Triangle([
    vertex([0.0, 0.0, 0.0]),
    vertex([0.0, 0.0, 1.0]),
    vertex([1.0, 0.0, 0.0]),
  ]);
  assert_eq!(ccw.face_normal(), Some(glam::Vec3::Y));

  let degenerate = Triangle([vertex([0.0; 3]), vertex([0.0; 3]), vertex([1.0, 0.0, 0.0])]);
  assert_eq!(degenerate.face_normal(), None);
}

#[test]
fn test_mesh_output_from_triangles() {
  let triangles = vec![
    Triangle([
      vertex([0.0, 0.0, 0.0]),
      vertex([0.0, 0.0, 1.0]),
      vertex([1.0, 0.0, 0.0]),
    ]),
    Triangle([
      vertex([1.0, 0.0, 0.0]),
      vertex([0.0, 0.0, 1.0]),
      vertex([1.0, 2.0, 1.0]),
    ]),
  ];
  let output = MeshOutput::from_triangles(&triangles);

  assert_eq!(output.triangle_count(), 2);
  assert_eq!(output.positions.len(), 6);
  assert_eq!(output.normals.len(), 6);
  assert_eq!(output.indices().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4, 5]);
  assert_eq!(output.bounds.max, [1.0, 2.0, 1.0]);
  assert_eq!(output.triangles().collect::<Vec<_>>(), triangles);
}

#[test]
fn test_empty_mesh_is_distinct_from_missing() {
  let empty = MeshOutput::from_triangles(&[]);
  assert!(empty.is_empty());
  assert_eq!(empty.triangle_count(), 0);

  let not_computed: Option<MeshOutput> = None;
  assert_ne!(Some(empty), not_computed);
}

#[test]
fn test_mesh_output_clear() {
  let mut output = MeshOutput::from_triangles(&[Triangle([vertex([1.0; 3]); 3])]);
  output.clear();
  assert!(output.is_empty());
  assert!(!output.bounds.is_valid());
}

#[test]
fn test_mesh_config_from_chunk_settings() {
  let chunk = ChunkSettings {
    power_voxels_per_axis: 4,
    voxel_size: 0.25,
    iso_level: 0.5,
    transition_width: 0.25,
  };
  let config = MeshConfig::from(&chunk);
  assert_eq!(config.voxels_per_axis, 16);
  assert_eq!(config.points_per_axis(), 17);
  assert_eq!(config.voxel_size, 0.25);
  assert_eq!(config.iso_level, 0.5);
  assert_eq!(config.transition_width, 0.25);

  let built = MeshConfig::new().with_voxels_per_axis(8).with_iso_level(1.0);
  assert_eq!(built.voxels_per_axis, 8);
  assert_eq!(built.iso_level, 1.0);
}
