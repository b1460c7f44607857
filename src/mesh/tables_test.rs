use std::collections::BTreeSet;

use glam::Vec3;

use super::*;

/// Canonical-frame position of a transition vertex.
fn transition_vertex(v: u8) -> Vec3 {
  match v {
    0..=8 => Vec3::new((v % 3) as f32 * 0.5, (v / 3) as f32 * 0.5, 1.0),
    _ => {
      let i = v - 9;
      Vec3::new((i & 1) as f32, (i >> 1) as f32, 0.0)
    }
  }
}

fn midpoint(table: &CaseTable, edge: u8, vertex: impl Fn(u8) -> Vec3) -> Vec3 {
  let [a, b] = table.edge(edge);
  (vertex(a) + vertex(b)) * 0.5
}

fn cube_vertex(c: u8) -> Vec3 {
  Vec3::from_array(corner_position(c))
}

/// Edges whose endpoints disagree in `case`.
fn crossed_edges(case: usize) -> BTreeSet<u8> {
  (0..12u8)
    .filter(|&e| {
      let [a, b] = EDGE_CORNERS[e as usize];
      (case >> a & 1) != (case >> b & 1)
    })
    .collect()
}

fn triangle_normal(table: &CaseTable, tri: [u8; 3], vertex: impl Fn(u8) -> Vec3 + Copy) -> Vec3 {
  let [a, b, c] = tri.map(|e| midpoint(table, e, vertex));
  (b - a).cross(c - a)
}

#[test]
fn test_regular_table_shape() {
  let table = &*REGULAR_TABLE;
  assert_eq!(table.cases.len(), 256);
  assert_eq!(table.edges, EDGE_CORNERS.to_vec());
  assert!(table.triangles(0).is_empty());
  assert!(table.triangles(255).is_empty());
}

#[test]
fn test_regular_cases_use_exactly_crossed_edges() {
  let table = &*REGULAR_TABLE;
  for case in 0..256 {
    let used: BTreeSet<u8> = table.triangles(case).iter().flatten().copied().collect();
    assert_eq!(used, crossed_edges(case), "case {case:#010b}");
    for tri in table.triangles(case) {
      assert!(tri[0] != tri[1] && tri[1] != tri[2] && tri[0] != tri[2]);
    }
  }
}

#[test]
fn test_single_corner_faces_away_from_inside() {
  let table = &*REGULAR_TABLE;
  for corner in 0..8u8 {
    let case = 1usize << corner;
    let tris = table.triangles(case);
    assert_eq!(tris.len(), 1);

    let normal = triangle_normal(table, tris[0], cube_vertex);
    let centroid = tris[0].iter().map(|&e| midpoint(table, e, cube_vertex)).sum::<Vec3>() / 3.0;
    assert!(normal.dot(centroid - cube_vertex(corner)) > 0.0, "corner {corner}");

    // Complement: only this corner outside, normal points toward it.
    let tris = table.triangles(255 ^ case);
    assert_eq!(tris.len(), 1);
    let normal = triangle_normal(table, tris[0], cube_vertex);
    assert!(normal.dot(cube_vertex(corner) - centroid) > 0.0, "complement {corner}");
  }
}

#[test]
fn test_inside_half_space_faces_up() {
  // Corners with y = 0 inside.
  let table = &*REGULAR_TABLE;
  let case = 0b0011_0011;
  let tris = table.triangles(case);
  assert_eq!(tris.len(), 2);
  for &tri in tris {
    let normal = triangle_normal(table, tri, cube_vertex).normalize();
    assert!((normal - Vec3::Y).length() < 1e-6);
  }
}

#[test]
fn test_each_axis_half_space() {
  let table = &*REGULAR_TABLE;
  for axis in 0..3 {
    let case: usize = (0..8).filter(|c| c >> axis & 1 == 0).map(|c| 1 << c).sum();
    let mut expected = Vec3::ZERO;
    expected[axis] = 1.0;
    for &tri in table.triangles(case) {
      let normal = triangle_normal(table, tri, cube_vertex).normalize();
      assert!((normal - expected).length() < 1e-6, "axis {axis}");
    }
  }
}

#[test]
fn test_transition_table_shape() {
  let table = &*TRANSITION_TABLE;
  assert_eq!(table.cases.len(), 512);
  // 12 high-res, 4 low-res, 4 side edges.
  assert_eq!(table.edges.len(), 20);
  assert!(table.triangles(0).is_empty());
  assert!(table.triangles(511).is_empty());
}

#[test]
fn test_transition_cases_use_exactly_crossed_edges() {
  let table = &*TRANSITION_TABLE;
  for case in 0..512 {
    let used: BTreeSet<u8> = table.triangles(case).iter().flatten().copied().collect();
    let crossed: BTreeSet<u8> = (0..table.edges.len() as u8)
      .filter(|&e| {
        let [a, b] = table.edge(e);
        transition_inside(case, a) != transition_inside(case, b)
      })
      .collect();
    assert_eq!(used, crossed, "case {case:#011b}");
  }
}

#[test]
fn test_side_edges_never_cross() {
  let table = &*TRANSITION_TABLE;
  for case in 0..512 {
    for (i, &source) in LOW_RES_SOURCE.iter().enumerate() {
      let low = (TRANSITION_HIGH_RES + i) as u8;
      assert_eq!(transition_inside(case, low), transition_inside(case, source));
    }
  }
  for &[a, b] in &table.edges {
    assert!(a < 13 && b < 13);
  }
}

#[test]
fn test_transition_center_bump_faces_into_cell() {
  let table = &*TRANSITION_TABLE;
  let tris = table.triangles(1 << 4);
  assert_eq!(tris.len(), 2);
  for &tri in tris {
    let normal = triangle_normal(table, tri, transition_vertex).normalize();
    assert!((normal - Vec3::NEG_Z).length() < 1e-6);
  }
}

#[test]
fn test_transition_plus_pattern_faces_into_cell() {
  // Corners outside, every other high-res sample inside: one octagon on the
  // high-res face.
  let table = &*TRANSITION_TABLE;
  let plus: usize = (1 << 1) | (1 << 3) | (1 << 4) | (1 << 5) | (1 << 7);
  let tris = table.triangles(plus);
  assert_eq!(tris.len(), 6);
  for &tri in tris {
    let normal = triangle_normal(table, tri, transition_vertex).normalize();
    assert!((normal - Vec3::NEG_Z).length() < 1e-6);
  }
}
