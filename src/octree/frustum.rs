//! View frustum extracted from a view-projection matrix.
//!
//! Planes point inward. glam's `perspective_*` projections map depth to
//! `[0, 1]`, so the near plane is `row2` alone and the far plane
//! `row3 - row2`.

use glam::{Mat4, Vec3, Vec4};

const LEFT: usize = 0;
const RIGHT: usize = 1;
const BOTTOM: usize = 2;
const TOP: usize = 3;
const NEAR: usize = 4;
const FAR: usize = 5;

/// Six inward-facing planes: left, right, bottom, top, near, far.
#[derive(Clone, Debug, PartialEq)]
pub struct Frustum {
  /// `Vec4(a, b, c, d)`: `(a, b, c)` is the unit inward normal.
  planes: [Vec4; 6],
}

impl Frustum {
  /// Gribb-Hartmann plane extraction.
  pub fn from_view_projection(view_projection: &Mat4) -> Self {
    let rows = [
      view_projection.row(0),
      view_projection.row(1),
      view_projection.row(2),
      view_projection.row(3),
    ];

    let mut planes = [Vec4::ZERO; 6];
    planes[LEFT] = rows[3] + rows[0];
    planes[RIGHT] = rows[3] - rows[0];
    planes[BOTTOM] = rows[3] + rows[1];
    planes[TOP] = rows[3] - rows[1];
    planes[NEAR] = rows[2];
    planes[FAR] = rows[3] - rows[2];

    for plane in &mut planes {
      let len = plane.truncate().length();
      if len > 0.0 {
        *plane /= len;
      }
    }

    Self { planes }
  }

  /// Frustum that accepts every box.
  pub fn infinite() -> Self {
    Self {
      planes: [Vec4::ZERO; 6],
    }
  }

  /// Conservative box test: `false` only when the box lies entirely
  /// behind one plane.
  pub fn intersects_aabb(&self, min: Vec3, max: Vec3) -> bool {
    self.planes.iter().all(|plane| {
      let normal = plane.truncate();
      // Corner furthest along the normal.
      let p = Vec3::select(normal.cmpge(Vec3::ZERO), max, min);
      normal.dot(p) + plane.w >= 0.0
    })
  }
}
