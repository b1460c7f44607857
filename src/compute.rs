//! Compute backend capability.
//!
//! Every per-point and per-cell kernel of the crate (density generation,
//! brush construction and application, triangle extraction) runs through a
//! [`ComputeBackend`]. A call dispatches the kernel over a 3D index domain and
//! blocks until every element is done; there is no partial-completion state.
//!
//! ```text
//! update_points:  buffer[point_index(p)] = kernel(p, buffer[point_index(p)])
//! collect_cells:  out = concat over x, y, z of kernel([x, y, z])
//! ```
//!
//! Results are deterministic for deterministic kernels: `collect_cells`
//! output is always ordered x-major, then y, then z, whatever the backend.

use rayon::prelude::*;
use tracing::trace;

use crate::octree::Face;
use crate::types::Triangle;

/// Named operation a backend call is performing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComputeOp {
  BuildDensity,
  BuildNoiseDensity,
  BuildBrush,
  ApplyBrush,
  ExtractRegular,
  ExtractTransition(Face),
}

/// Per-point kernel: `(lattice index, current value) -> new value`.
pub type PointKernel<'a> = dyn Fn([usize; 3], f32) -> f32 + Sync + 'a;

/// Per-cell kernel: appends the triangles of one cell.
pub type CellKernel<'a> = dyn Fn([usize; 3], &mut Vec<Triangle>) + Sync + 'a;

/// Blocking executor for data-parallel kernels.
pub trait ComputeBackend: Send + Sync {
  /// Rewrite every element of a lattice-ordered buffer.
  ///
  /// `buffer.len()` must equal the product of `points`; the layout is
  /// `(x * py + y) * pz + z`.
  fn update_points(&self, op: ComputeOp, points: [usize; 3], buffer: &mut [f32], kernel: &PointKernel);

  /// Gather triangles from every cell of a domain, in x-major order.
  fn collect_cells(&self, op: ComputeOp, cells: [usize; 3], kernel: &CellKernel) -> Vec<Triangle>;
}

impl<T: ComputeBackend + ?Sized> ComputeBackend for Box<T> {
  fn update_points(&self, op: ComputeOp, points: [usize; 3], buffer: &mut [f32], kernel: &PointKernel) {
    (**self).update_points(op, points, buffer, kernel)
  }

  fn collect_cells(&self, op: ComputeOp, cells: [usize; 3], kernel: &CellKernel) -> Vec<Triangle> {
    (**self).collect_cells(op, cells, kernel)
  }
}

impl<T: ComputeBackend + ?Sized> ComputeBackend for std::sync::Arc<T> {
  fn update_points(&self, op: ComputeOp, points: [usize; 3], buffer: &mut [f32], kernel: &PointKernel) {
    (**self).update_points(op, points, buffer, kernel)
  }

  fn collect_cells(&self, op: ComputeOp, cells: [usize; 3], kernel: &CellKernel) -> Vec<Triangle> {
    (**self).collect_cells(op, cells, kernel)
  }
}

/// Rayon backend, parallel over x slabs.
#[derive(Clone, Copy, Debug, Default)]
pub struct CpuBackend;

impl ComputeBackend for CpuBackend {
  fn update_points(&self, op: ComputeOp, points: [usize; 3], buffer: &mut [f32], kernel: &PointKernel) {
    let [px, py, pz] = points;
    debug_assert_eq!(buffer.len(), px * py * pz);
    trace!(?op, ?points, "update_points");

    let slab = py * pz;
    if slab == 0 {
      return;
    }
    buffer.par_chunks_mut(slab).enumerate().for_each(|(x, values)| {
      for y in 0..py {
        for z in 0..pz {
          let i = y * pz + z;
          values[i] = kernel([x, y, z], values[i]);
        }
      }
    });
  }

  fn collect_cells(&self, op: ComputeOp, cells: [usize; 3], kernel: &CellKernel) -> Vec<Triangle> {
    let [cx, cy, cz] = cells;
    trace!(?op, ?cells, "collect_cells");

    // Indexed rayon collect keeps slab order.
    let slabs: Vec<Vec<Triangle>> = (0..cx)
      .into_par_iter()
      .map(|x| {
        let mut out = Vec::new();
        for y in 0..cy {
          for z in 0..cz {
            kernel([x, y, z], &mut out);
          }
        }
        out
      })
      .collect();

    slabs.concat()
  }
}

/// Single-threaded backend with the same ordering as [`CpuBackend`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SerialBackend;

impl ComputeBackend for SerialBackend {
  fn update_points(&self, op: ComputeOp, points: [usize; 3], buffer: &mut [f32], kernel: &PointKernel) {
    let [px, py, pz] = points;
    debug_assert_eq!(buffer.len(), px * py * pz);
    trace!(?op, ?points, "update_points");

    let mut i = 0;
    for x in 0..px {
      for y in 0..py {
        for z in 0..pz {
          buffer[i] = kernel([x, y, z], buffer[i]);
          i += 1;
        }
      }
    }
  }

  fn collect_cells(&self, op: ComputeOp, cells: [usize; 3], kernel: &CellKernel) -> Vec<Triangle> {
    let [cx, cy, cz] = cells;
    trace!(?op, ?cells, "collect_cells");

    let mut out = Vec::new();
    for x in 0..cx {
      for y in 0..cy {
        for z in 0..cz {
          kernel([x, y, z], &mut out);
        }
      }
    }
    out
  }
}

#[cfg(test)]
#[path = "compute_test.rs"]
mod compute_test;
