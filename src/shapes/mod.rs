//! Shape/query protocol (spec §4.7): the abstraction letting any volumetric
//! primitive intersect, subdivide, and update the octree. Dynamic dispatch
//! is used throughout since per-leaf work dominates the call overhead
//! (DESIGN NOTES §9).

use glam::DVec3;

use crate::octree::LeafData;

pub mod bloated_polygon;
pub mod chunk_exporter;
pub mod histogram_projector;
pub mod plane;
pub mod room_polygon;
pub mod wedge_shape;

/// A volumetric primitive the octree can be queried and updated against.
pub trait Shape: Send + Sync {
  /// Number of vertices exposed for trivial-accept/reject tests.
  fn num_verts(&self) -> usize;

  /// Vertex `i`, `0 <= i < num_verts()`.
  fn vertex(&self, i: usize) -> DVec3;

  /// Conservative overlap test between this shape and the axis-aligned
  /// cube centered at `c` with halfwidth `hw`.
  fn intersects(&self, c: DVec3, hw: f64) -> bool;

  /// The node halfwidth below which the octree should stop subdividing
  /// further for this shape (spec §4.6: "node size > 2x query size:
  /// split"). Shapes that don't care about resolution (pure readers like
  /// the chunk exporter) return `0.0` to defer to the tree's own
  /// `max_depth`.
  fn target_resolution(&self) -> f64 {
    0.0
  }

  /// The only point at which the tree's leaf state is mutated: called
  /// once per intersecting leaf, with that leaf's current data (`None` if
  /// unobserved). Returns the leaf's new data.
  fn apply_to_leaf(&self, c: DVec3, hw: f64, data: Option<LeafData>) -> Option<LeafData>;
}

/// Even-odd ray-casting point-in-polygon test on the xy plane.
pub(crate) fn point_in_polygon_2d(p: glam::DVec2, polygon: &[glam::DVec2]) -> bool {
  let mut inside = false;
  let n = polygon.len();
  let mut j = n - 1;
  for i in 0..n {
    let vi = polygon[i];
    let vj = polygon[j];
    if (vi.y > p.y) != (vj.y > p.y) {
      let x_cross = (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x;
      if p.x < x_cross {
        inside = !inside;
      }
    }
    j = i;
  }
  inside
}

/// Minimum distance from `p` to the polygon's boundary (segment-to-point
/// distance over every edge), used to bloat a footprint by a buffer.
pub(crate) fn distance_to_polygon_boundary_2d(p: glam::DVec2, polygon: &[glam::DVec2]) -> f64 {
  let n = polygon.len();
  let mut best = f64::INFINITY;
  let mut j = n - 1;
  for i in 0..n {
    let a = polygon[j];
    let b = polygon[i];
    let ab = b - a;
    let len2 = ab.length_squared();
    let t = if len2 > 0.0 { ((p - a).dot(ab) / len2).clamp(0.0, 1.0) } else { 0.0 };
    let closest = a + ab * t;
    best = best.min((p - closest).length());
    j = i;
  }
  best
}

#[cfg(test)]
mod tests {
  use super::*;

  struct AlwaysHit;
  impl Shape for AlwaysHit {
    fn num_verts(&self) -> usize {
      0
    }
    fn vertex(&self, _i: usize) -> DVec3 {
      DVec3::ZERO
    }
    fn intersects(&self, _c: DVec3, _hw: f64) -> bool {
      true
    }
    fn apply_to_leaf(&self, _c: DVec3, _hw: f64, data: Option<LeafData>) -> Option<LeafData> {
      let mut d = data.unwrap_or_default();
      d.add_sample(1.0);
      Some(d)
    }
  }

  #[test]
  fn default_target_resolution_defers_to_the_tree() {
    assert_eq!(AlwaysHit.target_resolution(), 0.0);
  }
}
