//! Wedge builder (spec §4.4): from two consecutive rays in two consecutive
//! frames, produces the 6-vertex inflated hexahedron and its 4 carve maps.
//!
//! Vertex layout and triangulation mirror the reference's `carve_wedge_t`:
//!
//! ```text
//!        1 (a1, frame j)      4 (b1, frame j+1)
//!       /|                   /|
//!      / |                  / |
//!     0  |                 3  |      0 = sensor, frame j
//!     |\ |                 |\ |      3 = sensor, frame j+1
//!     | \|                 | \|
//!     |  2 (a2, frame j)   |  5 (b2, frame j+1)
//! ```

use glam::DVec3;

use crate::carve_map::CarveMap;

/// Number of carve maps feeding one wedge.
pub const NUM_MAPS_PER_WEDGE: usize = 4;
/// Number of cached vertices on one wedge.
pub const NUM_VERTICES_PER_WEDGE: usize = 6;

/// All `C(6, 2) = 15` vertex-index pairs, used by the shape/query protocol's
/// edge-vs-cube SAT pass (spec §4.7 counts exactly 15 edges for the
/// hexahedron — the full combinatorial set, not just the visible mesh
/// edges, giving the overlap test a conservative margin).
pub const EDGE_INDS: [[u8; 2]; 15] = [
  [0, 1],
  [0, 2],
  [0, 3],
  [0, 4],
  [0, 5],
  [1, 2],
  [1, 3],
  [1, 4],
  [1, 5],
  [2, 3],
  [2, 4],
  [2, 5],
  [3, 4],
  [3, 5],
  [4, 5],
];

/// Triangulated faces for the polygon-vs-cube SAT pass: the two end-cap
/// triangles, the three side quads (each split into two triangles), and
/// two additional cross-diagonal triangles covering the quads' other
/// diagonal, since the side faces are not guaranteed planar once inflated.
pub const TRI_INDS: [[u8; 3]; 10] = [
  [0, 1, 2],
  [3, 5, 4],
  [0, 1, 4],
  [0, 4, 3],
  [1, 2, 5],
  [1, 5, 4],
  [2, 0, 3],
  [2, 3, 5],
  [0, 5, 3],
  [1, 5, 2],
];

/// A carved volumetric primitive: four carve maps and the six vertices
/// they produce. Holds borrowed carve maps for the duration of one insert
/// or one store-write (spec §5's ownership model).
#[derive(Debug, Clone, Copy)]
pub struct Wedge<'a> {
  maps: [&'a CarveMap; NUM_MAPS_PER_WEDGE],
  verts: [DVec3; NUM_VERTICES_PER_WEDGE],
}

impl<'a> Wedge<'a> {
  /// Builds a wedge from four carve maps: `(a1, a2, b1, b2)` — ray `k` and
  /// `k+1` of frame `j`, then the same two ray indices of frame `j+1`.
  ///
  /// `carve_buffer_stddevs` is `nb`: the number of hit-point standard
  /// deviations each outer vertex is pushed past the mean, along the ray.
  /// For `nb >= 2` the wedge's hull contains the 2-sigma ellipsoid of every
  /// hit point (spec S2).
  pub fn build(a1: &'a CarveMap, a2: &'a CarveMap, b1: &'a CarveMap, b2: &'a CarveMap, carve_buffer_stddevs: f64) -> Self {
    let verts = [
      a1.sensor_mean(),
      inflate(a1, carve_buffer_stddevs),
      inflate(a2, carve_buffer_stddevs),
      b1.sensor_mean(),
      inflate(b1, carve_buffer_stddevs),
      inflate(b2, carve_buffer_stddevs),
    ];
    Wedge {
      maps: [a1, a2, b1, b2],
      verts,
    }
  }

  pub fn num_verts(&self) -> usize {
    NUM_VERTICES_PER_WEDGE
  }

  pub fn vertex(&self, i: usize) -> DVec3 {
    self.verts[i]
  }

  pub fn vertices(&self) -> &[DVec3; NUM_VERTICES_PER_WEDGE] {
    &self.verts
  }

  pub fn maps(&self) -> &[&'a CarveMap; NUM_MAPS_PER_WEDGE] {
    &self.maps
  }

  /// Carved probability for a leaf voxel at `c` with halfwidth `hw`:
  /// `(1/4) Σ_i maps[i].compute(c, 2 hw)`.
  pub fn carved_probability(&self, center: DVec3, halfwidth: f64) -> f64 {
    let voxel_side = 2.0 * halfwidth;
    self.maps.iter().map(|m| m.compute(center, voxel_side)).sum::<f64>() / NUM_MAPS_PER_WEDGE as f64
  }
}

/// `μ_p + nb · σ_p · r̂`, pushing the hit point's mean out along the ray by
/// `nb` standard deviations of the marginal variance along that ray.
fn inflate(map: &CarveMap, carve_buffer_stddevs: f64) -> DVec3 {
  let hit = map.hit_mean();
  let ray = map.ray();
  // The marginal variance along the ray is recomputed from the cached
  // sensor->hit distance rather than re-deriving an eigen-decomposition:
  // `compute`'s own lateral-variance machinery already captures it, but
  // the wedge builder only needs a scalar push distance, so it asks the
  // carve map for the same quantity used to build `hit_neg_inv_sqrt_2v`.
  let push = carve_buffer_stddevs * map.hit_stddev_along_ray();
  hit + ray * push
}

#[cfg(test)]
#[path = "wedge_test.rs"]
mod wedge_test;
