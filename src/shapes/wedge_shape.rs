//! Carve wedge as a [`Shape`] (spec §4.4, §4.7): the concrete primitive the
//! carver inserts into the octree. Overlap testing follows the SAT-like
//! cascade described in §4.7 — trivial accept/reject on vertices, then
//! edge-vs-cube, then polygon-vs-cube — mirroring the reference's
//! `carve_wedge_t::intersects`.

use glam::DVec3;

use super::Shape;
use crate::octree::LeafData;
use crate::wedge::{Wedge, EDGE_INDS, TRI_INDS};

/// Adapts a [`Wedge`] to the octree's shape/query protocol.
pub struct WedgeShape<'a> {
  wedge: Wedge<'a>,
}

impl<'a> WedgeShape<'a> {
  pub fn new(wedge: Wedge<'a>) -> Self {
    WedgeShape { wedge }
  }
}

impl<'a> Shape for WedgeShape<'a> {
  fn num_verts(&self) -> usize {
    self.wedge.num_verts()
  }

  fn vertex(&self, i: usize) -> DVec3 {
    self.wedge.vertex(i)
  }

  fn intersects(&self, c: DVec3, hw: f64) -> bool {
    wedge_intersects_cube(&self.wedge, c, hw)
  }

  fn apply_to_leaf(&self, c: DVec3, hw: f64, data: Option<LeafData>) -> Option<LeafData> {
    let mut d = data.unwrap_or_default();
    d.add_sample(self.wedge.carved_probability(c, hw));
    Some(d)
  }
}

/// Scales a world-space vertex into the cube's local frame, where the cube
/// spans `[-1, 1]^3`.
fn to_local(v: DVec3, c: DVec3, hw: f64) -> DVec3 {
  (v - c) / hw
}

/// The §4.7 cascade: scale vertices into the cube's unit frame; trivial
/// accept if any is inside; trivial reject if all lie beyond one cube
/// face; otherwise edge-vs-cube for all 15 edges, then polygon-vs-cube for
/// the 10 triangulated faces.
pub(crate) fn wedge_intersects_cube(wedge: &Wedge, c: DVec3, hw: f64) -> bool {
  let n = wedge.num_verts();
  let mut local = [DVec3::ZERO; 6];
  for i in 0..n {
    local[i] = to_local(wedge.vertex(i), c, hw);
  }
  let local = &local[..n];

  if local.iter().any(|v| v.x.abs() <= 1.0 && v.y.abs() <= 1.0 && v.z.abs() <= 1.0) {
    return true;
  }

  let axes = [
    (|v: &DVec3| v.x, 1),
    (|v: &DVec3| v.x, -1),
    (|v: &DVec3| v.y, 1),
    (|v: &DVec3| v.y, -1),
    (|v: &DVec3| v.z, 1),
    (|v: &DVec3| v.z, -1),
  ];
  for (component, sign) in axes {
    let beyond = local.iter().all(|v| component(v) * sign as f64 > 1.0);
    if beyond {
      return false;
    }
  }

  for [a, b] in EDGE_INDS {
    if segment_intersects_unit_cube(local[a as usize], local[b as usize]) {
      return true;
    }
  }

  for [a, b, d] in TRI_INDS {
    if triangle_intersects_unit_cube(local[a as usize], local[b as usize], local[d as usize]) {
      return true;
    }
  }

  false
}

/// Slab-method segment-vs-axis-aligned-cube test, cube spanning `[-1, 1]^3`.
fn segment_intersects_unit_cube(p0: DVec3, p1: DVec3) -> bool {
  let d = p1 - p0;
  let mut t_min = 0.0f64;
  let mut t_max = 1.0f64;
  for axis in 0..3 {
    let (o, dd) = match axis {
      0 => (p0.x, d.x),
      1 => (p0.y, d.y),
      _ => (p0.z, d.z),
    };
    if dd.abs() < 1e-15 {
      if !(-1.0..=1.0).contains(&o) {
        return false;
      }
      continue;
    }
    let inv = 1.0 / dd;
    let mut t0 = (-1.0 - o) * inv;
    let mut t1 = (1.0 - o) * inv;
    if t0 > t1 {
      std::mem::swap(&mut t0, &mut t1);
    }
    t_min = t_min.max(t0);
    t_max = t_max.min(t1);
    if t_min > t_max {
      return false;
    }
  }
  true
}

/// Akenine-Möller triangle/box overlap test against the unit cube centered
/// at the origin with halfwidth 1 — the 13-axis SAT cascade (3 box-face
/// normals, 1 triangle-face normal, 9 edge-cross-products).
fn triangle_intersects_unit_cube(v0: DVec3, v1: DVec3, v2: DVec3) -> bool {
  let box_hw = DVec3::ONE;

  // Box-face normals: equivalent to an AABB-vs-triangle-AABB test.
  for axis in 0..3 {
    let (lo, hi) = tri_axis_extent(v0, v1, v2, axis);
    let bhw = match axis {
      0 => box_hw.x,
      1 => box_hw.y,
      _ => box_hw.z,
    };
    if lo > bhw || hi < -bhw {
      return false;
    }
  }

  let e0 = v1 - v0;
  let e1 = v2 - v1;
  let e2 = v0 - v2;

  // Triangle-face normal.
  let normal = e0.cross(e1);
  if !plane_overlaps_box(normal, v0, box_hw) {
    return false;
  }

  // Nine edge-cross-products against the three box axes.
  let box_axes = [DVec3::X, DVec3::Y, DVec3::Z];
  for edge in [e0, e1, e2] {
    for axis in box_axes {
      let a = edge.cross(axis);
      if a.length_squared() < 1e-18 {
        continue;
      }
      if !sat_axis_separates(a, v0, v1, v2, box_hw) {
        continue;
      }
      return false;
    }
  }

  true
}

fn tri_axis_extent(v0: DVec3, v1: DVec3, v2: DVec3, axis: usize) -> (f64, f64) {
  let get = |v: DVec3| match axis {
    0 => v.x,
    1 => v.y,
    _ => v.z,
  };
  let (a, b, c) = (get(v0), get(v1), get(v2));
  (a.min(b).min(c), a.max(b).max(c))
}

/// `true` if the plane through `point` with normal `normal` can possibly
/// overlap an axis-aligned box of halfwidth `box_hw` centered at origin.
fn plane_overlaps_box(normal: DVec3, point: DVec3, box_hw: DVec3) -> bool {
  let r = box_hw.x * normal.x.abs() + box_hw.y * normal.y.abs() + box_hw.z * normal.z.abs();
  let d = normal.dot(point);
  d.abs() <= r
}

/// `true` if the axis `a` separates the triangle from the box (i.e. the
/// SAT test on this axis proves no overlap).
fn sat_axis_separates(a: DVec3, v0: DVec3, v1: DVec3, v2: DVec3, box_hw: DVec3) -> bool {
  let p0 = v0.dot(a);
  let p1 = v1.dot(a);
  let p2 = v2.dot(a);
  let r = box_hw.x * a.x.abs() + box_hw.y * a.y.abs() + box_hw.z * a.z.abs();
  let lo = p0.min(p1).min(p2);
  let hi = p0.max(p1).max(p2);
  lo > r || hi < -r
}
