//! Bloated floorplan polygon as a [`Shape`] (spec §4.7): a 3D extrusion of
//! a 2D polygon, inflated outward by a buffer distance, used to carve a
//! known floorplan footprint into the octree independently of per-wedge
//! range-return carving.

use glam::{DVec2, DVec3};

use super::{distance_to_polygon_boundary_2d, point_in_polygon_2d, Shape};
use crate::octree::LeafData;

/// A closed 2D polygon (xy), extruded over `[z_min, z_max]` and inflated
/// outward by `buffer`.
pub struct BloatedPolygon {
  pub polygon: Vec<DVec2>,
  pub z_min: f64,
  pub z_max: f64,
  pub buffer: f64,
}

impl BloatedPolygon {
  fn contains_xy(&self, p: DVec2) -> bool {
    if point_in_polygon_2d(p, &self.polygon) {
      return true;
    }
    self.buffer > 0.0 && distance_to_polygon_boundary_2d(p, &self.polygon) <= self.buffer
  }

  fn bounds_xy(&self) -> (DVec2, DVec2) {
    let mut lo = DVec2::splat(f64::INFINITY);
    let mut hi = DVec2::splat(f64::NEG_INFINITY);
    for &p in &self.polygon {
      lo = lo.min(p);
      hi = hi.max(p);
    }
    (lo - DVec2::splat(self.buffer), hi + DVec2::splat(self.buffer))
  }
}

impl Shape for BloatedPolygon {
  fn num_verts(&self) -> usize {
    self.polygon.len()
  }

  fn vertex(&self, i: usize) -> DVec3 {
    DVec3::new(self.polygon[i].x, self.polygon[i].y, 0.5 * (self.z_min + self.z_max))
  }

  fn intersects(&self, c: DVec3, hw: f64) -> bool {
    if c.z + hw < self.z_min || c.z - hw > self.z_max {
      return false;
    }
    let (lo, hi) = self.bounds_xy();
    let cx = DVec2::new(c.x, c.y);
    !(cx.x + hw < lo.x || cx.x - hw > hi.x || cx.y + hw < lo.y || cx.y - hw > hi.y)
  }

  fn apply_to_leaf(&self, c: DVec3, _hw: f64, data: Option<LeafData>) -> Option<LeafData> {
    let mut d = data.unwrap_or_default();
    let inside_z = c.z >= self.z_min && c.z <= self.z_max;
    let sample = if inside_z && self.contains_xy(DVec2::new(c.x, c.y)) { 1.0 } else { 0.5 };
    d.add_sample(sample);
    Some(d)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn unit_square() -> Vec<DVec2> {
    vec![DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.0), DVec2::new(1.0, 1.0), DVec2::new(0.0, 1.0)]
  }

  #[test]
  fn center_of_the_square_is_interior() {
    let poly = BloatedPolygon { polygon: unit_square(), z_min: 0.0, z_max: 2.0, buffer: 0.0 };
    let updated = poly.apply_to_leaf(DVec3::new(0.5, 0.5, 1.0), 0.01, None).unwrap();
    assert_eq!(updated.probability(), 1.0);
  }

  #[test]
  fn buffer_extends_membership_past_the_edge() {
    let poly = BloatedPolygon { polygon: unit_square(), z_min: 0.0, z_max: 2.0, buffer: 0.2 };
    let updated = poly.apply_to_leaf(DVec3::new(1.1, 0.5, 1.0), 0.01, None).unwrap();
    assert_eq!(updated.probability(), 1.0);
  }

  #[test]
  fn outside_the_z_range_is_no_information() {
    let poly = BloatedPolygon { polygon: unit_square(), z_min: 0.0, z_max: 2.0, buffer: 0.0 };
    let updated = poly.apply_to_leaf(DVec3::new(0.5, 0.5, 5.0), 0.01, None).unwrap();
    assert_eq!(updated.probability(), 0.5);
  }
}
