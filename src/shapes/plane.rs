//! Infinite plane as a [`Shape`] (spec §4.7): forces a leaf's occupancy
//! sample toward one of two probabilities depending on which side of the
//! plane the leaf center falls on. Used to carve known flat boundaries
//! (e.g. an assumed floor/ceiling) independently of range-return carving.

use glam::DVec3;

use super::Shape;
use crate::octree::LeafData;

/// An oriented plane: `normal` points toward the side sampled as
/// `probability_positive_side`.
pub struct Plane {
  pub point: DVec3,
  pub normal: DVec3,
  pub probability_positive_side: f64,
  pub probability_negative_side: f64,
}

impl Plane {
  pub fn new(point: DVec3, normal: DVec3) -> Self {
    Plane {
      point,
      normal: normal.normalize_or_zero(),
      probability_positive_side: 1.0,
      probability_negative_side: 0.0,
    }
  }

  fn signed_distance(&self, p: DVec3) -> f64 {
    (p - self.point).dot(self.normal)
  }
}

impl Shape for Plane {
  fn num_verts(&self) -> usize {
    0
  }

  fn vertex(&self, _i: usize) -> DVec3 {
    self.point
  }

  /// Literal plane-vs-AABB test: the cube overlaps the plane unless all
  /// eight corners lie strictly on the same side.
  fn intersects(&self, c: DVec3, hw: f64) -> bool {
    let mut any_pos = false;
    let mut any_neg = false;
    for sx in [-1.0, 1.0] {
      for sy in [-1.0, 1.0] {
        for sz in [-1.0, 1.0] {
          let corner = c + DVec3::new(sx, sy, sz) * hw;
          let d = self.signed_distance(corner);
          if d >= 0.0 {
            any_pos = true;
          }
          if d <= 0.0 {
            any_neg = true;
          }
          if any_pos && any_neg {
            return true;
          }
        }
      }
    }
    any_pos && any_neg
  }

  fn apply_to_leaf(&self, c: DVec3, _hw: f64, data: Option<LeafData>) -> Option<LeafData> {
    let mut d = data.unwrap_or_default();
    let sample = if self.signed_distance(c) >= 0.0 {
      self.probability_positive_side
    } else {
      self.probability_negative_side
    };
    d.add_sample(sample);
    Some(d)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cube_straddling_the_plane_intersects() {
    let plane = Plane::new(DVec3::ZERO, DVec3::Z);
    assert!(plane.intersects(DVec3::new(0.0, 0.0, 0.0), 1.0));
  }

  #[test]
  fn cube_entirely_above_the_plane_does_not_intersect() {
    let plane = Plane::new(DVec3::ZERO, DVec3::Z);
    assert!(!plane.intersects(DVec3::new(0.0, 0.0, 10.0), 1.0));
  }

  #[test]
  fn apply_to_leaf_forces_sample_by_side() {
    let plane = Plane::new(DVec3::ZERO, DVec3::Z);
    let above = plane.apply_to_leaf(DVec3::new(0.0, 0.0, 5.0), 1.0, None).unwrap();
    let below = plane.apply_to_leaf(DVec3::new(0.0, 0.0, -5.0), 1.0, None).unwrap();
    assert_eq!(above.probability(), 1.0);
    assert_eq!(below.probability(), 0.0);
  }
}
