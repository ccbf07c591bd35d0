//! Extruded room polygon as a [`Shape`] (spec §4.7): tags leaves falling
//! inside a room's footprint with a room label, without touching their
//! occupancy statistics. Used for room-based boundary segmentation (spec
//! §4.10: "faces are also emitted between different-room interior nodes").

use glam::{DVec2, DVec3};

use super::{point_in_polygon_2d, Shape};
use crate::octree::LeafData;

/// A closed 2D polygon (xy) extruded over `[z_min, z_max]`, labeling every
/// leaf whose center falls inside with `room_label`.
pub struct RoomPolygon {
  pub polygon: Vec<DVec2>,
  pub z_min: f64,
  pub z_max: f64,
  pub room_label: u32,
}

impl RoomPolygon {
  fn bounds_xy(&self) -> (DVec2, DVec2) {
    let mut lo = DVec2::splat(f64::INFINITY);
    let mut hi = DVec2::splat(f64::NEG_INFINITY);
    for &p in &self.polygon {
      lo = lo.min(p);
      hi = hi.max(p);
    }
    (lo, hi)
  }
}

impl Shape for RoomPolygon {
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
    !(c.x + hw < lo.x || c.x - hw > hi.x || c.y + hw < lo.y || c.y - hw > hi.y)
  }

  /// Only labels leaves that already carry occupancy data — an unobserved
  /// leaf stays unobserved even if it falls inside the room footprint.
  fn apply_to_leaf(&self, c: DVec3, _hw: f64, data: Option<LeafData>) -> Option<LeafData> {
    let mut d = data?;
    let inside_z = c.z >= self.z_min && c.z <= self.z_max;
    if inside_z && point_in_polygon_2d(DVec2::new(c.x, c.y), &self.polygon) {
      d.room_label = Some(self.room_label);
    }
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
  fn unobserved_leaf_is_left_unlabeled() {
    let room = RoomPolygon { polygon: unit_square(), z_min: 0.0, z_max: 2.0, room_label: 3 };
    assert!(room.apply_to_leaf(DVec3::new(0.5, 0.5, 1.0), 0.01, None).is_none());
  }

  #[test]
  fn observed_leaf_inside_the_footprint_gets_labeled() {
    let room = RoomPolygon { polygon: unit_square(), z_min: 0.0, z_max: 2.0, room_label: 3 };
    let mut data = LeafData::default();
    data.add_sample(1.0);
    let updated = room.apply_to_leaf(DVec3::new(0.5, 0.5, 1.0), 0.01, Some(data)).unwrap();
    assert_eq!(updated.room_label, Some(3));
  }

  #[test]
  fn observed_leaf_outside_the_footprint_is_untouched() {
    let room = RoomPolygon { polygon: unit_square(), z_min: 0.0, z_max: 2.0, room_label: 3 };
    let mut data = LeafData::default();
    data.add_sample(1.0);
    let updated = room.apply_to_leaf(DVec3::new(5.0, 5.0, 1.0), 0.01, Some(data)).unwrap();
    assert_eq!(updated.room_label, None);
  }
}
