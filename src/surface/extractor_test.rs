use glam::DVec3;

use super::*;
use crate::octree::Octree;
use crate::shapes::Shape;

struct ForcedShape {
  p: DVec3,
  probability: f64,
}

impl Shape for ForcedShape {
  fn num_verts(&self) -> usize {
    0
  }
  fn vertex(&self, _i: usize) -> DVec3 {
    self.p
  }
  fn intersects(&self, c: DVec3, hw: f64) -> bool {
    (self.p.x - c.x).abs() <= hw && (self.p.y - c.y).abs() <= hw && (self.p.z - c.z).abs() <= hw
  }
  fn apply_to_leaf(&self, _c: DVec3, _hw: f64, data: Option<crate::octree::LeafData>) -> Option<crate::octree::LeafData> {
    let mut d = data.unwrap_or_default();
    d.add_sample(self.probability);
    Some(d)
  }
}

#[test]
fn a_single_interior_leaf_produces_a_watertight_cube() {
  let mut tree = Octree::new(DVec3::ZERO, 1.0, 0);
  tree.find(&ForcedShape { p: DVec3::ZERO, probability: 1.0 }).unwrap();

  let mesh = extract(&tree);
  // 6 faces -> 6 vertices, 8 corners -> 8 polygons (each a triangle: a
  // cube corner touches exactly 3 faces).
  assert_eq!(mesh.vertices.len(), 6);
  assert_eq!(mesh.non_degenerate_polygon_count(), 8);
  for polygon in &mesh.polygons {
    assert_eq!(polygon.indices.len(), 3);
  }
}

#[test]
fn polygons_wind_with_their_normal_opposing_the_average_face_normal() {
  let mut tree = Octree::new(DVec3::ZERO, 1.0, 0);
  tree.find(&ForcedShape { p: DVec3::ZERO, probability: 1.0 }).unwrap();
  let mesh = extract(&tree);

  for polygon in &mesh.polygons {
    let positions: Vec<DVec3> = polygon.indices.iter().map(|&i| mesh.vertices[i as usize].position).collect();
    let avg_normal = polygon
      .indices
      .iter()
      .fold(DVec3::ZERO, |acc, &i| acc + mesh.vertices[i as usize].normal)
      .normalize();
    let n = newell_normal(&positions);
    assert!(n.dot(avg_normal) <= 0.0, "polygon normal should oppose the outward face normals");
  }
}

#[test]
fn an_empty_tree_produces_an_empty_mesh() {
  let tree = Octree::new(DVec3::ZERO, 1.0, 0);
  let mesh = extract(&tree);
  assert!(mesh.vertices.is_empty());
  assert!(mesh.polygons.is_empty());
}
