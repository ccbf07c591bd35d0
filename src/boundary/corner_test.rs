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
fn canonical_corner_prefers_the_smaller_halfwidth() {
  let mut tree = Octree::new(DVec3::ZERO, 1.0, 1);
  tree.find(&ForcedShape { p: DVec3::new(0.4, 0.4, 0.4), probability: 1.0 }).unwrap();

  // The root's own center (0,0,0) is also corner 7 of the unsplit sibling
  // at (-1,-1,-1)... but since we split the whole root into 8 depth-1
  // leaves, every depth-1 leaf shares that corner. All have equal
  // halfwidth, so the representative is simply the lowest corner index.
  let corner = canonical_corner(&tree, DVec3::ZERO);
  assert_eq!(tree.node(corner.node).halfwidth, 0.5);
}

#[test]
fn corner_graph_indexes_every_face_corner() {
  let mut tree = Octree::new(DVec3::ZERO, 1.0, 0);
  tree.find(&ForcedShape { p: DVec3::ZERO, probability: 1.0 }).unwrap();
  let boundary = crate::boundary::face::Boundary::extract(&tree);
  let graph = CornerGraph::build(&tree, &boundary);

  // A single-leaf cube has 8 corners, each touched by exactly 3 of the 6
  // faces.
  assert_eq!(graph.len(), 8);
  for (_, incidence) in graph.iter() {
    assert_eq!(incidence.faces.len(), 3);
  }
}
