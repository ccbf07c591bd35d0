use glam::DVec3;
use uuid::Uuid;

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
fn a_uniform_interior_leaf_round_trips_as_a_uniform_true_leaf() {
  let mut tree = Octree::new(DVec3::ZERO, 1.0, 0);
  tree.find(&ForcedShape { p: DVec3::ZERO, probability: 1.0 }).unwrap();

  let root = from_octree(&tree);
  assert_eq!(root, SofNode::Uniform(true));
}

#[test]
fn an_unobserved_tree_round_trips_as_a_uniform_false_leaf() {
  let tree = Octree::new(DVec3::ZERO, 1.0, 0);
  let root = from_octree(&tree);
  assert_eq!(root, SofNode::Uniform(false));
}

#[test]
fn file_round_trip_preserves_the_node_stream_byte_for_byte() {
  let mut tree = Octree::new(DVec3::ZERO, 1.0, 1);
  tree.find(&ForcedShape { p: DVec3::new(0.4, 0.4, 0.4), probability: 1.0 }).unwrap();

  let side = 1u32 << tree.max_depth();
  let root = from_octree(&tree);

  let dir = std::env::temp_dir().join(format!("scancarve-sof-test-{}", Uuid::new_v4()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("tree.sof");

  write_to_file(&path, side, &root).unwrap();
  let (read_side, read_root) = read_from_file(&path).unwrap();

  assert_eq!(read_side, side);
  assert_eq!(read_root, root);

  let _ = std::fs::remove_dir_all(&dir);
}
