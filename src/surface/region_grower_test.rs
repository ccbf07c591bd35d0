use glam::DVec3;

use super::*;
use crate::octree::Octree;
use crate::shapes::Shape;

struct PlanarWall {
  x: f64,
  planar_prob: f64,
}

impl Shape for PlanarWall {
  fn num_verts(&self) -> usize {
    0
  }
  fn vertex(&self, _i: usize) -> DVec3 {
    DVec3::new(self.x, 0.0, 0.0)
  }
  fn intersects(&self, c: DVec3, hw: f64) -> bool {
    (self.x - c.x).abs() <= hw
  }
  fn apply_to_leaf(&self, _c: DVec3, _hw: f64, data: Option<crate::octree::LeafData>) -> Option<crate::octree::LeafData> {
    let mut d = data.unwrap_or_default();
    d.add_sample(1.0);
    d.planar_prob = self.planar_prob;
    Some(d)
  }
}

#[test]
fn a_flat_interior_slab_grows_into_a_single_region_per_direction() {
  let mut tree = Octree::new(DVec3::ZERO, 1.0, 0);
  tree.find(&PlanarWall { x: 0.0, planar_prob: 0.9 }).unwrap();

  let boundary = Boundary::extract(&tree);
  let graph = CornerGraph::build(&tree, &boundary);
  let regions = grow_regions(&tree, &boundary, &graph, RegionGrowerConfig::default());

  // All six faces of the single leaf are planar-eligible; each direction
  // seeds its own 1-face region since a lone cube has no coplanar
  // neighbor to grow into.
  assert_eq!(regions.len(), 6);
  for region in &regions {
    assert_eq!(region.face_indices.len(), 1);
  }
}

#[test]
fn low_planar_probability_faces_are_excluded_from_every_region() {
  let mut tree = Octree::new(DVec3::ZERO, 1.0, 0);
  tree.find(&PlanarWall { x: 0.0, planar_prob: 0.1 }).unwrap();

  let boundary = Boundary::extract(&tree);
  let graph = CornerGraph::build(&tree, &boundary);
  let regions = grow_regions(&tree, &boundary, &graph, RegionGrowerConfig::default());

  assert!(regions.is_empty());
}

#[test]
fn region_normal_agrees_with_the_majority_of_its_member_face_normals() {
  let mut tree = Octree::new(DVec3::ZERO, 1.0, 0);
  tree.find(&PlanarWall { x: 0.0, planar_prob: 0.9 }).unwrap();

  let boundary = Boundary::extract(&tree);
  let graph = CornerGraph::build(&tree, &boundary);
  let regions = grow_regions(&tree, &boundary, &graph, RegionGrowerConfig::default());

  for region in &regions {
    let face = &boundary.faces[region.face_indices[0]];
    assert!(region.plane_normal.dot(face.normal()) >= 0.0);
  }
}
