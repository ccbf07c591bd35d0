use glam::DVec3;

use super::*;

#[test]
fn child_center_matches_the_octant_sign_convention() {
  let node = OctreeNode::new_leaf(DVec3::ZERO, 2.0, 0);
  let c = node.child_center(0); // (-1,-1,-1)
  assert_eq!(c, DVec3::new(-1.0, -1.0, -1.0));
  let c = node.child_center(7); // (1,1,1)
  assert_eq!(c, DVec3::new(1.0, 1.0, 1.0));
}

#[test]
fn octant_of_is_the_inverse_of_child_center() {
  let node = OctreeNode::new_leaf(DVec3::ZERO, 2.0, 0);
  for octant in 0..8 {
    let child_center = node.child_center(octant);
    // Nudge slightly toward the child center so it lands unambiguously in
    // that octant even exactly on the parent center's planes.
    let probe = child_center * 0.5 + DVec3::splat(1e-6) * child_center.signum();
    assert_eq!(node.octant_of(probe), octant);
  }
}

#[test]
fn contains_point_respects_the_cube_bounds() {
  let node = OctreeNode::new_leaf(DVec3::ZERO, 1.0, 0);
  assert!(node.contains_point(DVec3::new(1.0, 1.0, 1.0)));
  assert!(!node.contains_point(DVec3::new(1.1, 0.0, 0.0)));
}
