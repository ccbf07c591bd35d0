//! Node-corner canonicalization and the corner incidence graph (spec §3's
//! `Node corner`, §4.10's `CornerGraph`): the structure the dual mesher
//! walks to build one polygon per physical corner.

use std::collections::HashMap;

use glam::DVec3;
use smallvec::SmallVec;

use super::face::{Boundary, BoundaryFace};
use crate::constants::face_corners;
use crate::octree::{NodeId, Octree};

/// A canonical `(node, corner_index)` identifier: among every node whose
/// cube touches the same 3D point, the one with the smallest halfwidth
/// (ties broken by lowest corner index) is chosen as the representative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeCorner {
  pub node: NodeId,
  pub corner_index: u8,
}

/// Resolves the canonical [`NodeCorner`] for the physical point `world`.
pub fn canonical_corner(tree: &Octree, world: DVec3) -> NodeCorner {
  let touching = tree.leaves_touching_point(world);
  let mut best: Option<(NodeId, u8, f64)> = None;
  for leaf in touching {
    let node = tree.node(leaf);
    let tol = node.halfwidth * 1e-6 + 1e-12;
    for idx in 0..8u8 {
      if (node.corner(idx as usize) - world).length() <= tol {
        let better = match best {
          None => true,
          Some((_, best_idx, best_hw)) => node.halfwidth < best_hw - 1e-15 || (node.halfwidth <= best_hw + 1e-15 && idx < best_idx),
        };
        if better {
          best = Some((leaf, idx, node.halfwidth));
        }
        break;
      }
    }
  }
  let (node, idx, _) = best.expect("a touching leaf always has a matching corner index");
  NodeCorner { node, corner_index: idx }
}

/// Everything incident to one canonical corner: the boundary faces
/// touching it, and the leaves whose cube shares that physical point. A
/// regular octree corner touches at most 3 faces and a handful of leaves,
/// so both lists stay on the stack unless a ragged depth transition
/// forces a spill.
#[derive(Debug, Clone, Default)]
pub struct CornerIncidence {
  pub faces: SmallVec<[usize; 4]>,
  pub leaves: SmallVec<[NodeId; 4]>,
}

/// Indexes every canonical corner touched by a [`Boundary`]'s faces, with
/// the set of faces and leaves incident to each (spec §4.10). This is the
/// adjacency the dual mesher (spec §4.11) turns into one polygon per
/// corner.
#[derive(Debug, Clone, Default)]
pub struct CornerGraph {
  corners: HashMap<NodeCorner, CornerIncidence>,
}

impl CornerGraph {
  /// Builds the graph from a boundary's face set: every face's four
  /// physical corners are canonicalized and the face's index recorded
  /// against each.
  pub fn build(tree: &Octree, boundary: &Boundary) -> Self {
    let mut corners: HashMap<NodeCorner, CornerIncidence> = HashMap::new();
    for (face_idx, face) in boundary.faces.iter().enumerate() {
      for world in face_corner_points(tree, face) {
        let key = canonical_corner(tree, world);
        let entry = corners.entry(key).or_default();
        entry.faces.push(face_idx);
        if !entry.leaves.contains(&face.interior) {
          entry.leaves.push(face.interior);
        }
        if let Some(ext) = face.exterior {
          if !entry.leaves.contains(&ext) {
            entry.leaves.push(ext);
          }
        }
      }
    }
    CornerGraph { corners }
  }

  pub fn len(&self) -> usize {
    self.corners.len()
  }

  pub fn is_empty(&self) -> bool {
    self.corners.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&NodeCorner, &CornerIncidence)> {
    self.corners.iter()
  }

  pub fn get(&self, corner: &NodeCorner) -> Option<&CornerIncidence> {
    self.corners.get(corner)
  }
}

/// The four world-space corners of `face`'s quad, taken from the interior
/// node's own corner positions on the side facing `face.direction`.
fn face_corner_points(tree: &Octree, face: &BoundaryFace) -> [DVec3; 4] {
  let node = tree.node(face.interior);
  let indices = face_corners(face.direction);
  [
    node.corner(indices[0] as usize),
    node.corner(indices[1] as usize),
    node.corner(indices[2] as usize),
    node.corner(indices[3] as usize),
  ]
}

#[cfg(test)]
#[path = "corner_test.rs"]
mod corner_test;
