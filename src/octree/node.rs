//! Arena-addressed octree node (spec §3, §4.6, DESIGN NOTES §9's
//! cyclic-back-reference strategy: nodes are addressed by index rather than
//! owning pointers, so neighbor lookups can walk up to a common ancestor
//! and back down without unsafe back-pointers).

use glam::DVec3;

use super::leaf_data::LeafData;
use crate::constants::CHILD_OFFSETS;

/// Index into [`super::tree::Octree`]'s node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// A cube in space, either internal (has exactly eight children) or a leaf
/// (may carry [`LeafData`]). Invariant: a node never has both children and
/// data once fully simplified (spec §3 invariant ii).
#[derive(Debug, Clone)]
pub struct OctreeNode {
  pub center: DVec3,
  pub halfwidth: f64,
  pub depth: u32,
  pub children: Option<[NodeId; 8]>,
  pub data: Option<LeafData>,
}

impl OctreeNode {
  pub fn new_leaf(center: DVec3, halfwidth: f64, depth: u32) -> Self {
    OctreeNode {
      center,
      halfwidth,
      depth,
      children: None,
      data: None,
    }
  }

  pub fn is_leaf(&self) -> bool {
    self.children.is_none()
  }

  /// Child center for octant `octant` (0..8), following the fixed
  /// corner-sign convention in [`CHILD_OFFSETS`].
  pub fn child_center(&self, octant: usize) -> DVec3 {
    let (sx, sy, sz) = CHILD_OFFSETS[octant];
    let child_halfwidth = self.halfwidth * 0.5;
    self.center
      + DVec3::new(sx as f64, sy as f64, sz as f64) * child_halfwidth
  }

  /// Axis-aligned overlap test between this node's cube and a point.
  pub fn contains_point(&self, p: DVec3) -> bool {
    (p.x - self.center.x).abs() <= self.halfwidth
      && (p.y - self.center.y).abs() <= self.halfwidth
      && (p.z - self.center.z).abs() <= self.halfwidth
  }

  /// World position of corner `index` (0..8), using the same sign
  /// convention as [`CHILD_OFFSETS`] — corners and children share one
  /// canonical enumeration (spec §3's `Node corner`).
  pub fn corner(&self, index: usize) -> DVec3 {
    let (sx, sy, sz) = CHILD_OFFSETS[index];
    self.center + DVec3::new(sx as f64, sy as f64, sz as f64) * self.halfwidth
  }

  /// Which of the 8 octants `p` falls in, relative to this node's center.
  pub fn octant_of(&self, p: DVec3) -> usize {
    let sx = if p.x >= self.center.x { 1i8 } else { -1 };
    let sy = if p.y >= self.center.y { 1i8 } else { -1 };
    let sz = if p.z >= self.center.z { 1i8 } else { -1 };
    CHILD_OFFSETS
      .iter()
      .position(|&(x, y, z)| x == sx && y == sy && z == sz)
      .expect("CHILD_OFFSETS covers all 8 sign combinations")
  }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
