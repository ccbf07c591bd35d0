//! The adaptive octree itself (spec §4.6): split-on-demand insertion
//! through the shape/query protocol, simplification, and root expansion.

use glam::DVec3;

use super::leaf_data::LeafData;
use super::node::{NodeId, OctreeNode};
use crate::constants::CubeFace;
use crate::error::{CoreError, CoreResult};
use crate::shapes::Shape;

/// Epsilon for "numerically equal" leaf aggregates during simplification.
const SIMPLIFY_EPSILON: f64 = 1e-9;

/// Arena-allocated adaptive octree. The root may grow outward (spec §3
/// invariant iv); `max_depth` grows with it so the minimum leaf resolution
/// never changes.
#[derive(Debug, Clone)]
pub struct Octree {
  nodes: Vec<OctreeNode>,
  root: NodeId,
  max_depth: u32,
}

impl Octree {
  /// Creates a tree with a single-leaf root.
  pub fn new(center: DVec3, halfwidth: f64, max_depth: u32) -> Self {
    let root_node = OctreeNode::new_leaf(center, halfwidth, 0);
    Octree {
      nodes: vec![root_node],
      root: NodeId(0),
      max_depth,
    }
  }

  pub fn root(&self) -> NodeId {
    self.root
  }

  pub fn max_depth(&self) -> u32 {
    self.max_depth
  }

  pub fn node(&self, id: NodeId) -> &OctreeNode {
    &self.nodes[id.0 as usize]
  }

  pub fn node_count(&self) -> usize {
    self.nodes.len()
  }

  fn alloc(&mut self, node: OctreeNode) -> NodeId {
    let id = NodeId(self.nodes.len() as u32);
    self.nodes.push(node);
    id
  }

  /// Expands the root outward by one level so it contains `p`, repeating
  /// until `p` is inside. The old root becomes the child in the octant
  /// opposite `p`'s direction from the old center (spec §3 invariant iv,
  /// §4.6, tested by S3).
  pub fn ensure_contains(&mut self, p: DVec3) {
    while !self.node(self.root).contains_point(p) {
      self.expand_root_once(p);
    }
  }

  fn expand_root_once(&mut self, p: DVec3) {
    let old_root = self.root;
    let old = self.node(old_root).clone();
    let new_halfwidth = old.halfwidth * 2.0;

    // Old root sits in the octant opposite the direction of p.
    let sx = if p.x >= old.center.x { -1i8 } else { 1 };
    let sy = if p.y >= old.center.y { -1i8 } else { 1 };
    let sz = if p.z >= old.center.z { -1i8 } else { 1 };
    let old_slot = crate::constants::CHILD_OFFSETS
      .iter()
      .position(|&(x, y, z)| x == sx && y == sy && z == sz)
      .expect("sign combination always present");

    let new_center = old.center - DVec3::new(sx as f64, sy as f64, sz as f64) * old.halfwidth;
    let mut new_root = OctreeNode::new_leaf(new_center, new_halfwidth, 0);

    let mut children = [NodeId(0); 8];
    for (octant, slot) in children.iter_mut().enumerate() {
      if octant == old_slot {
        *slot = old_root;
      } else {
        let (cx, cy, cz) = crate::constants::CHILD_OFFSETS[octant];
        let center = new_center + DVec3::new(cx as f64, cy as f64, cz as f64) * old.halfwidth;
        *slot = self.alloc(OctreeNode::new_leaf(center, old.halfwidth, 1));
      }
    }
    new_root.children = Some(children);

    // Reparent: the new root replaces the old root's slot; the old root's
    // own depth increases by one, and every descendant already allocated
    // under it keeps a depth one greater than before this expansion. Since
    // depths aren't stored as absolute offsets from a movable root but as
    // a fixed count from the tree's logical root, we bump the old subtree
    // in place.
    self.bump_depth(old_root);

    let new_id = self.alloc(new_root);
    self.root = new_id;
    self.max_depth += 1;
  }

  fn bump_depth(&mut self, id: NodeId) {
    let children = self.nodes[id.0 as usize].children;
    self.nodes[id.0 as usize].depth += 1;
    if let Some(children) = children {
      for child in children {
        self.bump_depth(child);
      }
    }
  }

  /// Traverses nodes whose cube overlaps `shape.intersects`; on reaching a
  /// leaf whose size is at or below `shape.target_resolution()` (or the
  /// tree's own `max_depth`), invokes `shape.apply_to_leaf` and replaces
  /// the leaf's data with its return value.
  pub fn find(&mut self, shape: &dyn Shape) -> CoreResult<()> {
    self.find_recur(self.root, shape)
  }

  fn find_recur(&mut self, id: NodeId, shape: &dyn Shape) -> CoreResult<()> {
    let (center, halfwidth, depth, children, is_leaf) = {
      let node = &self.nodes[id.0 as usize];
      (node.center, node.halfwidth, node.depth, node.children, node.is_leaf())
    };

    if !shape.intersects(center, halfwidth) {
      return Ok(());
    }

    let should_subdivide = depth < self.max_depth && halfwidth > 2.0 * shape.target_resolution();

    if is_leaf && should_subdivide {
      self.split(id)?;
      return self.find_recur(id, shape);
    }

    if !is_leaf {
      let children = children.expect("non-leaf always has children");
      for child in children {
        self.find_recur(child, shape)?;
      }
      return Ok(());
    }

    let data = self.nodes[id.0 as usize].data;
    let updated = shape.apply_to_leaf(center, halfwidth, data);
    self.nodes[id.0 as usize].data = updated;
    Ok(())
  }

  /// Splits leaf `id` into eight fresh, dataless leaf children (spec
  /// §4.6). Fails with [`CoreError::InconsistentTree`] if `id` is not a
  /// leaf or is already at `max_depth`.
  fn split(&mut self, id: NodeId) -> CoreResult<()> {
    let (center, halfwidth, depth, is_leaf) = {
      let node = &self.nodes[id.0 as usize];
      (node.center, node.halfwidth, node.depth, node.is_leaf())
    };
    if !is_leaf {
      return Err(CoreError::InconsistentTree("split called on an internal node".into()));
    }
    if depth >= self.max_depth {
      return Err(CoreError::InconsistentTree("split called at max_depth".into()));
    }

    let child_halfwidth = halfwidth * 0.5;
    let mut children = [NodeId(0); 8];
    for (octant, slot) in children.iter_mut().enumerate() {
      let (sx, sy, sz) = crate::constants::CHILD_OFFSETS[octant];
      let child_center = center + DVec3::new(sx as f64, sy as f64, sz as f64) * child_halfwidth;
      *slot = self.alloc(OctreeNode::new_leaf(child_center, child_halfwidth, depth + 1));
    }

    self.nodes[id.0 as usize].children = Some(children);
    self.nodes[id.0 as usize].data = None;
    Ok(())
  }

  /// Collapses eight leaf siblings with numerically-equal aggregates into
  /// their parent (spec §4.6, tested property: no internal node has eight
  /// leaf children with identical aggregated statistics afterward).
  pub fn simplify_recur(&mut self) {
    self.simplify_node(self.root);
  }

  fn simplify_node(&mut self, id: NodeId) -> Option<LeafData> {
    let children = self.nodes[id.0 as usize].children;
    let Some(children) = children else {
      return self.nodes[id.0 as usize].data;
    };

    let mut child_data = Vec::with_capacity(8);
    for child in children {
      child_data.push(self.simplify_node(child));
    }

    let all_leaves = children.iter().all(|c| self.nodes[c.0 as usize].is_leaf());
    if !all_leaves {
      return None;
    }

    if child_data.iter().all(Option::is_none) {
      self.nodes[id.0 as usize].children = None;
      self.nodes[id.0 as usize].data = None;
      return None;
    }

    let Some(first) = child_data[0] else {
      return None;
    };
    let all_equal = child_data
      .iter()
      .all(|d| matches!(d, Some(d) if d.numerically_equal(&first, SIMPLIFY_EPSILON)));

    if all_equal {
      self.nodes[id.0 as usize].children = None;
      self.nodes[id.0 as usize].data = Some(first);
      Some(first)
    } else {
      None
    }
  }

  /// All leaf node ids currently in the tree, in fixed child-index
  /// traversal order (spec §4.6's ordering guarantee).
  pub fn leaf_ids(&self) -> Vec<NodeId> {
    let mut out = Vec::new();
    self.collect_leaves(self.root, &mut out);
    out
  }

  fn collect_leaves(&self, id: NodeId, out: &mut Vec<NodeId>) {
    match self.nodes[id.0 as usize].children {
      Some(children) => {
        for child in children {
          self.collect_leaves(child, out);
        }
      }
      None => out.push(id),
    }
  }

  /// Resolves the neighbor(s) of leaf `id` across `face` (spec §4.10):
  /// empty if `id` touches the tree boundary (the neighbor is "outside the
  /// root"), one id if the neighbor is a coarser-or-equal leaf, or several
  /// ids if the neighbor side is subdivided more finely than `id`.
  ///
  /// Implemented without parent back-pointers (DESIGN NOTES §9): a thin
  /// probe slab is placed just across the shared face and every leaf whose
  /// cube overlaps that slab is collected by a top-down walk from the
  /// root, mirroring a least-common-ancestor walk without needing to
  /// store one.
  pub fn neighbors_across(&self, id: NodeId, face: CubeFace) -> Vec<NodeId> {
    let node = &self.nodes[id.0 as usize];
    let normal = face.normal();
    let eps = (node.halfwidth * 1e-6).max(1e-12);
    let lateral_hw = (node.halfwidth - eps).max(0.0);

    let probe_center = node.center + normal * (node.halfwidth + eps);
    let probe_hw = DVec3::new(
      if normal.x != 0.0 { eps } else { lateral_hw },
      if normal.y != 0.0 { eps } else { lateral_hw },
      if normal.z != 0.0 { eps } else { lateral_hw },
    );

    let mut out = Vec::new();
    self.collect_region_leaves(self.root, probe_center, probe_hw, &mut out);
    out
  }

  fn collect_region_leaves(&self, id: NodeId, region_center: DVec3, region_hw: DVec3, out: &mut Vec<NodeId>) {
    let node = &self.nodes[id.0 as usize];
    if !aabb_overlaps(node.center, DVec3::splat(node.halfwidth), region_center, region_hw) {
      return;
    }
    match node.children {
      Some(children) => {
        for child in children {
          self.collect_region_leaves(child, region_center, region_hw, out);
        }
      }
      None => out.push(id),
    }
  }

  /// All leaves whose cube touches `point`, found the same way as
  /// [`Octree::neighbors_across`]: a tiny probe region centered on the
  /// point. Used by corner canonicalization (spec §3's `Node corner`).
  pub fn leaves_touching_point(&self, point: DVec3) -> Vec<NodeId> {
    let eps = self.node(self.root).halfwidth.max(1.0) * 1e-9;
    let mut out = Vec::new();
    self.collect_region_leaves(self.root, point, DVec3::splat(eps), &mut out);
    out
  }
}

/// Conservative AABB-vs-AABB overlap test with independent per-axis
/// halfwidths, used by neighbor and corner-touch queries.
fn aabb_overlaps(c1: DVec3, hw1: DVec3, c2: DVec3, hw2: DVec3) -> bool {
  (c1.x - c2.x).abs() <= hw1.x + hw2.x && (c1.y - c2.y).abs() <= hw1.y + hw2.y && (c1.z - c2.z).abs() <= hw1.z + hw2.z
}

#[cfg(test)]
#[path = "tree_test.rs"]
mod tree_test;
