//! Boundary face extraction (spec §4.10, §3's `Boundary face`): the set of
//! `(interior_node, exterior_node_or_null, direction, hw)` tuples scanned
//! out of a carved octree.

use glam::DVec3;

use crate::constants::CubeFace;
use crate::octree::{NodeId, Octree};

/// One boundary face: `interior` is labeled interior; `exterior` is the
/// neighbor through `direction`, or `None` if that neighbor lies outside
/// the root. `hw` is the smaller of the two nodes' halfwidths.
#[derive(Debug, Clone, Copy)]
pub struct BoundaryFace {
  pub interior: NodeId,
  pub exterior: Option<NodeId>,
  pub direction: CubeFace,
  pub hw: f64,
}

impl BoundaryFace {
  /// World-space isosurface position: the linear interpolant between the
  /// two nodes' centers, weighted by how far each node's probability sits
  /// from `0.5` (spec §3).
  pub fn isosurface_position(&self, tree: &Octree) -> DVec3 {
    let interior = tree.node(self.interior);
    let interior_center = interior.center;
    let interior_weight = (interior.data.map(|d| d.probability()).unwrap_or(0.5) - 0.5).abs();

    let Some(exterior_id) = self.exterior else {
      // No neighbor: the isosurface sits on the interior node's own face.
      return interior_center + self.direction.normal() * interior.halfwidth;
    };
    let exterior = tree.node(exterior_id);
    let exterior_weight = (exterior.data.map(|d| d.probability()).unwrap_or(0.5) - 0.5).abs();

    let total = interior_weight + exterior_weight;
    let t = if total > 0.0 { exterior_weight / total } else { 0.5 };
    interior_center.lerp(exterior.center, t)
  }

  /// Outward world-space normal: the direction's own axis normal, since
  /// boundary faces are always axis-aligned.
  pub fn normal(&self) -> DVec3 {
    self.direction.normal()
  }

  /// Face area, `(2 hw)^2`, used as a weight by region growing and dual
  /// mesh normal averaging.
  pub fn area(&self) -> f64 {
    (2.0 * self.hw) * (2.0 * self.hw)
  }
}

/// The full set of boundary faces extracted from a carved octree.
#[derive(Debug, Clone, Default)]
pub struct Boundary {
  pub faces: Vec<BoundaryFace>,
}

impl Boundary {
  /// Scans every interior leaf's six axis directions and emits a boundary
  /// face for each neighbor that is exterior, null, or (when room labels
  /// are in use) a different room (spec §4.10).
  pub fn extract(tree: &Octree) -> Self {
    let mut faces = Vec::new();
    for leaf in tree.leaf_ids() {
      let node = tree.node(leaf);
      let Some(data) = node.data else { continue };
      if !data.is_interior() {
        continue;
      }
      for face in CubeFace::ALL {
        let neighbors = tree.neighbors_across(leaf, face);
        if neighbors.is_empty() {
          faces.push(BoundaryFace {
            interior: leaf,
            exterior: None,
            direction: face,
            hw: node.halfwidth,
          });
          continue;
        }
        for neighbor in neighbors {
          let neighbor_node = tree.node(neighbor);
          let is_boundary = match neighbor_node.data {
            None => true,
            Some(nd) => !nd.is_interior() || nd.room_label != data.room_label,
          };
          if is_boundary {
            faces.push(BoundaryFace {
              interior: leaf,
              exterior: Some(neighbor),
              direction: face,
              hw: node.halfwidth.min(neighbor_node.halfwidth),
            });
          }
        }
      }
    }
    Boundary { faces }
  }
}

#[cfg(test)]
#[path = "face_test.rs"]
mod face_test;
