//! Dual surface extraction (spec §4.11): turns a [`Boundary`]/[`CornerGraph`]
//! pair into a [`Mesh`] with one vertex per boundary face and one polygon
//! per canonical corner.

use std::collections::HashMap;

use glam::DVec3;

use super::mesh::{Mesh, Polygon, Vertex};
use crate::boundary::{Boundary, CornerGraph, NodeCorner};
use crate::octree::Octree;

/// Builds the dual mesh of `tree`'s current boundary.
///
/// Every boundary face becomes exactly one vertex, placed at its
/// probability-weighted isosurface position (spec §3) with the face's own
/// outward normal. Every canonical corner incident to 3 or more faces
/// becomes one polygon, wound so its normal points into the interior — the
/// opposite sense of the faces' own outward normals, since a corner
/// polygon closes off the solid from the outside looking in.
pub fn extract(tree: &Octree) -> Mesh {
  let boundary = Boundary::extract(tree);
  let graph = CornerGraph::build(tree, &boundary);
  extract_from(tree, &boundary, &graph)
}

/// Same as [`extract`], but reuses an already-built boundary/corner graph
/// pair (e.g. one also consumed by the region grower).
pub fn extract_from(tree: &Octree, boundary: &Boundary, graph: &CornerGraph) -> Mesh {
  let mut mesh = Mesh::new();
  let mut vertex_of_face: HashMap<usize, u32> = HashMap::new();

  for (face_idx, face) in boundary.faces.iter().enumerate() {
    let idx = mesh.push_vertex(Vertex {
      position: face.isosurface_position(tree),
      normal: face.normal(),
    });
    vertex_of_face.insert(face_idx, idx);
  }

  let mut corners: Vec<(&NodeCorner, _)> = graph.iter().collect();
  corners.sort_by_key(|(c, _)| (c.node.0, c.corner_index));

  for (_corner, incidence) in corners {
    if incidence.faces.len() < 3 {
      continue;
    }
    let Some(polygon) = build_corner_polygon(&mesh, &vertex_of_face, &incidence.faces) else {
      continue;
    };
    mesh.polygons.push(polygon);
  }

  mesh
}

/// Orders a corner's incident faces into a closed loop by angle around
/// their area-weighted average normal, then winds the loop so its own
/// normal (by Newell's method) opposes that average - i.e. points into the
/// interior the faces bound.
fn build_corner_polygon(mesh: &Mesh, vertex_of_face: &HashMap<usize, u32>, face_indices: &[usize]) -> Option<Polygon> {
  let indices: Vec<u32> = face_indices.iter().filter_map(|f| vertex_of_face.get(f).copied()).collect();
  if indices.len() < 3 {
    return None;
  }

  let positions: Vec<DVec3> = indices.iter().map(|&i| mesh.vertices[i as usize].position).collect();
  let normals: Vec<DVec3> = indices.iter().map(|&i| mesh.vertices[i as usize].normal).collect();

  let centroid = positions.iter().fold(DVec3::ZERO, |acc, p| acc + *p) / positions.len() as f64;
  let mut avg_normal = normals.iter().fold(DVec3::ZERO, |acc, n| acc + *n);
  if avg_normal.length_squared() < 1e-20 {
    avg_normal = DVec3::Z;
  }
  let avg_normal = avg_normal.normalize();

  let u = pick_tangent(avg_normal);
  let v = avg_normal.cross(u);

  let mut order: Vec<usize> = (0..indices.len()).collect();
  order.sort_by(|&a, &b| {
    let pa = positions[a] - centroid;
    let pb = positions[b] - centroid;
    let angle_a = pa.dot(v).atan2(pa.dot(u));
    let angle_b = pb.dot(v).atan2(pb.dot(u));
    angle_a.partial_cmp(&angle_b).unwrap_or(std::cmp::Ordering::Equal)
  });

  let mut ordered_indices: Vec<u32> = order.iter().map(|&i| indices[i]).collect();
  let mut ordered_positions: Vec<DVec3> = order.iter().map(|&i| positions[i]).collect();

  if newell_normal(&ordered_positions).dot(avg_normal) > 0.0 {
    ordered_indices.reverse();
    ordered_positions.reverse();
  }

  Some(Polygon { indices: ordered_indices })
}

/// Any unit vector not parallel to `n`, used to seed a 2D basis in the
/// plane perpendicular to `n`.
fn pick_tangent(n: DVec3) -> DVec3 {
  let helper = if n.x.abs() < 0.9 { DVec3::X } else { DVec3::Y };
  (helper - n * helper.dot(n)).normalize()
}

/// Newell's method: a polygon normal estimate robust to non-planar loops.
fn newell_normal(positions: &[DVec3]) -> DVec3 {
  let mut n = DVec3::ZERO;
  let len = positions.len();
  for i in 0..len {
    let a = positions[i];
    let b = positions[(i + 1) % len];
    n.x += (a.y - b.y) * (a.z + b.z);
    n.y += (a.z - b.z) * (a.x + b.x);
    n.z += (a.x - b.x) * (a.y + b.y);
  }
  n.normalize_or_zero()
}

#[cfg(test)]
#[path = "extractor_test.rs"]
mod extractor_test;
