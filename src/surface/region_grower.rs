//! Planar region growing (spec §4.12): seeded flood-fill over the boundary
//! face graph, producing coplanar regions for wall/floor/ceiling detection
//! downstream of the dual mesher.
//!
//! Grounded on the same PCA machinery [`crate::carve_map`] already uses for
//! the endpoint-normal eigen-decomposition (`find_aligned_eig`): a region's
//! plane is the dominant eigenvector of its area-weighted point scatter.

use std::collections::{HashMap, HashSet};

use glam::DVec3;
use nalgebra::Matrix3;

use crate::boundary::{Boundary, CornerGraph};
use crate::constants::CubeFace;
use crate::octree::Octree;

/// Tunables for [`grow_regions`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionGrowerConfig {
  /// Minimum `planar_prob` (spec §4.12) a face's interior leaf must carry
  /// to be eligible for region membership.
  pub min_planar_prob: f64,
  /// Maximum allowed perpendicular distance (world units) from a
  /// candidate face's isosurface point to the region's running plane fit.
  pub max_residual: f64,
}

impl Default for RegionGrowerConfig {
  fn default() -> Self {
    RegionGrowerConfig {
      min_planar_prob: 0.5,
      max_residual: 0.05,
    }
  }
}

/// One grown coplanar region: the faces it claimed, its fitted plane, and
/// the shared cube direction that seeded it.
#[derive(Debug, Clone)]
pub struct Region {
  pub direction: CubeFace,
  pub face_indices: Vec<usize>,
  pub plane_point: DVec3,
  pub plane_normal: DVec3,
}

/// Incrementally-refit plane: tracks the area-weighted mean and scatter
/// matrix so adding a point doesn't require re-reading every prior one.
struct PlaneFit {
  total_weight: f64,
  mean: DVec3,
  scatter: Matrix3<f64>,
}

impl PlaneFit {
  fn new() -> Self {
    PlaneFit {
      total_weight: 0.0,
      mean: DVec3::ZERO,
      scatter: Matrix3::zeros(),
    }
  }

  /// Distance from `p` to the current plane fit; `0.0` until at least 3
  /// points have been folded in (nothing to reject yet).
  fn residual(&self, p: DVec3) -> f64 {
    if self.total_weight <= 0.0 {
      return 0.0;
    }
    let normal = self.normal();
    (p - self.mean).dot(normal).abs()
  }

  fn normal(&self) -> DVec3 {
    if self.total_weight <= 0.0 {
      return DVec3::Z;
    }
    let eig = nalgebra::linalg::SymmetricEigen::new(self.scatter);
    let mut best_idx = 0;
    let mut best_eigenvalue = f64::INFINITY;
    for i in 0..3 {
      if eig.eigenvalues[i] < best_eigenvalue {
        best_eigenvalue = eig.eigenvalues[i];
        best_idx = i;
      }
    }
    let col = eig.eigenvectors.column(best_idx);
    DVec3::new(col[0], col[1], col[2]).normalize_or_zero()
  }

  /// Folds a new weighted point into the running mean/scatter, centering
  /// each point's contribution on the mean as it stood just after that
  /// point was added. An approximation of the exact area-weighted scatter
  /// matrix, good enough to pick a plane normal for region growing.
  fn add(&mut self, p: DVec3, weight: f64) {
    let new_total = self.total_weight + weight;
    if new_total <= 0.0 {
      return;
    }
    let delta = p - self.mean;
    let new_mean = self.mean + delta * (weight / new_total);

    let d = p - new_mean;
    let outer = Matrix3::new(
      d.x * d.x,
      d.x * d.y,
      d.x * d.z,
      d.y * d.x,
      d.y * d.y,
      d.y * d.z,
      d.z * d.x,
      d.z * d.y,
      d.z * d.z,
    );
    self.scatter += outer * weight;
    self.mean = new_mean;
    self.total_weight = new_total;
  }
}

/// Flood-fills every boundary face into planar regions: a region only
/// grows across faces sharing its seed's cube direction, whose interior
/// leaf's `planar_prob` clears `min_planar_prob`, and whose isosurface
/// point sits within `max_residual` of the region's running plane fit.
pub fn grow_regions(tree: &Octree, boundary: &Boundary, graph: &CornerGraph, config: RegionGrowerConfig) -> Vec<Region> {
  let adjacency = build_face_adjacency(boundary, graph);
  let positions: Vec<DVec3> = boundary.faces.iter().map(|f| f.isosurface_position(tree)).collect();

  let mut visited = vec![false; boundary.faces.len()];
  let mut regions = Vec::new();

  for seed in 0..boundary.faces.len() {
    if visited[seed] || !face_is_planar_eligible(tree, boundary, seed, config) {
      continue;
    }

    let direction = boundary.faces[seed].direction;
    let mut fit = PlaneFit::new();
    let mut members = Vec::new();
    let mut queue = vec![seed];
    visited[seed] = true;

    while let Some(face_idx) = queue.pop() {
      let p = positions[face_idx];
      let area = boundary.faces[face_idx].area();
      fit.add(p, area);
      members.push(face_idx);

      for &neighbor in adjacency.get(&face_idx).into_iter().flatten() {
        if visited[neighbor] || boundary.faces[neighbor].direction != direction {
          continue;
        }
        if !face_is_planar_eligible(tree, boundary, neighbor, config) {
          continue;
        }
        if fit.residual(positions[neighbor]) > config.max_residual {
          continue;
        }
        visited[neighbor] = true;
        queue.push(neighbor);
      }
    }

    let plane_normal = orient_by_weighted_vote(tree, boundary, &members, fit.normal());
    regions.push(Region {
      direction,
      face_indices: members,
      plane_point: fit.mean,
      plane_normal,
    });
  }

  regions
}

fn face_is_planar_eligible(tree: &Octree, boundary: &Boundary, face_idx: usize, config: RegionGrowerConfig) -> bool {
  let face = &boundary.faces[face_idx];
  let planar_prob = tree.node(face.interior).data.map(|d| d.planar_prob).unwrap_or(0.0);
  planar_prob >= config.min_planar_prob
}

/// Two faces are adjacent when they share a canonical corner; the caller
/// additionally filters by matching direction.
fn build_face_adjacency(boundary: &Boundary, graph: &CornerGraph) -> HashMap<usize, HashSet<usize>> {
  let mut adjacency: HashMap<usize, HashSet<usize>> = HashMap::new();
  let _ = boundary;
  for (_corner, incidence) in graph.iter() {
    for &a in &incidence.faces {
      for &b in &incidence.faces {
        if a != b {
          adjacency.entry(a).or_default().insert(b);
        }
      }
    }
  }
  adjacency
}

/// The PCA eigenvector has no inherent sign; orient it to agree with the
/// area-weighted majority of the region's own boundary-face normals.
fn orient_by_weighted_vote(tree: &Octree, boundary: &Boundary, members: &[usize], normal: DVec3) -> DVec3 {
  let _ = tree;
  let mut agree = 0.0;
  let mut disagree = 0.0;
  for &idx in members {
    let face = &boundary.faces[idx];
    let weight = face.area();
    if face.normal().dot(normal) >= 0.0 {
      agree += weight;
    } else {
      disagree += weight;
    }
  }
  if disagree > agree {
    -normal
  } else {
    normal
  }
}

#[cfg(test)]
#[path = "region_grower_test.rs"]
mod region_grower_test;
