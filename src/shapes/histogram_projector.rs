//! Histogram projector as a [`Shape`] (spec §4.7, §6's HIA output): reads
//! leaf data and accumulates it into a top-down 2D occupancy grid without
//! mutating the tree. Grounded on the same "read-only shape" pattern as
//! the chunk exporter (spec §4.9).

use std::sync::Mutex;

use glam::DVec3;

use super::Shape;
use crate::octree::LeafData;

/// A top-down 2D grid of accumulated interior-probability mass, cell size
/// `cell_size`, anchored so cell `(0, 0)` covers `[origin, origin +
/// cell_size)` in xy.
pub struct HistogramProjector {
  pub origin: glam::DVec2,
  pub cell_size: f64,
  pub width: usize,
  pub height: usize,
  grid: Mutex<Vec<f64>>,
}

impl HistogramProjector {
  pub fn new(origin: glam::DVec2, cell_size: f64, width: usize, height: usize) -> Self {
    HistogramProjector {
      origin,
      cell_size,
      width,
      height,
      grid: Mutex::new(vec![0.0; width * height]),
    }
  }

  fn cell_of(&self, x: f64, y: f64) -> Option<(usize, usize)> {
    let fx = (x - self.origin.x) / self.cell_size;
    let fy = (y - self.origin.y) / self.cell_size;
    if fx < 0.0 || fy < 0.0 {
      return None;
    }
    let (cx, cy) = (fx as usize, fy as usize);
    if cx >= self.width || cy >= self.height {
      return None;
    }
    Some((cx, cy))
  }

  /// Snapshot of the accumulated grid, row-major, `height` rows of `width`
  /// cells each.
  pub fn into_grid(self) -> Vec<f64> {
    self.grid.into_inner().expect("histogram mutex not poisoned")
  }

  /// Packages this projector's accumulated grid for HIA export (spec §6).
  pub fn into_hia_grid(self) -> crate::formats::hia::HiaGrid {
    let origin = self.origin;
    let cell_size = self.cell_size;
    let width = self.width;
    let height = self.height;
    crate::formats::hia::HiaGrid {
      origin,
      cell_size,
      width,
      height,
      cells: self.into_grid(),
    }
  }
}

impl Shape for HistogramProjector {
  fn num_verts(&self) -> usize {
    0
  }

  fn vertex(&self, _i: usize) -> DVec3 {
    DVec3::ZERO
  }

  fn intersects(&self, c: DVec3, hw: f64) -> bool {
    self.cell_of(c.x, c.y).is_some() || self.cell_of(c.x - hw, c.y - hw).is_some() || self.cell_of(c.x + hw, c.y + hw).is_some()
  }

  /// Never mutates: accumulates interior probability mass weighted by the
  /// leaf's footprint volume, then returns `data` unchanged.
  fn apply_to_leaf(&self, c: DVec3, hw: f64, data: Option<LeafData>) -> Option<LeafData> {
    if let (Some(leaf), Some((cx, cy))) = (data, self.cell_of(c.x, c.y)) {
      let mass = leaf.probability() * (2.0 * hw).powi(3);
      let mut grid = self.grid.lock().expect("histogram mutex not poisoned");
      grid[cy * self.width + cx] += mass;
    }
    data
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn accumulates_interior_mass_into_the_right_cell() {
    let hist = HistogramProjector::new(glam::DVec2::ZERO, 1.0, 4, 4);
    let mut data = LeafData::default();
    data.add_sample(1.0);
    let returned = hist.apply_to_leaf(DVec3::new(1.5, 2.5, 0.0), 0.5, Some(data));
    assert_eq!(returned, Some(data));
    let grid = hist.into_grid();
    assert!(grid[2 * 4 + 1] > 0.0);
  }

  #[test]
  fn points_outside_the_grid_are_ignored() {
    let hist = HistogramProjector::new(glam::DVec2::ZERO, 1.0, 2, 2);
    let mut data = LeafData::default();
    data.add_sample(1.0);
    hist.apply_to_leaf(DVec3::new(100.0, 100.0, 0.0), 0.5, Some(data));
    let grid = hist.into_grid();
    assert!(grid.iter().all(|&v| v == 0.0));
  }
}
