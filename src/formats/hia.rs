//! HIA (Histogrammed Interior Area) interop export (spec §6): the top-down
//! 2D occupancy grid [`crate::shapes::HistogramProjector`] accumulates,
//! written out for a downstream floorplanning tool. Grounded on the same
//! length-prefixed-magic, fixed-field-then-payload shape as
//! [`crate::wedge_store`] and [`crate::surface::mesh`]'s file formats.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use glam::DVec2;

use crate::constants::HIA_MAGIC;
use crate::error::{CoreError, CoreResult};
use crate::le_bytes::{read_f64, read_u32, read_u8, write_f64, write_u32, write_u8};

/// A finished histogram grid ready to serialize: origin and cell size of
/// [`crate::shapes::HistogramProjector`], plus its accumulated cells.
pub struct HiaGrid {
  pub origin: DVec2,
  pub cell_size: f64,
  pub width: usize,
  pub height: usize,
  pub cells: Vec<f64>,
}

/// Writes `grid` to `path`: magic, origin, cell size, `u32` width/height,
/// then `width * height` row-major `f64` cells. Truncates any existing
/// file (spec §6).
pub fn write_to_file(path: impl AsRef<Path>, grid: &HiaGrid) -> CoreResult<()> {
  let path = path.as_ref();
  let mut file = File::create(path).map_err(|e| CoreError::io(path, e))?;
  write_grid(&mut file, grid).map_err(|e| CoreError::io(path, e))
}

/// Reads a grid back from `path`, as written by [`write_to_file`].
pub fn read_from_file(path: impl AsRef<Path>) -> CoreResult<HiaGrid> {
  let path = path.as_ref();
  let mut file = File::open(path).map_err(|e| CoreError::io(path, e))?;
  read_grid(&mut file).map_err(|e| CoreError::io(path, e))
}

fn write_grid(w: &mut impl Write, grid: &HiaGrid) -> io::Result<()> {
  write_u8(w, HIA_MAGIC.len() as u8)?;
  w.write_all(HIA_MAGIC.as_bytes())?;
  write_f64(w, grid.origin.x)?;
  write_f64(w, grid.origin.y)?;
  write_f64(w, grid.cell_size)?;
  write_u32(w, grid.width as u32)?;
  write_u32(w, grid.height as u32)?;
  for &cell in &grid.cells {
    write_f64(w, cell)?;
  }
  Ok(())
}

fn read_grid(r: &mut impl Read) -> io::Result<HiaGrid> {
  let magic_len = read_u8(r)? as usize;
  if magic_len != HIA_MAGIC.len() {
    return Err(io::Error::new(io::ErrorKind::InvalidData, "bad HIA magic"));
  }
  let mut magic = vec![0u8; magic_len];
  r.read_exact(&mut magic)?;
  if magic != HIA_MAGIC.as_bytes() {
    return Err(io::Error::new(io::ErrorKind::InvalidData, "bad HIA magic"));
  }

  let origin = DVec2::new(read_f64(r)?, read_f64(r)?);
  let cell_size = read_f64(r)?;
  let width = read_u32(r)? as usize;
  let height = read_u32(r)? as usize;

  let mut cells = Vec::with_capacity(width * height);
  for _ in 0..width * height {
    cells.push(read_f64(r)?);
  }

  Ok(HiaGrid {
    origin,
    cell_size,
    width,
    height,
    cells,
  })
}

#[cfg(test)]
#[path = "hia_test.rs"]
mod hia_test;
