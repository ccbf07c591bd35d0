//! Output mesh type (spec §4.11): one vertex per boundary face, one polygon
//! per canonical corner.
//!
//! [`Mesh::write_to_file`]/[`Mesh::read_from_file`] give it the same
//! interop round-trip spec §6 asks of SOF/SOG: a length-prefixed magic
//! (mirroring [`crate::wedge_store`]'s header), vertex and polygon counts,
//! then the vertices and polygons themselves.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use glam::DVec3;

use crate::constants::MESH_MAGIC;
use crate::error::{CoreError, CoreResult};
use crate::le_bytes::{read_u32, read_vertex, read_u8, write_u32, write_vertex, write_u8};

/// A mesh vertex: world position plus the averaged normal of the faces
/// that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
  pub position: DVec3,
  pub normal: DVec3,
}

/// One dual-mesh polygon: a closed loop of vertex indices into the
/// [`Mesh`] that owns it, wound so its normal points away from the
/// interior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polygon {
  pub indices: Vec<u32>,
}

/// The reconstructed surface: an indexed polygon soup, not necessarily
/// triangulated (corners with more than 3 incident faces produce n-gons).
#[derive(Debug, Clone, Default)]
pub struct Mesh {
  pub vertices: Vec<Vertex>,
  pub polygons: Vec<Polygon>,
}

impl Mesh {
  pub fn new() -> Self {
    Mesh::default()
  }

  pub fn push_vertex(&mut self, vertex: Vertex) -> u32 {
    let idx = self.vertices.len() as u32;
    self.vertices.push(vertex);
    idx
  }

  /// Total polygon count, ignoring degenerate (fewer than 3 vertex)
  /// entries that region growing or corner pruning may have left behind.
  pub fn non_degenerate_polygon_count(&self) -> usize {
    self.polygons.iter().filter(|p| p.indices.len() >= 3).count()
  }

  /// Writes this mesh to `path`: magic, `u32` vertex count, `u32` polygon
  /// count, then the vertices and polygons in order. Truncates any
  /// existing file (spec §6).
  pub fn write_to_file(&self, path: impl AsRef<Path>) -> CoreResult<()> {
    let path = path.as_ref();
    let mut file = File::create(path).map_err(|e| CoreError::io(path, e))?;
    self.write(&mut file).map_err(|e| CoreError::io(path, e))
  }

  /// Reads a mesh back from `path`, as written by [`Mesh::write_to_file`].
  pub fn read_from_file(path: impl AsRef<Path>) -> CoreResult<Mesh> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|e| CoreError::io(path, e))?;
    Mesh::read(&mut file).map_err(|e| CoreError::io(path, e))
  }

  fn write(&self, w: &mut impl Write) -> io::Result<()> {
    write_u8(w, MESH_MAGIC.len() as u8)?;
    w.write_all(MESH_MAGIC.as_bytes())?;
    write_u32(w, self.vertices.len() as u32)?;
    write_u32(w, self.polygons.len() as u32)?;
    for vertex in &self.vertices {
      write_vertex(w, vertex.position)?;
      write_vertex(w, vertex.normal)?;
    }
    for polygon in &self.polygons {
      write_u32(w, polygon.indices.len() as u32)?;
      for &index in &polygon.indices {
        write_u32(w, index)?;
      }
    }
    Ok(())
  }

  fn read(r: &mut impl Read) -> io::Result<Mesh> {
    let magic_len = read_u8(r)? as usize;
    if magic_len != MESH_MAGIC.len() {
      return Err(io::Error::new(io::ErrorKind::InvalidData, "bad mesh magic"));
    }
    let mut magic = vec![0u8; magic_len];
    r.read_exact(&mut magic)?;
    if magic != MESH_MAGIC.as_bytes() {
      return Err(io::Error::new(io::ErrorKind::InvalidData, "bad mesh magic"));
    }

    let vertex_count = read_u32(r)? as usize;
    let polygon_count = read_u32(r)? as usize;

    let mut vertices = Vec::with_capacity(vertex_count);
    for _ in 0..vertex_count {
      let position = read_vertex(r)?;
      let normal = read_vertex(r)?;
      vertices.push(Vertex { position, normal });
    }

    let mut polygons = Vec::with_capacity(polygon_count);
    for _ in 0..polygon_count {
      let len = read_u32(r)? as usize;
      let mut indices = Vec::with_capacity(len);
      for _ in 0..len {
        indices.push(read_u32(r)?);
      }
      polygons.push(Polygon { indices });
    }

    Ok(Mesh { vertices, polygons })
  }
}

#[cfg(test)]
mod tests {
  use uuid::Uuid;

  use super::*;

  fn sample_mesh() -> Mesh {
    let mut mesh = Mesh::new();
    mesh.push_vertex(Vertex { position: DVec3::ZERO, normal: DVec3::Z });
    mesh.push_vertex(Vertex { position: DVec3::X, normal: DVec3::Z });
    mesh.push_vertex(Vertex { position: DVec3::Y, normal: DVec3::Z });
    mesh.polygons.push(Polygon { indices: vec![0, 1, 2] });
    mesh
  }

  #[test]
  fn file_round_trip_preserves_vertices_and_polygons() {
    let mesh = sample_mesh();
    let dir = std::env::temp_dir().join(format!("scancarve-mesh-test-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("surface.mesh");

    mesh.write_to_file(&path).unwrap();
    let read_back = Mesh::read_from_file(&path).unwrap();

    assert_eq!(read_back.vertices, mesh.vertices);
    assert_eq!(read_back.polygons, mesh.polygons);

    let _ = std::fs::remove_dir_all(&dir);
  }

  #[test]
  fn rejects_a_file_with_the_wrong_magic() {
    let dir = std::env::temp_dir().join(format!("scancarve-mesh-badmagic-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("bad.mesh");
    std::fs::write(&path, [9u8, b'x', b'x', b'x', b'x', b'x', b'x', b'x', b'x']).unwrap();

    let err = Mesh::read_from_file(&path).unwrap_err();
    assert!(matches!(err, CoreError::Io { .. }));

    let _ = std::fs::remove_dir_all(&dir);
  }

  #[test]
  fn push_vertex_returns_sequential_indices() {
    let mut mesh = Mesh::new();
    let a = mesh.push_vertex(Vertex { position: DVec3::ZERO, normal: DVec3::Z });
    let b = mesh.push_vertex(Vertex { position: DVec3::X, normal: DVec3::Z });
    assert_eq!(a, 0);
    assert_eq!(b, 1);
  }

  #[test]
  fn degenerate_polygons_are_not_counted() {
    let mut mesh = Mesh::new();
    mesh.polygons.push(Polygon { indices: vec![0, 1] });
    mesh.polygons.push(Polygon { indices: vec![0, 1, 2] });
    assert_eq!(mesh.non_degenerate_polygon_count(), 1);
  }
}
