//! SOG (Signed Octree with Geometry) interop export (spec §6): SOF's node
//! stream plus a per-leaf vertex position, for tools that want surface
//! geometry without running their own contouring pass.
//!
//! Open Question resolution (recorded in DESIGN.md): the reference format
//! doesn't say which point a leaf's vertex should be when more than one
//! plausible candidate exists (an isosurface crossing vs. the cube
//! center). This implementation emits the leaf's own cube center, since
//! SOG carries one vertex per *leaf* rather than per boundary face the way
//! the dual mesher (`surface::extractor`) does.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use glam::DVec3;

use crate::boundary::canonical_corner;
use crate::constants::{SOF_TAG_INTERIOR, SOF_TAG_SIGNED_LEAF, SOF_TAG_UNIFORM_LEAF, SOG_HEADER_SIZE, SOG_MAGIC};
use crate::error::{CoreError, CoreResult};
use crate::le_bytes::{read_f32, read_i32, read_u8, write_f32, write_i32, write_u8};
use crate::octree::{NodeId, Octree};

/// A SOG node: [`crate::formats::sof::SofNode`]'s shape, plus the leaf's
/// own vertex position.
#[derive(Debug, Clone, PartialEq)]
pub enum SogNode {
  Interior(Box<[SogNode; 8]>),
  Uniform(bool, DVec3),
  Signed([bool; 8], DVec3),
}

/// Builds a [`SogNode`] tree mirroring `tree`'s shape.
pub fn from_octree(tree: &Octree) -> SogNode {
  build_node(tree, tree.root())
}

fn build_node(tree: &Octree, id: NodeId) -> SogNode {
  let node = tree.node(id);
  match node.children {
    Some(children) => {
      let built: Vec<SogNode> = children.iter().map(|&c| build_node(tree, c)).collect();
      let array: [SogNode; 8] = built.try_into().expect("octree nodes always have exactly 8 children");
      SogNode::Interior(Box::new(array))
    }
    None => {
      let mut signs = [false; 8];
      for (i, sign) in signs.iter_mut().enumerate() {
        let world = node.corner(i);
        let canonical = canonical_corner(tree, world);
        *sign = tree.node(canonical.node).data.map(|d| d.is_interior()).unwrap_or(false);
      }
      if signs.iter().all(|&s| s == signs[0]) {
        SogNode::Uniform(signs[0], node.center)
      } else {
        SogNode::Signed(signs, node.center)
      }
    }
  }
}

/// Writes the full SOG file: 128-byte padded header, `i32 dimension`, then
/// the node stream.
pub fn write_to_file(path: impl AsRef<Path>, corner: DVec3, side: f32, dimension: i32, root: &SogNode) -> CoreResult<()> {
  let path = path.as_ref();
  let mut file = File::create(path).map_err(|e| CoreError::io(path, e))?;
  write_header(&mut file, corner, side, dimension).map_err(|e| CoreError::io(path, e))?;
  write_node(&mut file, root).map_err(|e| CoreError::io(path, e))
}

pub fn read_from_file(path: impl AsRef<Path>) -> CoreResult<(DVec3, f32, i32, SogNode)> {
  let path = path.as_ref();
  let mut file = File::open(path).map_err(|e| CoreError::io(path, e))?;
  let (corner, side, dimension) = read_header(&mut file).map_err(|e| CoreError::io(path, e))?;
  let root = read_node(&mut file).map_err(|e| CoreError::io(path, e))?;
  Ok((corner, side, dimension, root))
}

fn write_header(w: &mut impl Write, corner: DVec3, side: f32, dimension: i32) -> io::Result<()> {
  let mut header = Vec::with_capacity(SOG_HEADER_SIZE);
  header.extend_from_slice(SOG_MAGIC.as_bytes());
  write_f32(&mut header, corner.x as f32)?;
  write_f32(&mut header, corner.y as f32)?;
  write_f32(&mut header, corner.z as f32)?;
  write_f32(&mut header, side)?;
  header.resize(SOG_HEADER_SIZE, 0u8);
  w.write_all(&header)?;
  write_i32(w, dimension)
}

fn read_header(r: &mut impl Read) -> io::Result<(DVec3, f32, i32)> {
  let mut header = vec![0u8; SOG_HEADER_SIZE];
  r.read_exact(&mut header)?;
  if &header[..SOG_MAGIC.len()] != SOG_MAGIC.as_bytes() {
    return Err(io::Error::new(io::ErrorKind::InvalidData, "bad SOG magic"));
  }
  let mut cursor = &header[SOG_MAGIC.len()..];
  let x = read_f32(&mut cursor)? as f64;
  let y = read_f32(&mut cursor)? as f64;
  let z = read_f32(&mut cursor)? as f64;
  let side = read_f32(&mut cursor)?;
  let dimension = read_i32(r)?;
  Ok((DVec3::new(x, y, z), side, dimension))
}

fn write_node(w: &mut impl Write, node: &SogNode) -> io::Result<()> {
  match node {
    SogNode::Interior(children) => {
      write_u8(w, SOF_TAG_INTERIOR)?;
      for child in children.iter() {
        write_node(w, child)?;
      }
      Ok(())
    }
    SogNode::Uniform(inside, vertex) => {
      write_u8(w, SOF_TAG_UNIFORM_LEAF)?;
      write_u8(w, *inside as u8)?;
      write_leaf_vertex(w, *vertex)
    }
    SogNode::Signed(signs, vertex) => {
      write_u8(w, SOF_TAG_SIGNED_LEAF)?;
      let mut byte = 0u8;
      for (i, &s) in signs.iter().enumerate() {
        if s {
          byte |= 1 << i;
        }
      }
      write_u8(w, byte)?;
      write_leaf_vertex(w, *vertex)
    }
  }
}

fn write_leaf_vertex(w: &mut impl Write, v: DVec3) -> io::Result<()> {
  write_f32(w, v.x as f32)?;
  write_f32(w, v.y as f32)?;
  write_f32(w, v.z as f32)
}

fn read_leaf_vertex(r: &mut impl Read) -> io::Result<DVec3> {
  let x = read_f32(r)? as f64;
  let y = read_f32(r)? as f64;
  let z = read_f32(r)? as f64;
  Ok(DVec3::new(x, y, z))
}

fn read_node(r: &mut impl Read) -> io::Result<SogNode> {
  match read_u8(r)? {
    SOF_TAG_INTERIOR => {
      let mut children = Vec::with_capacity(8);
      for _ in 0..8 {
        children.push(read_node(r)?);
      }
      let array: [SogNode; 8] = children.try_into().expect("exactly 8 children were pushed");
      Ok(SogNode::Interior(Box::new(array)))
    }
    SOF_TAG_UNIFORM_LEAF => {
      let inside = read_u8(r)? != 0;
      let vertex = read_leaf_vertex(r)?;
      Ok(SogNode::Uniform(inside, vertex))
    }
    SOF_TAG_SIGNED_LEAF => {
      let byte = read_u8(r)?;
      let mut signs = [false; 8];
      for (i, sign) in signs.iter_mut().enumerate() {
        *sign = (byte >> i) & 1 == 1;
      }
      let vertex = read_leaf_vertex(r)?;
      Ok(SogNode::Signed(signs, vertex))
    }
    other => Err(io::Error::new(io::ErrorKind::InvalidData, format!("unknown SOG tag {other}"))),
  }
}

#[cfg(test)]
#[path = "sog_test.rs"]
mod sog_test;
