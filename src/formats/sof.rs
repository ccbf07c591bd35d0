//! SOF (Signed Octree Format) interop export (spec §6): the preorder
//! node-tag stream Tao Ju's dual contouring tooling reads. Grounded on the
//! reference's documented `sof_io.h` scheme, implemented exactly since it's
//! a wire contract with an external tool, not an internal choice.
//!
//! This module's tree is deliberately its own small type (`SofNode`) rather
//! than [`crate::octree::Octree`] itself: SOF only carries topology plus an
//! inside/outside sign per leaf corner, not the full occupancy aggregate.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::boundary::canonical_corner;
use crate::constants::{SOF_TAG_INTERIOR, SOF_TAG_SIGNED_LEAF, SOF_TAG_UNIFORM_LEAF};
use crate::error::{CoreError, CoreResult};
use crate::le_bytes::{read_u32, read_u8, write_u32, write_u8};
use crate::octree::{NodeId, Octree};

/// A signed octree node, independent of [`Octree`]'s own leaf-data layout.
#[derive(Debug, Clone, PartialEq)]
pub enum SofNode {
  /// Eight children in `CHILD_OFFSETS` order.
  Interior(Box<[SofNode; 8]>),
  /// A leaf all of whose 8 corners agree in sign.
  Uniform(bool),
  /// A leaf whose 8 corners (bit `i` set = corner `i` is inside) disagree.
  Signed([bool; 8]),
}

/// Builds a [`SofNode`] tree mirroring `tree`'s shape, resolving each
/// leaf's corner signs through [`canonical_corner`] so a corner shared
/// with a differently-sized neighbor reads the same sign from every side.
pub fn from_octree(tree: &Octree) -> SofNode {
  build_node(tree, tree.root())
}

fn build_node(tree: &Octree, id: NodeId) -> SofNode {
  let node = tree.node(id);
  match node.children {
    Some(children) => {
      let built: Vec<SofNode> = children.iter().map(|&c| build_node(tree, c)).collect();
      let array: [SofNode; 8] = built.try_into().expect("octree nodes always have exactly 8 children");
      SofNode::Interior(Box::new(array))
    }
    None => {
      let mut signs = [false; 8];
      for (i, sign) in signs.iter_mut().enumerate() {
        let world = node.corner(i);
        let canonical = canonical_corner(tree, world);
        *sign = tree.node(canonical.node).data.map(|d| d.is_interior()).unwrap_or(false);
      }
      if signs.iter().all(|&s| s == signs[0]) {
        SofNode::Uniform(signs[0])
      } else {
        SofNode::Signed(signs)
      }
    }
  }
}

/// Writes `(u32 side, node_stream)` to `path`, truncating any existing
/// file (spec §6).
pub fn write_to_file(path: impl AsRef<Path>, side: u32, root: &SofNode) -> CoreResult<()> {
  let path = path.as_ref();
  let mut file = File::create(path).map_err(|e| CoreError::io(path, e))?;
  write_u32(&mut file, side).map_err(|e| CoreError::io(path, e))?;
  write_node(&mut file, root).map_err(|e| CoreError::io(path, e))
}

/// Reads `(side, root)` back from `path`.
pub fn read_from_file(path: impl AsRef<Path>) -> CoreResult<(u32, SofNode)> {
  let path = path.as_ref();
  let mut file = File::open(path).map_err(|e| CoreError::io(path, e))?;
  let side = read_u32(&mut file).map_err(|e| CoreError::io(path, e))?;
  let root = read_node(&mut file).map_err(|e| CoreError::io(path, e))?;
  Ok((side, root))
}

fn write_node(w: &mut impl Write, node: &SofNode) -> io::Result<()> {
  match node {
    SofNode::Interior(children) => {
      write_u8(w, SOF_TAG_INTERIOR)?;
      for child in children.iter() {
        write_node(w, child)?;
      }
      Ok(())
    }
    SofNode::Uniform(inside) => {
      write_u8(w, SOF_TAG_UNIFORM_LEAF)?;
      write_u8(w, *inside as u8)
    }
    SofNode::Signed(signs) => {
      write_u8(w, SOF_TAG_SIGNED_LEAF)?;
      let mut byte = 0u8;
      for (i, &s) in signs.iter().enumerate() {
        if s {
          byte |= 1 << i;
        }
      }
      write_u8(w, byte)
    }
  }
}

fn read_node(r: &mut impl Read) -> io::Result<SofNode> {
  match read_u8(r)? {
    SOF_TAG_INTERIOR => {
      let mut children = Vec::with_capacity(8);
      for _ in 0..8 {
        children.push(read_node(r)?);
      }
      let array: [SofNode; 8] = children.try_into().expect("exactly 8 children were pushed");
      Ok(SofNode::Interior(Box::new(array)))
    }
    SOF_TAG_UNIFORM_LEAF => Ok(SofNode::Uniform(read_u8(r)? != 0)),
    SOF_TAG_SIGNED_LEAF => {
      let byte = read_u8(r)?;
      let mut signs = [false; 8];
      for (i, sign) in signs.iter_mut().enumerate() {
        *sign = (byte >> i) & 1 == 1;
      }
      Ok(SofNode::Signed(signs))
    }
    other => Err(io::Error::new(io::ErrorKind::InvalidData, format!("unknown SOF tag {other}"))),
  }
}

#[cfg(test)]
#[path = "sof_test.rs"]
mod sof_test;
