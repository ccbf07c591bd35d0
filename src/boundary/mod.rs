//! Boundary extraction and corner canonicalization (spec §4.10): turns a
//! carved octree into the face/corner adjacency the surface extractor
//! (spec §4.11) walks to emit polygons.

pub mod corner;
pub mod face;

pub use corner::{canonical_corner, CornerGraph, CornerIncidence, NodeCorner};
pub use face::{Boundary, BoundaryFace};
