//! Adaptive octree storage (spec §4.6): aggregates per-leaf occupancy
//! statistics and room labels, supports shape-based queries, and merges
//! observations from many wedges.

pub mod leaf_data;
pub mod node;
pub mod tree;

pub use leaf_data::LeafData;
pub use node::{NodeId, OctreeNode};
pub use tree::Octree;
