//! Interoperability export formats (spec §6): signed-octree and histogram
//! formats a downstream dual-contouring or floorplanning tool can read
//! without depending on this crate's in-memory [`crate::octree::Octree`]
//! or [`crate::shapes::histogram_projector::HistogramProjector`] layout.

pub mod hia;
pub mod sof;
pub mod sog;
