//! `scancarve`: probabilistic volumetric carving and dual-mesh surface
//! extraction from mobile-mapping range scans.
//!
//! Reconstructs the 3D interior geometry of a building from streaming,
//! time-stamped range returns captured by a rig with a localized 6-DoF
//! trajectory. The pipeline runs, roughly leaf-to-root of the module tree
//! below:
//!
//! [`trajectory`] (pose lookups) + [`sensor`] (extrinsics/noise) feed
//! [`scan_model`], which turns each range return into a pair of Gaussians
//! consumed by [`carve_map`]. [`wedge`] sweeps two adjacent rays across two
//! adjacent frames into a carve primitive, optionally persisted by
//! [`wedge_store`] and partitioned by [`chunker`]. [`octree`] aggregates
//! carved probability through the [`shapes`] query protocol; [`boundary`]
//! extracts the interior/exterior face and corner topology, and
//! [`surface`] dual-meshes it. [`formats`] covers interop serialization;
//! [`carver`] is the pipeline glue driving frame -> wedge -> octree.
//!
//! Out of scope (spec §1): CLI/XML config loading, vendor raw-log readers,
//! timestamp synchronization, trajectory interpolation *file formats*,
//! colorization, and 2D floorplan reasoning. Those are external
//! collaborators; this crate only defines the interfaces they feed.

pub mod boundary;
pub mod carve_map;
pub mod carver;
pub mod chunker;
pub mod config;
pub mod constants;
pub mod error;
pub mod formats;
pub mod le_bytes;
pub mod octree;
pub mod progress;
pub mod scan_model;
pub mod sensor;
pub mod shapes;
pub mod surface;
pub mod trajectory;
pub mod wedge;
pub mod wedge_store;

pub use carve_map::CarveMap;
pub use carver::{carve_sensor_stream, carve_sensors_in_parallel, FrameSource, RawFrame, WedgeSink};
pub use config::CarverConfig;
pub use error::{CoreError, CoreResult};
pub use octree::Octree;
pub use wedge::Wedge;
