//! Magic numbers, fixed byte-widths, and table constants shared across the
//! binary formats and geometry code.
//!
//! Sizes here are a wire contract, not a suggestion: they mirror the C++
//! reference's `wedge_io.h` and `sof_io.h` exactly so chunk and wedge files
//! produced by one build remain readable by another.

/// Wedge-store magic number, NUL-terminated on disk.
pub const WEDGE_MAGIC: &str = "wedge";

/// `1 (length byte) + len(WEDGE_MAGIC) + NUL` rounded the way the reference
/// header packs it: a length-prefixed magic string.
pub const WEDGE_MAGIC_SIZE: usize = 1 + WEDGE_MAGIC.len();

/// Header = magic + `u64 wedge_count`.
pub const WEDGE_HEADER_SIZE: usize = WEDGE_MAGIC_SIZE + 8;

/// One little-endian `f64` vertex: 3 * 8 bytes.
pub const VERTEX_SIZE: usize = 24;

/// One little-endian `f64` 3x3 covariance matrix, row-major: 9 * 8 bytes.
pub const COV_MAT_SIZE: usize = 72;

/// One endpoint of a carve map: a mean vertex plus its covariance.
pub const GAUSS_DIST_SIZE: usize = VERTEX_SIZE + COV_MAT_SIZE;

/// A carve map is two Gaussians: sensor endpoint, hit endpoint.
pub const CARVE_MAP_SIZE: usize = 2 * GAUSS_DIST_SIZE;

/// A wedge record: 6 vertices + 4 carve maps.
pub const WEDGE_SIZE: usize = 6 * VERTEX_SIZE + 4 * CARVE_MAP_SIZE;

/// Fixed child traversal order for both the octree and the SOF/SOG formats:
/// `(0,0,0), (0,0,1), (0,1,0), (0,1,1), (1,0,0), (1,0,1), (1,1,0), (1,1,1)`,
/// read as (x, y, z) sign bits, 0 = negative half, 1 = positive half.
pub const CHILD_OFFSETS: [(i8, i8, i8); 8] = [
  (-1, -1, -1),
  (-1, -1, 1),
  (-1, 1, -1),
  (-1, 1, 1),
  (1, -1, -1),
  (1, -1, 1),
  (1, 1, -1),
  (1, 1, 1),
];

/// SOF node tag: interior node, 8 children follow.
pub const SOF_TAG_INTERIOR: u8 = 0;
/// SOF node tag: uniform leaf, one inside/outside byte follows.
pub const SOF_TAG_UNIFORM_LEAF: u8 = 1;
/// SOF node tag: signed leaf, one byte of 8 corner sign bits follows.
pub const SOF_TAG_SIGNED_LEAF: u8 = 2;

/// SOG format magic, NUL-terminated, padded to `SOG_HEADER_SIZE`.
pub const SOG_MAGIC: &str = "SOG.Format 1.0\0";

/// SOG fixed header size in bytes (magic + corner + side, padded).
pub const SOG_HEADER_SIZE: usize = 128;

/// Chunklist text-file magic line.
pub const CHUNKLIST_MAGIC: &str = "chunklist";

/// Mesh export magic number, length-prefixed the same way as `WEDGE_MAGIC`.
pub const MESH_MAGIC: &str = "mesh";

/// `1 (length byte) + len(MESH_MAGIC)`.
pub const MESH_MAGIC_SIZE: usize = 1 + MESH_MAGIC.len();

/// Histogrammed Interior Area export magic number, length-prefixed the
/// same way as `WEDGE_MAGIC`.
pub const HIA_MAGIC: &str = "hia";

/// Number of corners on a cube.
pub const NUM_CORNERS_PER_CUBE: usize = 8;

/// Number of edges incident to each cube corner.
pub const NUM_EDGES_PER_CORNER: usize = 3;

/// Each cube corner's three edge-adjacent corners (the neighbors reached by
/// flipping exactly one of the x/y/z sign bits), indexed by corner index.
///
/// The reference's `node_corner.h` table is built on a different corner
/// numbering (its corners 0-3 sit on the +Z face) than [`CHILD_OFFSETS`]'s
/// binary sign-bit convention (corner `i`'s position is `CHILD_OFFSETS[i]`,
/// e.g. corner 0 = `(-1,-1,-1)`). Reusing that table verbatim against
/// `OctreeNode::corner` would pair each corner with the wrong physical
/// neighbors, so this table is re-derived to match `CHILD_OFFSETS` instead
/// — `CHILD_OFFSETS` itself stays binary since SOF/SOG's child order
/// depends on it.
pub const CUBE_EDGES: [[u8; NUM_EDGES_PER_CORNER]; NUM_CORNERS_PER_CUBE] = [
  [1, 2, 4],
  [0, 3, 5],
  [0, 3, 6],
  [1, 2, 7],
  [0, 5, 6],
  [1, 4, 7],
  [2, 4, 7],
  [3, 5, 6],
];

/// Number of corners on a cube face.
pub const NUM_CORNERS_PER_SQUARE: usize = 4;

/// The 6 cube faces in a fixed order: -z, -y, -x, +x, +y, +z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
  ZMinus,
  YMinus,
  XMinus,
  XPlus,
  YPlus,
  ZPlus,
}

impl CubeFace {
  /// All six faces in the reference's fixed enumeration order.
  pub const ALL: [CubeFace; 6] = [
    CubeFace::ZMinus,
    CubeFace::YMinus,
    CubeFace::XMinus,
    CubeFace::XPlus,
    CubeFace::YPlus,
    CubeFace::ZPlus,
  ];

  /// The opposite face, used when walking from one node into its neighbor.
  pub fn opposite(self) -> CubeFace {
    match self {
      CubeFace::ZMinus => CubeFace::ZPlus,
      CubeFace::ZPlus => CubeFace::ZMinus,
      CubeFace::YMinus => CubeFace::YPlus,
      CubeFace::YPlus => CubeFace::YMinus,
      CubeFace::XMinus => CubeFace::XPlus,
      CubeFace::XPlus => CubeFace::XMinus,
    }
  }

  /// Outward unit normal of this face in the node's local frame.
  pub fn normal(self) -> glam::DVec3 {
    match self {
      CubeFace::XMinus => glam::DVec3::NEG_X,
      CubeFace::XPlus => glam::DVec3::X,
      CubeFace::YMinus => glam::DVec3::NEG_Y,
      CubeFace::YPlus => glam::DVec3::Y,
      CubeFace::ZMinus => glam::DVec3::NEG_Z,
      CubeFace::ZPlus => glam::DVec3::Z,
    }
  }

  fn index(self) -> usize {
    match self {
      CubeFace::ZMinus => 0,
      CubeFace::YMinus => 1,
      CubeFace::XMinus => 2,
      CubeFace::XPlus => 3,
      CubeFace::YPlus => 4,
      CubeFace::ZPlus => 5,
    }
  }
}

/// Each face's four corners, wound so the quad's normal (via the standard
/// `(v1-v0) x (v2-v1)` convention) points along `face.normal()`, indexed by
/// `CubeFace::index`.
///
/// Re-derived against [`CHILD_OFFSETS`]'s binary sign-bit corner numbering
/// (see [`CUBE_EDGES`]'s doc comment: the reference table assumes a
/// different corner numbering and cannot be reused verbatim here without
/// pairing faces with the wrong physical corners).
pub const FACE_CORNERS: [[u8; NUM_CORNERS_PER_SQUARE]; 6] = [
  [0, 2, 6, 4],
  [0, 4, 5, 1],
  [0, 1, 3, 2],
  [4, 6, 7, 5],
  [2, 3, 7, 6],
  [1, 5, 7, 3],
];

/// Looks up the four corner indices of `face`.
pub fn face_corners(face: CubeFace) -> [u8; NUM_CORNERS_PER_SQUARE] {
  FACE_CORNERS[face.index()]
}

#[cfg(test)]
#[path = "constants_test.rs"]
mod constants_test;
