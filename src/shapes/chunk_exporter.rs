//! Chunk exporter as a [`Shape`] (spec §4.9): the only shape that never
//! mutates leaf data. For every leaf a wedge's geometry intersects — at
//! the chunker's fixed `chunk_depth`, not the tree's full depth — it opens
//! (or reuses) a chunk file keyed by the leaf's identity and appends the
//! wedge's index, then returns the leaf unchanged.

use std::collections::HashMap;
use std::fs::{create_dir_all, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use glam::DVec3;
use uuid::Uuid;

use super::wedge_shape::wedge_intersects_cube;
use super::Shape;
use crate::error::{CoreError, CoreResult};
use crate::le_bytes;
use crate::octree::LeafData;
use crate::wedge::Wedge;

/// Chunk identity: a truncated integer grid index over the chunker's
/// fixed-size cells (spec SUPPLEMENT §2: "chunk key hashing by truncated
/// integer grid index", grounded on `chunk_dict.h`'s `chunk_key_t`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkKey(pub i64, pub i64, pub i64);

/// Maps a chunk-cell center to its canonical grid key. Chunk centers are
/// exact multiples of `chunk_size / 2` away from the tree origin by
/// construction, so rounding (rather than flooring) the scaled coordinate
/// is robust to floating-point drift.
pub fn chunk_key(center: DVec3, chunk_size: f64) -> ChunkKey {
  let scaled = center / chunk_size;
  ChunkKey(scaled.x.round() as i64, scaled.y.round() as i64, scaled.z.round() as i64)
}

struct ChunkHandle {
  uuid: Uuid,
  file: File,
}

/// Shared, mutex-guarded table of open chunk files, owned by
/// [`crate::chunker::Chunker`] and borrowed by every [`ChunkExporter`] it
/// hands to the carver.
pub struct ChunkRegistry {
  chunk_dir: PathBuf,
  open: Mutex<HashMap<ChunkKey, ChunkHandle>>,
}

impl ChunkRegistry {
  pub fn new(chunk_dir: impl Into<PathBuf>) -> CoreResult<Self> {
    let chunk_dir = chunk_dir.into();
    create_dir_all(&chunk_dir).map_err(|e| CoreError::io(&chunk_dir, e))?;
    Ok(ChunkRegistry {
      chunk_dir,
      open: Mutex::new(HashMap::new()),
    })
  }

  /// Appends `wedge_index` to the chunk file for `key`, creating the file
  /// (and its UUID) the first time `key` is seen.
  pub fn record(&self, key: ChunkKey, wedge_index: u64) -> CoreResult<()> {
    let mut open = self.open.lock().expect("chunk registry mutex poisoned");
    let handle = match open.get_mut(&key) {
      Some(h) => h,
      None => {
        let uuid = Uuid::new_v4();
        let path = self.chunk_path(uuid);
        let file = OpenOptions::new()
          .create(true)
          .write(true)
          .truncate(true)
          .open(&path)
          .map_err(|e| CoreError::io(&path, e))?;
        open.insert(key, ChunkHandle { uuid, file });
        open.get_mut(&key).expect("just inserted")
      }
    };
    le_bytes::write_u64(&mut handle.file, wedge_index).map_err(|e| CoreError::io(self.chunk_path(handle.uuid), e))
  }

  fn chunk_path(&self, uuid: Uuid) -> PathBuf {
    self.chunk_dir.join(format!("{uuid}.chunk"))
  }

  /// Flushes every open chunk file and returns `(key, uuid)` pairs for the
  /// chunklist (spec §6).
  pub fn close(self) -> CoreResult<Vec<(ChunkKey, Uuid)>> {
    let open = self.open.into_inner().expect("chunk registry mutex poisoned");
    let mut manifest = Vec::with_capacity(open.len());
    for (key, mut handle) in open {
      handle.file.flush().map_err(|e| CoreError::io(self.chunk_dir.join(format!("{}.chunk", handle.uuid)), e))?;
      manifest.push((key, handle.uuid));
    }
    Ok(manifest)
  }

  pub fn chunk_dir(&self) -> &Path {
    &self.chunk_dir
  }
}

/// A wedge adapted to the chunk-cutting pass: geometrically identical to
/// [`super::wedge_shape::WedgeShape`], but it records the wedge's index
/// into the chunk registry instead of carving, and its resolution target
/// is the chunker's fixed cell size rather than the octree's full depth.
pub struct ChunkExporter<'a> {
  wedge: Wedge<'a>,
  wedge_index: u64,
  chunk_size: f64,
  registry: &'a ChunkRegistry,
}

impl<'a> ChunkExporter<'a> {
  pub fn new(wedge: Wedge<'a>, wedge_index: u64, chunk_size: f64, registry: &'a ChunkRegistry) -> Self {
    ChunkExporter {
      wedge,
      wedge_index,
      chunk_size,
      registry,
    }
  }
}

impl<'a> Shape for ChunkExporter<'a> {
  fn num_verts(&self) -> usize {
    self.wedge.num_verts()
  }

  fn vertex(&self, i: usize) -> DVec3 {
    self.wedge.vertex(i)
  }

  fn intersects(&self, c: DVec3, hw: f64) -> bool {
    wedge_intersects_cube(&self.wedge, c, hw)
  }

  fn target_resolution(&self) -> f64 {
    self.chunk_size * 0.5
  }

  fn apply_to_leaf(&self, c: DVec3, _hw: f64, data: Option<LeafData>) -> Option<LeafData> {
    let key = chunk_key(c, self.chunk_size);
    if let Err(e) = self.registry.record(key, self.wedge_index) {
      tracing::warn!(error = %e, "failed to record wedge into chunk file");
    }
    data
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn chunk_key_rounds_to_the_nearest_grid_cell() {
    let a = chunk_key(DVec3::new(0.999_999_999, 0.0, 0.0), 1.0);
    let b = chunk_key(DVec3::new(1.000_000_001, 0.0, 0.0), 1.0);
    assert_eq!(a, ChunkKey(1, 0, 0));
    assert_eq!(a, b);
  }

  #[test]
  fn registry_reuses_the_same_file_for_the_same_key() {
    let dir = std::env::temp_dir().join(format!("scancarve-chunk-test-{}", Uuid::new_v4()));
    let registry = ChunkRegistry::new(&dir).unwrap();
    let key = ChunkKey(0, 0, 0);
    registry.record(key, 1).unwrap();
    registry.record(key, 2).unwrap();
    let manifest = registry.close().unwrap();
    assert_eq!(manifest.len(), 1);
    let bytes = std::fs::read(dir.join(format!("{}.chunk", manifest[0].1))).unwrap();
    assert_eq!(bytes.len(), 16);
    let _ = std::fs::remove_dir_all(&dir);
  }
}
