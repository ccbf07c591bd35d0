//! Chunker (spec §4.9): partitions the octree's root cube at a configured
//! depth into equal-sized chunks, and records — per chunk — the wedges
//! that intersect it, for out-of-core refinement. Driven by the same
//! shape/query protocol as carving (§4.7): a [`ChunkExporter`] is inserted
//! per wedge, and never mutates tree state.

use std::io::Write;
use std::path::{Path, PathBuf};

use glam::DVec3;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::shapes::chunk_exporter::{ChunkExporter, ChunkKey, ChunkRegistry};
use crate::wedge::Wedge;

/// One entry of the chunklist: a chunk's identity, bounding cube, and the
/// UUID of its on-disk `.chunk` file.
#[derive(Debug, Clone, Copy)]
pub struct ChunkListEntry {
  pub key: ChunkKey,
  pub uuid: Uuid,
  pub center: DVec3,
  pub halfwidth: f64,
}

/// The chunklist file's contents (spec §6): the root cube the chunks
/// partition, the sensors that contributed wedges, and one entry per
/// chunk that actually received a wedge.
#[derive(Debug, Clone)]
pub struct ChunkList {
  pub root_center: DVec3,
  pub root_halfwidth: f64,
  pub chunk_dir: PathBuf,
  pub sensors: Vec<String>,
  pub chunks: Vec<ChunkListEntry>,
}

impl ChunkList {
  /// Writes the plain-text chunklist: a `"chunklist"` magic header line
  /// with the root cube, chunk directory, and sensor list, followed by one
  /// chunk UUID per line (spec §6).
  pub fn write_text(&self, path: impl AsRef<Path>) -> CoreResult<()> {
    let path = path.as_ref();
    let mut file = std::fs::File::create(path).map_err(|e| CoreError::io(path, e))?;
    writeln!(
      file,
      "chunklist {} {} {} {} {} {}",
      self.root_center.x,
      self.root_center.y,
      self.root_center.z,
      self.root_halfwidth,
      self.chunks.len(),
      self.chunk_dir.display()
    )
    .map_err(|e| CoreError::io(path, e))?;
    writeln!(file, "{}", self.sensors.join(",")).map_err(|e| CoreError::io(path, e))?;
    for chunk in &self.chunks {
      writeln!(file, "{}", chunk.uuid).map_err(|e| CoreError::io(path, e))?;
    }
    Ok(())
  }
}

/// Drives the chunk-cutting pass: every wedge the carver produces is
/// offered to [`Chunker::exporter_for`] instead of (or in addition to)
/// being carved directly, and `close` emits the chunklist once the carver
/// is done.
pub struct Chunker {
  chunk_size: f64,
  chunk_dir: PathBuf,
  root_center: DVec3,
  root_halfwidth: f64,
  sensors: Vec<String>,
  registry: ChunkRegistry,
}

impl Chunker {
  /// `chunk_depth` cuts the root cube (`root_center`, `root_halfwidth`)
  /// into `2^chunk_depth` equal cells per axis.
  pub fn new(
    chunk_dir: impl Into<PathBuf>,
    root_center: DVec3,
    root_halfwidth: f64,
    chunk_depth: u32,
    sensors: Vec<String>,
  ) -> CoreResult<Self> {
    let chunk_dir = chunk_dir.into();
    let chunk_size = (root_halfwidth * 2.0) / 2f64.powi(chunk_depth as i32);
    let registry = ChunkRegistry::new(&chunk_dir)?;
    Ok(Chunker {
      chunk_size,
      chunk_dir,
      root_center,
      root_halfwidth,
      sensors,
      registry,
    })
  }

  pub fn chunk_size(&self) -> f64 {
    self.chunk_size
  }

  /// Adapts one wedge into a chunk-exporting shape, ready to be run
  /// through `Octree::find` the same way a carving wedge would be.
  pub fn exporter_for<'a>(&'a self, wedge: Wedge<'a>, wedge_index: u64) -> ChunkExporter<'a> {
    ChunkExporter::new(wedge, wedge_index, self.chunk_size, &self.registry)
  }

  /// Flushes every chunk file and emits the chunklist.
  pub fn close(self) -> CoreResult<ChunkList> {
    let chunk_size = self.chunk_size;
    let manifest = self.registry.close()?;
    let chunks = manifest
      .into_iter()
      .map(|(key, uuid)| ChunkListEntry {
        key,
        uuid,
        center: DVec3::new(key.0 as f64, key.1 as f64, key.2 as f64) * chunk_size,
        halfwidth: chunk_size * 0.5,
      })
      .collect();
    Ok(ChunkList {
      root_center: self.root_center,
      root_halfwidth: self.root_halfwidth,
      chunk_dir: self.chunk_dir,
      sensors: self.sensors,
      chunks,
    })
  }
}

#[cfg(test)]
#[path = "chunker_test.rs"]
mod chunker_test;
