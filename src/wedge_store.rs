//! Wedge store (spec §4.5): an append-only, random-access binary file of
//! wedges. Fixed-width header and constant-stride records let any wedge be
//! fetched by index with a single seek (spec §6's wire contract, grounded
//! on the reference's `wedge_io.h`).

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use glam::{DMat3, DVec3};

use crate::constants::{
  CARVE_MAP_SIZE, GAUSS_DIST_SIZE, VERTEX_SIZE, WEDGE_HEADER_SIZE, WEDGE_MAGIC, WEDGE_MAGIC_SIZE, WEDGE_SIZE,
};
use crate::error::{CoreError, CoreResult};
use crate::le_bytes;

/// A single mean/covariance Gaussian as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoredGaussian {
  pub mean: DVec3,
  pub cov: DMat3,
}

/// One carve map's two endpoints, as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoredCarveMap {
  pub sensor: StoredGaussian,
  pub hit: StoredGaussian,
}

/// One wedge record: 6 vertices + 4 carve maps, `WEDGE_SIZE` bytes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WedgeRecord {
  pub vertices: [DVec3; 6],
  pub maps: [StoredCarveMap; 4],
}

fn write_gaussian(w: &mut impl Write, g: &StoredGaussian) -> std::io::Result<()> {
  le_bytes::write_vertex(w, g.mean)?;
  le_bytes::write_mat3(w, g.cov)
}

fn read_gaussian(r: &mut impl Read) -> std::io::Result<StoredGaussian> {
  let mean = le_bytes::read_vertex(r)?;
  let cov = le_bytes::read_mat3(r)?;
  Ok(StoredGaussian { mean, cov })
}

fn write_record(w: &mut impl Write, record: &WedgeRecord) -> std::io::Result<()> {
  for v in record.vertices {
    le_bytes::write_vertex(w, v)?;
  }
  for m in &record.maps {
    write_gaussian(w, &m.sensor)?;
    write_gaussian(w, &m.hit)?;
  }
  Ok(())
}

fn read_record(r: &mut impl Read) -> std::io::Result<WedgeRecord> {
  let mut vertices = [DVec3::ZERO; 6];
  for v in vertices.iter_mut() {
    *v = le_bytes::read_vertex(r)?;
  }
  let mut maps = [StoredCarveMap {
    sensor: StoredGaussian { mean: DVec3::ZERO, cov: DMat3::ZERO },
    hit: StoredGaussian { mean: DVec3::ZERO, cov: DMat3::ZERO },
  }; 4];
  for m in maps.iter_mut() {
    m.sensor = read_gaussian(r)?;
    m.hit = read_gaussian(r)?;
  }
  Ok(WedgeRecord { vertices, maps })
}

fn write_header(w: &mut (impl Write + Seek), wedge_count: u64) -> std::io::Result<()> {
  w.seek(SeekFrom::Start(0))?;
  w.write_all(&[WEDGE_MAGIC.len() as u8])?;
  w.write_all(WEDGE_MAGIC.as_bytes())?;
  le_bytes::write_u64(w, wedge_count)
}

fn parse_header(r: &mut impl Read, path: &Path) -> CoreResult<u64> {
  let mut magic_len = [0u8; 1];
  r.read_exact(&mut magic_len).map_err(|e| CoreError::io(path, e))?;
  if magic_len[0] as usize != WEDGE_MAGIC.len() {
    return Err(CoreError::BadFormat(format!("{}: unexpected magic length", path.display())));
  }
  let mut magic = vec![0u8; WEDGE_MAGIC.len()];
  r.read_exact(&mut magic).map_err(|e| CoreError::io(path, e))?;
  if magic != WEDGE_MAGIC.as_bytes() {
    return Err(CoreError::BadFormat(format!("{}: bad magic number", path.display())));
  }
  let mut count_bytes = [0u8; 8];
  r.read_exact(&mut count_bytes).map_err(|e| CoreError::io(path, e))?;
  Ok(u64::from_le_bytes(count_bytes))
}

/// Random-access reader. Guarded by a single mutex (spec §5) so it can be
/// shared among readers without per-call file handles.
pub struct WedgeStoreReader {
  path: PathBuf,
  wedge_count: u64,
  file: Mutex<File>,
}

impl WedgeStoreReader {
  /// Opens `path` for random access. Fails with [`CoreError::BadFormat`]
  /// on a bad magic number, or [`CoreError::Io`] on any other failure.
  pub fn open(path: impl AsRef<Path>) -> CoreResult<Self> {
    let path = path.as_ref().to_path_buf();
    let mut file = File::open(&path).map_err(|e| CoreError::io(&path, e))?;
    let expected_file_len = file.metadata().map_err(|e| CoreError::io(&path, e))?.len();
    if (expected_file_len as usize) < WEDGE_HEADER_SIZE {
      return Err(CoreError::BadFormat(format!("{}: truncated header", path.display())));
    }
    let wedge_count = parse_header(&mut file, &path)?;
    let expected_len = WEDGE_HEADER_SIZE as u64 + wedge_count * WEDGE_SIZE as u64;
    if expected_file_len != expected_len {
      return Err(CoreError::BadFormat(format!(
        "{}: expected {expected_len} bytes for {wedge_count} wedges, found {expected_file_len}",
        path.display()
      )));
    }
    Ok(WedgeStoreReader {
      path,
      wedge_count,
      file: Mutex::new(file),
    })
  }

  pub fn num_wedges(&self) -> u64 {
    self.wedge_count
  }

  /// Fetches wedge `index` with a single seek. Thread-safe: internally
  /// serialized through the reader mutex.
  pub fn get(&self, index: u64) -> CoreResult<WedgeRecord> {
    if index >= self.wedge_count {
      return Err(CoreError::InvalidInput(format!("wedge index {index} out of range (count {})", self.wedge_count)));
    }
    let offset = WEDGE_HEADER_SIZE as u64 + index * WEDGE_SIZE as u64;
    let mut file = self.file.lock().expect("wedge store reader mutex poisoned");
    file.seek(SeekFrom::Start(offset)).map_err(|e| CoreError::io(&self.path, e))?;
    read_record(&mut *file).map_err(|e| CoreError::io(&self.path, e))
  }
}

/// Append-only writer. The header's `wedge_count` is rewritten on
/// [`WedgeStoreWriter::close`], so a crashed writer leaves a file whose
/// header matches the last committed record (spec §5).
pub struct WedgeStoreWriter {
  path: PathBuf,
  file: File,
  wedge_count: u64,
}

impl WedgeStoreWriter {
  /// Creates a new wedge store at `path`, truncating any existing file.
  pub fn create(path: impl AsRef<Path>) -> CoreResult<Self> {
    let path = path.as_ref().to_path_buf();
    let mut file = OpenOptions::new()
      .create(true)
      .write(true)
      .truncate(true)
      .open(&path)
      .map_err(|e| CoreError::io(&path, e))?;
    write_header(&mut file, 0).map_err(|e| CoreError::io(&path, e))?;
    Ok(WedgeStoreWriter { path, file, wedge_count: 0 })
  }

  /// Appends one wedge record, seeking to the end of the file.
  pub fn write(&mut self, record: &WedgeRecord) -> CoreResult<()> {
    self
      .file
      .seek(SeekFrom::End(0))
      .map_err(|e| CoreError::io(&self.path, e))?;
    write_record(&mut self.file, record).map_err(|e| CoreError::io(&self.path, e))?;
    self.wedge_count += 1;
    Ok(())
  }

  pub fn num_wedges(&self) -> u64 {
    self.wedge_count
  }

  /// Rewrites the header with the final count and flushes. Also called
  /// implicitly on drop.
  pub fn close(mut self) -> CoreResult<()> {
    self.finish()
  }

  fn finish(&mut self) -> CoreResult<()> {
    write_header(&mut self.file, self.wedge_count).map_err(|e| CoreError::io(&self.path, e))?;
    self.file.flush().map_err(|e| CoreError::io(&self.path, e))
  }
}

impl Drop for WedgeStoreWriter {
  fn drop(&mut self) {
    let _ = self.finish();
  }
}

const _: () = assert!(GAUSS_DIST_SIZE == VERTEX_SIZE + 72 && CARVE_MAP_SIZE == 2 * GAUSS_DIST_SIZE);

#[cfg(test)]
#[path = "wedge_store_test.rs"]
mod wedge_store_test;
