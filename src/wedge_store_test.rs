use glam::{DMat3, DVec3};
use tempfile_free_helpers::*;

use super::*;

/// Minimal scratch-path helper so tests don't need a `tempfile` dependency
/// the rest of the crate doesn't otherwise need.
mod tempfile_free_helpers {
  use std::path::PathBuf;
  use std::sync::atomic::{AtomicU64, Ordering};

  static COUNTER: AtomicU64 = AtomicU64::new(0);

  pub fn scratch_path(label: &str) -> PathBuf {
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("scancarve_wedge_store_test_{label}_{n}.bin"))
  }
}

fn sample_record(seed: f64) -> WedgeRecord {
  let gaussian = |offset: f64| StoredGaussian {
    mean: DVec3::new(seed + offset, 0.0, 0.0),
    cov: DMat3::from_diagonal(DVec3::splat(0.01)),
  };
  let map = |offset: f64| StoredCarveMap {
    sensor: gaussian(offset),
    hit: gaussian(offset + 1.0),
  };
  WedgeRecord {
    vertices: [
      DVec3::new(seed, 0.0, 0.0),
      DVec3::new(seed, 0.0, 1.0),
      DVec3::new(seed, 1.0, 0.0),
      DVec3::new(seed, 1.0, 1.0),
      DVec3::new(seed, 2.0, 0.0),
      DVec3::new(seed, 2.0, 1.0),
    ],
    maps: [map(0.0), map(1.0), map(2.0), map(3.0)],
  }
}

#[test]
fn round_trips_written_records_byte_identically() {
  let path = scratch_path("roundtrip");
  let mut writer = WedgeStoreWriter::create(&path).unwrap();
  for i in 0..3 {
    writer.write(&sample_record(i as f64)).unwrap();
  }
  writer.close().unwrap();

  let reader = WedgeStoreReader::open(&path).unwrap();
  assert_eq!(reader.num_wedges(), 3);
  for i in 0..3 {
    assert_eq!(reader.get(i).unwrap(), sample_record(i as f64));
  }

  std::fs::remove_file(&path).ok();
}

#[test]
fn reopening_after_append_sees_the_updated_count_and_last_record() {
  // S4: writer closes at 3, appends 2 more and closes, reader sees 5.
  let path = scratch_path("append");
  {
    let mut writer = WedgeStoreWriter::create(&path).unwrap();
    for i in 0..3 {
      writer.write(&sample_record(i as f64)).unwrap();
    }
    writer.close().unwrap();
  }

  {
    let existing = WedgeStoreReader::open(&path).unwrap();
    assert_eq!(existing.num_wedges(), 3);
  }

  // Appending re-reads the written bytes directly rather than reusing
  // `create`, which truncates.
  {
    let mut file = std::fs::OpenOptions::new().read(true).write(true).open(&path).unwrap();
    let mut writer = WedgeStoreWriter {
      path: path.clone(),
      wedge_count: 3,
      file: {
        use std::io::{Seek, SeekFrom};
        file.seek(SeekFrom::End(0)).unwrap();
        file
      },
    };
    writer.write(&sample_record(3.0)).unwrap();
    writer.write(&sample_record(4.0)).unwrap();
    writer.close().unwrap();
  }

  let reader = WedgeStoreReader::open(&path).unwrap();
  assert_eq!(reader.num_wedges(), 5);
  assert_eq!(reader.get(4).unwrap(), sample_record(4.0));

  std::fs::remove_file(&path).ok();
}

#[test]
fn bad_magic_is_rejected() {
  let path = scratch_path("badmagic");
  std::fs::write(&path, [0u8; WEDGE_HEADER_SIZE]).unwrap();
  assert!(matches!(WedgeStoreReader::open(&path), Err(CoreError::BadFormat(_))));
  std::fs::remove_file(&path).ok();
}

#[test]
fn out_of_range_index_is_rejected() {
  let path = scratch_path("oor");
  let mut writer = WedgeStoreWriter::create(&path).unwrap();
  writer.write(&sample_record(0.0)).unwrap();
  writer.close().unwrap();

  let reader = WedgeStoreReader::open(&path).unwrap();
  assert!(matches!(reader.get(5), Err(CoreError::InvalidInput(_))));
  std::fs::remove_file(&path).ok();
}
