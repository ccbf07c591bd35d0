use glam::DVec2;
use uuid::Uuid;

use super::*;

fn sample_grid() -> HiaGrid {
  HiaGrid {
    origin: DVec2::new(-2.0, -3.0),
    cell_size: 0.5,
    width: 3,
    height: 2,
    cells: vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
  }
}

#[test]
fn file_round_trip_preserves_header_and_cells() {
  let grid = sample_grid();
  let dir = std::env::temp_dir().join(format!("scancarve-hia-test-{}", Uuid::new_v4()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("floor.hia");

  write_to_file(&path, &grid).unwrap();
  let read_back = read_from_file(&path).unwrap();

  assert_eq!(read_back.origin, grid.origin);
  assert_eq!(read_back.cell_size, grid.cell_size);
  assert_eq!(read_back.width, grid.width);
  assert_eq!(read_back.height, grid.height);
  assert_eq!(read_back.cells, grid.cells);

  let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn rejects_a_file_with_the_wrong_magic() {
  let dir = std::env::temp_dir().join(format!("scancarve-hia-badmagic-{}", Uuid::new_v4()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("bad.hia");
  std::fs::write(&path, [9u8, b'x', b'x', b'x', b'x', b'x', b'x', b'x', b'x']).unwrap();

  let err = read_from_file(&path).unwrap_err();
  assert!(matches!(err, CoreError::Io { .. }));

  let _ = std::fs::remove_dir_all(&dir);
}
