//! Little-endian IEEE-754 byte layout helpers.
//!
//! All binary formats in this crate (wedge store, SOF/SOG, mesh export) are
//! little-endian. This module centralizes the byte layout so each format
//! doesn't re-derive it.

use std::io::{self, Read, Write};

use glam::{DMat3, DVec3};

/// Writes a single `f64` as 8 little-endian bytes.
pub fn write_f64(w: &mut impl Write, v: f64) -> io::Result<()> {
  w.write_all(&v.to_le_bytes())
}

/// Reads a single `f64` from 8 little-endian bytes.
pub fn read_f64(r: &mut impl Read) -> io::Result<f64> {
  let mut buf = [0u8; 8];
  r.read_exact(&mut buf)?;
  Ok(f64::from_le_bytes(buf))
}

/// Writes a single byte; little-endian is a non-issue at this width, but
/// the helper keeps every wire primitive in one place.
pub fn write_u8(w: &mut impl Write, v: u8) -> io::Result<()> {
  w.write_all(&[v])
}

/// Reads a single byte.
pub fn read_u8(r: &mut impl Read) -> io::Result<u8> {
  let mut buf = [0u8; 1];
  r.read_exact(&mut buf)?;
  Ok(buf[0])
}

/// Writes a `u32` as 4 little-endian bytes.
pub fn write_u32(w: &mut impl Write, v: u32) -> io::Result<()> {
  w.write_all(&v.to_le_bytes())
}

/// Reads a `u32` from 4 little-endian bytes.
pub fn read_u32(r: &mut impl Read) -> io::Result<u32> {
  let mut buf = [0u8; 4];
  r.read_exact(&mut buf)?;
  Ok(u32::from_le_bytes(buf))
}

/// Writes an `i32` as 4 little-endian bytes (SOG's `dimension` field).
pub fn write_i32(w: &mut impl Write, v: i32) -> io::Result<()> {
  w.write_all(&v.to_le_bytes())
}

/// Reads an `i32` from 4 little-endian bytes.
pub fn read_i32(r: &mut impl Read) -> io::Result<i32> {
  let mut buf = [0u8; 4];
  r.read_exact(&mut buf)?;
  Ok(i32::from_le_bytes(buf))
}

/// Writes an `f32` as 4 little-endian bytes (SOG's vertex/header fields).
pub fn write_f32(w: &mut impl Write, v: f32) -> io::Result<()> {
  w.write_all(&v.to_le_bytes())
}

/// Reads an `f32` from 4 little-endian bytes.
pub fn read_f32(r: &mut impl Read) -> io::Result<f32> {
  let mut buf = [0u8; 4];
  r.read_exact(&mut buf)?;
  Ok(f32::from_le_bytes(buf))
}

/// Writes a `u64` as 8 little-endian bytes.
pub fn write_u64(w: &mut impl Write, v: u64) -> io::Result<()> {
  w.write_all(&v.to_le_bytes())
}

/// Reads a `u64` from 8 little-endian bytes.
pub fn read_u64(r: &mut impl Read) -> io::Result<u64> {
  let mut buf = [0u8; 8];
  r.read_exact(&mut buf)?;
  Ok(u64::from_le_bytes(buf))
}

/// Writes a 3D vertex as 3 consecutive little-endian `f64`s (24 bytes).
pub fn write_vertex(w: &mut impl Write, v: DVec3) -> io::Result<()> {
  write_f64(w, v.x)?;
  write_f64(w, v.y)?;
  write_f64(w, v.z)
}

/// Reads a 3D vertex from 24 little-endian bytes.
pub fn read_vertex(r: &mut impl Read) -> io::Result<DVec3> {
  let x = read_f64(r)?;
  let y = read_f64(r)?;
  let z = read_f64(r)?;
  Ok(DVec3::new(x, y, z))
}

/// Writes a 3x3 covariance matrix in row-major order (9 x 8 = 72 bytes).
pub fn write_mat3(w: &mut impl Write, m: DMat3) -> io::Result<()> {
  // glam stores column-major; emit row-major to match the wire format.
  for row in 0..3 {
    for col in 0..3 {
      write_f64(w, m.col(col)[row])?;
    }
  }
  Ok(())
}

/// Reads a 3x3 covariance matrix from 72 row-major little-endian bytes.
pub fn read_mat3(r: &mut impl Read) -> io::Result<DMat3> {
  let mut rows = [[0.0f64; 3]; 3];
  for row in rows.iter_mut() {
    for slot in row.iter_mut() {
      *slot = read_f64(r)?;
    }
  }
  Ok(DMat3::from_cols(
    DVec3::new(rows[0][0], rows[1][0], rows[2][0]),
    DVec3::new(rows[0][1], rows[1][1], rows[2][1]),
    DVec3::new(rows[0][2], rows[1][2], rows[2][2]),
  ))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn vertex_round_trips() {
    let v = DVec3::new(1.5, -2.25, 3.0);
    let mut buf = Vec::new();
    write_vertex(&mut buf, v).unwrap();
    assert_eq!(buf.len(), 24);
    let mut cursor = &buf[..];
    let out = read_vertex(&mut cursor).unwrap();
    assert_eq!(v, out);
  }

  #[test]
  fn mat3_round_trips_respecting_row_major_layout() {
    let m = DMat3::from_cols(DVec3::new(1.0, 2.0, 3.0), DVec3::new(4.0, 5.0, 6.0), DVec3::new(7.0, 8.0, 9.0));
    let mut buf = Vec::new();
    write_mat3(&mut buf, m).unwrap();
    assert_eq!(buf.len(), 72);
    let mut cursor = &buf[..];
    let out = read_mat3(&mut cursor).unwrap();
    assert_eq!(m, out);
  }

  #[test]
  fn u32_round_trips() {
    let mut buf = Vec::new();
    write_u32(&mut buf, 0xDEAD_BEEF).unwrap();
    assert_eq!(buf.len(), 4);
    let mut cursor = &buf[..];
    assert_eq!(read_u32(&mut cursor).unwrap(), 0xDEAD_BEEF);
  }

  #[test]
  fn i32_round_trips() {
    let mut buf = Vec::new();
    write_i32(&mut buf, -42).unwrap();
    let mut cursor = &buf[..];
    assert_eq!(read_i32(&mut cursor).unwrap(), -42);
  }

  #[test]
  fn f32_round_trips() {
    let mut buf = Vec::new();
    write_f32(&mut buf, -1.5).unwrap();
    let mut cursor = &buf[..];
    assert_eq!(read_f32(&mut cursor).unwrap(), -1.5);
  }
}
