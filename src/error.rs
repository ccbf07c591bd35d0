//! Crate-wide error type.
//!
//! Mirrors the propagation policy of the carving pipeline: per-point and
//! per-frame conditions (`InvalidPoint`, `NumericalNonfinite`) are meant to
//! be logged and absorbed locally by callers rather than bubbled all the
//! way up, but still need a concrete variant so call sites that *do* want
//! to surface them can.

use std::path::PathBuf;

/// Errors signalled by the carving core.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
  /// A parameter was out of range, a required file was missing, or a
  /// covariance input contained a NaN.
  #[error("invalid input: {0}")]
  InvalidInput(String),

  /// A binary file's magic number didn't match, or the file was truncated.
  #[error("bad format: {0}")]
  BadFormat(String),

  /// Underlying filesystem failure, wrapped with the offending path.
  #[error("io error at {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The trajectory oracle was queried outside its covered time interval.
  #[error("timestamp {t} out of range [{lo}, {hi}]")]
  TimestampOutOfRange { t: f64, lo: f64, hi: f64 },

  /// A single range return had non-finite noise. Recovered locally by
  /// dropping the point; callers absorb this rather than abort the frame.
  #[error("invalid point: {0}")]
  InvalidPoint(String),

  /// A carve-map evaluation produced a non-finite probability. Recovered
  /// locally by substituting 0.5 (no information).
  #[error("non-finite probability encountered: {0}")]
  NumericalNonfinite(String),

  /// Root expansion or simplification encountered an impossible octree
  /// state. Always fatal.
  #[error("inconsistent octree state: {0}")]
  InconsistentTree(String),

  /// The host dropped the pipeline mid-operation.
  #[error("cancelled")]
  Cancelled,
}

impl CoreError {
  /// Construct an [`CoreError::Io`] variant, attaching the path that
  /// caused the failure.
  pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    CoreError::Io {
      path: path.into(),
      source,
    }
  }

  /// Maps this error onto the pipeline driver's exit-code contract
  /// (spec §6): 2 for input-load failures, 3 for processing failures,
  /// 4 for output-write failures. Argument parsing (exit code 1) is a
  /// collaborator's concern and is never produced by this crate.
  pub fn exit_code(&self) -> u8 {
    match self {
      CoreError::InvalidInput(_) | CoreError::BadFormat(_) | CoreError::TimestampOutOfRange { .. } => 2,
      CoreError::InvalidPoint(_) | CoreError::NumericalNonfinite(_) | CoreError::InconsistentTree(_) | CoreError::Cancelled => 3,
      CoreError::Io { .. } => 4,
    }
  }
}

/// Convenience alias used throughout the crate.
pub type CoreResult<T> = Result<T, CoreError>;
