//! Sensor descriptor and noisy range-return point (spec §3).

use glam::{DQuat, DVec3};

/// Intrinsic noise model: bias, per-point stddev, beam width as a function
/// of range, and the valid range window. Reading these from a sensor config
/// file is a collaborator's concern; this is the parsed value type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntrinsicNoiseModel {
  pub bias: f64,
  pub point_stddev: f64,
  /// Beam width at zero range; grows linearly with range at `width_slope`.
  pub width_at_zero: f64,
  pub width_slope: f64,
  pub min_range: f64,
  pub max_range: f64,
}

impl IntrinsicNoiseModel {
  /// Beam width at the given range.
  pub fn width_at(&self, range: f64) -> f64 {
    self.width_at_zero + self.width_slope * range
  }

  pub fn in_valid_range(&self, range: f64) -> bool {
    range.is_finite() && range >= self.min_range && range <= self.max_range
  }
}

/// A sensor's rigid mount and timing characteristics. Name is unique within
/// a rig; immutable after load.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorDescriptor {
  pub name: String,
  /// Rigid extrinsic transform from sensor frame to rig-body frame.
  pub extrinsic_translation: DVec3,
  pub extrinsic_rotation: DQuat,
  /// Sensor clock standard deviation, seconds. `None` falls back to
  /// `CarverConfig::default_clock_stddev`.
  pub clock_stddev: Option<f64>,
  pub noise: IntrinsicNoiseModel,
}

impl SensorDescriptor {
  pub fn clock_stddev_or(&self, default_clock_stddev: f64) -> f64 {
    self.clock_stddev.unwrap_or(default_clock_stddev)
  }
}

/// A single range return in sensor frame: position, stddev, and beam width.
/// Flagged invalid if any noise component is non-finite (spec §3).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoisyPoint {
  pub position: DVec3,
  pub stddev: f64,
  pub width: f64,
}

impl NoisyPoint {
  pub fn new(position: DVec3, stddev: f64, width: f64) -> Self {
    NoisyPoint { position, stddev, width }
  }

  /// `true` if the point's noise components are all finite and non-negative.
  pub fn is_valid(&self) -> bool {
    self.position.is_finite() && self.stddev.is_finite() && self.stddev >= 0.0 && self.width.is_finite() && self.width >= 0.0
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn noise() -> IntrinsicNoiseModel {
    IntrinsicNoiseModel {
      bias: 0.0,
      point_stddev: 0.01,
      width_at_zero: 0.002,
      width_slope: 0.0005,
      min_range: 0.1,
      max_range: 50.0,
    }
  }

  #[test]
  fn width_grows_linearly_with_range() {
    let n = noise();
    assert!((n.width_at(0.0) - 0.002).abs() < 1e-12);
    assert!((n.width_at(10.0) - 0.007).abs() < 1e-12);
  }

  #[test]
  fn range_validity_respects_bounds() {
    let n = noise();
    assert!(!n.in_valid_range(0.05));
    assert!(n.in_valid_range(1.0));
    assert!(!n.in_valid_range(f64::NAN));
  }

  #[test]
  fn nonfinite_noise_marks_the_point_invalid() {
    let p = NoisyPoint::new(DVec3::new(1.0, 0.0, 0.0), f64::NAN, 0.01);
    assert!(!p.is_valid());
  }

  #[test]
  fn finite_noise_is_valid() {
    let p = NoisyPoint::new(DVec3::new(1.0, 0.0, 0.0), 0.01, 0.002);
    assert!(p.is_valid());
  }
}
