//! Trajectory oracle (spec §4.1): given a timestamp and sensor name, returns
//! the sensor's pose mean and covariance in world.
//!
//! This module owns interpolation policy only. Reading trajectory files is a
//! collaborator's concern (spec §1 Non-goals); callers construct a
//! [`Trajectory`] from an already-parsed, time-sorted sample list.

use glam::{DMat3, DQuat, DVec3};
use nalgebra::SMatrix;

use crate::error::{CoreError, CoreResult};

/// 6x6 joint covariance of position and orientation-error (roll, pitch, yaw),
/// in that order.
pub type PoseCov6 = SMatrix<f64, 6, 6>;

/// One recorded pose sample: timestamp, position mean, 3x3 position
/// covariance, orientation, and an orientation-error contribution folded
/// into the 6x6 joint covariance at query time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySample {
  pub t: f64,
  pub position: DVec3,
  pub position_cov: DMat3,
  pub orientation: DQuat,
  /// 3x3 orientation-error covariance (roll, pitch, yaw), small-angle.
  pub orientation_cov: DMat3,
  pub angular_velocity: DVec3,
}

/// Result of a [`Trajectory::pose_at`] query.
#[derive(Debug, Clone, Copy)]
pub struct Pose {
  pub position: DVec3,
  pub orientation: DQuat,
  pub cov6: PoseCov6,
  pub angular_velocity: DVec3,
}

/// A single sensor's time-ordered pose samples. Immutable after construction,
/// pure and thread-safe to query (§5 scheduling model).
#[derive(Debug, Clone)]
pub struct Trajectory {
  sensor: String,
  samples: Vec<TrajectorySample>,
}

impl Trajectory {
  /// Builds a trajectory from samples already sorted by ascending `t`.
  ///
  /// Returns [`CoreError::InvalidInput`] if `samples` is empty or not sorted.
  pub fn new(sensor: impl Into<String>, samples: Vec<TrajectorySample>) -> CoreResult<Self> {
    if samples.is_empty() {
      return Err(CoreError::InvalidInput("trajectory requires at least one sample".into()));
    }
    if !samples.windows(2).all(|w| w[0].t <= w[1].t) {
      return Err(CoreError::InvalidInput("trajectory samples must be sorted by timestamp".into()));
    }
    Ok(Trajectory {
      sensor: sensor.into(),
      samples,
    })
  }

  pub fn sensor(&self) -> &str {
    &self.sensor
  }

  pub fn time_bounds(&self) -> (f64, f64) {
    (self.samples[0].t, self.samples[self.samples.len() - 1].t)
  }

  /// Returns the interpolated pose at time `t`: linear for translation and
  /// covariance, SLERP for orientation. Fails with [`CoreError::TimestampOutOfRange`]
  /// if `t` falls outside the covered interval; no retries.
  pub fn pose_at(&self, t: f64) -> CoreResult<Pose> {
    if !t.is_finite() {
      return Err(CoreError::InvalidInput(format!("non-finite timestamp query: {t}")));
    }

    let (lo, hi) = self.time_bounds();
    if t < lo || t > hi {
      return Err(CoreError::TimestampOutOfRange { t, lo, hi });
    }

    let idx = match self.samples.binary_search_by(|s| s.t.total_cmp(&t)) {
      Ok(i) => i,
      Err(i) => i,
    };
    if idx == 0 {
      return Ok(Self::sample_to_pose(&self.samples[0]));
    }
    if idx >= self.samples.len() {
      return Ok(Self::sample_to_pose(&self.samples[self.samples.len() - 1]));
    }

    let a = &self.samples[idx - 1];
    let b = &self.samples[idx];
    let span = b.t - a.t;
    let alpha = if span > 0.0 { (t - a.t) / span } else { 0.0 };

    let position = a.position.lerp(b.position, alpha);
    let orientation = a.orientation.slerp(b.orientation, alpha);
    let angular_velocity = a.angular_velocity.lerp(b.angular_velocity, alpha);
    let cov6 = Self::lerp_cov6(a, b, alpha);

    Ok(Pose {
      position,
      orientation,
      cov6,
      angular_velocity,
    })
  }

  fn sample_to_pose(s: &TrajectorySample) -> Pose {
    Pose {
      position: s.position,
      orientation: s.orientation,
      cov6: Self::joint_cov6(s.position_cov, s.orientation_cov),
      angular_velocity: s.angular_velocity,
    }
  }

  fn joint_cov6(pos_cov: DMat3, rot_cov: DMat3) -> PoseCov6 {
    let mut m = PoseCov6::zeros();
    for r in 0..3 {
      for c in 0..3 {
        m[(r, c)] = pos_cov.col(c)[r];
        m[(r + 3, c + 3)] = rot_cov.col(c)[r];
      }
    }
    m
  }

  fn lerp_cov6(a: &TrajectorySample, b: &TrajectorySample, alpha: f64) -> PoseCov6 {
    let ca = Self::joint_cov6(a.position_cov, a.orientation_cov);
    let cb = Self::joint_cov6(b.position_cov, b.orientation_cov);
    ca * (1.0 - alpha) + cb * alpha
  }
}

#[cfg(test)]
#[path = "trajectory_test.rs"]
mod trajectory_test;
