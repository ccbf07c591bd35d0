//! Scan model (spec §4.2): composes pose, extrinsics, clock, and intrinsic
//! noise into the two 3D Gaussians a [`crate::carve_map::CarveMap`] needs.
//!
//! `set_sensor`/`set_frame`/`set_point` are TODO stubs in the C++ this crate
//! is descended from; the covariance composition below is reconstructed
//! from the surrounding matrix-ordering comments rather than ported, and is
//! recorded as an open question resolution in DESIGN.md: rotation-error
//! partials are the cross product of the small-angle basis vector with the
//! lever arm, clock-error partials use the documented `R_ts` rotation
//! directly as a finite secant rather than a linearized derivative.

use glam::{DMat3, DQuat, DVec3};
use nalgebra::SMatrix;

use crate::error::{CoreError, CoreResult};
use crate::sensor::{NoisyPoint, SensorDescriptor};
use crate::trajectory::{Pose, Trajectory};

/// 7x7 input covariance for sensor position: `[roll, pitch, yaw, ext_x,
/// ext_y, ext_z, ts_std]`.
pub type SensorCov7 = SMatrix<f64, 7, 7>;

/// 10x10 input covariance for point position: `[roll, pitch, yaw, ext_x,
/// ext_y, ext_z, point_x, point_y, point_z, ts_std]`.
pub type ScanpointCov10 = SMatrix<f64, 10, 10>;

/// Per-sensor setup: extrinsics, clock stddev, and the calibration
/// uncertainty of the extrinsic transform itself.
#[derive(Debug, Clone)]
pub struct SensorModel<'a> {
  descriptor: &'a SensorDescriptor,
  /// Covariance of the sensor-to-system-body extrinsic translation.
  extrinsic_cov: DMat3,
  default_clock_stddev: f64,
}

impl<'a> SensorModel<'a> {
  pub fn new(descriptor: &'a SensorDescriptor, extrinsic_cov: DMat3, default_clock_stddev: f64) -> Self {
    SensorModel {
      descriptor,
      extrinsic_cov,
      default_clock_stddev,
    }
  }

  fn clock_stddev(&self) -> f64 {
    self.descriptor.clock_stddev_or(self.default_clock_stddev)
  }

  /// Materializes a per-frame state by querying `trajectory` at `t`.
  pub fn set_frame(&self, trajectory: &Trajectory, t: f64) -> CoreResult<FrameModel<'a>> {
    let pose = trajectory.pose_at(t)?;
    let clock_stddev = self.clock_stddev();
    let r_ts = clock_error_rotation(pose.angular_velocity, clock_stddev);
    Ok(FrameModel {
      sensor: self.descriptor,
      extrinsic_cov: self.extrinsic_cov,
      clock_stddev,
      pose,
      r_ts,
    })
  }
}

/// `R_ts = I + [ω]x sin(|ω|σ_t) + [ω]x² (1 − cos(|ω|σ_t))`: the rotation
/// accumulated by one clock-stddev's worth of angular motion (Rodrigues'
/// formula applied to `ω·σ_t`).
fn clock_error_rotation(omega: DVec3, clock_stddev: f64) -> DMat3 {
  let theta = omega.length() * clock_stddev;
  if theta == 0.0 || !theta.is_finite() {
    return DMat3::IDENTITY;
  }
  let axis = omega / omega.length();
  DMat3::from_axis_angle(axis, theta)
}

/// Per-frame scan model state: the maximum-likelihood sensor pose, its
/// decomposition, and the two input covariances. Produced by
/// [`SensorModel::set_frame`]; consumed by [`FrameModel::set_point`].
#[derive(Debug, Clone)]
pub struct FrameModel<'a> {
  sensor: &'a SensorDescriptor,
  extrinsic_cov: DMat3,
  clock_stddev: f64,
  pose: Pose,
  r_ts: DMat3,
}

/// The two output 3D Gaussians a single range return produces: the sensor
/// endpoint (shared by every point in the frame) and the hit endpoint.
#[derive(Debug, Clone, Copy)]
pub struct ScanPointGaussians {
  pub sensor_mean: DVec3,
  pub sensor_cov: DMat3,
  pub hit_mean: DVec3,
  pub hit_cov: DMat3,
}

impl<'a> FrameModel<'a> {
  /// World position of the sensor's mount point for this frame.
  pub fn sensor_world_position(&self) -> DVec3 {
    self.pose.position + self.pose.orientation * self.sensor.extrinsic_translation
  }

  /// 3x3 output covariance of the sensor endpoint, propagating the 7x7
  /// input covariance through pose -> body -> world.
  pub fn sensor_cov(&self) -> DMat3 {
    let cov7 = self.assemble_sensor_cov7();
    let jacobian = self.sensor_jacobian();
    propagate3(&jacobian, &cov7)
  }

  /// For a single point, forms the output 3x3 covariance of the hit point
  /// by propagating the 10-dim input covariance through pose -> sensor
  /// frame -> body frame -> world frame.
  ///
  /// Returns [`CoreError::InvalidPoint`] if the point's own noise is
  /// non-finite; callers drop the point without failing the frame.
  pub fn set_point(&self, point: &NoisyPoint) -> CoreResult<ScanPointGaussians> {
    if !point.is_valid() {
      return Err(CoreError::InvalidPoint(format!("non-finite noise on point {:?}", point.position)));
    }

    let hit_mean = self.sensor_world_position() + self.pose.orientation * (self.sensor.extrinsic_rotation * point.position);

    let point_cov = DMat3::from_diagonal(DVec3::splat(point.stddev * point.stddev));
    let cov10 = self.assemble_scanpoint_cov10(point_cov);
    let jacobian = self.scanpoint_jacobian(point);
    let hit_cov = propagate3(&jacobian, &cov10);

    Ok(ScanPointGaussians {
      sensor_mean: self.sensor_world_position(),
      sensor_cov: self.sensor_cov(),
      hit_mean,
      hit_cov,
    })
  }

  fn assemble_sensor_cov7(&self) -> SensorCov7 {
    let mut m = SensorCov7::zeros();
    let rot_block = self.pose.cov6.fixed_view::<3, 3>(3, 3);
    m.fixed_view_mut::<3, 3>(0, 0).copy_from(&rot_block);
    for i in 0..3 {
      for j in 0..3 {
        m[(3 + i, 3 + j)] = self.extrinsic_cov.col(j)[i];
      }
    }
    m[(6, 6)] = self.clock_stddev * self.clock_stddev;
    m
  }

  fn assemble_scanpoint_cov10(&self, point_cov: DMat3) -> ScanpointCov10 {
    let mut m = ScanpointCov10::zeros();
    let rot_block = self.pose.cov6.fixed_view::<3, 3>(3, 3);
    m.fixed_view_mut::<3, 3>(0, 0).copy_from(&rot_block);
    for i in 0..3 {
      for j in 0..3 {
        m[(3 + i, 3 + j)] = self.extrinsic_cov.col(j)[i];
        m[(6 + i, 6 + j)] = point_cov.col(j)[i];
      }
    }
    m[(9, 9)] = self.clock_stddev * self.clock_stddev;
    m
  }

  /// Rotation-error partials: `R(q)(e_i x v)` for the small-angle basis
  /// vectors; extrinsic-translation partials: `R(q)`; clock partials: the
  /// finite secant `R(q)(R_ts v - v) / ts_std`.
  fn sensor_jacobian(&self) -> SMatrix<f64, 3, 7> {
    let lever = self.sensor.extrinsic_translation;
    let mut j = SMatrix::<f64, 3, 7>::zeros();
    self.fill_rotation_and_translation_columns(&mut j, 0, lever);
    self.fill_clock_column(&mut j, 6, lever);
    j
  }

  fn scanpoint_jacobian(&self, point: &NoisyPoint) -> SMatrix<f64, 3, 10> {
    let point_in_body = self.sensor.extrinsic_rotation * point.position;
    let lever = self.sensor.extrinsic_translation + point_in_body;
    let mut j = SMatrix::<f64, 3, 10>::zeros();
    self.fill_rotation_and_translation_columns(&mut j, 0, lever);
    let r_world_sensor = DMat3::from_quat(self.pose.orientation) * DMat3::from_quat(self.sensor.extrinsic_rotation);
    for col in 0..3 {
      let c = r_world_sensor.col(col);
      j[(0, 6 + col)] = c.x;
      j[(1, 6 + col)] = c.y;
      j[(2, 6 + col)] = c.z;
    }
    self.fill_clock_column(&mut j, 9, lever);
    j
  }

  fn fill_rotation_and_translation_columns<const N: usize>(&self, j: &mut SMatrix<f64, 3, N>, start: usize, lever: DVec3) {
    let r = DMat3::from_quat(self.pose.orientation);
    let basis = [DVec3::X, DVec3::Y, DVec3::Z];
    for (i, e) in basis.iter().enumerate() {
      let col = r * e.cross(lever);
      j[(0, start + i)] = col.x;
      j[(1, start + i)] = col.y;
      j[(2, start + i)] = col.z;
    }
    for i in 0..3 {
      let col = r.col(i);
      j[(0, start + 3 + i)] = col.x;
      j[(1, start + 3 + i)] = col.y;
      j[(2, start + 3 + i)] = col.z;
    }
  }

  fn fill_clock_column<const N: usize>(&self, j: &mut SMatrix<f64, 3, N>, idx: usize, lever: DVec3) {
    let r = DMat3::from_quat(self.pose.orientation);
    if self.clock_stddev > 0.0 {
      let perturbed = r * (self.r_ts * lever - lever) / self.clock_stddev;
      j[(0, idx)] = perturbed.x;
      j[(1, idx)] = perturbed.y;
      j[(2, idx)] = perturbed.z;
    }
  }
}

/// `Σ_out = J Σ_in Jᵀ`, converted back to a [`DMat3`].
fn propagate3<const N: usize>(jacobian: &SMatrix<f64, 3, N>, cov: &SMatrix<f64, N, N>) -> DMat3 {
  let out = jacobian * cov * jacobian.transpose();
  DMat3::from_cols(
    DVec3::new(out[(0, 0)], out[(1, 0)], out[(2, 0)]),
    DVec3::new(out[(0, 1)], out[(1, 1)], out[(2, 1)]),
    DVec3::new(out[(0, 2)], out[(1, 2)], out[(2, 2)]),
  )
}

#[cfg(test)]
#[path = "scan_model_test.rs"]
mod scan_model_test;
