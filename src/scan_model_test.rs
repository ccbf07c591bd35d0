use glam::{DMat3, DQuat, DVec3};

use crate::sensor::{IntrinsicNoiseModel, NoisyPoint, SensorDescriptor};
use crate::trajectory::{Trajectory, TrajectorySample};

use super::*;

fn flat_sensor() -> SensorDescriptor {
  SensorDescriptor {
    name: "lidar0".into(),
    extrinsic_translation: DVec3::ZERO,
    extrinsic_rotation: DQuat::IDENTITY,
    clock_stddev: Some(1e-4),
    noise: IntrinsicNoiseModel {
      bias: 0.0,
      point_stddev: 0.01,
      width_at_zero: 0.002,
      width_slope: 0.0,
      min_range: 0.05,
      max_range: 50.0,
    },
  }
}

fn static_trajectory() -> Trajectory {
  let sample = TrajectorySample {
    t: 0.0,
    position: DVec3::ZERO,
    position_cov: DMat3::ZERO,
    orientation: DQuat::IDENTITY,
    orientation_cov: DMat3::ZERO,
    angular_velocity: DVec3::ZERO,
  };
  Trajectory::new("lidar0", vec![sample]).unwrap()
}

#[test]
fn zero_uncertainty_input_yields_zero_output_covariance() {
  let sensor = flat_sensor();
  let model = SensorModel::new(&sensor, DMat3::ZERO, 1e-4);
  let traj = static_trajectory();
  let frame = model.set_frame(&traj, 0.0).unwrap();

  assert_eq!(frame.sensor_cov(), DMat3::ZERO);

  let point = NoisyPoint::new(DVec3::new(0.0, 0.0, 1.0), 0.0, 0.0);
  let gaussians = frame.set_point(&point).unwrap();
  assert_eq!(gaussians.hit_cov, DMat3::ZERO);
  assert!((gaussians.hit_mean - DVec3::new(0.0, 0.0, 1.0)).length() < 1e-12);
}

#[test]
fn point_noise_propagates_into_hit_covariance() {
  let sensor = flat_sensor();
  let model = SensorModel::new(&sensor, DMat3::ZERO, 0.0);
  let traj = static_trajectory();
  let frame = model.set_frame(&traj, 0.0).unwrap();

  let point = NoisyPoint::new(DVec3::new(0.0, 0.0, 1.0), 0.02, 0.002);
  let gaussians = frame.set_point(&point).unwrap();
  // Identity pose/extrinsics: point covariance passes through unrotated.
  assert!((gaussians.hit_cov.col(0).x - 0.02 * 0.02).abs() < 1e-9);
  assert!((gaussians.hit_cov.col(2).z - 0.02 * 0.02).abs() < 1e-9);
}

#[test]
fn invalid_point_is_rejected_without_panicking() {
  let sensor = flat_sensor();
  let model = SensorModel::new(&sensor, DMat3::ZERO, 1e-4);
  let traj = static_trajectory();
  let frame = model.set_frame(&traj, 0.0).unwrap();

  let point = NoisyPoint::new(DVec3::new(f64::NAN, 0.0, 1.0), 0.01, 0.002);
  assert!(matches!(frame.set_point(&point), Err(CoreError::InvalidPoint(_))));
}

#[test]
fn orientation_uncertainty_propagates_through_the_lever_arm() {
  let mut sensor = flat_sensor();
  sensor.extrinsic_translation = DVec3::new(1.0, 0.0, 0.0);
  let model = SensorModel::new(&sensor, DMat3::ZERO, 0.0);

  let sample = TrajectorySample {
    t: 0.0,
    position: DVec3::ZERO,
    position_cov: DMat3::ZERO,
    orientation: DQuat::IDENTITY,
    orientation_cov: DMat3::from_diagonal(DVec3::new(0.0, 0.0, 0.01)),
    angular_velocity: DVec3::ZERO,
  };
  let traj = Trajectory::new("lidar0", vec![sample]).unwrap();
  let frame = model.set_frame(&traj, 0.0).unwrap();

  // Yaw uncertainty rotating a lever arm along +x induces y-variance.
  assert!(frame.sensor_cov().col(1).y > 0.0);
}
