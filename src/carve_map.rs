//! Carve map (spec §4.3): the continuous occupancy probability field
//! induced by one range return, `p(x, s)` with `0.5` meaning no
//! information, `1.0` certainly interior, `0.0` certainly exterior.
//!
//! Grounded directly on the reference implementation's working
//! `carve_map_t::compute`/`get_surface_prob` (its `scan_model_t` is a TODO
//! stub, but this evaluator is a complete, load-bearing algorithm and is
//! ported formula-for-formula, not reconstructed).

use glam::{DMat3, DVec3};
use nalgebra::Matrix3;

use crate::scan_model::ScanPointGaussians;

/// `1 / (2π)^{3/2}`, the normalization constant for a 3D Gaussian PDF with
/// a unit-determinant covariance.
const THREE_D_GAUSSIAN_COEF: f64 = 0.063_493_635_934_240_97;

/// Two Gaussians (sensor endpoint, hit endpoint) plus the cached derived
/// values needed to evaluate the occupancy field cheaply at many points.
/// Immutable once computed.
#[derive(Debug, Clone, Copy)]
pub struct CarveMap {
  sensor_mean: DVec3,
  sensor_cov: DMat3,
  hit_mean: DVec3,
  hit_cov: DMat3,

  ray: DVec3,
  range: f64,

  sensor_norm: DVec3,
  hit_norm: DVec3,
  /// `sensor_norm · ray`, cached so [`CarveMap::compute`] can recover the
  /// along-ray signed distance from the plane-normal distance (spec §4.3
  /// steps 1-2: `d_s = ((μ_s-x)·n_s) / (n_s·r)`).
  sensor_dot: f64,
  /// `hit_norm · ray`, the same normalization for the hit endpoint's
  /// plane (`d_p = ((μ_p-x)·n_p) / (n_p·r)`).
  scanpoint_dot: f64,

  sensor_neg_inv_sqrt_2v: f64,
  hit_neg_inv_sqrt_2v: f64,
  hit_stddev_along_ray: f64,

  surface_pdf_coef: f64,
  mh_hit_inv_cov: DMat3,

  /// Neighborhood planar probability in `[0, 1]`, set by a separate
  /// neighborhood analysis pass; `0.0` until then.
  pub planar_prob: f64,
  /// Neighborhood corner probability in `[0, 1]`, set the same way.
  pub corner_prob: f64,
}

impl CarveMap {
  /// Builds a carve map from the scan model's output Gaussians.
  pub fn new(gaussians: &ScanPointGaussians) -> Self {
    Self::from_endpoints(gaussians.sensor_mean, gaussians.sensor_cov, gaussians.hit_mean, gaussians.hit_cov)
  }

  pub fn from_endpoints(sensor_mean: DVec3, sensor_cov: DMat3, hit_mean: DVec3, hit_cov: DMat3) -> Self {
    let delta = hit_mean - sensor_mean;
    let range = delta.length();
    let ray = if range > 0.0 { delta / range } else { DVec3::Z };

    let sensor_norm = find_aligned_eig(sensor_cov, ray);
    // The hit-endpoint normal points back toward the sensor.
    let hit_norm = -find_aligned_eig(hit_cov, ray);

    // `find_aligned_eig` returns a unit normal; the signed-distance formula
    // needs its dot product with the ray as well (spec §4.3 steps 1-2), so
    // it is cached here rather than discarded.
    let sensor_dot = away_from_zero(sensor_norm.dot(ray));
    let scanpoint_dot = away_from_zero(hit_norm.dot(ray));

    let sensor_var = (sensor_cov * ray).dot(ray).max(f64::MIN_POSITIVE);
    let hit_var = (hit_cov * ray).dot(ray).max(f64::MIN_POSITIVE);

    let det = hit_cov.determinant().max(f64::MIN_POSITIVE);
    let surface_pdf_coef = THREE_D_GAUSSIAN_COEF * det.powf(-0.5);
    let mh_hit_inv_cov = hit_cov.inverse() * -0.5;

    CarveMap {
      sensor_mean,
      sensor_cov,
      hit_mean,
      hit_cov,
      ray,
      range,
      sensor_norm,
      hit_norm,
      sensor_dot,
      scanpoint_dot,
      sensor_neg_inv_sqrt_2v: -1.0 / (2.0 * sensor_var).sqrt(),
      hit_neg_inv_sqrt_2v: -1.0 / (2.0 * hit_var).sqrt(),
      hit_stddev_along_ray: hit_var.sqrt(),
      surface_pdf_coef,
      mh_hit_inv_cov,
      planar_prob: 0.0,
      corner_prob: 0.0,
    }
  }

  pub fn sensor_mean(&self) -> DVec3 {
    self.sensor_mean
  }

  pub fn hit_mean(&self) -> DVec3 {
    self.hit_mean
  }

  pub fn sensor_cov(&self) -> DMat3 {
    self.sensor_cov
  }

  pub fn hit_cov(&self) -> DMat3 {
    self.hit_cov
  }

  pub fn ray(&self) -> DVec3 {
    self.ray
  }

  pub fn range(&self) -> f64 {
    self.range
  }

  /// Marginal standard deviation of the hit endpoint's covariance along
  /// the ray direction: `sqrt(r^T Σ_p r)`. Used by the wedge builder to
  /// push the outer vertices `nb` standard deviations past the mean.
  pub fn hit_stddev_along_ray(&self) -> f64 {
    self.hit_stddev_along_ray
  }

  /// Evaluates the occupancy probability at `x` for a query voxel of side
  /// `xsize`. Non-finite results are logged and replaced with `0.5`
  /// (no information), matching the reference's numeric safeguard.
  pub fn compute(&self, x: DVec3, xsize: f64) -> f64 {
    // Spec §4.3 steps 1-2: signed distance along the ray, recovered from
    // the plane-normal distance by dividing out the normal/ray alignment.
    let ms_dist = (self.sensor_mean - x).dot(self.sensor_norm) / self.sensor_dot;
    let mp_dist = (self.hit_mean - x).dot(self.hit_norm) / self.scanpoint_dot;

    let p_forward = 0.5 * (1.0 + erf(ms_dist * self.sensor_neg_inv_sqrt_2v));
    let p_inrange = 0.5 * (1.0 - erf(mp_dist * self.hit_neg_inv_sqrt_2v));

    let denom = mp_dist - ms_dist;
    let f = if denom != 0.0 { (-ms_dist / denom).clamp(0.0, 1.0) } else { 0.0 };

    let blended_mean = self.sensor_mean * (1.0 - f) + self.hit_mean * f;
    let blended_cov = self.sensor_cov * (1.0 - f) + self.hit_cov * f;

    let offset = x - blended_mean;
    let latdist = offset.length();
    let var_lat = if latdist > 0.0 {
      (blended_cov * offset).dot(offset) / (latdist * latdist)
    } else {
      (self.sensor_cov.trace() + self.hit_cov.trace()) / 6.0
    };

    let p_lat = gauss_pdf(0.0, var_lat, latdist) * xsize;
    let p_fl = p_forward * p_lat;

    let p_total = p_fl * p_inrange + (1.0 - p_fl) * 0.5;

    if p_total.is_finite() {
      p_total.clamp(0.0, 1.0)
    } else {
      tracing::warn!(
        x = ?x, xsize, ms_dist, mp_dist, p_forward, p_inrange, p_fl,
        "carve map produced a non-finite probability; substituting 0.5"
      );
      0.5
    }
  }

  /// Auxiliary neighborhood-density helper used by planar-region weighting
  /// (spec §4.12): `s³ · MVN(x; μ_p, Σ_p)`.
  pub fn get_surface_prob(&self, x: DVec3, xsize: f64) -> f64 {
    let offset = x - self.hit_mean;
    let exponent = (self.mh_hit_inv_cov * offset).dot(offset);
    let value = xsize.powi(3) * self.surface_pdf_coef * exponent.exp();
    if value.is_finite() {
      value
    } else {
      0.0
    }
  }
}

/// 1D Gaussian PDF.
fn gauss_pdf(mu: f64, var: f64, x: f64) -> f64 {
  let var = var.max(f64::MIN_POSITIVE);
  let coef = 1.0 / (2.0 * std::f64::consts::PI * var).sqrt();
  coef * (-((x - mu) * (x - mu)) / (2.0 * var)).exp()
}

fn erf(x: f64) -> f64 {
  libm::erf(x)
}

/// Clamps `v`'s magnitude away from zero without flipping its sign,
/// guarding the `n·r` denominator in the signed-distance formula against
/// blowing up when an endpoint's aligned normal is nearly perpendicular to
/// the ray.
fn away_from_zero(v: f64) -> f64 {
  if v >= 0.0 {
    v.max(1e-9)
  } else {
    v.min(-1e-9)
  }
}

/// Finds the eigenvector of symmetric `cov` whose (unsigned) alignment with
/// `direction` is greatest, sign-corrected to point along `direction`. This
/// is the principal endpoint normal used by [`CarveMap::compute`] — the
/// covariance's dominant axis in the direction the ray actually travels,
/// not simply its largest-eigenvalue axis.
fn find_aligned_eig(cov: DMat3, direction: DVec3) -> DVec3 {
  let m = Matrix3::new(
    cov.col(0).x, cov.col(1).x, cov.col(2).x, //
    cov.col(0).y, cov.col(1).y, cov.col(2).y, //
    cov.col(0).z, cov.col(1).z, cov.col(2).z,
  );
  let eig = nalgebra::linalg::SymmetricEigen::new(m);

  let mut best_idx = 0;
  let mut best_alignment = f64::NEG_INFINITY;
  for i in 0..3 {
    let col = eig.eigenvectors.column(i);
    let v = DVec3::new(col[0], col[1], col[2]);
    let alignment = v.dot(direction).abs();
    if alignment > best_alignment {
      best_alignment = alignment;
      best_idx = i;
    }
  }

  let col = eig.eigenvectors.column(best_idx);
  let mut v = DVec3::new(col[0], col[1], col[2]);
  if v.dot(direction) < 0.0 {
    v = -v;
  }
  v.normalize_or_zero()
}

#[cfg(test)]
#[path = "carve_map_test.rs"]
mod carve_map_test;
