//! Runtime configuration for the carving pipeline (spec §6's enumerated
//! options). Loading this from XML/CLI is a collaborator's concern; this
//! crate only owns the value type.

use serde::{Deserialize, Serialize};

/// Tunables threaded through the carver, wedge builder, and region grower.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarverConfig {
  /// Fallback clock stddev (seconds) when a sensor descriptor omits one.
  pub default_clock_stddev: f64,

  /// `nb`: number of stddevs past each hit point the wedge builder carves.
  pub carve_buffer_stddevs: f64,

  /// Radius used by the neighborhood planarity/corner estimation feeding
  /// `CarveMap::planar_prob`/`corner_prob`.
  pub linefit_distance: f64,

  /// Extra octree depth applied when recarving flagged object regions.
  pub object_refine_depth_increase: u32,

  /// Octree depth at which the chunker cuts chunks.
  pub chunk_depth: u32,
}

impl Default for CarverConfig {
  fn default() -> Self {
    CarverConfig {
      default_clock_stddev: 1e-4,
      carve_buffer_stddevs: 2.0,
      linefit_distance: 0.1,
      object_refine_depth_increase: 2,
      chunk_depth: 4,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_carve_buffer_covers_two_sigma() {
    // S2 requires the wedge to cover the 2-sigma region for nb >= 2.
    assert!(CarverConfig::default().carve_buffer_stddevs >= 2.0);
  }

  #[test]
  fn partial_config_deserializes_with_defaults_for_the_rest() {
    // `#[serde(default)]` on the struct means a format that only sets one
    // field (e.g. a sparse XML/TOML fragment) still produces a valid config.
    let cfg = CarverConfig {
      chunk_depth: 6,
      ..CarverConfig::default()
    };
    assert_eq!(cfg.chunk_depth, 6);
    assert_eq!(cfg.carve_buffer_stddevs, CarverConfig::default().carve_buffer_stddevs);
  }
}
