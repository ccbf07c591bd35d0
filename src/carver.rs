//! Carver pipeline glue (spec §4.8): drives one sensor's frame stream into
//! wedges and hands each wedge to a sink (inline octree insertion, or a
//! wedge-store write for the chunker to pick up later).
//!
//! Per DESIGN NOTES §9's explicit warning, the C++ original's
//! `frame_model::carve` leaves the in-line carving path as a `// TODO carve
//! this wedge` stub; this module routes every wedge through the
//! `WedgeSink` abstraction instead, so both the inline-tree and
//! wedge-store paths are complete rather than one being a placeholder.

use std::path::PathBuf;

use glam::DMat3;

use crate::carve_map::CarveMap;
use crate::error::CoreResult;
use crate::octree::Octree;
use crate::progress::{ProgressReporter, TracingProgress};
use crate::scan_model::SensorModel;
use crate::sensor::{NoisyPoint, SensorDescriptor};
use crate::shapes::wedge_shape::WedgeShape;
use crate::trajectory::Trajectory;
use crate::wedge::Wedge;
use crate::wedge_store::{StoredCarveMap, StoredGaussian, WedgeRecord, WedgeStoreWriter};

/// One frame's raw range returns, in ray order. A `None` at index `k`
/// means ray `k` produced no valid return this frame (already filtered
/// upstream, or never fired) — the carver skips any wedge that would need
/// it without aborting the rest of the frame (spec §4.8).
#[derive(Debug, Clone)]
pub struct RawFrame {
  pub timestamp: f64,
  pub points: Vec<Option<NoisyPoint>>,
}

/// Supplies frames in time order. Implemented by whatever reads a
/// per-sensor range-scan file (spec §6); this crate only consumes the
/// stream. `Send` so a whole sensor's stream can be handed to
/// [`carve_sensors_in_parallel`].
pub trait FrameSource: Send {
  fn next_frame(&mut self) -> CoreResult<Option<RawFrame>>;
}

/// Receives each wedge the carver produces. The only two shapes of sink
/// spec §4.8 names: straight into the octree, or appended to a wedge
/// store for the chunker to process later.
pub trait WedgeSink {
  fn accept(&mut self, wedge: &Wedge, ray_index: usize, frame_index: usize) -> CoreResult<()>;
}

/// Inserts every wedge directly into an owned octree.
pub struct InlineOctreeSink<'a> {
  tree: &'a mut Octree,
}

impl<'a> InlineOctreeSink<'a> {
  pub fn new(tree: &'a mut Octree) -> Self {
    InlineOctreeSink { tree }
  }
}

impl<'a> WedgeSink for InlineOctreeSink<'a> {
  fn accept(&mut self, wedge: &Wedge, _ray_index: usize, _frame_index: usize) -> CoreResult<()> {
    let shape = WedgeShape::new(*wedge);
    self.tree.find(&shape)
  }
}

/// Appends every wedge to a wedge store, tagged with its originating ray
/// and frame index is implicit in append order (spec §4.5/§4.8).
pub struct WedgeStoreSink {
  writer: WedgeStoreWriter,
}

impl WedgeStoreSink {
  pub fn new(writer: WedgeStoreWriter) -> Self {
    WedgeStoreSink { writer }
  }

  pub fn close(self) -> CoreResult<()> {
    self.writer.close()
  }
}

impl WedgeSink for WedgeStoreSink {
  fn accept(&mut self, wedge: &Wedge, _ray_index: usize, _frame_index: usize) -> CoreResult<()> {
    let record = to_wedge_record(wedge);
    self.writer.write(&record)
  }
}

fn to_wedge_record(wedge: &Wedge) -> WedgeRecord {
  let mut vertices = [glam::DVec3::ZERO; 6];
  for (i, v) in vertices.iter_mut().enumerate() {
    *v = wedge.vertex(i);
  }
  let maps = wedge.maps();
  let to_stored = |m: &CarveMap| StoredCarveMap {
    sensor: StoredGaussian { mean: m.sensor_mean(), cov: m.sensor_cov() },
    hit: StoredGaussian { mean: m.hit_mean(), cov: m.hit_cov() },
  };
  WedgeRecord {
    vertices,
    maps: [to_stored(maps[0]), to_stored(maps[1]), to_stored(maps[2]), to_stored(maps[3])],
  }
}

/// Drives one sensor's frame stream to completion (spec §4.8): for every
/// consecutive pair of frames, builds the per-ray carve maps, constructs a
/// wedge for every ray index valid in both frames, and hands it to `sink`.
///
/// A frame whose pose query falls outside the trajectory's covered
/// interval is logged and treated as empty (its rays simply produce no
/// wedges against the neighboring frame), matching the per-frame abort
/// policy in spec §7 without stopping the sensor stream.
pub fn carve_sensor_stream(
  source: &mut dyn FrameSource,
  sensor_model: &SensorModel,
  trajectory: &Trajectory,
  carve_buffer_stddevs: f64,
  sink: &mut dyn WedgeSink,
  progress: &dyn ProgressReporter,
) -> CoreResult<()> {
  progress.begin(0, "carve_sensor_stream");

  let mut prev: Option<Vec<Option<CarveMap>>> = None;
  let mut frame_index: usize = 0;

  while let Some(raw) = source.next_frame()? {
    let curr = build_frame_carve_maps(sensor_model, trajectory, &raw);

    if let Some(prev_maps) = &prev {
      emit_wedges_between(prev_maps, &curr, carve_buffer_stddevs, frame_index.saturating_sub(1), sink)?;
    }

    prev = Some(curr);
    frame_index += 1;
    progress.advance(1);
  }

  progress.finish();
  Ok(())
}

/// Builds one carve map per valid ray, `None` at any ray whose point was
/// missing or invalid. Logs and substitutes an all-`None` frame if the
/// trajectory can't be queried at this frame's timestamp.
fn build_frame_carve_maps(sensor_model: &SensorModel, trajectory: &Trajectory, raw: &RawFrame) -> Vec<Option<CarveMap>> {
  let frame_model = match sensor_model.set_frame(trajectory, raw.timestamp) {
    Ok(fm) => fm,
    Err(err) => {
      tracing::warn!(timestamp = raw.timestamp, error = %err, "skipping frame: pose unavailable");
      return vec![None; raw.points.len()];
    }
  };

  raw
    .points
    .iter()
    .map(|maybe_point| {
      let point = maybe_point.as_ref()?;
      match frame_model.set_point(point) {
        Ok(gaussians) => Some(CarveMap::new(&gaussians)),
        Err(err) => {
          tracing::warn!(error = %err, "skipping invalid point");
          None
        }
      }
    })
    .collect()
}

/// For every ray index `k` where `prev[k]`, `prev[k+1]`, `curr[k]`, and
/// `curr[k+1]` are all present, builds the wedge and hands it to `sink`.
fn emit_wedges_between(
  prev: &[Option<CarveMap>],
  curr: &[Option<CarveMap>],
  carve_buffer_stddevs: f64,
  prev_frame_index: usize,
  sink: &mut dyn WedgeSink,
) -> CoreResult<()> {
  let rays = prev.len().min(curr.len());
  if rays == 0 {
    return Ok(());
  }
  for k in 0..rays - 1 {
    let (Some(a1), Some(a2), Some(b1), Some(b2)) = (&prev[k], &prev[k + 1], &curr[k], &curr[k + 1]) else {
      continue;
    };
    let wedge = Wedge::build(a1, a2, b1, b2, carve_buffer_stddevs);
    sink.accept(&wedge, k, prev_frame_index)?;
  }
  Ok(())
}

/// One sensor's share of a multi-sensor carve: everything
/// [`carve_sensors_in_parallel`] needs to run it on its own thread, writing
/// to its own wedge store so no cross-sensor locking is required (spec §5:
/// "wedge generation is naturally per-sensor-stream and can run
/// concurrently across sensors").
pub struct SensorCarveJob {
  pub source: Box<dyn FrameSource>,
  pub sensor: SensorDescriptor,
  pub extrinsic_cov: DMat3,
  pub default_clock_stddev: f64,
  pub trajectory: Trajectory,
  pub carve_buffer_stddevs: f64,
  pub wedge_store_path: PathBuf,
}

impl SensorCarveJob {
  fn run(mut self) -> CoreResult<()> {
    let sensor_model = SensorModel::new(&self.sensor, self.extrinsic_cov, self.default_clock_stddev);
    let writer = WedgeStoreWriter::create(&self.wedge_store_path)?;
    let mut sink = WedgeStoreSink::new(writer);
    carve_sensor_stream(
      self.source.as_mut(),
      &sensor_model,
      &self.trajectory,
      self.carve_buffer_stddevs,
      &mut sink,
      &TracingProgress,
    )?;
    sink.close()
  }
}

/// Runs every job concurrently, one thread per sensor (spec §5). Insertion
/// into a single shared octree is still serialized — each job here targets
/// its own wedge store file, so there is nothing to lock between them; a
/// later pass (the chunker, or a direct octree fold) consumes the stores
/// sequentially.
pub fn carve_sensors_in_parallel(jobs: Vec<SensorCarveJob>) -> Vec<CoreResult<()>> {
  use rayon::prelude::*;
  jobs.into_par_iter().map(SensorCarveJob::run).collect()
}

#[cfg(test)]
#[path = "carver_test.rs"]
mod carver_test;
