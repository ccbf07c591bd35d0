//! Benchmarks for the carve-map occupancy evaluator and octree insertion -
//! the two per-sample hot paths the carver runs once per wedge per leaf.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use glam::{DMat3, DVec3};

use scancarve::carve_map::CarveMap;
use scancarve::octree::Octree;
use scancarve::shapes::wedge_shape::WedgeShape;
use scancarve::wedge::Wedge;

fn sample_carve_map(range: f64) -> CarveMap {
  let sensor_cov = DMat3::from_diagonal(DVec3::splat(0.0025));
  let hit_cov = DMat3::from_diagonal(DVec3::splat(0.0004));
  CarveMap::from_endpoints(DVec3::ZERO, sensor_cov, DVec3::new(0.0, 0.0, range), hit_cov)
}

fn bench_compute(c: &mut Criterion) {
  let mut group = c.benchmark_group("carve_map_compute");
  group.throughput(Throughput::Elements(1));

  let map = sample_carve_map(2.0);
  let queries = [
    ("interior", DVec3::new(0.0, 0.0, 1.0)),
    ("near_hit", DVec3::new(0.0, 0.0, 1.98)),
    ("past_hit", DVec3::new(0.0, 0.0, 2.4)),
  ];

  for (name, x) in queries {
    group.bench_with_input(BenchmarkId::from_parameter(name), &x, |b, &x| {
      b.iter(|| black_box(map.compute(black_box(x), 0.01)))
    });
  }

  group.finish();
}

fn bench_surface_prob(c: &mut Criterion) {
  let mut group = c.benchmark_group("carve_map_surface_prob");
  let map = sample_carve_map(2.0);
  group.bench_function("at_hit", |b| {
    b.iter(|| black_box(map.get_surface_prob(black_box(DVec3::new(0.0, 0.0, 2.0)), 0.01)))
  });
  group.finish();
}

/// Inserting one wedge into an empty octree: the per-wedge cost the
/// carver pays once per (ray, frame) pair.
fn bench_wedge_insert(c: &mut Criterion) {
  let mut group = c.benchmark_group("octree_wedge_insert");

  let a1 = sample_carve_map(2.0);
  let a2 = sample_carve_map(2.0);
  let b1 = sample_carve_map(2.1);
  let b2 = sample_carve_map(2.1);
  let wedge = Wedge::build(&a1, &a2, &b1, &b2, 2.0);
  let shape = WedgeShape::new(wedge);

  for max_depth in [4u32, 6, 8] {
    group.bench_with_input(BenchmarkId::from_parameter(max_depth), &max_depth, |b, &max_depth| {
      b.iter_batched(
        || Octree::new(DVec3::ZERO, 4.0, max_depth),
        |mut tree| {
          tree.find(&shape).unwrap();
          black_box(tree.node_count())
        },
        criterion::BatchSize::SmallInput,
      )
    });
  }

  group.finish();
}

criterion_group!(carve_map, bench_compute, bench_surface_prob);
criterion_group!(octree, bench_wedge_insert);
criterion_main!(carve_map, octree);
