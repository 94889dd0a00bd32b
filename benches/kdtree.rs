//! Performance benchmarks for the spatial index.
//!
//! Run with: `cargo bench`
//!
//! Compares balanced construction cost across input sizes and indexed
//! nearest-neighbor search against a linear scan.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use waymark::geo_utils::haversine_distance;
use waymark::{GeoPoint, KdTree};

fn generate_points(seed: u64, count: usize) -> Vec<GeoPoint> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            GeoPoint::new(
                rng.gen_range(-60.0..60.0),
                rng.gen_range(-170.0..170.0),
            )
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for size in [1_000, 10_000, 100_000] {
        let points = generate_points(42, size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &points, |b, points| {
            b.iter(|| KdTree::from_points(black_box(points.clone())));
        });
    }
    group.finish();
}

fn bench_nearest_neighbors(c: &mut Criterion) {
    let mut group = c.benchmark_group("nearest_neighbors");
    for size in [1_000, 10_000, 100_000] {
        let points = generate_points(42, size);
        let index = KdTree::from_points(points.clone());
        let target = GeoPoint::new(12.34, 56.78);

        group.bench_with_input(BenchmarkId::new("indexed", size), &index, |b, index| {
            b.iter(|| index.nearest_neighbors(black_box(5), black_box(&target)));
        });

        group.bench_with_input(BenchmarkId::new("scan", size), &points, |b, points| {
            b.iter(|| {
                let mut distances: Vec<f64> = points
                    .iter()
                    .map(|p| haversine_distance(p, black_box(&target)))
                    .collect();
                distances.sort_by(f64::total_cmp);
                distances.truncate(5);
                distances
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_nearest_neighbors);
criterion_main!(benches);
