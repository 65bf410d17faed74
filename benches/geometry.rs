//! Benchmark the per-tick geometry work on simulated scans.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use pathik::core::{DeltaPose, Direction, RotationDirection};
use pathik::geometry::{LidarGeometry, extract_lines};
use pathik::robot::{infer_rotation, perceive};
use pathik::sensors::LidarScan;
use pathik::sim::{Arena, SimConfig, SimPose, SimWorld};

/// One scan of the standard arena from the clockwise start pose.
fn arena_scan(samples: usize) -> LidarScan {
    let arena = Arena::standard();
    let start = arena.start_pose(RotationDirection::Clockwise);
    let config = SimConfig {
        seed: 7,
        lidar_samples: samples,
        ..SimConfig::default()
    };
    SimWorld::new(arena, start, config).scan()
}

fn bench_perceive(c: &mut Criterion) {
    let geometry = LidarGeometry::default();
    let scan = arena_scan(720);
    let delta = DeltaPose::new(0.0, 0.02, 1.5);

    c.bench_function("perceive_720pts", |b| {
        b.iter(|| {
            let perception = perceive(
                &geometry,
                black_box(&scan),
                black_box(&delta),
                Direction::North,
                0.0,
            );
            black_box(perception)
        })
    });

    c.bench_function("infer_rotation_720pts", |b| {
        b.iter(|| black_box(infer_rotation(&geometry, black_box(&scan), &DeltaPose::ZERO, 0.0)))
    });
}

fn bench_split_merge_resolutions(c: &mut Criterion) {
    let mut group = c.benchmark_group("split_merge_resolution");
    let geometry = LidarGeometry::default();

    for samples in [360, 720, 1440] {
        let scan = arena_scan(samples);
        let points = geometry.points(&scan, &DeltaPose::ZERO);

        group.bench_with_input(BenchmarkId::from_parameter(samples), &points, |b, points| {
            b.iter(|| {
                black_box(extract_lines(
                    black_box(points),
                    &geometry.config().split_merge,
                ))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_perceive, bench_split_merge_resolutions);
criterion_main!(benches);
