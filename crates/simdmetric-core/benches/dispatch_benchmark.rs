//! Benchmark kernel resolution and dispatched metric calls.
//!
//! Run with: `cargo bench --bench dispatch_benchmark`

#![allow(clippy::cast_precision_loss)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use simdmetric_core::{
    capabilities, dispatch_table, resolve, resolve_cached, Capability, DataType, Metric,
    MetricKind, CATALOG,
};

fn generate_vector(dim: usize, seed: f32) -> Vec<f32> {
    (0..dim).map(|i| (seed + i as f32 * 0.1).sin()).collect()
}

/// Warmup function to stabilize CPU frequency and caches
fn warmup<F: Fn()>(f: F) {
    for _ in 0..3 {
        f();
    }
}

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");
    let caps = capabilities();

    group.bench_function("resolve", |bencher| {
        bencher.iter(|| {
            resolve(
                black_box(MetricKind::Cosine),
                black_box(DataType::F32),
                caps,
                Capability::ANY,
            )
        });
    });

    group.bench_function("resolve_cached", |bencher| {
        bencher.iter(|| {
            resolve_cached(
                black_box(MetricKind::Cosine),
                black_box(DataType::F32),
                Capability::ANY,
            )
        });
    });

    group.bench_function("dispatch_table_get", |bencher| {
        let table = dispatch_table();
        bencher.iter(|| table.get(black_box(MetricKind::Cosine), black_box(DataType::F32)));
    });

    group.bench_function("catalog_lookup", |bencher| {
        bencher.iter(|| {
            CATALOG.lookup(
                black_box(MetricKind::Cosine),
                black_box(DataType::F32),
                black_box(simdmetric_core::Tier::Serial),
            )
        });
    });

    group.finish();
}

fn bench_metric(c: &mut Criterion, kind: MetricKind, name: &str) {
    let mut group = c.benchmark_group(name);
    let best = Metric::new(kind, DataType::F32).expect("f32 metric");
    let serial = Metric::with_allowed(kind, DataType::F32, Capability::SERIAL).expect("serial");

    for dim in &[128, 384, 768, 1536] {
        let a = generate_vector(*dim, 0.0);
        let b = generate_vector(*dim, 1.0);

        group.bench_with_input(BenchmarkId::new("serial", dim), dim, |bencher, _| {
            warmup(|| {
                let _ = serial.real(&a, &b);
            });
            bencher.iter(|| serial.real(black_box(&a), black_box(&b)));
        });

        group.bench_with_input(
            BenchmarkId::new(format!("dispatched_{}", best.tier()), dim),
            dim,
            |bencher, _| {
                warmup(|| {
                    let _ = best.real(&a, &b);
                });
                bencher.iter(|| best.real(black_box(&a), black_box(&b)));
            },
        );
    }

    group.finish();
}

fn bench_dot(c: &mut Criterion) {
    bench_metric(c, MetricKind::Inner, "dot_product");
}

fn bench_cosine(c: &mut Criterion) {
    bench_metric(c, MetricKind::Cosine, "cosine_distance");
}

fn bench_sqeuclidean(c: &mut Criterion) {
    bench_metric(c, MetricKind::SqEuclidean, "sqeuclidean");
}

fn bench_hamming(c: &mut Criterion) {
    let mut group = c.benchmark_group("hamming_b8");
    let best = Metric::new(MetricKind::Hamming, DataType::B8).expect("b8 metric");
    let serial = Metric::with_allowed(MetricKind::Hamming, DataType::B8, Capability::SERIAL)
        .expect("serial");

    for bytes in &[64_usize, 256, 1024] {
        let a: Vec<u8> = (0..*bytes).map(|i| (i * 31 % 251) as u8).collect();
        let b: Vec<u8> = (0..*bytes).map(|i| (i * 17 % 241) as u8).collect();

        group.bench_with_input(BenchmarkId::new("serial", bytes), bytes, |bencher, _| {
            bencher.iter(|| serial.real(black_box(&a), black_box(&b)));
        });
        group.bench_with_input(
            BenchmarkId::new(format!("dispatched_{}", best.tier()), bytes),
            bytes,
            |bencher, _| {
                bencher.iter(|| best.real(black_box(&a), black_box(&b)));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_resolution,
    bench_dot,
    bench_cosine,
    bench_sqeuclidean,
    bench_hamming
);
criterion_main!(benches);
