//! Criterion benchmarks for the IEEE-754 minimizer.
//!
//! Run with:
//!   cargo bench --bench float

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use qcbor::float::{double_to_int, shrink_double_as_smallest};

fn sample_doubles() -> Vec<f64> {
    vec![
        0.0,
        -0.0,
        1.5,
        3.1415926535,
        1.0e300,
        1.0e-300,
        f64::MAX,
        f64::MIN_POSITIVE,
        -1234.5,
        42.0,
        f64::INFINITY,
        f64::NAN,
    ]
}

fn bench_shrink_double_as_smallest(c: &mut Criterion) {
    let samples = sample_doubles();
    let mut group = c.benchmark_group("shrink_double_as_smallest");
    for (i, &d) in samples.iter().enumerate() {
        group.bench_with_input(BenchmarkId::new("sample", i), &d, |b, &d| {
            b.iter(|| shrink_double_as_smallest(d, true));
        });
    }
    group.finish();
}

fn bench_double_to_int(c: &mut Criterion) {
    let samples = [0.0, -1.0, 42.0, 1.0e18, -1.0e18, 9_223_372_036_854_775_808.0];
    let mut group = c.benchmark_group("double_to_int");
    for (i, &d) in samples.iter().enumerate() {
        group.bench_with_input(BenchmarkId::new("sample", i), &d, |b, &d| {
            b.iter(|| double_to_int(d));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_shrink_double_as_smallest, bench_double_to_int);
criterion_main!(benches);
