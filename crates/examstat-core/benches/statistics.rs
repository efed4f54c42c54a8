use criterion::{black_box, criterion_group, criterion_main, Criterion};

use examstat_core::statistics::{
    kurtosis, median, point_biserial_correlation, skewness, standard_deviation,
};

/// Deterministic pseudo-random ratios in `[0, 1)`.
fn ratios(n: usize) -> Vec<f64> {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    (0..n)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            (state >> 11) as f64 / (1u64 << 53) as f64
        })
        .collect()
}

fn bench_moments(c: &mut Criterion) {
    let mut group = c.benchmark_group("moments");

    for n in [30, 300, 3000] {
        let data = ratios(n);
        group.bench_function(format!("sd+skew+kurt n={n}"), |b| {
            b.iter(|| {
                (
                    standard_deviation(black_box(&data)),
                    skewness(black_box(&data)),
                    kurtosis(black_box(&data)),
                )
            })
        });
        group.bench_function(format!("median n={n}"), |b| {
            b.iter(|| median(black_box(&data)))
        });
    }

    group.finish();
}

fn bench_point_biserial(c: &mut Criterion) {
    let mut group = c.benchmark_group("point_biserial");

    for n in [30, 300, 3000] {
        let totals = ratios(n);
        let item: Vec<bool> = totals.iter().map(|t| *t > 0.5).collect();
        group.bench_function(format!("n={n}"), |b| {
            b.iter(|| point_biserial_correlation(black_box(&item), black_box(&totals)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_moments, bench_point_biserial);
criterion_main!(benches);
