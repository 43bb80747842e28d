//! Criterion benchmarks for CoveLab hot paths.
//!
//! Benchmarks:
//! 1. SMA over a long series
//! 2. Signal generation + ledger accounting for one ticker
//! 3. Aggregation across many tickers

use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use covelab_core::domain::PricePoint;
use covelab_core::engine::{aggregate, build_ledger, generate_signals};
use covelab_core::indicators::Sma;

// ── Helpers ──────────────────────────────────────────────────────────

/// Seeded random walk starting at 100.
fn random_walk(ticker: &str, n: usize, seed: u64) -> Vec<PricePoint> {
    let mut rng = StdRng::seed_from_u64(seed);
    let base = chrono::NaiveDate::from_ymd_opt(2000, 1, 3).unwrap();
    let mut price = 100.0_f64;
    (0..n)
        .map(|i| {
            price *= 1.0 + rng.gen_range(-0.03..0.03);
            PricePoint::new(ticker, base + chrono::Duration::days(i as i64), price)
        })
        .collect()
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_sma(c: &mut Criterion) {
    let prices: Vec<f64> = random_walk("AAA", 10_000, 1).iter().map(|p| p.price).collect();
    let mut group = c.benchmark_group("sma");
    for period in [30, 90, 270] {
        group.bench_with_input(BenchmarkId::from_parameter(period), &period, |b, &period| {
            let sma = Sma::new(period);
            b.iter(|| sma.compute(black_box(&prices)))
        });
    }
    group.finish();
}

fn bench_ticker_pipeline(c: &mut Criterion) {
    let prices = random_walk("AAA", 5_000, 7);
    c.bench_function("ticker_pipeline_5000", |b| {
        b.iter(|| {
            let signals = generate_signals(black_box(&prices), 30, 90).unwrap();
            build_ledger(&signals, &prices, 10_000.0, 100).unwrap()
        })
    });
}

fn bench_aggregate(c: &mut Criterion) {
    let ledgers: BTreeMap<String, _> = (0..100u64)
        .map(|i| {
            let ticker = format!("T{i:03}");
            let prices = random_walk(&ticker, 1_250, i);
            let signals = generate_signals(&prices, 30, 90).unwrap();
            let ledger = build_ledger(&signals, &prices, 10_000.0, 100).unwrap();
            (ticker, ledger)
        })
        .collect();
    c.bench_function("aggregate_100x1250", |b| b.iter(|| aggregate(black_box(&ledgers))));
}

criterion_group!(benches, bench_sma, bench_ticker_pipeline, bench_aggregate);
criterion_main!(benches);
