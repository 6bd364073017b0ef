use criterion::{black_box, criterion_group, criterion_main, Criterion};

use utxoracle::oracle::{BinSpace, PriceOracle};
use utxoracle::types::{BlockRange, WINDOW_BLOCKS};

/// Deterministic spread of amounts with a cluster around $100 at $40k
fn amounts() -> Vec<f64> {
    let mut amounts = Vec::with_capacity(400_000);
    let mut amount = 0.000_011;
    while amounts.len() < 300_000 {
        amounts.push(amount);
        amount *= 1.000_07;
        if amount > 20.0 {
            amount = 0.000_011;
        }
    }
    amounts.extend(std::iter::repeat(100.0 / 40_000.0).take(100_000));
    amounts
}

fn bench_histogram(c: &mut Criterion) {
    let bins = BinSpace::new();
    let amounts = amounts();

    c.bench_function("histogram_400k_outputs", |b| {
        b.iter(|| {
            let mut builder = bins.histogram();
            builder.extend(amounts.iter().copied());
            black_box(builder.finish())
        })
    });
}

fn bench_estimate(c: &mut Criterion) {
    let oracle = PriceOracle::new();
    let amounts = amounts();
    let range = BlockRange::ending_at(840_000, WINDOW_BLOCKS).unwrap();

    c.bench_function("estimate_400k_outputs", |b| {
        b.iter(|| black_box(oracle.estimate_from_amounts(amounts.iter().copied(), range)))
    });
}

criterion_group!(benches, bench_histogram, bench_estimate);
criterion_main!(benches);
