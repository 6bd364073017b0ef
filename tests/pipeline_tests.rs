//! End-to-end oracle runs against a synthetic chain

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

use utxoracle::oracle::{Aligner, BinSpace, ConditionedCurve, PriceOracle, ReferenceStencil};
use utxoracle::types::{BlockRange, WINDOW_BLOCKS};
use utxoracle::{BlockSource, OracleError, RpcError};

/// In-memory chain: a tip height and the outputs of the blocks it holds
struct SyntheticChain {
    tip: u64,
    blocks: HashMap<u64, Vec<u64>>,
}

impl SyntheticChain {
    /// Spread `outputs` round-robin over the 144 blocks ending at `tip`
    fn with_day(tip: u64, outputs: Vec<u64>) -> Self {
        let range = BlockRange::ending_at(tip, WINDOW_BLOCKS).unwrap();
        let mut blocks: HashMap<u64, Vec<u64>> =
            range.heights().map(|height| (height, Vec::new())).collect();
        for (i, sats) in outputs.into_iter().enumerate() {
            let height = range.start + (i as u64 % WINDOW_BLOCKS);
            blocks.get_mut(&height).unwrap().push(sats);
        }
        Self { tip, blocks }
    }
}

#[async_trait]
impl BlockSource for SyntheticChain {
    async fn chain_height(&self) -> Result<u64, OracleError> {
        Ok(self.tip)
    }

    async fn block_outputs(&self, height: u64) -> Result<Vec<u64>, OracleError> {
        self.blocks
            .get(&height)
            .cloned()
            .ok_or_else(|| OracleError::BlockUnavailable {
                height,
                source: RpcError::Node {
                    code: -8,
                    message: "Block height out of range".to_string(),
                },
            })
    }
}

const ROUND_USD: [f64; 13] = [
    1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0, 200.0, 500.0, 1000.0, 2000.0, 5000.0, 10000.0,
];

/// A day of payments at round USD amounts (a little under, for fees) over
/// log-uniform background noise between 1k sats and 10 BTC.
fn synthetic_day(usd_per_btc: f64, seed: u64) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut outputs = Vec::new();

    for usd in ROUND_USD {
        for _ in 0..300 {
            let fee = 1.0 - rng.gen::<f64>() * 0.004;
            outputs.push((usd / usd_per_btc * fee * 1e8).round() as u64);
        }
    }
    for _ in 0..30_000 {
        let btc = 10f64.powf(rng.gen_range(-5.0..1.0));
        outputs.push((btc * 1e8).round() as u64);
    }
    outputs
}

fn assert_close(estimate: u64, usd_per_btc: f64) {
    let error = (estimate as f64 - usd_per_btc).abs() / usd_per_btc;
    assert!(
        error < 0.03,
        "estimate {} is {:.2}% off {}",
        estimate,
        error * 100.0,
        usd_per_btc
    );
}

#[test]
fn test_recovers_price_across_range() {
    for (seed, usd_per_btc) in [(1, 12_345.0), (2, 23_456.0), (3, 61_000.0), (4, 88_000.0)] {
        let chain = SyntheticChain::with_day(830_000, synthetic_day(usd_per_btc, seed));
        let estimate = tokio_test::block_on(PriceOracle::new().estimate(&chain)).unwrap();

        assert_eq!(estimate.last_x_blocks, 144);
        assert_eq!(estimate.starting_block, 829_857);
        assert_eq!(estimate.ending_block, 830_000);
        assert_close(estimate.estimated_price, usd_per_btc);
    }
}

#[test]
fn test_historical_window() {
    let mut chain = SyntheticChain::with_day(700_000, synthetic_day(37_000.0, 9));
    chain.tip = 900_000;

    let estimate =
        tokio_test::block_on(PriceOracle::new().estimate_ending_at(&chain, 700_000)).unwrap();
    assert_eq!(estimate.ending_block, 700_000);
    assert_close(estimate.estimated_price, 37_000.0);
}

#[test]
fn test_runs_are_deterministic() {
    let chain = SyntheticChain::with_day(830_000, synthetic_day(42_000.0, 5));
    let oracle = PriceOracle::new();

    let first = tokio_test::block_on(oracle.estimate(&chain)).unwrap();
    let second = tokio_test::block_on(oracle.estimate(&chain)).unwrap();
    let fresh = tokio_test::block_on(PriceOracle::new().estimate(&chain)).unwrap();

    assert_eq!(first, second);
    assert_eq!(first, fresh);
}

#[test]
fn test_missing_block_is_unavailable() {
    let mut chain = SyntheticChain::with_day(830_000, synthetic_day(42_000.0, 6));
    chain.blocks.remove(&829_950);

    let err = tokio_test::block_on(PriceOracle::new().estimate(&chain)).unwrap_err();
    assert!(matches!(
        err,
        OracleError::BlockUnavailable { height: 829_950, .. }
    ));
}

#[test]
fn test_window_without_usable_outputs() {
    // dust and whales only
    let outputs = vec![50, 99, 100, 200_000_000_000_000, 5_000_000_000_000];
    let chain = SyntheticChain::with_day(830_000, outputs);

    let err = tokio_test::block_on(PriceOracle::new().estimate(&chain)).unwrap_err();
    assert!(matches!(err, OracleError::InsufficientData { observed: 5 }));
}

#[test]
fn test_whole_btc_outputs_are_levelled_away() {
    // 1 BTC is a round BTC amount, so a day of nothing but 1 BTC outputs
    // leaves no signal once round amounts are smoothed.
    let oracle = PriceOracle::new();
    let range = BlockRange::ending_at(830_000, WINDOW_BLOCKS).unwrap();

    let err = oracle
        .estimate_from_amounts(std::iter::repeat(1.0).take(1_000_000), range)
        .unwrap_err();
    assert!(matches!(
        err,
        OracleError::InsufficientData { observed: 1_000_000 }
    ));
}

#[test]
fn test_flat_curve_is_degenerate() {
    let bins = BinSpace::new();
    let stencil = ReferenceStencil::new();
    // mass only above every stencil position
    let mut values = vec![0.0; bins.len()];
    values[1550] = 0.008;
    values[1551] = 0.008;

    let err = Aligner::new()
        .align(&ConditionedCurve::from_values(values), &stencil, &bins)
        .unwrap_err();
    assert!(matches!(err, OracleError::DegenerateAlignment { .. }));
}
