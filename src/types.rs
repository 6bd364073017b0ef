//! Core types used throughout UTXOracle
//!
//! Block windows, per-block output amounts and the final price estimate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

use crate::error::OracleError;

/// Satoshis per bitcoin
pub const SATS_PER_BTC: f64 = 100_000_000.0;

/// Number of blocks analysed per run (one day at ~10 minute spacing)
pub const WINDOW_BLOCKS: u64 = 144;

/// Convert a satoshi value to a BTC amount
pub fn sats_to_btc(sats: u64) -> f64 {
    sats as f64 / SATS_PER_BTC
}

/// Inclusive range of block heights
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRange {
    pub start: u64,
    pub end: u64,
}

impl BlockRange {
    /// The `window` blocks ending at (and including) `end`.
    pub fn ending_at(end: u64, window: u64) -> Result<Self, OracleError> {
        if window == 0 || end < window - 1 {
            return Err(OracleError::ChainTooShort { tip: end, window });
        }
        Ok(Self {
            start: end - (window - 1),
            end,
        })
    }

    /// Number of blocks in the range
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn heights(&self) -> RangeInclusive<u64> {
        self.start..=self.end
    }
}

impl fmt::Display for BlockRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Output values of every transaction in one block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockOutputs {
    pub height: u64,
    /// Output values in satoshis, coinbase included
    pub amounts: Vec<u64>,
}

/// Result of one oracle run
///
/// Field names are the wire format consumers already parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceEstimate {
    pub last_x_blocks: u64,
    /// USD per BTC, truncated toward zero
    pub estimated_price: u64,
    pub starting_block: u64,
    pub ending_block: u64,
}

impl PriceEstimate {
    pub fn new(estimated_price: u64, range: BlockRange) -> Self {
        Self {
            last_x_blocks: range.len(),
            estimated_price,
            starting_block: range.start,
            ending_block: range.end,
        }
    }
}

impl fmt::Display for PriceEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "${} per BTC over blocks {}..={} ({} blocks)",
            self.estimated_price, self.starting_block, self.ending_block, self.last_x_blocks
        )
    }
}
