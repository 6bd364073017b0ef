//! Output amount histogram over a `BinSpace`

use crate::oracle::bins::BinSpace;
use crate::types::sats_to_btc;

/// Accumulates counts per bin in a single forward pass.
///
/// Only the builder mutates counts; `finish` hands back a read-only
/// `Histogram`.
#[derive(Debug)]
pub struct HistogramBuilder<'a> {
    bins: &'a BinSpace,
    counts: Vec<f64>,
    observed: u64,
}

impl<'a> HistogramBuilder<'a> {
    pub fn new(bins: &'a BinSpace) -> Self {
        Self {
            bins,
            counts: vec![0.0; bins.len()],
            observed: 0,
        }
    }

    /// Count one BTC amount. Returns false when the amount was filtered out.
    pub fn push(&mut self, amount: f64) -> bool {
        self.observed += 1;
        match self.bins.bin_index(amount) {
            Some(bin) => {
                self.counts[bin] += 1.0;
                true
            }
            None => false,
        }
    }

    pub fn push_sats(&mut self, sats: u64) -> bool {
        self.push(sats_to_btc(sats))
    }

    pub fn extend_sats<I>(&mut self, sats: I)
    where
        I: IntoIterator<Item = u64>,
    {
        for value in sats {
            self.push_sats(value);
        }
    }

    pub fn finish(self) -> Histogram {
        Histogram {
            counts: self.counts,
            observed: self.observed,
        }
    }
}

impl Extend<f64> for HistogramBuilder<'_> {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, amounts: I) {
        for amount in amounts {
            self.push(amount);
        }
    }
}

/// Completed histogram, index-aligned with the `BinSpace` it was built on
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    counts: Vec<f64>,
    observed: u64,
}

impl Histogram {
    pub fn counts(&self) -> &[f64] {
        &self.counts
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Amounts offered to the builder, accepted or not
    pub fn observed(&self) -> u64 {
        self.observed
    }

    /// Amounts that landed in a bin
    pub fn total(&self) -> f64 {
        self.counts.iter().sum()
    }
}
