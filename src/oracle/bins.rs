//! Bin Space - log-uniform bin edges from 1e-6 to 1e6 BTC

use crate::oracle::histogram::HistogramBuilder;

/// Ordered, strictly increasing bin edges in BTC.
///
/// Edge 0 is a zero bin; after it come 200 edges per decade for the 12
/// decades starting at 1e-6 BTC (100 sats). Bin `i` covers
/// `[edges[i], edges[i + 1])` and the last bin is open-ended.
#[derive(Debug, Clone, PartialEq)]
pub struct BinSpace {
    edges: Vec<f64>,
}

impl BinSpace {
    /// log10 of the first non-zero edge
    pub const FIRST_EXPONENT: i32 = -6;
    /// log10 one past the last edge
    pub const LAST_EXPONENT: i32 = 6;
    pub const BINS_PER_DECADE: usize = 200;
    /// Amounts at or below this are dust for pricing purposes
    pub const MIN_AMOUNT: f64 = 1e-6;
    pub const MAX_AMOUNT: f64 = 1e6;
    /// Zero bin plus 12 decades of 200
    pub const LEN: usize =
        1 + (Self::LAST_EXPONENT - Self::FIRST_EXPONENT) as usize * Self::BINS_PER_DECADE;

    pub fn new() -> Self {
        let mut edges = Vec::with_capacity(Self::LEN);
        edges.push(0.0);

        for exponent in Self::FIRST_EXPONENT..Self::LAST_EXPONENT {
            for b in 0..Self::BINS_PER_DECADE {
                let offset = b as f64 / Self::BINS_PER_DECADE as f64;
                edges.push(10f64.powf(exponent as f64 + offset));
            }
        }

        Self { edges }
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn edge(&self, index: usize) -> Option<f64> {
        self.edges.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Whether an amount is informative enough to be binned at all
    pub fn accepts(&self, amount: f64) -> bool {
        amount > Self::MIN_AMOUNT && amount < Self::MAX_AMOUNT
    }

    /// Index of the bin holding `amount`, or `None` outside `(1e-6, 1e6)`.
    ///
    /// The log projection only estimates the index; a forward scan then
    /// settles on the greatest edge `<= amount`. The estimate never lands
    /// past the true bin, so the scan never needs to go backwards, and an
    /// amount equal to an edge is placed in that edge's bin.
    pub fn bin_index(&self, amount: f64) -> Option<usize> {
        if !self.accepts(amount) {
            return None;
        }

        let range = (Self::LAST_EXPONENT - Self::FIRST_EXPONENT) as f64;
        let percent_in_range = (amount.log10() - Self::FIRST_EXPONENT as f64) / range;
        let mut estimate = (percent_in_range * self.edges.len() as f64) as usize;

        // invariant: every edge before `estimate` is <= amount
        while estimate < self.edges.len() && self.edges[estimate] <= amount {
            estimate += 1;
        }

        Some(estimate - 1)
    }

    /// Start accumulating a histogram over these bins
    pub fn histogram(&self) -> HistogramBuilder<'_> {
        HistogramBuilder::new(self)
    }
}

impl Default for BinSpace {
    fn default() -> Self {
        Self::new()
    }
}
