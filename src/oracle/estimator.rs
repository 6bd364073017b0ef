//! Price Oracle - drives one estimation run
//!
//! Picks the block window, streams its outputs into a histogram and hands
//! the result down the pipeline. No numeric work happens here.

use futures_util::{pin_mut, StreamExt};
use tracing::{debug, info};

use crate::error::OracleError;
use crate::node::{outputs_in_range, BlockSource};
use crate::oracle::aligner::{Aligner, Alignment};
use crate::oracle::bins::BinSpace;
use crate::oracle::conditioner::CurveConditioner;
use crate::oracle::histogram::Histogram;
use crate::oracle::stencil::ReferenceStencil;
use crate::types::{BlockRange, PriceEstimate, WINDOW_BLOCKS};

/// Immutable pipeline configuration, reusable across runs
#[derive(Debug, Clone)]
pub struct PriceOracle {
    bins: BinSpace,
    stencil: ReferenceStencil,
    conditioner: CurveConditioner,
    aligner: Aligner,
    window_blocks: u64,
}

impl PriceOracle {
    pub fn new() -> Self {
        Self {
            bins: BinSpace::new(),
            stencil: ReferenceStencil::new(),
            conditioner: CurveConditioner::new(),
            aligner: Aligner::new(),
            window_blocks: WINDOW_BLOCKS,
        }
    }

    pub fn bins(&self) -> &BinSpace {
        &self.bins
    }

    pub fn window_blocks(&self) -> u64 {
        self.window_blocks
    }

    /// Estimate over the last day of blocks ending at the current tip
    pub async fn estimate<S>(&self, source: &S) -> Result<PriceEstimate, OracleError>
    where
        S: BlockSource + ?Sized,
    {
        let tip = source.chain_height().await?;
        self.estimate_ending_at(source, tip).await
    }

    /// Estimate over the day of blocks ending at `end_height`
    pub async fn estimate_ending_at<S>(
        &self,
        source: &S,
        end_height: u64,
    ) -> Result<PriceEstimate, OracleError>
    where
        S: BlockSource + ?Sized,
    {
        let range = BlockRange::ending_at(end_height, self.window_blocks)?;
        info!(
            start = range.start,
            end = range.end,
            "📥 Estimating price for last day ({} blocks)",
            range.len()
        );

        let mut builder = self.bins.histogram();
        let blocks = outputs_in_range(source, range);
        pin_mut!(blocks);

        let mut scanned = 0u64;
        while let Some(block) = blocks.next().await {
            let block = block?;
            scanned += 1;
            debug!(
                height = block.height,
                outputs = block.amounts.len(),
                "Scanned block ({:.2}% complete)",
                100.0 * scanned as f64 / range.len() as f64
            );
            builder.extend_sats(block.amounts);
        }

        let histogram = builder.finish();
        self.estimate_from_histogram(&histogram, range)
    }

    /// Run the pipeline over amounts (in BTC) already in hand
    pub fn estimate_from_amounts<I>(
        &self,
        amounts: I,
        range: BlockRange,
    ) -> Result<PriceEstimate, OracleError>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut builder = self.bins.histogram();
        builder.extend(amounts);
        self.estimate_from_histogram(&builder.finish(), range)
    }

    pub fn estimate_from_histogram(
        &self,
        histogram: &Histogram,
        range: BlockRange,
    ) -> Result<PriceEstimate, OracleError> {
        let alignment = self.align(histogram)?;
        let estimate = PriceEstimate::new(alignment.price, range);

        info!(
            price = estimate.estimated_price,
            starting_block = estimate.starting_block,
            ending_block = estimate.ending_block,
            "✅ Estimated price for last {} blocks",
            estimate.last_x_blocks
        );
        Ok(estimate)
    }

    /// Condition and align a histogram, keeping the diagnostics
    pub fn align(&self, histogram: &Histogram) -> Result<Alignment, OracleError> {
        let curve = self.conditioner.condition(histogram)?;
        let alignment = self.aligner.align(&curve, &self.stencil, &self.bins)?;

        info!(
            accepted = histogram.total(),
            observed = histogram.observed(),
            best_slide = alignment.best_slide,
            neighbor_slide = alignment.neighbor_slide,
            best_score = alignment.best_score,
            avg_score = alignment.avg_score,
            "Stencil aligned"
        );
        Ok(alignment)
    }
}

impl Default for PriceOracle {
    fn default() -> Self {
        Self::new()
    }
}
