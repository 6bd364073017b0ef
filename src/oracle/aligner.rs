//! Aligner - slides the reference stencil over the conditioned curve
//!
//! The best slide and its better neighbour are each turned into a USD rate
//! and blended, weighted by how far each score stands above the mean.

use crate::error::OracleError;
use crate::oracle::bins::BinSpace;
use crate::oracle::conditioner::ConditionedCurve;
use crate::oracle::stencil::ReferenceStencil;

/// Bin holding the $100 anchor at slide 0
const ANCHOR_BIN: usize = 801;
const ANCHOR_USD: f64 = 100.0;
const MIN_SLIDE: i64 = -200;
const MAX_SLIDE: i64 = 200;

/// Outcome of sliding the stencil
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alignment {
    pub best_slide: i64,
    pub best_score: f64,
    pub neighbor_slide: i64,
    pub neighbor_score: f64,
    pub avg_score: f64,
    /// USD per BTC implied by the best slide
    pub best_rate: f64,
    /// USD per BTC implied by the neighbour slide
    pub neighbor_rate: f64,
    /// Weighted blend of the two rates, truncated
    pub price: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aligner {
    min_slide: i64,
    max_slide: i64,
}

impl Aligner {
    pub fn new() -> Self {
        Self {
            min_slide: MIN_SLIDE,
            max_slide: MAX_SLIDE,
        }
    }

    /// Trial slides, half-open
    pub fn slide_range(&self) -> std::ops::Range<i64> {
        self.min_slide..self.max_slide
    }

    pub fn align(
        &self,
        curve: &ConditionedCurve,
        stencil: &ReferenceStencil,
        bins: &BinSpace,
    ) -> Result<Alignment, OracleError> {
        let values = curve.values();
        let score_at = |slide: i64| -> Result<f64, OracleError> {
            stencil
                .score(values, slide)
                .ok_or(OracleError::SlideOutOfRange { slide })
        };

        let mut best_slide = 0;
        let mut best_score = 0.0;
        let mut total_score = 0.0;
        let mut number_of_scores = 0u32;

        for slide in self.slide_range() {
            let score = score_at(slide)?;
            total_score += score;
            number_of_scores += 1;

            if score > best_score {
                best_score = score;
                best_slide = slide;
            }
        }

        // The neighbour may sit one step outside the trial range; its bins
        // are still inside the curve.
        let up_score = score_at(best_slide + 1)?;
        let down_score = score_at(best_slide - 1)?;
        let (neighbor_slide, neighbor_score) = if down_score > up_score {
            (best_slide - 1, down_score)
        } else {
            (best_slide + 1, up_score)
        };

        let best_rate = Self::rate_at(bins, best_slide)?;
        let neighbor_rate = Self::rate_at(bins, neighbor_slide)?;

        let avg_score = total_score / f64::from(number_of_scores.max(1));
        let a1 = best_score - avg_score;
        let a2 = (neighbor_score - avg_score).abs();
        let spread = a1 + a2;
        if spread == 0.0 || !spread.is_finite() {
            return Err(OracleError::DegenerateAlignment {
                best_score,
                avg_score,
            });
        }

        let w1 = a1 / spread;
        let w2 = a2 / spread;
        let price = (w1 * best_rate + w2 * neighbor_rate).trunc() as u64;

        Ok(Alignment {
            best_slide,
            best_score,
            neighbor_slide,
            neighbor_score,
            avg_score,
            best_rate,
            neighbor_rate,
            price,
        })
    }

    /// USD per BTC if the $100 anchor sits `slide` bins from bin 801
    fn rate_at(bins: &BinSpace, slide: i64) -> Result<f64, OracleError> {
        let edge = usize::try_from(ANCHOR_BIN as i64 + slide)
            .ok()
            .and_then(|bin| bins.edge(bin))
            .filter(|edge| *edge > 0.0)
            .ok_or(OracleError::SlideOutOfRange { slide })?;
        Ok(ANCHOR_USD / edge)
    }
}

impl Default for Aligner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve_with(spikes: &[(usize, f64)]) -> ConditionedCurve {
        let mut values = vec![0.0; BinSpace::LEN];
        for &(bin, value) in spikes {
            values[bin] = value;
        }
        ConditionedCurve::from_values(values)
    }

    #[test]
    fn test_single_spike_on_anchor() {
        let bins = BinSpace::new();
        let stencil = ReferenceStencil::new();
        // $100 weight is the heaviest, so the spike at 801 + 40 pulls slide 40
        let alignment = Aligner::new()
            .align(&curve_with(&[(841, 0.008)]), &stencil, &bins)
            .unwrap();

        assert_eq!(alignment.best_slide, 40);
        assert_eq!(alignment.best_rate, 100.0 / bins.edges()[841]);
        assert!(alignment.best_score > alignment.avg_score);
    }

    #[test]
    fn test_blend_stays_between_rates() {
        let bins = BinSpace::new();
        let stencil = ReferenceStencil::new();
        let alignment = Aligner::new()
            .align(
                &curve_with(&[(700, 0.008), (701, 0.006), (300, 0.001)]),
                &stencil,
                &bins,
            )
            .unwrap();

        let lo = alignment.best_rate.min(alignment.neighbor_rate);
        let hi = alignment.best_rate.max(alignment.neighbor_rate);
        assert!((alignment.price as f64) >= lo.trunc());
        assert!((alignment.price as f64) <= hi);
        assert_eq!((alignment.best_slide - alignment.neighbor_slide).abs(), 1);
    }

    #[test]
    fn test_flat_scores_are_degenerate() {
        let bins = BinSpace::new();
        let stencil = ReferenceStencil::new();
        // nothing under any stencil position: every score equals the mean
        let err = Aligner::new()
            .align(&curve_with(&[(2000, 0.5)]), &stencil, &bins)
            .unwrap_err();

        assert!(matches!(
            err,
            OracleError::DegenerateAlignment { best_score, avg_score }
                if best_score == 0.0 && avg_score == 0.0
        ));
    }

    #[test]
    fn test_stencil_fits_every_slide() {
        let stencil = ReferenceStencil::new();
        let aligner = Aligner::new();
        let (first, last) = stencil.bin_span();
        let lowest = first as i64 + aligner.slide_range().start - 1;
        let highest = last as i64 + aligner.slide_range().end;

        assert!(lowest >= 0);
        assert!((highest as usize) < BinSpace::LEN);
    }

    #[test]
    fn test_best_slide_at_range_edge() {
        let bins = BinSpace::new();
        let stencil = ReferenceStencil::new();
        // $100 weight lands on 1000 only at slide 199, the last trial slide
        let alignment = Aligner::new()
            .align(&curve_with(&[(1000, 0.008)]), &stencil, &bins)
            .unwrap();

        assert_eq!(alignment.best_slide, 199);
        assert!(alignment.neighbor_slide == 200 || alignment.neighbor_slide == 198);
    }
}
