//! Curve Conditioner - turns raw bin counts into a correlatable curve
//!
//! Four steps, always in this order:
//! 1. clip dust (< 1k sats) and large outputs (> ~100 BTC)
//! 2. level the spikes at round BTC amounts
//! 3. normalize the informative region to sum to 1
//! 4. clamp outliers to a fixed ceiling

use tracing::debug;

use crate::error::OracleError;
use crate::oracle::histogram::Histogram;

/// Bins below this index are zeroed (under 1k sats)
const CLIP_BELOW: usize = 401;
/// Bins from this index up are zeroed (over ~100 BTC)
const CLIP_FROM: usize = 1601;
/// First bin of the normalized region
const NORMALIZE_FROM: usize = 201;
/// Normalized values above this are clamped
const OUTLIER_CEILING: f64 = 0.008;

/// Bins of round BTC amounts. These attract volume for reasons unrelated to
/// the USD price and get replaced by the mean of their neighbours.
const ROUND_BTC_BINS: [usize; 18] = [
    201,  // 1k sats
    401,  // 10k
    461,  // 20k
    496,  // 30k
    540,  // 50k
    601,  // 100k
    661,  // 200k
    696,  // 300k
    740,  // 500k
    801,  // 0.01 BTC
    861,  // 0.02
    896,  // 0.03
    940,  // 0.05
    1001, // 0.1
    1061, // 0.2
    1096, // 0.3
    1140, // 0.5
    1201, // 1 BTC
];

/// Normalized, clipped histogram ready for stencil scoring
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionedCurve {
    values: Vec<f64>,
}

impl ConditionedCurve {
    /// Wrap values that were conditioned elsewhere
    pub fn from_values(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveConditioner {
    outlier_ceiling: f64,
}

impl CurveConditioner {
    pub fn new() -> Self {
        Self {
            outlier_ceiling: OUTLIER_CEILING,
        }
    }

    pub fn with_outlier_ceiling(mut self, ceiling: f64) -> Self {
        self.outlier_ceiling = ceiling;
        self
    }

    pub fn outlier_ceiling(&self) -> f64 {
        self.outlier_ceiling
    }

    /// Condition a histogram. Fails with `InsufficientData` when nothing is
    /// left in the informative region to normalize.
    pub fn condition(&self, histogram: &Histogram) -> Result<ConditionedCurve, OracleError> {
        let mut curve = histogram.counts().to_vec();
        let end = CLIP_FROM.min(curve.len());

        for value in curve.iter_mut().take(CLIP_BELOW) {
            *value = 0.0;
        }
        for value in curve.iter_mut().skip(CLIP_FROM) {
            *value = 0.0;
        }

        for &bin in ROUND_BTC_BINS.iter() {
            if bin + 1 >= curve.len() {
                continue;
            }
            curve[bin] = 0.5 * (curve[bin + 1] + curve[bin - 1]);
        }

        let curve_sum: f64 = curve
            .get(NORMALIZE_FROM..end)
            .map(|region| region.iter().sum())
            .unwrap_or(0.0);

        if curve_sum <= 0.0 || !curve_sum.is_finite() {
            return Err(OracleError::InsufficientData {
                observed: histogram.observed(),
            });
        }

        let mut clamped = 0usize;
        for value in &mut curve[NORMALIZE_FROM..end] {
            *value /= curve_sum;
            if *value > self.outlier_ceiling {
                *value = self.outlier_ceiling;
                clamped += 1;
            }
        }

        debug!(curve_sum, clamped, "conditioned output curve");

        Ok(ConditionedCurve { values: curve })
    }
}

impl Default for CurveConditioner {
    fn default() -> Self {
        Self::new()
    }
}
