//! Oracle module - On-chain price estimation
//!
//! Builds a log-scale histogram of output amounts, conditions it, and slides
//! a reference stencil of round USD amounts across it to find the implied
//! BTC/USD rate. Data flows strictly forward:
//! `BinSpace -> Histogram -> CurveConditioner -> Aligner -> PriceEstimate`.

mod aligner;
mod bins;
mod conditioner;
mod estimator;
mod histogram;
mod stencil;

pub use aligner::{Aligner, Alignment};
pub use bins::BinSpace;
pub use conditioner::{ConditionedCurve, CurveConditioner};
pub use estimator::PriceOracle;
pub use histogram::{Histogram, HistogramBuilder};
pub use stencil::ReferenceStencil;
