//! UTXOracle Library
//!
//! Estimates the BTC/USD rate from nothing but the output amounts of the
//! last day of blocks.

pub mod config;
pub mod error;
pub mod node;
pub mod oracle;
pub mod types;

pub use error::{OracleError, RpcError};
pub use node::{BitcoindClient, BlockSource};
pub use oracle::PriceOracle;
pub use types::{BlockOutputs, BlockRange, PriceEstimate};
