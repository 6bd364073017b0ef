//! Error types for the oracle pipeline and the node client.

use thiserror::Error;

/// Failure of a single oracle run. None of these are retried internally.
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("could not read chain height from node: {source}")]
    ChainHeightUnavailable {
        #[source]
        source: RpcError,
    },

    #[error("chain tip {tip} is below a {window}-block window")]
    ChainTooShort { tip: u64, window: u64 },

    #[error("block {height} unavailable: {source}")]
    BlockUnavailable {
        height: u64,
        #[source]
        source: RpcError,
    },

    #[error("block {height} could not be decoded: {reason}")]
    MalformedBlockData { height: u64, reason: String },

    #[error("insufficient data: no usable outputs among {observed} observed amounts")]
    InsufficientData { observed: u64 },

    #[error("stencil slide {slide} reaches past the histogram")]
    SlideOutOfRange { slide: i64 },

    #[error("degenerate alignment: best score {best_score} and neighbor both equal the mean {avg_score}")]
    DegenerateAlignment { best_score: f64, avg_score: f64 },
}

/// Node RPC errors.
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("node returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("node error {code}: {message}")]
    Node { code: i64, message: String },

    #[error("response to {method} carried no result")]
    MissingResult { method: String },

    #[error("unexpected response to {method}: {source}")]
    Decode {
        method: String,
        #[source]
        source: serde_json::Error,
    },
}
