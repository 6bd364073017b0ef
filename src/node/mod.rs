//! Node access - chain height and block outputs
//!
//! The oracle only needs two things from a node, kept behind `BlockSource`
//! so the pipeline can run against synthetic data.

mod block;
mod rpc;

pub use block::decode_block_outputs;
pub use rpc::BitcoindClient;

use async_trait::async_trait;
use futures_util::stream::{self, Stream, StreamExt};

use crate::error::OracleError;
use crate::types::{BlockOutputs, BlockRange};

/// Trait for block data providers
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlockSource: Send + Sync {
    /// Current best block height
    async fn chain_height(&self) -> Result<u64, OracleError>;

    /// Satoshi value of every output of every transaction in the block
    async fn block_outputs(&self, height: u64) -> Result<Vec<u64>, OracleError>;
}

/// Lazily fetch the outputs of each block in `range`, in ascending height
/// order. Nothing is requested until the stream is polled.
pub fn outputs_in_range<'a, S>(
    source: &'a S,
    range: BlockRange,
) -> impl Stream<Item = Result<BlockOutputs, OracleError>> + 'a
where
    S: BlockSource + ?Sized,
{
    stream::iter(range.heights()).then(move |height| async move {
        let amounts = source.block_outputs(height).await?;
        Ok(BlockOutputs { height, amounts })
    })
}
