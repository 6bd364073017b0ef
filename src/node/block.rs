//! Raw block decoding

use bitcoin::consensus::deserialize;
use bitcoin::Block;

use crate::error::OracleError;

/// Decode a hex-serialized block and return the satoshi value of every
/// transaction output, coinbase included.
pub fn decode_block_outputs(height: u64, raw_hex: &str) -> Result<Vec<u64>, OracleError> {
    let bytes = hex::decode(raw_hex.trim()).map_err(|e| OracleError::MalformedBlockData {
        height,
        reason: format!("invalid hex: {}", e),
    })?;

    let block: Block = deserialize(&bytes).map_err(|e| OracleError::MalformedBlockData {
        height,
        reason: e.to_string(),
    })?;

    Ok(block
        .txdata
        .iter()
        .flat_map(|tx| tx.output.iter())
        .map(|output| output.value.to_sat())
        .collect())
}
