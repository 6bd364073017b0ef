//! UTXOracle - on-chain BTC/USD price estimate
//!
//! Reads the last 144 blocks from a bitcoind node and prints the estimate as
//! JSON on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use utxoracle::config::{AppConfig, LoggingConfig};
use utxoracle::{BitcoindClient, PriceOracle};

fn init_tracing(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config.logging);
    info!(config = %config, "🚀 Starting UTXOracle v{}", env!("CARGO_PKG_VERSION"));

    let client = BitcoindClient::from_config(&config.node)?;
    let oracle = PriceOracle::new();

    let estimate = match config.oracle.end_height {
        Some(height) => oracle.estimate_ending_at(&client, height).await,
        None => oracle.estimate(&client).await,
    }
    .with_context(|| format!("Price estimation against {} failed", client.url()))?;

    let json = if config.output.pretty {
        serde_json::to_string_pretty(&estimate)?
    } else {
        serde_json::to_string(&estimate)?
    };
    println!("{}", json);

    Ok(())
}
