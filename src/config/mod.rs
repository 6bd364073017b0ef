//! Configuration management for UTXOracle
//!
//! Loads from optional config files + environment variables via .env

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub node: NodeConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    /// bitcoind JSON-RPC endpoint
    pub rpc_url: String,
    pub rpc_user: Option<String>,
    pub rpc_password: Option<String>,
    /// Path to bitcoind's `.cookie`, used when no user/password is set
    pub cookie_file: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OracleConfig {
    /// End the window at this height instead of the chain tip
    pub end_height: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Pretty-print the JSON result
    pub pretty: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    pub level: String,
    /// Emit JSON log lines
    pub json: bool,
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        // Load .env file first
        dotenvy::dotenv().ok();

        let config = Self::defaults()?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (UTXORACLE_*)
            .add_source(Environment::with_prefix("UTXORACLE").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        app_config.validate()?;
        Ok(app_config)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(Config::builder()
            // Node defaults
            .set_default("node.rpc_url", "http://127.0.0.1:8332")?
            .set_default("node.timeout_secs", 30)?
            // Output defaults
            .set_default("output.pretty", false)?
            // Logging defaults
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?)
    }

    /// Reject settings that cannot produce a working client
    pub fn validate(&self) -> Result<()> {
        if self.node.rpc_url.trim().is_empty() {
            bail!("node.rpc_url must not be empty");
        }
        if self.node.timeout_secs == 0 {
            bail!("node.timeout_secs must be greater than zero");
        }
        if self.node.rpc_user.is_some() != self.node.rpc_password.is_some() {
            bail!("node.rpc_user and node.rpc_password must be set together");
        }
        Ok(())
    }

    /// Generate a digest of the config (without secrets) for logging
    pub fn digest(&self) -> String {
        let auth = match (&self.node.rpc_user, &self.node.cookie_file) {
            (Some(_), _) => "userpass",
            (None, Some(_)) => "cookie",
            (None, None) => "none",
        };
        format!(
            "rpc_url={} auth={} timeout={}s end_height={:?}",
            self.node.rpc_url, auth, self.node.timeout_secs, self.oracle.end_height
        )
    }
}

impl std::fmt::Display for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.digest())
    }
}
