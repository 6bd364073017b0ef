//! Bitcoin Core JSON-RPC client
//!
//! Uses `getblockcount`, `getblockhash` and raw `getblock` (verbosity 0).

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::config::NodeConfig;
use crate::error::{OracleError, RpcError};
use crate::node::block::decode_block_outputs;
use crate::node::BlockSource;

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: &'static str,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// JSON-RPC client for a bitcoind node
#[derive(Debug, Clone)]
pub struct BitcoindClient {
    client: Client,
    url: String,
    auth: Option<(String, String)>,
}

impl BitcoindClient {
    pub fn new(url: &str, auth: Option<(String, String)>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    /// Build a client from config, reading the cookie file when no
    /// user/password pair is configured.
    pub fn from_config(config: &NodeConfig) -> Result<Self> {
        let auth = match (&config.rpc_user, &config.rpc_password, &config.cookie_file) {
            (Some(user), Some(password), _) => Some((user.clone(), password.clone())),
            (None, None, Some(path)) => Some(Self::read_cookie(path)?),
            (None, None, None) => None,
            _ => bail!("node.rpc_user and node.rpc_password must be set together"),
        };

        Self::new(
            &config.rpc_url,
            auth,
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Parse a bitcoind `.cookie` file (`user:password`)
    fn read_cookie(path: &str) -> Result<(String, String)> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read cookie file {}", path))?;
        Self::parse_cookie(&contents).with_context(|| format!("Malformed cookie file {}", path))
    }

    fn parse_cookie(contents: &str) -> Result<(String, String)> {
        let (user, password) = contents
            .trim()
            .split_once(':')
            .context("expected user:password")?;
        Ok((user.to_string(), password.to_string()))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, RpcError> {
        let request = RpcRequest {
            jsonrpc: "1.0",
            id: "utxoracle",
            method,
            params,
        };

        let mut builder = self.client.post(&self.url).json(&request);
        if let Some((user, password)) = &self.auth {
            builder = builder.basic_auth(user, Some(password));
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        // bitcoind reports RPC errors with a non-2xx status and a JSON body
        let parsed: RpcResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(RpcError::Status {
                    status: status.as_u16(),
                    body,
                })
            }
            Err(source) => {
                return Err(RpcError::Decode {
                    method: method.to_string(),
                    source,
                })
            }
        };

        Self::into_result(method, parsed)
    }

    fn into_result<T: DeserializeOwned>(method: &str, response: RpcResponse) -> Result<T, RpcError> {
        if let Some(error) = response.error {
            return Err(RpcError::Node {
                code: error.code,
                message: error.message,
            });
        }

        let result = response.result.ok_or_else(|| RpcError::MissingResult {
            method: method.to_string(),
        })?;

        serde_json::from_value(result).map_err(|source| RpcError::Decode {
            method: method.to_string(),
            source,
        })
    }

    pub async fn get_block_count(&self) -> Result<u64, RpcError> {
        self.call("getblockcount", json!([])).await
    }

    pub async fn get_block_hash(&self, height: u64) -> Result<String, RpcError> {
        self.call("getblockhash", json!([height])).await
    }

    /// Hex-serialized block
    pub async fn get_raw_block(&self, hash: &str) -> Result<String, RpcError> {
        self.call("getblock", json!([hash, 0])).await
    }
}

#[async_trait]
impl BlockSource for BitcoindClient {
    async fn chain_height(&self) -> Result<u64, OracleError> {
        self.get_block_count()
            .await
            .map_err(|source| OracleError::ChainHeightUnavailable { source })
    }

    async fn block_outputs(&self, height: u64) -> Result<Vec<u64>, OracleError> {
        let unavailable = |source: RpcError| OracleError::BlockUnavailable { height, source };

        let hash = self.get_block_hash(height).await.map_err(unavailable)?;
        let raw = self.get_raw_block(&hash).await.map_err(unavailable)?;
        let outputs = decode_block_outputs(height, &raw)?;

        debug!(height, hash = %hash, outputs = outputs.len(), "fetched block");
        Ok(outputs)
    }
}
