//! JSON-RPC chain client.
//!
//! Implements the [`ChainClient`] capability over plain `eth_call`,
//! `eth_getCode`, and Multicall3 aggregation. One client instance serves
//! every chain; the RPC endpoint is chosen per call from the TLD metadata.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use omniname_core::cancel::CancelToken;
use omniname_core::constants::MULTICALL3;
use omniname_core::error::{OmniNameError, Result};
use omniname_core::traits::{ChainClient, RawCall};

use crate::abi::{self, Param, Token};

/// Chain client configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainClientConfig {
    /// Request timeout in seconds, applied at the HTTP transport level.
    pub timeout_seconds: u64,
}

impl Default for ChainClientConfig {
    fn default() -> Self {
        Self { timeout_seconds: 30 }
    }
}

/// HTTP JSON-RPC implementation of the [`ChainClient`] capability.
pub struct HttpChainClient {
    config: ChainClientConfig,
    http_client: reqwest::Client,
}

impl HttpChainClient {
    /// Creates a new client with default configuration.
    pub fn new() -> Self {
        Self::with_config(ChainClientConfig::default())
    }

    /// Creates a new client with custom configuration.
    pub fn with_config(config: ChainClientConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            http_client,
        }
    }

    /// Makes a JSON-RPC call and returns the `result` field.
    async fn rpc(
        &self,
        rpc_url: &str,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value> {
        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let response = self
            .http_client
            .post(rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| OmniNameError::Http(e.to_string()))?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| OmniNameError::Http(e.to_string()))?;

        if let Some(error) = json.get("error") {
            let msg = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("Unknown RPC error");
            debug!(method, error = %msg, "RPC error");
            return Err(OmniNameError::Rpc(msg.to_string()));
        }

        json.get("result")
            .cloned()
            .ok_or_else(|| OmniNameError::Rpc("response has no result".into()))
    }

    /// Decodes a 0x-prefixed hex result field into bytes.
    fn result_bytes(result: serde_json::Value) -> Result<Vec<u8>> {
        let text = result
            .as_str()
            .ok_or_else(|| OmniNameError::Rpc("result is not a hex string".into()))?;
        Ok(hex::decode(text.trim_start_matches("0x"))?)
    }

    /// Returns the configured transport timeout in seconds.
    pub fn timeout_seconds(&self) -> u64 {
        self.config.timeout_seconds
    }
}

impl Default for HttpChainClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChainClient for HttpChainClient {
    #[instrument(skip(self, data, cancel), fields(data_len = data.len()))]
    async fn call(
        &self,
        rpc_url: &str,
        to: &str,
        data: &[u8],
        cancel: Option<&CancelToken>,
    ) -> Result<Vec<u8>> {
        let params = serde_json::json!([
            { "to": to, "data": format!("0x{}", hex::encode(data)) },
            "latest"
        ]);

        let request = self.rpc(rpc_url, "eth_call", params);
        let result = match cancel {
            Some(token) => {
                tokio::select! {
                    _ = token.cancelled() => return Err(OmniNameError::Cancelled),
                    result = request => result?,
                }
            }
            None => request.await?,
        };

        Self::result_bytes(result)
    }

    #[instrument(skip(self))]
    async fn get_code(&self, rpc_url: &str, address: &str) -> Result<Vec<u8>> {
        let params = serde_json::json!([address, "latest"]);
        let result = self.rpc(rpc_url, "eth_getCode", params).await?;
        Self::result_bytes(result)
    }

    #[instrument(skip(self, calls), fields(call_count = calls.len()))]
    async fn multicall(&self, rpc_url: &str, calls: &[RawCall]) -> Result<Vec<Option<Vec<u8>>>> {
        if calls.is_empty() {
            return Ok(Vec::new());
        }

        let call_tokens = Token::Array(
            calls
                .iter()
                .map(|call| {
                    Token::Tuple(vec![
                        Token::Address(call.to.clone()),
                        Token::Bool(true),
                        Token::Bytes(call.data.clone()),
                    ])
                })
                .collect(),
        );
        let data = abi::encode_call("aggregate3((address,bool,bytes)[])", &[call_tokens]);

        let raw = self.call(rpc_url, MULTICALL3, &data, None).await?;
        let shape = Param::Array(Box::new(Param::Tuple(vec![Param::Bool, Param::Bytes])));
        let decoded = abi::decode(&raw, &[shape])?;
        let entries = decoded[0].as_array()?;

        if entries.len() != calls.len() {
            return Err(OmniNameError::AbiDecode(format!(
                "multicall returned {} results for {} calls",
                entries.len(),
                calls.len()
            )));
        }

        let mut results = Vec::with_capacity(entries.len());
        for entry in entries {
            let fields = entry.as_tuple()?;
            let success = fields[0].as_bool()?;
            let bytes = fields[1].as_bytes()?;
            if success && !bytes.is_empty() {
                results.push(Some(bytes.to_vec()));
            } else {
                results.push(None);
            }
        }
        Ok(results)
    }
}
