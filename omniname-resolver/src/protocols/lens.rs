//! Lens protocol adapter.
//!
//! Lens handles live in a social-graph API rather than a name registry;
//! the adapter queries the public GraphQL endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use omniname_core::error::{OmniNameError, Result};
use omniname_core::traits::ProtocolAdapter;

/// Lens adapter configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LensConfig {
    /// Lens API endpoint.
    pub api_url: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for LensConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.lens.dev".into(),
            timeout_seconds: 30,
        }
    }
}

/// Adapter resolving `.lens` handles through the Lens API.
pub struct LensAdapter {
    config: LensConfig,
    http_client: reqwest::Client,
}

impl LensAdapter {
    /// Creates an adapter with default configuration.
    pub fn new() -> Self {
        Self::with_config(LensConfig::default())
    }

    /// Creates an adapter with custom configuration.
    pub fn with_config(config: LensConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            config,
            http_client,
        }
    }

    async fn graphql(&self, query: serde_json::Value) -> Result<serde_json::Value> {
        let response = self
            .http_client
            .post(&self.config.api_url)
            .json(&query)
            .send()
            .await
            .map_err(|e| OmniNameError::Http(e.to_string()))?;
        response
            .json()
            .await
            .map_err(|e| OmniNameError::Http(e.to_string()))
    }
}

impl Default for LensAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProtocolAdapter for LensAdapter {
    #[instrument(skip(self))]
    async fn get_address(&self, name: &str) -> Result<Option<String>> {
        let query = serde_json::json!({
            "query": "query Profile($handle: Handle!) { profile(request: { handle: $handle }) { ownedBy } }",
            "variables": { "handle": name },
        });
        let json = self.graphql(query).await?;
        let owned_by = json
            .pointer("/data/profile/ownedBy")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        debug!(name, found = owned_by.is_some(), "Lens forward lookup");
        Ok(owned_by.filter(|a| !a.is_empty()))
    }

    #[instrument(skip(self))]
    async fn get_domain_name(&self, address: &str) -> Result<Option<String>> {
        let query = serde_json::json!({
            "query": "query DefaultProfile($address: EthereumAddress!) { defaultProfile(request: { ethereumAddress: $address }) { handle } }",
            "variables": { "address": address },
        });
        let json = self.graphql(query).await?;
        let handle = json
            .pointer("/data/defaultProfile/handle")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        debug!(address, found = handle.is_some(), "Lens reverse lookup");
        Ok(handle.filter(|h| !h.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter_for(server: &MockServer) -> LensAdapter {
        LensAdapter::with_config(LensConfig {
            api_url: server.uri(),
            timeout_seconds: 5,
        })
    }

    #[tokio::test]
    async fn test_get_address_reads_owned_by() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("Profile"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": { "profile": { "ownedBy": "0x7777777775b611f0f3d90ccb69ef425a62b35afa" } }
            })))
            .mount(&server)
            .await;

        let address = adapter_for(&server).get_address("alice.lens").await.unwrap();
        assert_eq!(
            address.as_deref(),
            Some("0x7777777775b611f0f3d90ccb69ef425a62b35afa")
        );
    }

    #[tokio::test]
    async fn test_missing_profile_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": { "profile": null }
            })))
            .mount(&server)
            .await;

        let adapter = adapter_for(&server);
        assert!(adapter.get_address("ghost.lens").await.unwrap().is_none());
        assert!(adapter.get_domain_name("0x1").await.unwrap().is_none());
    }
}
