//! Unstoppable-Domains-style adapter.
//!
//! Resolution goes through the proxy reader contract on Polygon, which
//! fronts the marketplace registry: record lookups are keyed by the
//! EIP-137 namehash interpreted as a token id.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use omniname_chain::abi::{self, Token};
use omniname_core::constants::{POLYGON_RPC, UD_PROXY_READER};
use omniname_core::error::Result;
use omniname_core::traits::{ChainClient, ProtocolAdapter};
use omniname_name::namehash;

/// Record key holding the EVM address of a marketplace domain.
const ETH_ADDRESS_KEY: &str = "crypto.ETH.address";

/// Adapter resolving `.crypto`-style names through the proxy reader.
pub struct UdAdapter {
    chain: Arc<dyn ChainClient>,
    rpc_url: String,
    reader: String,
}

impl UdAdapter {
    /// Creates an adapter against the Polygon proxy reader deployment.
    pub fn new(chain: Arc<dyn ChainClient>) -> Self {
        Self {
            chain,
            rpc_url: POLYGON_RPC.into(),
            reader: UD_PROXY_READER.into(),
        }
    }

    /// Creates an adapter against a custom deployment, for tests and
    /// alternate networks.
    pub fn with_endpoint(
        chain: Arc<dyn ChainClient>,
        rpc_url: impl Into<String>,
        reader: impl Into<String>,
    ) -> Self {
        Self {
            chain,
            rpc_url: rpc_url.into(),
            reader: reader.into(),
        }
    }
}

#[async_trait]
impl ProtocolAdapter for UdAdapter {
    #[instrument(skip(self))]
    async fn get_address(&self, name: &str) -> Result<Option<String>> {
        let token_id = namehash(&name.trim().to_lowercase());
        let data = abi::encode_call(
            "get(string,uint256)",
            &[
                Token::Str(ETH_ADDRESS_KEY.into()),
                Token::uint_bytes(token_id),
            ],
        );
        let raw = self.chain.call(&self.rpc_url, &self.reader, &data, None).await?;
        let value = abi::decode_string(&raw)?;
        debug!(name, found = !value.is_empty(), "marketplace forward lookup");
        Ok(if value.is_empty() { None } else { Some(value) })
    }

    #[instrument(skip(self))]
    async fn get_domain_name(&self, address: &str) -> Result<Option<String>> {
        let data = abi::encode_call(
            "reverseNameOf(address)",
            &[Token::Address(address.to_lowercase())],
        );
        let raw = self.chain.call(&self.rpc_url, &self.reader, &data, None).await?;
        let name = abi::decode_string(&raw)?;
        debug!(address, found = !name.is_empty(), "marketplace reverse lookup");
        Ok(if name.is_empty() { None } else { Some(name) })
    }
}
