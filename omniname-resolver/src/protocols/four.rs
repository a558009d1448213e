//! `.four` registry adapter.
//!
//! The `.four` registry exposes a single reader contract on BSC with
//! forward (`getDomainInfo`) and reverse (`getDomainByCA`) entry points.
//! Both directions run under the adapter's effective timeout.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument};

use omniname_chain::abi::{self, Param, Token};
use omniname_chain::with_timeout;
use omniname_core::constants::{BSC_RPC, FOUR_DOMAIN_READER, TLD_FOUR};
use omniname_core::error::Result;
use omniname_core::traits::{ChainClient, ProtocolAdapter};
use omniname_core::types::is_zero_address;

/// Adapter resolving `.four` domains through the reader contract.
pub struct FourAdapter {
    chain: Arc<dyn ChainClient>,
    rpc_url: String,
    reader: String,
    timeout: Option<Duration>,
}

impl FourAdapter {
    /// Creates an adapter against the BSC reader deployment.
    pub fn new(chain: Arc<dyn ChainClient>, timeout: Option<Duration>) -> Self {
        Self {
            chain,
            rpc_url: BSC_RPC.into(),
            reader: FOUR_DOMAIN_READER.into(),
            timeout,
        }
    }

    /// Creates an adapter against a custom deployment, for tests.
    pub fn with_endpoint(
        chain: Arc<dyn ChainClient>,
        rpc_url: impl Into<String>,
        reader: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            chain,
            rpc_url: rpc_url.into(),
            reader: reader.into(),
            timeout,
        }
    }
}

#[async_trait]
impl ProtocolAdapter for FourAdapter {
    #[instrument(skip(self))]
    async fn get_address(&self, name: &str) -> Result<Option<String>> {
        // The reader takes the bare label, without the suffix.
        let label = name
            .strip_suffix(&format!(".{TLD_FOUR}"))
            .unwrap_or(name)
            .to_string();

        with_timeout(self.timeout, |cancel| async move {
            let data = abi::encode_call("getDomainInfo(string)", &[Token::Str(label)]);
            let raw = self
                .chain
                .call(&self.rpc_url, &self.reader, &data, cancel.as_ref())
                .await?;
            // (owner, caAddress, registeredAt, exists)
            let fields = abi::decode(
                &raw,
                &[Param::Address, Param::Address, Param::Uint, Param::Bool],
            )?;
            let ca_address = fields[1].as_address()?;
            let exists = fields[3].as_bool()?;
            debug!(exists, "four domain info");
            if exists && !is_zero_address(&ca_address) {
                Ok(Some(ca_address))
            } else {
                Ok(None)
            }
        })
        .await
    }

    #[instrument(skip(self))]
    async fn get_domain_name(&self, address: &str) -> Result<Option<String>> {
        let address = address.to_string();
        with_timeout(self.timeout, |cancel| async move {
            let data = abi::encode_call("getDomainByCA(address)", &[Token::Address(address)]);
            let raw = self
                .chain
                .call(&self.rpc_url, &self.reader, &data, cancel.as_ref())
                .await?;
            let domain = abi::decode_string(&raw)?;
            let domain = domain.trim();
            if domain.is_empty() {
                return Ok(None);
            }
            // The reader may return the bare label; normalize to a full name.
            if domain.ends_with(&format!(".{TLD_FOUR}")) {
                Ok(Some(domain.to_string()))
            } else {
                Ok(Some(format!("{domain}.{TLD_FOUR}")))
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omniname_core::cancel::CancelToken;
    use omniname_core::error::OmniNameError;
    use omniname_core::traits::RawCall;

    struct FixedChain {
        response: Result<Vec<u8>>,
    }

    impl FixedChain {
        fn ok(bytes: Vec<u8>) -> Arc<Self> {
            Arc::new(Self { response: Ok(bytes) })
        }
    }

    #[async_trait]
    impl ChainClient for FixedChain {
        async fn call(
            &self,
            _rpc_url: &str,
            _to: &str,
            _data: &[u8],
            _cancel: Option<&CancelToken>,
        ) -> Result<Vec<u8>> {
            match &self.response {
                Ok(bytes) => Ok(bytes.clone()),
                Err(_) => Err(OmniNameError::Rpc("down".into())),
            }
        }
        async fn get_code(&self, _rpc_url: &str, _address: &str) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }
        async fn multicall(
            &self,
            _rpc_url: &str,
            _calls: &[RawCall],
        ) -> Result<Vec<Option<Vec<u8>>>> {
            Ok(Vec::new())
        }
    }

    fn domain_info(ca: &str, exists: bool) -> Vec<u8> {
        abi::encode_tokens(&[
            Token::Address("0x17bc015607fdf93e7c949e9ca22f96907cfbef88".into()),
            Token::Address(ca.into()),
            Token::uint(1_700_000_000),
            Token::Bool(exists),
        ])
    }

    #[tokio::test]
    async fn test_get_address_returns_ca_when_exists() {
        let chain = FixedChain::ok(domain_info(
            "0x17bc015607fdf93e7c949e9ca22f96907cfbef88",
            true,
        ));
        let adapter = FourAdapter::with_endpoint(chain, "https://rpc", "0x1", None);
        let address = adapter.get_address("farm17bc.four").await.unwrap();
        assert_eq!(
            address.as_deref(),
            Some("0x17bc015607fdf93e7c949e9ca22f96907cfbef88")
        );
    }

    #[tokio::test]
    async fn test_get_address_absent_or_zero_is_none() {
        let chain = FixedChain::ok(domain_info(
            "0x17bc015607fdf93e7c949e9ca22f96907cfbef88",
            false,
        ));
        let adapter = FourAdapter::with_endpoint(chain, "https://rpc", "0x1", None);
        assert!(adapter.get_address("ghost.four").await.unwrap().is_none());

        let chain = FixedChain::ok(domain_info(
            "0x0000000000000000000000000000000000000000",
            true,
        ));
        let adapter = FourAdapter::with_endpoint(chain, "https://rpc", "0x1", None);
        assert!(adapter.get_address("empty.four").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reverse_appends_suffix_to_bare_label() {
        let chain = FixedChain::ok(abi::encode_tokens(&[Token::Str("farm17bc".into())]));
        let adapter = FourAdapter::with_endpoint(chain, "https://rpc", "0x1", None);
        let domain = adapter
            .get_domain_name("0x17bc015607fdf93e7c949e9ca22f96907cfbef88")
            .await
            .unwrap();
        assert_eq!(domain.as_deref(), Some("farm17bc.four"));
    }

    #[tokio::test]
    async fn test_reverse_keeps_existing_suffix() {
        let chain = FixedChain::ok(abi::encode_tokens(&[Token::Str("farm17bc.four".into())]));
        let adapter = FourAdapter::with_endpoint(chain, "https://rpc", "0x1", None);
        let domain = adapter
            .get_domain_name("0x17bc015607fdf93e7c949e9ca22f96907cfbef88")
            .await
            .unwrap();
        assert_eq!(domain.as_deref(), Some("farm17bc.four"));
    }

    #[tokio::test]
    async fn test_empty_reverse_is_none() {
        let chain = FixedChain::ok(abi::encode_tokens(&[Token::Str(String::new())]));
        let adapter = FourAdapter::with_endpoint(chain, "https://rpc", "0x1", None);
        assert!(adapter.get_domain_name("0x1").await.unwrap().is_none());
    }
}
