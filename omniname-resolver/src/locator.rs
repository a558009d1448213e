//! Resolver contract location and capability probing.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, instrument};

use omniname_chain::abi::{self, Token};
use omniname_core::constants::TLD_NAME_SIGNATURE;
use omniname_core::error::{OmniNameError, Result};
use omniname_core::traits::{CapabilityProbe, ChainClient};
use omniname_core::types::{is_zero_address, TldInfo};

use async_trait::async_trait;

/// A located resolver contract, together with the endpoint it is reachable on.
#[derive(Clone, Debug)]
pub struct ResolverHandle {
    /// Resolver contract address.
    pub address: String,
    /// RPC endpoint the resolver's chain is reachable on.
    pub rpc_url: String,
}

/// Capability probe that inspects deployed bytecode for a function selector.
///
/// Selector presence in bytecode does not strictly prove the function is
/// implemented, but it avoids requiring an explicit capability registry.
pub struct BytecodeProbe {
    chain: Arc<dyn ChainClient>,
}

impl BytecodeProbe {
    /// Creates a probe over the given chain capability.
    pub fn new(chain: Arc<dyn ChainClient>) -> Self {
        Self { chain }
    }
}

#[async_trait]
impl CapabilityProbe for BytecodeProbe {
    async fn function_exists(
        &self,
        rpc_url: &str,
        contract: &str,
        signature: &str,
    ) -> Result<bool> {
        let bytecode = self.chain.get_code(rpc_url, contract).await?;
        let selector = abi::selector(signature);
        Ok(bytecode.windows(selector.len()).any(|w| w == selector))
    }
}

/// Locates resolver contracts through a TLD's registry and detects their
/// calling convention.
pub struct ResolverLocator {
    chain: Arc<dyn ChainClient>,
    probe: Arc<dyn CapabilityProbe>,
    // Versioned-call support per (resolver address, tld); immutable once a
    // contract is deployed, so cached for the locator's lifetime.
    tld_name_support: RwLock<HashMap<(String, String), bool>>,
}

impl ResolverLocator {
    /// Creates a locator with the bytecode-inspection probe.
    pub fn new(chain: Arc<dyn ChainClient>) -> Self {
        let probe = Arc::new(BytecodeProbe::new(chain.clone()));
        Self::with_probe(chain, probe)
    }

    /// Creates a locator with a custom capability probe.
    pub fn with_probe(chain: Arc<dyn ChainClient>, probe: Arc<dyn CapabilityProbe>) -> Self {
        Self {
            chain,
            probe,
            tld_name_support: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the RPC endpoint to use for a TLD, honoring an override.
    pub fn rpc_for(tld_info: &TldInfo, rpc_override: Option<&str>) -> String {
        rpc_override
            .map(str::to_string)
            .unwrap_or_else(|| tld_info.default_rpc.clone())
    }

    /// Reads the resolver for `node` from the TLD's registry.
    ///
    /// Fails with [`OmniNameError::ResolverNotFound`] when the registry
    /// returns the zero address.
    #[instrument(skip(self, node, tld_info), fields(tld = %tld_info.tld))]
    pub async fn resolver_for(
        &self,
        node: [u8; 32],
        tld_info: &TldInfo,
        rpc_override: Option<&str>,
    ) -> Result<ResolverHandle> {
        let rpc_url = Self::rpc_for(tld_info, rpc_override);
        let data = abi::encode_call("resolver(bytes32)", &[Token::FixedBytes(node)]);
        let raw = self
            .chain
            .call(&rpc_url, &tld_info.registry, &data, None)
            .await?;
        let address = abi::decode_address(&raw)?;
        if is_zero_address(&address) {
            return Err(OmniNameError::ResolverNotFound(tld_info.tld.clone()));
        }
        Ok(ResolverHandle { address, rpc_url })
    }

    /// Reads the resolver for a reverse node.
    ///
    /// A TLD that declares no default RPC endpoint has no reverse support;
    /// that is a valid state, reported as `Ok(None)` rather than an error.
    /// A zero resolver likewise maps to `None`.
    #[instrument(skip(self, node, tld_info), fields(tld = %tld_info.tld))]
    pub async fn reverse_resolver_for(
        &self,
        node: [u8; 32],
        tld_info: &TldInfo,
        rpc_override: Option<&str>,
    ) -> Result<Option<ResolverHandle>> {
        if tld_info.default_rpc.is_empty() && rpc_override.is_none() {
            debug!(tld = %tld_info.tld, "TLD declares no reverse endpoint");
            return Ok(None);
        }
        let rpc_url = Self::rpc_for(tld_info, rpc_override);
        let data = abi::encode_call("resolver(bytes32)", &[Token::FixedBytes(node)]);
        let raw = self
            .chain
            .call(&rpc_url, &tld_info.registry, &data, None)
            .await?;
        let address = abi::decode_address(&raw)?;
        if is_zero_address(&address) {
            return Ok(None);
        }
        Ok(Some(ResolverHandle { address, rpc_url }))
    }

    /// Detects whether a resolver supports the versioned tld-scoped name
    /// call. Probed once per (resolver, tld) and cached.
    pub async fn supports_tld_name(
        &self,
        resolver: &ResolverHandle,
        tld_info: &TldInfo,
    ) -> Result<bool> {
        let key = (resolver.address.clone(), tld_info.tld.clone());
        if let Some(&supported) = self.tld_name_support.read().get(&key) {
            return Ok(supported);
        }
        let supported = self
            .probe
            .function_exists(&resolver.rpc_url, &resolver.address, TLD_NAME_SIGNATURE)
            .await?;
        self.tld_name_support.write().insert(key, supported);
        Ok(supported)
    }

    /// Builds the reverse-name call for a resolver: the versioned variant
    /// when the contract supports it, the legacy one otherwise.
    pub async fn name_call(
        &self,
        resolver: &ResolverHandle,
        tld_info: &TldInfo,
        node: [u8; 32],
    ) -> Result<Vec<u8>> {
        let data = if self.supports_tld_name(resolver, tld_info).await? {
            abi::encode_call(
                TLD_NAME_SIGNATURE,
                &[Token::FixedBytes(node), Token::uint(tld_info.identifier)],
            )
        } else {
            abi::encode_call("name(bytes32)", &[Token::FixedBytes(node)])
        };
        Ok(data)
    }

    /// One-off capability check without the (resolver, tld) cache, for
    /// optional resolver functions like `contenthash`.
    pub async fn function_exists(&self, resolver: &ResolverHandle, signature: &str) -> Result<bool> {
        self.probe
            .function_exists(&resolver.rpc_url, &resolver.address, signature)
            .await
    }
}
