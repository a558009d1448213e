//! Forward/reverse resolution engine.
//!
//! The public contract favors absence over exception: aside from validation
//! failures on the input itself, a failed lookup is indistinguishable from
//! an unregistered name. Reverse results are only accepted after forward
//! verification, which is the engine's defense against reverse records
//! written by third parties into resolvers that do not enforce ownership.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use tracing::{debug, instrument, warn};

use omniname_chain::abi::{self, Token};
use omniname_chain::{with_timeout, HttpChainClient};
use omniname_core::constants::{
    is_eth_chain, is_v2_tld, CONTENTHASH_SIGNATURE, ENS_BASE_REGISTRAR, ENS_METADATA_URL,
    TLD_ENS, TLD_NAME_SIGNATURE,
};
use omniname_core::error::{OmniNameError, Result};
use omniname_core::traits::ChainClient;
use omniname_core::types::{is_zero_address, TldInfo};
use omniname_hub::{TldHub, TldHubConfig};
use omniname_name::{normalize, reverse_node, tld_namehash};

use crate::locator::{ResolverHandle, ResolverLocator};
use crate::protocols::{AdapterRegistry, ProtocolTag};

/// Engine configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Use development-network deployments (testnet hub).
    pub is_dev: bool,
    /// RPC endpoint for hub queries. Defaults to the network's public RPC.
    pub rpc_url: Option<String>,
    /// Effective timeout for chain operations, in milliseconds. `None`
    /// disables the timeout wrapper.
    pub timeout_ms: Option<u64>,
}

/// Options for forward resolution.
#[derive(Clone, Debug, Default)]
pub struct GetAddressOpts {
    /// ENSIP-9 coin type; when set, the multi-coin `addr` variant is called.
    pub coin_type: Option<u64>,
    /// RPC endpoint override for the TLD's chain.
    pub rpc_url: Option<String>,
}

/// Options for reverse resolution.
#[derive(Clone, Debug, Default)]
pub struct GetDomainNameOpts {
    /// Account address to reverse-resolve.
    pub address: String,
    /// Chains to search, in priority order. Wins over `query_tld_list`.
    pub query_chain_id_list: Option<Vec<u64>>,
    /// TLDs to try, in priority order.
    pub query_tld_list: Option<Vec<String>>,
    /// RPC endpoint override for the TLDs' chains.
    pub rpc_url: Option<String>,
}

impl GetDomainNameOpts {
    fn has_chain_ids(&self) -> bool {
        self.query_chain_id_list.as_deref().is_some_and(|l| !l.is_empty())
    }

    fn has_tlds(&self) -> bool {
        self.query_tld_list.as_deref().is_some_and(|l| !l.is_empty())
    }

    fn lists_tld(&self, tld: &str) -> bool {
        self.query_tld_list
            .as_deref()
            .is_some_and(|l| l.iter().any(|t| t == tld))
    }
}

/// The multi-TLD resolution engine.
pub struct OmniName {
    pub(crate) chain: Arc<dyn ChainClient>,
    pub(crate) hub: TldHub,
    pub(crate) locator: ResolverLocator,
    pub(crate) adapters: AdapterRegistry,
    pub(crate) timeout: Option<Duration>,
    http_client: reqwest::Client,
}

/// Creates an engine instance (factory form of [`OmniName::with_config`]).
pub fn create_engine(config: EngineConfig) -> OmniName {
    OmniName::with_config(config)
}

/// Extracts the lowercased TLD suffix of a name.
fn tld_suffix(name: &str) -> Option<String> {
    name.rsplit('.')
        .next()
        .filter(|tld| !tld.is_empty())
        .map(str::to_lowercase)
}

impl OmniName {
    /// Creates an engine with default configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Creates an engine with custom configuration and the built-in
    /// protocol adapters.
    pub fn with_config(config: EngineConfig) -> Self {
        let chain: Arc<dyn ChainClient> = Arc::new(HttpChainClient::new());
        let timeout = config.timeout_ms.map(Duration::from_millis);
        let adapters = AdapterRegistry::with_defaults(chain.clone(), timeout);
        Self::with_parts(config, chain, adapters)
    }

    /// Creates an engine over an explicit chain capability and adapter
    /// table. The registry's completeness was verified at its construction,
    /// so unknown reserved suffixes cannot fall through silently.
    pub fn with_parts(
        config: EngineConfig,
        chain: Arc<dyn ChainClient>,
        adapters: AdapterRegistry,
    ) -> Self {
        let hub = TldHub::new(
            chain.clone(),
            TldHubConfig {
                is_dev: config.is_dev,
                rpc_url: config.rpc_url.clone(),
                ..Default::default()
            },
        );
        let locator = ResolverLocator::new(chain.clone());
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            chain,
            hub,
            locator,
            adapters,
            timeout: config.timeout_ms.map(Duration::from_millis),
            http_client,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // FORWARD RESOLUTION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Resolves a name to an address.
    ///
    /// Reserved protocol suffixes delegate to their registered adapter and
    /// return its result unmodified. Everything else goes through the hub:
    /// TLD metadata, content identifier, resolver contract, `addr` call.
    ///
    /// Returns `Ok(None)` for every failure except validation errors on the
    /// name itself, which indicate caller error and fail loudly.
    #[instrument(skip(self))]
    pub async fn get_address(&self, name: &str, opts: GetAddressOpts) -> Result<Option<String>> {
        let Some(tld) = tld_suffix(name) else {
            return Ok(None);
        };

        if let Some(tag) = ProtocolTag::from_tld(&tld) {
            return match self.adapters.get(tag).get_address(name).await {
                Ok(result) => Ok(result),
                Err(e) => {
                    warn!(name, error = %e, "protocol adapter lookup failed");
                    Ok(None)
                }
            };
        }

        let normalized = normalize(name)?;

        match self.forward_resolve(&tld, &normalized, &opts).await {
            Ok(result) => Ok(result),
            Err(e) => {
                debug!(name, error = %e, "forward resolution failed");
                Ok(None)
            }
        }
    }

    async fn forward_resolve(
        &self,
        tld: &str,
        normalized: &str,
        opts: &GetAddressOpts,
    ) -> Result<Option<String>> {
        let infos = self.hub.get_tld_info(&[tld]).await?;
        let info = infos
            .into_iter()
            .next()
            .ok_or_else(|| OmniNameError::TldNotFound(tld.to_string()))?;
        let node = node_for(&info, normalized);
        let rpc_override = opts.rpc_url.as_deref();
        let coin_type = opts.coin_type;

        with_timeout(self.timeout, |cancel| async move {
            let resolver = self.locator.resolver_for(node, &info, rpc_override).await?;
            self.addr_call(&resolver, node, coin_type, cancel.as_ref()).await
        })
        .await
    }

    async fn addr_call(
        &self,
        resolver: &ResolverHandle,
        node: [u8; 32],
        coin_type: Option<u64>,
        cancel: Option<&omniname_core::CancelToken>,
    ) -> Result<Option<String>> {
        match coin_type {
            None => {
                let data = abi::encode_call("addr(bytes32)", &[Token::FixedBytes(node)]);
                let raw = self
                    .chain
                    .call(&resolver.rpc_url, &resolver.address, &data, cancel)
                    .await?;
                let address = abi::decode_address(&raw)?;
                Ok(if is_zero_address(&address) {
                    None
                } else {
                    Some(address)
                })
            }
            Some(coin_type) => {
                let data = abi::encode_call(
                    "addr(bytes32,uint256)",
                    &[Token::FixedBytes(node), Token::uint(coin_type)],
                );
                let raw = self
                    .chain
                    .call(&resolver.rpc_url, &resolver.address, &data, cancel)
                    .await?;
                let bytes = abi::decode_bytes(&raw)?;
                Ok(if bytes.is_empty() {
                    None
                } else {
                    Some(format!("0x{}", hex::encode(bytes)))
                })
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // REVERSE RESOLUTION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Reverse-resolves an address to its primary name.
    ///
    /// Candidate TLDs come from `query_chain_id_list` (which wins over
    /// `query_tld_list`), from `query_tld_list` verbatim, or from the full
    /// hub universe. The first candidate whose reverse record survives
    /// forward verification is returned.
    #[instrument(skip(self))]
    pub async fn get_domain_name(&self, opts: GetDomainNameOpts) -> Option<String> {
        match self.reverse_resolve(&opts, true).await {
            Ok(names) => names.into_iter().next(),
            Err(e) => {
                debug!(address = %opts.address, error = %e, "reverse resolution failed");
                None
            }
        }
    }

    /// Collects every verified name for an address across the candidate
    /// TLDs, de-duplicated. Returns an empty list when nothing verifies.
    #[instrument(skip(self))]
    pub async fn get_domain_names(&self, opts: GetDomainNameOpts) -> Vec<String> {
        match self.reverse_resolve(&opts, false).await {
            Ok(names) => names,
            Err(e) => {
                debug!(address = %opts.address, error = %e, "reverse resolution failed");
                Vec::new()
            }
        }
    }

    async fn reverse_resolve(
        &self,
        opts: &GetDomainNameOpts,
        first_only: bool,
    ) -> Result<Vec<String>> {
        if opts.has_chain_ids() && opts.has_tlds() {
            warn!(
                "query_chain_id_list and query_tld_list cannot be used together, \
                 query_tld_list will be ignored"
            );
        }

        let node = reverse_node(&opts.address)?;
        let candidates = self.tld_candidates(opts).await?;
        let rpc_override = opts.rpc_url.as_deref();
        // An explicit TLD list opts into the versioned tld-scoped call.
        let use_versioned = opts.has_tlds() && !opts.has_chain_ids();

        let mut results: Vec<String> = Vec::new();
        for info in &candidates {
            if info.is_empty() {
                continue;
            }
            if let Some(name) = self
                .domain_name_by_tld(&opts.address, node, info, use_versioned, rpc_override)
                .await
            {
                if !results.contains(&name) {
                    results.push(name);
                }
                if first_only {
                    return Ok(results);
                }
            }
        }

        // Reserved suffixes outside the hub universe, tried only when the
        // caller listed them explicitly.
        for tag in [ProtocolTag::Lens, ProtocolTag::Crypto] {
            if !opts.lists_tld(tag.as_tld()) {
                continue;
            }
            if first_only && !results.is_empty() {
                break;
            }
            if let Some(name) = self.adapter_domain_name(tag, &opts.address).await {
                if !results.contains(&name) {
                    results.push(name);
                }
            }
        }

        Ok(results)
    }

    /// Builds the ordered candidate TLD list for a reverse query.
    pub(crate) async fn tld_candidates(&self, opts: &GetDomainNameOpts) -> Result<Vec<TldInfo>> {
        let requested: Vec<String> = if opts.has_chain_ids() {
            let mut chain_tlds = Vec::new();
            for &chain_id in opts.query_chain_id_list.as_deref().unwrap_or(&[]) {
                let tlds = self.hub.get_chain_tlds(chain_id).await?;
                if is_eth_chain(chain_id) {
                    // ENS is the lowest-priority fallback on its own chains.
                    if let Some(tld) = tlds.iter().find(|t| t.as_str() != TLD_ENS) {
                        chain_tlds.push(tld.clone());
                    }
                    chain_tlds.push(TLD_ENS.to_string());
                } else if let Some(tld) = tlds.first() {
                    chain_tlds.push(tld.clone());
                }
            }
            chain_tlds
        } else if opts.has_tlds() {
            opts.query_tld_list
                .as_deref()
                .unwrap_or(&[])
                .iter()
                .filter(|tld| ProtocolTag::from_tld(tld).is_none())
                .cloned()
                .collect()
        } else {
            self.hub.all_tlds().await?
        };

        self.hub.get_tld_info_lenient(&requested).await
    }

    async fn domain_name_by_tld(
        &self,
        address: &str,
        node: [u8; 32],
        info: &TldInfo,
        use_versioned: bool,
        rpc_override: Option<&str>,
    ) -> Option<String> {
        let name = match self
            .reverse_name_lookup(node, info, use_versioned, rpc_override)
            .await
        {
            Ok(Some(name)) if !name.is_empty() => name,
            Ok(_) => return None,
            Err(e) => {
                debug!(tld = %info.tld, error = %e, "reverse lookup failed, skipping TLD");
                return None;
            }
        };

        let forward = self
            .get_address(
                &name,
                GetAddressOpts {
                    coin_type: None,
                    rpc_url: rpc_override.map(str::to_string),
                },
            )
            .await
            .ok()
            .flatten()?;
        if forward.eq_ignore_ascii_case(address) {
            Some(name)
        } else {
            debug!(
                tld = %info.tld,
                claimed = %name,
                "reverse record failed forward verification, skipping"
            );
            None
        }
    }

    async fn reverse_name_lookup(
        &self,
        node: [u8; 32],
        info: &TldInfo,
        use_versioned: bool,
        rpc_override: Option<&str>,
    ) -> Result<Option<String>> {
        with_timeout(self.timeout, |cancel| async move {
            let (resolver, data) = if info.tld == TLD_ENS {
                let Some(resolver) = self
                    .locator
                    .reverse_resolver_for(node, info, rpc_override)
                    .await?
                else {
                    return Ok(None);
                };
                let data = abi::encode_call("name(bytes32)", &[Token::FixedBytes(node)]);
                (resolver, data)
            } else {
                let resolver = self.locator.resolver_for(node, info, rpc_override).await?;
                let data = if use_versioned {
                    if is_v2_tld(&info.tld) {
                        // Legacy resolvers may predate the versioned call.
                        self.locator.name_call(&resolver, info, node).await?
                    } else {
                        abi::encode_call(
                            TLD_NAME_SIGNATURE,
                            &[Token::FixedBytes(node), Token::uint(info.identifier)],
                        )
                    }
                } else {
                    abi::encode_call("name(bytes32)", &[Token::FixedBytes(node)])
                };
                (resolver, data)
            };

            let raw = self
                .chain
                .call(&resolver.rpc_url, &resolver.address, &data, cancel.as_ref())
                .await?;
            let name = abi::decode_string(&raw)?;
            Ok((!name.is_empty()).then_some(name))
        })
        .await
    }

    async fn adapter_domain_name(&self, tag: ProtocolTag, address: &str) -> Option<String> {
        let adapter = self.adapters.get(tag);
        let name = match adapter.get_domain_name(address).await {
            Ok(name) => name?,
            Err(e) => {
                debug!(tag = tag.as_tld(), error = %e, "adapter reverse lookup failed");
                return None;
            }
        };
        // Verify through the same adapter before accepting.
        let forward = adapter.get_address(&name).await.ok().flatten()?;
        forward.eq_ignore_ascii_case(address).then_some(name)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // RECORDS, METADATA, CONTENT HASH
    // ═══════════════════════════════════════════════════════════════════════════

    /// Resolves a free-form text record (e.g. avatar metadata) for a name.
    #[instrument(skip(self))]
    pub async fn get_domain_record(
        &self,
        name: &str,
        key: &str,
        rpc_url: Option<&str>,
    ) -> Result<Option<String>> {
        let Some(tld) = tld_suffix(name) else {
            return Ok(None);
        };
        if ProtocolTag::from_tld(&tld).is_some() {
            return Ok(None);
        }

        let normalized = normalize(name)?;

        let lookup = async {
            let infos = self.hub.get_tld_info(&[&tld]).await?;
            let info = infos
                .into_iter()
                .next()
                .ok_or_else(|| OmniNameError::TldNotFound(tld.clone()))?;
            let node = node_for(&info, &normalized);

            with_timeout(self.timeout, |cancel| async move {
                let resolver = self.locator.resolver_for(node, &info, rpc_url).await?;
                let data = abi::encode_call(
                    "text(bytes32,string)",
                    &[Token::FixedBytes(node), Token::Str(key.to_string())],
                );
                let raw = self
                    .chain
                    .call(&resolver.rpc_url, &resolver.address, &data, cancel.as_ref())
                    .await?;
                let value = abi::decode_string(&raw)?;
                Ok((!value.is_empty()).then_some(value))
            })
            .await
        };

        match lookup.await {
            Ok(value) => Ok(value),
            Err(e) => {
                debug!(name, key, error = %e, "text record lookup failed");
                Ok(None)
            }
        }
    }

    /// Fetches domain metadata JSON for TLDs that declare a metadata
    /// registry. `None` when the TLD has no registry, silently.
    #[instrument(skip(self))]
    pub async fn get_metadata(&self, name: &str, rpc_url: Option<&str>) -> Option<serde_json::Value> {
        let tld = tld_suffix(name)?;
        match self.metadata_lookup(&tld, name, rpc_url).await {
            Ok(value) => value,
            Err(e) => {
                debug!(name, error = %e, "metadata lookup failed");
                None
            }
        }
    }

    async fn metadata_lookup(
        &self,
        tld: &str,
        name: &str,
        rpc_url: Option<&str>,
    ) -> Result<Option<serde_json::Value>> {
        let infos = self.hub.get_tld_info(&[tld]).await?;
        let Some(info) = infos.into_iter().next() else {
            return Ok(None);
        };
        let Some(sann) = info.sann.clone() else {
            return Ok(None);
        };

        // Token id is the hash of the first label.
        let first_label = name.split('.').next().unwrap_or(name);
        let token_id: [u8; 32] = Keccak256::digest(first_label.as_bytes()).into();
        let rpc = ResolverLocator::rpc_for(&info, rpc_url);

        let base_contract = if info.identifier == 0 {
            ENS_BASE_REGISTRAR.to_string()
        } else {
            let data = abi::encode_call("tldBase(uint256)", &[Token::uint(info.identifier)]);
            let raw = self.chain.call(&rpc, &sann, &data, None).await?;
            abi::decode_address(&raw)?
        };

        let uri = if info.chain_id == 1 {
            // The canonical mainnet metadata service is addressed by URL
            // template rather than an on-chain tokenURI round trip.
            format!(
                "{ENS_METADATA_URL}/{base_contract}/0x{}",
                hex::encode(token_id)
            )
        } else {
            let data = abi::encode_call("tokenURI(uint256)", &[Token::uint_bytes(token_id)]);
            let raw = self.chain.call(&rpc, &base_contract, &data, None).await?;
            abi::decode_string(&raw)?
        };

        let json = self
            .http_client
            .get(&uri)
            .send()
            .await
            .map_err(|e| OmniNameError::Http(e.to_string()))?
            .json()
            .await
            .map_err(|e| OmniNameError::Http(e.to_string()))?;
        Ok(Some(json))
    }

    /// Fetches the avatar image URI from domain metadata.
    pub async fn get_domain_avatar(&self, name: &str, rpc_url: Option<&str>) -> Option<String> {
        let metadata = self.get_metadata(name, rpc_url).await?;
        metadata
            .get("image")
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }

    /// Resolves the decentralized-content pointer for a name. A literal
    /// empty hash reads as absent, not as an error.
    #[instrument(skip(self))]
    pub async fn get_content_hash(&self, name: &str, rpc_url: Option<&str>) -> Option<String> {
        let tld = tld_suffix(name)?;
        if ProtocolTag::from_tld(&tld).is_some() {
            return None;
        }
        let normalized = normalize(name).ok()?;

        let lookup = async {
            let infos = self.hub.get_tld_info(&[&tld]).await?;
            let info = infos
                .into_iter()
                .next()
                .ok_or_else(|| OmniNameError::TldNotFound(tld.clone()))?;
            let node = node_for(&info, &normalized);

            with_timeout(self.timeout, |cancel| async move {
                let resolver = self.locator.resolver_for(node, &info, rpc_url).await?;
                if !self
                    .locator
                    .function_exists(&resolver, CONTENTHASH_SIGNATURE)
                    .await?
                {
                    return Ok(None);
                }
                let data = abi::encode_call(CONTENTHASH_SIGNATURE, &[Token::FixedBytes(node)]);
                let raw = self
                    .chain
                    .call(&resolver.rpc_url, &resolver.address, &data, cancel.as_ref())
                    .await?;
                let bytes = abi::decode_bytes(&raw)?;
                Ok((!bytes.is_empty()).then(|| format!("0x{}", hex::encode(bytes))))
            })
            .await
        };

        match lookup.await {
            Ok(value) => value,
            Err(e) => {
                debug!(name, error = %e, "content hash lookup failed");
                None
            }
        }
    }
}

impl Default for OmniName {
    fn default() -> Self {
        Self::new()
    }
}

/// Computes the content identifier for a name under a TLD: salted unless
/// the TLD uses the unsalted hierarchical scheme.
pub(crate) fn node_for(info: &TldInfo, normalized: &str) -> [u8; 32] {
    let salt = if is_v2_tld(&info.tld) || info.tld == TLD_ENS {
        None
    } else {
        Some(info.identifier)
    };
    tld_namehash(normalized, salt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use omniname_name::namehash;
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const REGISTRY: &str = "0x1111111111111111111111111111111111111111";
    const RESOLVER: &str = "0x2222222222222222222222222222222222222222";
    const OWNER: &str = "0x2886d6792503e04b19640c1f1430d23219af177f";
    const OTHER: &str = "0x00000000000000000000000000000000deadbeef";

    fn rpc_result(encoded: Vec<u8>) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": format!("0x{}", hex::encode(encoded)),
        }))
    }

    fn selector_hex(signature: &str) -> String {
        hex::encode(abi::selector(signature))
    }

    /// Mounts a hub serving a single unsalted "bnb" TLD whose registry and
    /// resolver live on the same mock endpoint.
    async fn mount_bnb_hub(server: &MockServer) {
        let tlds = Token::Array(vec![Token::Str("bnb".into())]);
        Mock::given(method("POST"))
            .and(body_string_contains(selector_hex("getTlds()")))
            .respond_with(rpc_result(abi::encode_tokens(&[tlds])))
            .mount(server)
            .await;

        let info = Token::Array(vec![Token::Tuple(vec![
            Token::Str("bnb".into()),
            Token::uint(0),
            Token::uint(56),
            Token::Address(REGISTRY.into()),
            Token::Str(server.uri()),
            Token::Address("0x0000000000000000000000000000000000000000".into()),
        ])]);
        Mock::given(method("POST"))
            .and(body_string_contains(selector_hex("getTldInfo(string[])")))
            .respond_with(rpc_result(abi::encode_tokens(&[info])))
            .mount(server)
            .await;

        Mock::given(method("POST"))
            .and(body_string_contains(selector_hex("resolver(bytes32)")))
            .respond_with(rpc_result(abi::encode_tokens(&[Token::Address(
                RESOLVER.into(),
            )])))
            .mount(server)
            .await;
    }

    fn engine_for(server: &MockServer) -> OmniName {
        OmniName::with_config(EngineConfig {
            is_dev: false,
            rpc_url: Some(server.uri()),
            timeout_ms: None,
        })
    }

    #[tokio::test]
    async fn test_get_address_end_to_end() {
        let server = MockServer::start().await;
        mount_bnb_hub(&server).await;

        let node = namehash("example.bnb");
        Mock::given(method("POST"))
            .and(body_string_contains(selector_hex("addr(bytes32)")))
            .and(body_string_contains(hex::encode(node)))
            .respond_with(rpc_result(abi::encode_tokens(&[Token::Address(
                OWNER.into(),
            )])))
            .mount(&server)
            .await;

        let engine = engine_for(&server);
        let address = engine
            .get_address("example.bnb", Default::default())
            .await
            .unwrap();
        assert_eq!(address.as_deref(), Some(OWNER));
    }

    #[tokio::test]
    async fn test_get_address_zero_resolution_is_none() {
        let server = MockServer::start().await;
        mount_bnb_hub(&server).await;

        Mock::given(method("POST"))
            .and(body_string_contains(selector_hex("addr(bytes32)")))
            .respond_with(rpc_result(abi::encode_tokens(&[Token::Address(
                "0x0000000000000000000000000000000000000000".into(),
            )])))
            .mount(&server)
            .await;

        let engine = engine_for(&server);
        let address = engine
            .get_address("ghost.bnb", Default::default())
            .await
            .unwrap();
        assert!(address.is_none());
    }

    #[tokio::test]
    async fn test_get_address_invalid_name_fails_loudly() {
        let server = MockServer::start().await;
        let engine = engine_for(&server);
        let err = engine
            .get_address("bad name.bnb", Default::default())
            .await
            .unwrap_err();
        assert!(matches!(err, OmniNameError::InvalidName(_)));
    }

    #[tokio::test]
    async fn test_get_address_unknown_tld_is_none_not_error() {
        let server = MockServer::start().await;
        mount_bnb_hub(&server).await;

        let engine = engine_for(&server);
        let address = engine
            .get_address("alice.unknowntld", Default::default())
            .await
            .unwrap();
        assert!(address.is_none());
    }

    #[tokio::test]
    async fn test_reverse_resolution_verified_round_trip() {
        let server = MockServer::start().await;
        mount_bnb_hub(&server).await;

        let reverse = reverse_node(OWNER).unwrap();
        Mock::given(method("POST"))
            .and(body_string_contains(selector_hex("name(bytes32)")))
            .and(body_string_contains(hex::encode(reverse)))
            .respond_with(rpc_result(abi::encode_tokens(&[Token::Str(
                "example.bnb".into(),
            )])))
            .mount(&server)
            .await;

        let forward = namehash("example.bnb");
        Mock::given(method("POST"))
            .and(body_string_contains(selector_hex("addr(bytes32)")))
            .and(body_string_contains(hex::encode(forward)))
            .respond_with(rpc_result(abi::encode_tokens(&[Token::Address(
                OWNER.into(),
            )])))
            .mount(&server)
            .await;

        let engine = engine_for(&server);
        let name = engine
            .get_domain_name(GetDomainNameOpts {
                // Mixed case exercises the case-insensitive verification.
                address: OWNER.to_uppercase().replace("0X", "0x"),
                ..Default::default()
            })
            .await;
        assert_eq!(name.as_deref(), Some("example.bnb"));
    }

    #[tokio::test]
    async fn test_reverse_resolution_rejects_spoofed_record() {
        let server = MockServer::start().await;
        mount_bnb_hub(&server).await;

        let reverse = reverse_node(OWNER).unwrap();
        Mock::given(method("POST"))
            .and(body_string_contains(selector_hex("name(bytes32)")))
            .and(body_string_contains(hex::encode(reverse)))
            .respond_with(rpc_result(abi::encode_tokens(&[Token::Str(
                "example.bnb".into(),
            )])))
            .mount(&server)
            .await;

        // Forward resolution points at a different owner: spoofed record.
        let forward = namehash("example.bnb");
        Mock::given(method("POST"))
            .and(body_string_contains(selector_hex("addr(bytes32)")))
            .and(body_string_contains(hex::encode(forward)))
            .respond_with(rpc_result(abi::encode_tokens(&[Token::Address(
                OTHER.into(),
            )])))
            .mount(&server)
            .await;

        let engine = engine_for(&server);
        let name = engine
            .get_domain_name(GetDomainNameOpts {
                address: OWNER.into(),
                ..Default::default()
            })
            .await;
        assert!(name.is_none(), "spoofed reverse record must not be returned");
    }

    #[tokio::test]
    async fn test_get_domain_names_empty_universe_is_empty_list() {
        let server = MockServer::start().await;
        mount_bnb_hub(&server).await;

        let reverse = reverse_node(OTHER).unwrap();
        Mock::given(method("POST"))
            .and(body_string_contains(selector_hex("name(bytes32)")))
            .and(body_string_contains(hex::encode(reverse)))
            .respond_with(rpc_result(abi::encode_tokens(&[Token::Str(String::new())])))
            .mount(&server)
            .await;

        let engine = engine_for(&server);
        let names = engine
            .get_domain_names(GetDomainNameOpts {
                address: OTHER.into(),
                query_tld_list: Some(Vec::new()),
                ..Default::default()
            })
            .await;
        assert!(names.is_empty());
    }

    #[tokio::test]
    async fn test_get_domain_record_reads_text() {
        let server = MockServer::start().await;
        mount_bnb_hub(&server).await;

        Mock::given(method("POST"))
            .and(body_string_contains(selector_hex("text(bytes32,string)")))
            .respond_with(rpc_result(abi::encode_tokens(&[Token::Str(
                "ipfs://QmAvatar".into(),
            )])))
            .mount(&server)
            .await;

        let engine = engine_for(&server);
        let record = engine
            .get_domain_record("example.bnb", "avatar", None)
            .await
            .unwrap();
        assert_eq!(record.as_deref(), Some("ipfs://QmAvatar"));
    }

    #[tokio::test]
    async fn test_content_hash_absent_function_is_none() {
        let server = MockServer::start().await;
        mount_bnb_hub(&server).await;

        // Resolver bytecode without the contenthash selector.
        Mock::given(method("POST"))
            .and(body_string_contains("eth_getCode"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": "0x6080604052",
            })))
            .mount(&server)
            .await;

        let engine = engine_for(&server);
        let hash = engine.get_content_hash("example.bnb", None).await;
        assert!(hash.is_none());
    }

    #[tokio::test]
    async fn test_tld_candidates_puts_ens_last_on_eth_chains() {
        let server = MockServer::start().await;

        let chain_tlds = Token::Array(vec![Token::Str("eth".into()), Token::Str("abc".into())]);
        Mock::given(method("POST"))
            .and(body_string_contains(selector_hex("getChainTlds(uint256)")))
            .respond_with(rpc_result(abi::encode_tokens(&[chain_tlds])))
            .mount(&server)
            .await;

        let tlds = Token::Array(vec![Token::Str("eth".into()), Token::Str("abc".into())]);
        Mock::given(method("POST"))
            .and(body_string_contains(selector_hex("getTlds()")))
            .respond_with(rpc_result(abi::encode_tokens(&[tlds])))
            .mount(&server)
            .await;

        let info = |tld: &str, id: u64| {
            Token::Tuple(vec![
                Token::Str(tld.into()),
                Token::uint(id),
                Token::uint(1),
                Token::Address(REGISTRY.into()),
                Token::Str(server.uri()),
                Token::Address("0x0000000000000000000000000000000000000000".into()),
            ])
        };
        Mock::given(method("POST"))
            .and(body_string_contains(selector_hex("getTldInfo(string[])")))
            .respond_with(rpc_result(abi::encode_tokens(&[Token::Array(vec![
                info("eth", 0),
                info("abc", 7),
            ])])))
            .mount(&server)
            .await;

        let engine = engine_for(&server);
        let candidates = engine
            .tld_candidates(&GetDomainNameOpts {
                address: OWNER.into(),
                query_chain_id_list: Some(vec![1]),
                ..Default::default()
            })
            .await
            .unwrap();
        let order: Vec<&str> = candidates.iter().map(|i| i.tld.as_str()).collect();
        assert_eq!(order, vec!["abc", "eth"]);
    }

    #[test]
    fn test_tld_suffix_extraction() {
        assert_eq!(tld_suffix("example.bnb").as_deref(), Some("bnb"));
        assert_eq!(tld_suffix("sub.example.ARB").as_deref(), Some("arb"));
        assert_eq!(tld_suffix("nodot").as_deref(), Some("nodot"));
        assert_eq!(tld_suffix("trailing."), None);
    }

    #[test]
    fn test_node_for_applies_salt_policy() {
        let v2 = TldInfo {
            tld: "bnb".into(),
            identifier: 9,
            chain_id: 56,
            registry: REGISTRY.into(),
            default_rpc: String::new(),
            sann: None,
        };
        // Legacy TLDs ignore the identifier even when the hub carries one.
        assert_eq!(node_for(&v2, "alice.bnb"), namehash("alice.bnb"));

        let v3 = TldInfo {
            tld: "abc".into(),
            ..v2.clone()
        };
        assert_eq!(
            node_for(&v3, "alice.abc"),
            tld_namehash("alice.abc", Some(9))
        );
    }
}
