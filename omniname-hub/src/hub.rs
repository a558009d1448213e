//! Verified TLD hub client.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use omniname_cache::{CacheConfig, SnapshotCache, TtlCache};
use omniname_chain::abi::{self, Param, Token};
use omniname_core::constants::{
    BSC_TESTNET_RPC, CHAIN_TLDS_TTL_SECS, DEFAULT_MAINNET_RPC, VERIFIED_TLD_HUB,
    VERIFIED_TLD_HUB_TEST,
};
use omniname_core::error::{OmniNameError, Result};
use omniname_core::traits::ChainClient;
use omniname_core::types::{is_zero_address, TldInfo};

/// Hub client configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TldHubConfig {
    /// Use the development-network hub deployment.
    pub is_dev: bool,
    /// RPC endpoint for hub queries. Defaults to the network's public RPC.
    pub rpc_url: Option<String>,
    /// Staleness window for per-chain TLD lists, in seconds.
    pub chain_tlds_ttl_seconds: u64,
}

impl Default for TldHubConfig {
    fn default() -> Self {
        Self {
            is_dev: false,
            rpc_url: None,
            chain_tlds_ttl_seconds: CHAIN_TLDS_TTL_SECS,
        }
    }
}

impl TldHubConfig {
    /// Creates a configuration with an explicit RPC endpoint.
    pub fn new(is_dev: bool, rpc_url: impl Into<String>) -> Self {
        Self {
            is_dev,
            rpc_url: Some(rpc_url.into()),
            ..Default::default()
        }
    }

    /// Returns the hub contract address for the configured network.
    pub fn hub_address(&self) -> &'static str {
        if self.is_dev {
            VERIFIED_TLD_HUB_TEST
        } else {
            VERIFIED_TLD_HUB
        }
    }

    /// Returns the RPC endpoint for hub queries.
    pub fn effective_rpc(&self) -> String {
        self.rpc_url.clone().unwrap_or_else(|| {
            if self.is_dev {
                BSC_TESTNET_RPC.into()
            } else {
                DEFAULT_MAINNET_RPC.into()
            }
        })
    }
}

/// Client for the verified TLD hub contract.
///
/// Holds the two metadata caches. A miss on any requested TLD triggers one
/// full snapshot refresh (bulk-fetch-then-filter: the hub's TLD count is
/// small and round-trip latency dominates payload size on public RPC
/// endpoints).
pub struct TldHub {
    chain: Arc<dyn ChainClient>,
    config: TldHubConfig,
    rpc_url: String,
    tld_info: SnapshotCache<String, TldInfo>,
    chain_tlds: TtlCache<u64, Vec<String>>,
}

fn tld_info_shape() -> Param {
    Param::Array(Box::new(Param::Tuple(vec![
        Param::Str,     // tld
        Param::Uint,    // identifier
        Param::Uint,    // chainId
        Param::Address, // registry
        Param::Str,     // defaultRpc
        Param::Address, // sann
    ])))
}

fn decode_tld_info(entry: &Token) -> Result<TldInfo> {
    let fields = entry.as_tuple()?;
    let sann = fields[5].as_address()?;
    Ok(TldInfo {
        tld: fields[0].as_str()?.to_string(),
        identifier: fields[1].as_u64()?,
        chain_id: fields[2].as_u64()?,
        registry: fields[3].as_address()?,
        default_rpc: fields[4].as_str()?.to_string(),
        sann: if is_zero_address(&sann) { None } else { Some(sann) },
    })
}

impl TldHub {
    /// Creates a hub client over the given chain capability.
    pub fn new(chain: Arc<dyn ChainClient>, config: TldHubConfig) -> Self {
        let rpc_url = config.effective_rpc();
        let chain_tlds = TtlCache::with_config(CacheConfig {
            default_ttl_seconds: config.chain_tlds_ttl_seconds,
            ..Default::default()
        });
        Self {
            chain,
            config,
            rpc_url,
            tld_info: SnapshotCache::new(),
            chain_tlds,
        }
    }

    /// Fetches the complete TLD universe from the hub.
    #[instrument(skip(self))]
    pub async fn all_tlds(&self) -> Result<Vec<String>> {
        let data = abi::encode_call("getTlds()", &[]);
        let raw = self
            .chain
            .call(&self.rpc_url, self.config.hub_address(), &data, None)
            .await?;
        let decoded = abi::decode(&raw, &[Param::Array(Box::new(Param::Str))])?;
        decoded[0]
            .as_array()?
            .iter()
            .map(|t| t.as_str().map(str::to_string))
            .collect()
    }

    /// Returns metadata for the requested TLDs, in request order.
    ///
    /// Served from the snapshot cache when every requested TLD is present;
    /// otherwise the whole snapshot is refetched once. Fails with
    /// [`OmniNameError::TldNotFound`] naming the first TLD still absent
    /// after the refresh.
    #[instrument(skip(self, tld_list), fields(requested = tld_list.len()))]
    pub async fn get_tld_info<S: AsRef<str>>(&self, tld_list: &[S]) -> Result<Vec<TldInfo>> {
        let all_cached = tld_list
            .iter()
            .all(|tld| self.tld_info.contains(&tld.as_ref().to_string()));
        if !all_cached {
            debug!("TLD info cache miss, refreshing snapshot");
            self.refresh_tld_info().await?;
        }

        if let Some(missing) = tld_list
            .iter()
            .find(|tld| !self.tld_info.contains(&tld.as_ref().to_string()))
        {
            return Err(OmniNameError::TldNotFound(missing.as_ref().to_string()));
        }

        Ok(tld_list
            .iter()
            .filter_map(|tld| self.tld_info.get(&tld.as_ref().to_string()))
            .collect())
    }

    /// Like [`get_tld_info`](Self::get_tld_info), but silently drops TLDs
    /// the hub does not know instead of failing. Multi-TLD traversals use
    /// this so one unknown candidate cannot abort the whole attempt.
    #[instrument(skip(self, tld_list), fields(requested = tld_list.len()))]
    pub async fn get_tld_info_lenient<S: AsRef<str>>(&self, tld_list: &[S]) -> Result<Vec<TldInfo>> {
        let all_cached = tld_list
            .iter()
            .all(|tld| self.tld_info.contains(&tld.as_ref().to_string()));
        if !all_cached {
            self.refresh_tld_info().await?;
        }
        Ok(tld_list
            .iter()
            .filter_map(|tld| self.tld_info.get(&tld.as_ref().to_string()))
            .collect())
    }

    /// Returns the TLDs registered to a chain, using the staleness-windowed
    /// cache (simple check-then-refetch; concurrent refreshes are benign
    /// because updates are idempotent).
    #[instrument(skip(self))]
    pub async fn get_chain_tlds(&self, chain_id: u64) -> Result<Vec<String>> {
        if let Some(tlds) = self.chain_tlds.get(&chain_id) {
            return Ok(tlds);
        }

        let data = abi::encode_call("getChainTlds(uint256)", &[Token::uint(chain_id)]);
        let raw = self
            .chain
            .call(&self.rpc_url, self.config.hub_address(), &data, None)
            .await?;
        let decoded = abi::decode(&raw, &[Param::Array(Box::new(Param::Str))])?;
        let tlds: Vec<String> = decoded[0]
            .as_array()?
            .iter()
            .map(|t| t.as_str().map(str::to_string))
            .collect::<Result<_>>()?;

        self.chain_tlds.set_with_ttl(
            chain_id,
            tlds.clone(),
            Duration::from_secs(self.config.chain_tlds_ttl_seconds),
        );
        Ok(tlds)
    }

    /// Refetches the entire TLD snapshot: `getTlds` then `getTldInfo(all)`.
    async fn refresh_tld_info(&self) -> Result<()> {
        let all = self.all_tlds().await?;
        let names = Token::Array(all.iter().map(|t| Token::Str(t.clone())).collect());
        let data = abi::encode_call("getTldInfo(string[])", &[names]);
        let raw = self
            .chain
            .call(&self.rpc_url, self.config.hub_address(), &data, None)
            .await?;
        let decoded = abi::decode(&raw, &[tld_info_shape()])?;

        let mut fresh = Vec::new();
        for entry in decoded[0].as_array()? {
            let info = decode_tld_info(entry)?;
            if info.is_empty() {
                warn!("hub returned an unpopulated TLD entry, skipping");
                continue;
            }
            fresh.push((info.tld.clone(), info));
        }
        self.tld_info.replace_all(fresh);
        debug!(count = self.tld_info.len(), "TLD snapshot refreshed");
        Ok(())
    }
}
