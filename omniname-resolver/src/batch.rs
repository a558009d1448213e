//! Batch resolution through multicall aggregation.
//!
//! Batching trades per-item error granularity for round-trip count: any
//! failure of the aggregated path voids the whole batch (`None`), while
//! per-item misses stay positionally aligned as `None` entries so output
//! length always equals input length.

use tracing::{debug, instrument, warn};

use omniname_chain::abi::{self, Param, Token};
use omniname_core::constants::{BNB_BATCH_ADDRESSES_RESOLVER, BSC_RPC};
use omniname_core::error::Result;
use omniname_core::traits::RawCall;
use omniname_core::types::{is_zero_address, BatchAddressEntry, BatchDomainEntry, TldInfo};
use omniname_name::{normalize, reverse_node};

use crate::engine::{node_for, OmniName};
use crate::locator::ResolverHandle;

/// Batch forward-resolution request.
#[derive(Clone, Debug, Default)]
pub struct BatchAddressRequest {
    /// Names to resolve, all against one TLD.
    pub name_list: Vec<String>,
    /// Target TLD. Wins over `query_chain_id`.
    pub query_tld: Option<String>,
    /// Target chain; its first registered TLD is used.
    pub query_chain_id: Option<u64>,
}

/// Batch reverse-resolution request.
#[derive(Clone, Debug, Default)]
pub struct BatchDomainNameRequest {
    /// Addresses to reverse-resolve, all against one TLD.
    pub address_list: Vec<String>,
    /// Target TLD. Wins over `query_chain_id`.
    pub query_tld: Option<String>,
    /// Target chain; its first registered TLD is used.
    pub query_chain_id: Option<u64>,
}

impl OmniName {
    /// Selects the single target TLD for a batch request.
    async fn select_batch_tld(
        &self,
        query_tld: Option<&str>,
        query_chain_id: Option<u64>,
    ) -> Result<Option<TldInfo>> {
        if query_tld.is_some() && query_chain_id.is_some() {
            warn!("query_tld and query_chain_id cannot be used together, query_chain_id will be ignored");
        }
        let all = self.hub.all_tlds().await?;
        let infos = self.hub.get_tld_info_lenient(&all).await?;
        Ok(match (query_tld, query_chain_id) {
            (Some(tld), _) => infos.into_iter().find(|info| info.tld == tld),
            (None, Some(chain_id)) => infos.into_iter().find(|info| info.chain_id == chain_id),
            (None, None) => None,
        })
    }

    /// Resolves many names against one TLD in two multicall round trips:
    /// one for resolvers, one for addresses. Results align positionally
    /// with the input.
    #[instrument(skip(self, request), fields(names = request.name_list.len()))]
    pub async fn batch_get_address(
        &self,
        request: BatchAddressRequest,
    ) -> Option<Vec<BatchAddressEntry>> {
        if request.name_list.is_empty() {
            return Some(Vec::new());
        }
        match self.batch_address_inner(&request).await {
            Ok(entries) => Some(entries),
            Err(e) => {
                debug!(error = %e, "batch forward resolution failed");
                None
            }
        }
    }

    pub(crate) async fn batch_address_inner(
        &self,
        request: &BatchAddressRequest,
    ) -> Result<Vec<BatchAddressEntry>> {
        let Some(info) = self
            .select_batch_tld(request.query_tld.as_deref(), request.query_chain_id)
            .await?
        else {
            warn!("batch resolution needs query_tld or query_chain_id naming a hub TLD");
            return Ok(Vec::new());
        };
        let rpc = info.default_rpc.clone();

        let mut nodes = Vec::with_capacity(request.name_list.len());
        for name in &request.name_list {
            let normalized = normalize(name)?;
            nodes.push(node_for(&info, &normalized));
        }

        let resolver_calls: Vec<RawCall> = nodes
            .iter()
            .map(|node| RawCall {
                to: info.registry.clone(),
                data: abi::encode_call("resolver(bytes32)", &[Token::FixedBytes(*node)]),
            })
            .collect();
        let resolver_results = self.chain.multicall(&rpc, &resolver_calls).await?;
        let resolvers: Vec<Option<String>> = resolver_results
            .iter()
            .map(|raw| {
                raw.as_ref()
                    .and_then(|bytes| abi::decode_address(bytes).ok())
                    .filter(|address| !is_zero_address(address))
            })
            .collect();

        let mut addr_calls = Vec::new();
        let mut addr_slots = Vec::new();
        for (slot, resolver) in resolvers.iter().enumerate() {
            if let Some(address) = resolver {
                addr_slots.push(slot);
                addr_calls.push(RawCall {
                    to: address.clone(),
                    data: abi::encode_call("addr(bytes32)", &[Token::FixedBytes(nodes[slot])]),
                });
            }
        }
        let addr_results = if addr_calls.is_empty() {
            Vec::new()
        } else {
            self.chain.multicall(&rpc, &addr_calls).await?
        };

        let mut entries: Vec<BatchAddressEntry> = request
            .name_list
            .iter()
            .map(|name| BatchAddressEntry {
                name: name.clone(),
                address: None,
            })
            .collect();
        for (slot, raw) in addr_slots.into_iter().zip(addr_results.iter()) {
            if let Some(bytes) = raw {
                if let Ok(address) = abi::decode_address(bytes) {
                    if !is_zero_address(&address) {
                        entries[slot].address = Some(address);
                    }
                }
            }
        }
        Ok(entries)
    }

    /// Reverse-resolves many addresses against one TLD: one multicall for
    /// resolvers, one for reverse names, then one batched forward pass that
    /// verifies every candidate. Entries whose verification fails keep
    /// their position with `domain: None`.
    #[instrument(skip(self, request), fields(addresses = request.address_list.len()))]
    pub async fn batch_get_domain_name(
        &self,
        request: BatchDomainNameRequest,
    ) -> Option<Vec<BatchDomainEntry>> {
        if request.address_list.is_empty() {
            return Some(Vec::new());
        }
        match self.batch_domain_inner(&request).await {
            Ok(entries) => Some(entries),
            Err(e) => {
                debug!(error = %e, "batch reverse resolution failed");
                None
            }
        }
    }

    async fn batch_domain_inner(
        &self,
        request: &BatchDomainNameRequest,
    ) -> Result<Vec<BatchDomainEntry>> {
        let Some(info) = self
            .select_batch_tld(request.query_tld.as_deref(), request.query_chain_id)
            .await?
        else {
            warn!("batch resolution needs query_tld or query_chain_id naming a hub TLD");
            return Ok(Vec::new());
        };
        let rpc = info.default_rpc.clone();

        let nodes: Vec<[u8; 32]> = request
            .address_list
            .iter()
            .map(|address| reverse_node(address))
            .collect::<Result<_>>()?;

        let resolver_calls: Vec<RawCall> = nodes
            .iter()
            .map(|node| RawCall {
                to: info.registry.clone(),
                data: abi::encode_call("resolver(bytes32)", &[Token::FixedBytes(*node)]),
            })
            .collect();
        let resolver_results = self.chain.multicall(&rpc, &resolver_calls).await?;
        let resolvers: Vec<Option<String>> = resolver_results
            .iter()
            .map(|raw| {
                raw.as_ref()
                    .and_then(|bytes| abi::decode_address(bytes).ok())
                    .filter(|address| !is_zero_address(address))
            })
            .collect();

        // Per-resolver calling convention; probe results are cached so a
        // batch over one registry costs a single bytecode fetch.
        let mut name_calls = Vec::new();
        let mut name_slots = Vec::new();
        for (slot, resolver) in resolvers.iter().enumerate() {
            let Some(address) = resolver else { continue };
            let handle = ResolverHandle {
                address: address.clone(),
                rpc_url: rpc.clone(),
            };
            let data = self.locator.name_call(&handle, &info, nodes[slot]).await?;
            name_slots.push(slot);
            name_calls.push(RawCall {
                to: address.clone(),
                data,
            });
        }
        let name_results = if name_calls.is_empty() {
            Vec::new()
        } else {
            self.chain.multicall(&rpc, &name_calls).await?
        };

        let mut names: Vec<Option<String>> = vec![None; request.address_list.len()];
        for (slot, raw) in name_slots.into_iter().zip(name_results.iter()) {
            if let Some(bytes) = raw {
                if let Ok(name) = abi::decode_string(bytes) {
                    if !name.is_empty() {
                        names[slot] = Some(name);
                    }
                }
            }
        }

        // Forward-verify every candidate in one additional batched pass.
        let candidates: Vec<(usize, String)> = names
            .iter()
            .enumerate()
            .filter_map(|(slot, name)| name.clone().map(|n| (slot, n)))
            .collect();
        let verified = if candidates.is_empty() {
            Vec::new()
        } else {
            self.batch_address_inner(&BatchAddressRequest {
                name_list: candidates.iter().map(|(_, name)| name.clone()).collect(),
                query_tld: Some(info.tld.clone()),
                query_chain_id: None,
            })
            .await?
        };

        let mut entries: Vec<BatchDomainEntry> = request
            .address_list
            .iter()
            .map(|address| BatchDomainEntry {
                address: address.clone(),
                domain: None,
            })
            .collect();
        for ((slot, name), verdict) in candidates.iter().zip(verified.iter()) {
            if let Some(resolved) = &verdict.address {
                if resolved.eq_ignore_ascii_case(&request.address_list[*slot]) {
                    entries[*slot].domain = Some(name.clone());
                } else {
                    debug!(
                        address = %request.address_list[*slot],
                        claimed = %name,
                        "batch reverse record failed forward verification"
                    );
                }
            }
        }
        Ok(entries)
    }

    /// Reverse-resolves `.bnb` domains through the dedicated batch resolver
    /// contract: a single call for the whole list. Unknown or zero
    /// addresses come back as empty strings, preserving alignment.
    #[instrument(skip(self, address_list), fields(addresses = address_list.len()))]
    pub async fn batch_bnb_domains(
        &self,
        address_list: &[String],
        rpc_url: Option<&str>,
    ) -> Option<Vec<String>> {
        if address_list.is_empty() {
            return Some(Vec::new());
        }
        let lookup = async {
            let addresses = Token::Array(
                address_list
                    .iter()
                    .map(|address| Token::Address(address.clone()))
                    .collect(),
            );
            let data = abi::encode_call("batchResolve(address[])", &[addresses]);
            let raw = self
                .chain
                .call(
                    rpc_url.unwrap_or(BSC_RPC),
                    BNB_BATCH_ADDRESSES_RESOLVER,
                    &data,
                    None,
                )
                .await?;
            let decoded = abi::decode(&raw, &[Param::Array(Box::new(Param::Str))])?;
            decoded[0]
                .as_array()?
                .iter()
                .map(|token| token.as_str().map(str::to_string))
                .collect::<Result<Vec<String>>>()
        };
        match lookup.await {
            Ok(domains) => Some(domains),
            Err(e) => {
                debug!(error = %e, "bnb batch resolution failed");
                None
            }
        }
    }
}
