//! Protocol constants for OmniName.
//!
//! Contract addresses are externally-owned deployments; the engine treats
//! their ABIs as fixed interface contracts.

// ═══════════════════════════════════════════════════════════════════════════════
// HUB CONTRACTS (registry of registries)
// ═══════════════════════════════════════════════════════════════════════════════

/// Verified TLD hub contract on Ethereum mainnet.
pub const VERIFIED_TLD_HUB: &str = "0x754D6827A57334143eD5fB58C5b1A4aAe4396ba5";

/// Verified TLD hub contract on BSC testnet, used on development networks.
pub const VERIFIED_TLD_HUB_TEST: &str = "0x123c784946a9b649FB1268D589E41bc7BF658725";

/// Dedicated batch reverse resolver for `.bnb` domains.
pub const BNB_BATCH_ADDRESSES_RESOLVER: &str = "0x145471AA992a9336011B9c5c57e7716fD24311CD";

/// Multicall3 aggregator, deployed at the same address on every supported chain.
pub const MULTICALL3: &str = "0xcA11bde05977b3631167028862bE2a173976CA11";

/// ENS base registrar, used to build the mainnet metadata URL for identifier-0 TLDs.
pub const ENS_BASE_REGISTRAR: &str = "0x57f1887a8BF19b14fC0dF6Fd9B2acc9Af147eA85";

// ═══════════════════════════════════════════════════════════════════════════════
// PROTOCOL ADAPTER CONTRACTS
// ═══════════════════════════════════════════════════════════════════════════════

/// `.four` domain reader contract on BSC.
pub const FOUR_DOMAIN_READER: &str = "0xd2865AFd9684c4b04c25B2205710484b2879d8Ad";

/// PaymentID reader contract on Base Sepolia.
pub const PAYMENT_ID_READER: &str = "0xcd8E5A0023Cb750B89898BdAf776e26138E76E33";

/// Unstoppable-Domains-style proxy reader on Polygon.
pub const UD_PROXY_READER: &str = "0xA3f32c8cd786dc089Bd1fC175F2707223aeE5d00";

// ═══════════════════════════════════════════════════════════════════════════════
// DEFAULT RPC ENDPOINTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Default Ethereum mainnet RPC used for hub queries.
pub const DEFAULT_MAINNET_RPC: &str = "https://rpc.ankr.com/eth";

/// BSC testnet RPC used for hub queries on development networks.
pub const BSC_TESTNET_RPC: &str = "https://data-seed-prebsc-1-s1.binance.org:8545";

/// BSC mainnet RPC for the `.four` reader and the BNB batch resolver.
pub const BSC_RPC: &str = "https://bsc-dataseed.binance.org";

/// Base Sepolia RPC for the PaymentID reader.
pub const BASE_SEPOLIA_RPC: &str = "https://sepolia.base.org";

/// Polygon RPC for the UD proxy reader.
pub const POLYGON_RPC: &str = "https://polygon-rpc.com";

// ═══════════════════════════════════════════════════════════════════════════════
// TLD NAMES AND VERSIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// ENS top-level domain.
pub const TLD_ENS: &str = "eth";

/// Lens protocol suffix.
pub const TLD_LENS: &str = "lens";

/// Unstoppable-Domains-style suffix.
pub const TLD_CRYPTO: &str = "crypto";

/// `.four` registry suffix.
pub const TLD_FOUR: &str = "four";

/// Legacy TLDs using the unsalted hierarchical namehash.
pub const V2_TLDS: &[&str] = &["bnb", "arb"];

/// Chain ids whose TLD lists get ENS appended as the lowest-priority fallback.
pub const ETH_CHAIN_IDS: &[u64] = &[1, 5];

/// Returns true for legacy TLDs that use the unsalted hierarchical namehash.
pub fn is_v2_tld(tld: &str) -> bool {
    V2_TLDS.contains(&tld)
}

/// Returns true if the chain id is an Ethereum mainnet-compatible chain.
pub fn is_eth_chain(chain_id: u64) -> bool {
    ETH_CHAIN_IDS.contains(&chain_id)
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESOLUTION PROTOCOL CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Reverse-record namespace appended to the lowercased hex address.
pub const ADDR_REVERSE_SUFFIX: &str = "addr.reverse";

/// Staleness window for the per-chain TLD list cache.
pub const CHAIN_TLDS_TTL_SECS: u64 = 60 * 60;

/// Signature of the versioned (tld-scoped) reverse name call.
pub const TLD_NAME_SIGNATURE: &str = "tldName(bytes32,uint256)";

/// Signature of the content-hash resolver call.
pub const CONTENTHASH_SIGNATURE: &str = "contenthash(bytes32)";

/// URL template for the canonical mainnet metadata service.
pub const ENS_METADATA_URL: &str = "https://metadata.ens.domains/mainnet";

/// The EVM zero address.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_v2_tld_detection() {
        assert!(is_v2_tld("bnb"));
        assert!(is_v2_tld("arb"));
        assert!(!is_v2_tld("eth"));
        assert!(!is_v2_tld("lens"));
    }

    #[test]
    fn test_eth_chain_detection() {
        assert!(is_eth_chain(1));
        assert!(is_eth_chain(5));
        assert!(!is_eth_chain(56));
        assert!(!is_eth_chain(42_161));
    }
}
