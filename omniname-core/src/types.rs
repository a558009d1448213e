//! Shared types for the OmniName resolution engine.

use serde::{Deserialize, Serialize};

use crate::constants::ZERO_ADDRESS;
use crate::error::{OmniNameError, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// TLD METADATA
// ═══════════════════════════════════════════════════════════════════════════════

/// Metadata describing one naming system instance, as published by the hub.
///
/// An entry with an empty `tld` is an invalid/unpopulated hub slot and is
/// filtered out of every result set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TldInfo {
    /// TLD string key, e.g. "bnb".
    pub tld: String,
    /// Per-TLD namehash salt. Zero for legacy deployments.
    pub identifier: u64,
    /// Chain the registry lives on.
    pub chain_id: u64,
    /// Registry contract address.
    pub registry: String,
    /// Default RPC endpoint for the registry's chain. Empty when the TLD
    /// declares no reverse-capable endpoint.
    pub default_rpc: String,
    /// Metadata-registry ("SANN") contract address, absent for most TLDs.
    pub sann: Option<String>,
}

impl TldInfo {
    /// Returns true for unpopulated hub slots that must be filtered out.
    pub fn is_empty(&self) -> bool {
        self.tld.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BATCH RESULT ENTRIES
// ═══════════════════════════════════════════════════════════════════════════════

/// One entry of a batch reverse-resolution result, positionally aligned with
/// the input address list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchDomainEntry {
    /// The queried address, echoed back verbatim.
    pub address: String,
    /// The verified domain, or `None` when nothing verified for this address.
    pub domain: Option<String>,
}

/// One entry of a batch forward-resolution result, positionally aligned with
/// the input name list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchAddressEntry {
    /// The queried name, echoed back verbatim.
    pub name: String,
    /// The resolved address, or `None` when the name did not resolve.
    pub address: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// ADDRESS HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Validates an EVM account address and returns its lowercased form.
pub fn normalize_address(address: &str) -> Result<String> {
    let lowered = address.trim().to_lowercase();
    let hex_part = lowered
        .strip_prefix("0x")
        .ok_or_else(|| OmniNameError::InvalidAddress(address.to_string()))?;
    if hex_part.len() != 40 || !hex_part.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(OmniNameError::InvalidAddress(address.to_string()));
    }
    Ok(lowered)
}

/// Returns true for the zero address (or an unparseable one).
pub fn is_zero_address(address: &str) -> bool {
    match normalize_address(address) {
        Ok(normalized) => normalized == ZERO_ADDRESS,
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_address() {
        assert_eq!(
            normalize_address("0xABCDEF0123456789abcdef0123456789ABCDEF01").unwrap(),
            "0xabcdef0123456789abcdef0123456789abcdef01"
        );
        assert_eq!(
            normalize_address("  0x0000000000000000000000000000000000000001  ").unwrap(),
            "0x0000000000000000000000000000000000000001"
        );
    }

    #[test]
    fn test_normalize_address_rejects_invalid() {
        assert!(normalize_address("").is_err());
        assert!(normalize_address("abcdef").is_err());
        assert!(normalize_address("0x1234").is_err());
        assert!(normalize_address("0xZZcdef0123456789abcdef0123456789abcdef01").is_err());
    }

    #[test]
    fn test_zero_address_detection() {
        assert!(is_zero_address(ZERO_ADDRESS));
        assert!(is_zero_address("not-an-address"));
        assert!(!is_zero_address("0x0000000000000000000000000000000000000001"));
    }

    #[test]
    fn test_tld_info_empty_filter() {
        let empty = TldInfo {
            tld: String::new(),
            identifier: 0,
            chain_id: 0,
            registry: ZERO_ADDRESS.into(),
            default_rpc: String::new(),
            sann: None,
        };
        assert!(empty.is_empty());
    }
}
