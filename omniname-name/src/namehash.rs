//! Content-identifier derivation.
//!
//! The on-chain lookup key is the EIP-137 hierarchical namehash: hash each
//! label right to left, folding into the previous node. TLDs carrying an
//! identifier salt use the same fold seeded with the hash of the identifier
//! instead of the zero node, which keeps identically-named domains on
//! different TLD deployments from colliding.

use sha3::{Digest, Keccak256};

use omniname_core::constants::ADDR_REVERSE_SUFFIX;
use omniname_core::error::Result;
use omniname_core::types::normalize_address;

fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// Hashes a single label.
pub fn labelhash(label: &str) -> [u8; 32] {
    keccak256(label.as_bytes())
}

fn fold_labels(name: &str, root: [u8; 32]) -> [u8; 32] {
    let mut node = root;
    for label in name.rsplit('.') {
        if label.is_empty() {
            continue;
        }
        let mut combined = [0u8; 64];
        combined[..32].copy_from_slice(&node);
        combined[32..].copy_from_slice(&labelhash(label));
        node = keccak256(&combined);
    }
    node
}

/// Computes the hierarchical namehash of a normalized name.
pub fn namehash(name: &str) -> [u8; 32] {
    fold_labels(name, [0u8; 32])
}

/// Computes the content identifier for a normalized name, keyed by the
/// TLD identifier when one is supplied.
///
/// Without a salt this is the plain hierarchical namehash (legacy TLDs).
/// With a salt the fold is seeded with `keccak256(uint256(identifier))`.
pub fn tld_namehash(name: &str, identifier: Option<u64>) -> [u8; 32] {
    match identifier {
        None => namehash(name),
        Some(id) => {
            let mut salt = [0u8; 32];
            salt[24..].copy_from_slice(&id.to_be_bytes());
            fold_labels(name, keccak256(&salt))
        }
    }
}

/// Computes the reverse-record node for an account address: the lowercased
/// hex address (without `0x`) under the reverse namespace.
pub fn reverse_node(address: &str) -> Result<[u8; 32]> {
    let normalized = normalize_address(address)?;
    let hex_part = normalized.trim_start_matches("0x");
    Ok(namehash(&format!("{hex_part}.{ADDR_REVERSE_SUFFIX}")))
}
