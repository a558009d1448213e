//! Capability traits for OmniName.
//!
//! These traits define the seams between the resolution engine and the
//! outside world: chain access, resolver capability probing, and non-default
//! naming protocols. Implementations can be swapped for testing or to change
//! transport/policy without touching the engine.

use async_trait::async_trait;

use crate::cancel::CancelToken;
use crate::error::Result;

// ═══════════════════════════════════════════════════════════════════════════════
// CHAIN CLIENT CAPABILITY
// ═══════════════════════════════════════════════════════════════════════════════

/// One raw contract call for multicall aggregation.
#[derive(Clone, Debug)]
pub struct RawCall {
    /// Target contract address.
    pub to: String,
    /// ABI-encoded calldata (selector + arguments).
    pub data: Vec<u8>,
}

/// Read-only chain access consumed by the engine.
///
/// The engine never signs or broadcasts; it only needs `eth_call`-style
/// reads, bytecode fetches for capability probing, and multicall batching.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Executes a read call against `to` with the given calldata, returning
    /// the raw return data. A cancellation token, when provided, aborts the
    /// in-flight request.
    async fn call(
        &self,
        rpc_url: &str,
        to: &str,
        data: &[u8],
        cancel: Option<&CancelToken>,
    ) -> Result<Vec<u8>>;

    /// Fetches the deployed bytecode at `address`.
    async fn get_code(&self, rpc_url: &str, address: &str) -> Result<Vec<u8>>;

    /// Executes many read calls in one round trip. Individual call failures
    /// map to `None` in the result; the output is positionally aligned with
    /// the input. Not cancellable in this design.
    async fn multicall(&self, rpc_url: &str, calls: &[RawCall]) -> Result<Vec<Option<Vec<u8>>>>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// CAPABILITY PROBE
// ═══════════════════════════════════════════════════════════════════════════════

/// Detects whether a deployed contract exposes a given function.
///
/// The shipped implementation inspects bytecode for the 4-byte selector,
/// which is a heuristic: selector presence does not strictly prove the
/// function is correctly implemented. The trait boundary exists so the
/// heuristic can be replaced by an explicit capability registry without
/// touching calling code.
#[async_trait]
pub trait CapabilityProbe: Send + Sync {
    /// Returns true when `contract` appears to implement `signature`
    /// (canonical form, e.g. `"tldName(bytes32,uint256)"`).
    async fn function_exists(&self, rpc_url: &str, contract: &str, signature: &str)
        -> Result<bool>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROTOCOL ADAPTER CAPABILITY
// ═══════════════════════════════════════════════════════════════════════════════

/// Uniform interface to a non-default naming protocol.
///
/// One adapter per protocol (Lens-style social graphs, marketplace-style
/// registries, non-EVM name services). Both operations return `Ok(None)`
/// for "not registered"; errors are reserved for transport failures.
#[async_trait]
pub trait ProtocolAdapter: Send + Sync {
    /// Forward resolution: name to address.
    async fn get_address(&self, name: &str) -> Result<Option<String>>;

    /// Reverse resolution: address to name.
    async fn get_domain_name(&self, address: &str) -> Result<Option<String>>;
}
