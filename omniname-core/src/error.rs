//! Error types for OmniName.
//!
//! This module provides the error hierarchy using `thiserror`. The public
//! resolution methods deliberately swallow most of these (a failed lookup is
//! indistinguishable from an unregistered name); the variants exist so the
//! internal layers and the instrumentation hooks stay precise.

use thiserror::Error;

/// Result type alias using `OmniNameError`.
pub type Result<T> = std::result::Result<T, OmniNameError>;

/// Main error type for all OmniName operations.
#[derive(Debug, Error)]
pub enum OmniNameError {
    // ═══════════════════════════════════════════════════════════════════════════
    // INPUT VALIDATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Name fails character or format validation.
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// Address string is not a valid hex account address.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // RESOLUTION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Requested TLD absent from the hub even after a forced refresh.
    #[error("TLD not found in hub: {0}")]
    TldNotFound(String),

    /// Registry returned the zero address for a resolver lookup.
    #[error("No resolver registered for node under TLD '{0}'")]
    ResolverNotFound(String),

    /// No protocol adapter registered for a reserved suffix.
    #[error("No adapter registered for protocol suffix '{0}'")]
    AdapterMissing(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // NETWORK ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// HTTP transport failure.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Chain RPC returned an error object or malformed response.
    #[error("RPC call failed: {0}")]
    Rpc(String),

    /// Effective timeout elapsed before the operation settled.
    #[error("Operation timed out after {millis}ms")]
    Timeout {
        /// The configured timeout that elapsed.
        millis: u64,
    },

    /// In-flight call was cancelled through its cancellation token.
    #[error("Operation cancelled")]
    Cancelled,

    // ═══════════════════════════════════════════════════════════════════════════
    // ENCODING ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// ABI-encoded return data could not be decoded.
    #[error("ABI decode error: {0}")]
    AbiDecode(String),

    /// Invalid hex encoding.
    #[error("Invalid hex encoding: {0}")]
    Hex(#[from] hex::FromHexError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OmniNameError {
    /// Returns true if this error is recoverable (can retry).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            OmniNameError::Http(_) | OmniNameError::Rpc(_) | OmniNameError::Timeout { .. }
        )
    }

    /// Returns true if this is an input validation error.
    ///
    /// Validation errors are the only failures the single-entity resolution
    /// methods surface to callers; everything else maps to `None`.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            OmniNameError::InvalidName(_)
                | OmniNameError::InvalidAddress(_)
                | OmniNameError::Config(_)
        )
    }
}
