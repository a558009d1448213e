//! PaymentID registry resolver.
//!
//! PaymentID names use the `user@provider` form rather than dotted TLDs,
//! so this resolver stands alone instead of joining the suffix dispatch.
//! The reader contract answers `addr(tokenId, tldCode, chainId)` where the
//! token id is the keccak hash of the local part.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sha3::{Digest, Keccak256};
use tracing::{debug, instrument};

use omniname_chain::abi::{self, Token};
use omniname_chain::with_timeout;
use omniname_core::constants::{BASE_SEPOLIA_RPC, PAYMENT_ID_READER};
use omniname_core::error::{OmniNameError, Result};
use omniname_core::traits::ChainClient;

/// Numeric code the reader contract assigns to each provider suffix.
pub fn payment_tld_code(tld: &str) -> Option<u64> {
    match tld {
        "binance" => Some(0),
        "okx" => Some(1),
        "bitget" => Some(2),
        "bybit" => Some(3),
        _ => None,
    }
}

/// Resolver for `user@provider` PaymentID names.
pub struct PaymentIdName {
    chain: Arc<dyn ChainClient>,
    rpc_url: String,
    reader: String,
    timeout: Option<Duration>,
}

impl PaymentIdName {
    /// Creates a resolver against the Base Sepolia reader deployment.
    pub fn new(chain: Arc<dyn ChainClient>, timeout: Option<Duration>) -> Self {
        Self {
            chain,
            rpc_url: BASE_SEPOLIA_RPC.into(),
            reader: PAYMENT_ID_READER.into(),
            timeout,
        }
    }

    /// Creates a resolver against a custom deployment, for tests.
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

    fn split(name: &str) -> Result<(&str, &str)> {
        let (local, provider) = name
            .split_once('@')
            .ok_or_else(|| OmniNameError::InvalidName(format!("'{name}' is not user@provider")))?;
        if local.is_empty() || provider.is_empty() {
            return Err(OmniNameError::InvalidName(format!(
                "'{name}' has an empty local part or provider"
            )));
        }
        Ok((local, provider))
    }

    /// Resolves a PaymentID name to the address registered for `chain_id`.
    ///
    /// EVM targets come back as hex addresses; other chains store their
    /// native address format as UTF-8 bytes.
    #[instrument(skip(self))]
    pub async fn get_address(&self, name: &str, chain_id: u64) -> Result<Option<String>> {
        let (local, provider) = Self::split(name)?;
        let tld_code = payment_tld_code(provider).ok_or_else(|| {
            OmniNameError::InvalidName(format!("unknown PaymentID provider '{provider}'"))
        })?;
        let token_id: [u8; 32] = Keccak256::digest(local.as_bytes()).into();

        with_timeout(self.timeout, |cancel| async move {
            let data = abi::encode_call(
                "addr(uint256,uint256,uint256)",
                &[
                    Token::uint_bytes(token_id),
                    Token::uint(tld_code),
                    Token::uint(chain_id),
                ],
            );
            let raw = self
                .chain
                .call(&self.rpc_url, &self.reader, &data, cancel.as_ref())
                .await?;
            let bytes = abi::decode_bytes(&raw)?;
            if bytes.is_empty() {
                debug!(name, chain_id, "no PaymentID record");
                return Ok(None);
            }
            if chain_id == 1 {
                Ok(Some(format!("0x{}", hex::encode(&bytes))))
            } else {
                let text = String::from_utf8(bytes)
                    .map_err(|e| OmniNameError::AbiDecode(format!("non-utf8 address: {e}")))?;
                Ok(Some(text))
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omniname_core::cancel::CancelToken;
    use omniname_core::traits::RawCall;
    use parking_lot::Mutex;

    struct RecordingChain {
        response: Vec<u8>,
        last_data: Mutex<Vec<u8>>,
    }

    #[async_trait]
    impl ChainClient for RecordingChain {
        async fn call(
            &self,
            _rpc_url: &str,
            _to: &str,
            data: &[u8],
            _cancel: Option<&CancelToken>,
        ) -> Result<Vec<u8>> {
            *self.last_data.lock() = data.to_vec();
            Ok(self.response.clone())
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

    fn resolver_with(response: Vec<u8>) -> (Arc<RecordingChain>, PaymentIdName) {
        let chain = Arc::new(RecordingChain {
            response,
            last_data: Mutex::new(Vec::new()),
        });
        let resolver =
            PaymentIdName::with_endpoint(chain.clone(), "https://rpc", "0x1", None);
        (chain, resolver)
    }

    #[tokio::test]
    async fn test_evm_target_returns_hex_address() {
        let payload = hex::decode("2886d6792503e04b19640c1f1430d23219af177f").unwrap();
        let (chain, resolver) = resolver_with(abi::encode_tokens(&[Token::Bytes(payload)]));
        let address = resolver.get_address("alice@binance", 1).await.unwrap();
        assert_eq!(
            address.as_deref(),
            Some("0x2886d6792503e04b19640c1f1430d23219af177f")
        );

        let sent = chain.last_data.lock().clone();
        assert_eq!(&sent[..4], &abi::selector("addr(uint256,uint256,uint256)"));
        let token_id: [u8; 32] = Keccak256::digest(b"alice").into();
        assert!(sent.windows(32).any(|w| w == token_id));
    }

    #[tokio::test]
    async fn test_non_evm_target_decodes_utf8() {
        let (_, resolver) =
            resolver_with(abi::encode_tokens(&[Token::Bytes(b"inj10zvhv2a2mam8w".to_vec())]));
        let address = resolver.get_address("alice@okx", 19).await.unwrap();
        assert_eq!(address.as_deref(), Some("inj10zvhv2a2mam8w"));
    }

    #[tokio::test]
    async fn test_empty_record_is_none() {
        let (_, resolver) = resolver_with(abi::encode_tokens(&[Token::Bytes(Vec::new())]));
        assert!(resolver
            .get_address("ghost@binance", 1)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_malformed_names_fail_loudly() {
        let (_, resolver) = resolver_with(Vec::new());
        assert!(matches!(
            resolver.get_address("no-at-sign", 1).await.unwrap_err(),
            OmniNameError::InvalidName(_)
        ));
        assert!(matches!(
            resolver.get_address("alice@unknown", 1).await.unwrap_err(),
            OmniNameError::InvalidName(_)
        ));
        assert!(matches!(
            resolver.get_address("@binance", 1).await.unwrap_err(),
            OmniNameError::InvalidName(_)
        ));
    }
}
