//! Protocol adapters for reserved naming suffixes.
//!
//! Suffixes outside the hub's TLD universe dispatch through a closed tag
//! set rather than ad hoc string comparison: every tag must have an adapter
//! registered at engine construction, so an unhandled suffix is a
//! configuration error instead of a silent fallthrough.

mod four;
mod lens;
mod payment_id;
mod ud;

pub use four::FourAdapter;
pub use lens::LensAdapter;
pub use payment_id::{payment_tld_code, PaymentIdName};
pub use ud::UdAdapter;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use omniname_core::constants::{TLD_CRYPTO, TLD_FOUR, TLD_LENS};
use omniname_core::error::{OmniNameError, Result};
use omniname_core::traits::{ChainClient, ProtocolAdapter};

/// Closed set of reserved suffixes served by protocol adapters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProtocolTag {
    /// Lens social-graph handles.
    Lens,
    /// Unstoppable-Domains-style marketplace registry.
    Crypto,
    /// The `.four` registry on BSC.
    Four,
}

impl ProtocolTag {
    /// Every known tag; the registry must cover all of them.
    pub const ALL: [ProtocolTag; 3] = [ProtocolTag::Lens, ProtocolTag::Crypto, ProtocolTag::Four];

    /// Maps a TLD suffix to its protocol tag.
    pub fn from_tld(tld: &str) -> Option<Self> {
        match tld {
            t if t == TLD_LENS => Some(ProtocolTag::Lens),
            t if t == TLD_CRYPTO => Some(ProtocolTag::Crypto),
            t if t == TLD_FOUR => Some(ProtocolTag::Four),
            _ => None,
        }
    }

    /// The suffix this tag serves.
    pub fn as_tld(&self) -> &'static str {
        match self {
            ProtocolTag::Lens => TLD_LENS,
            ProtocolTag::Crypto => TLD_CRYPTO,
            ProtocolTag::Four => TLD_FOUR,
        }
    }
}

/// Registration table mapping protocol tags to adapter capabilities.
pub struct AdapterRegistry {
    adapters: HashMap<ProtocolTag, Arc<dyn ProtocolAdapter>>,
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("tags", &self.adapters.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl AdapterRegistry {
    /// Builds a registry from an explicit table, verifying completeness:
    /// every [`ProtocolTag`] must be covered.
    pub fn new(adapters: HashMap<ProtocolTag, Arc<dyn ProtocolAdapter>>) -> Result<Self> {
        for tag in ProtocolTag::ALL {
            if !adapters.contains_key(&tag) {
                return Err(OmniNameError::AdapterMissing(tag.as_tld().to_string()));
            }
        }
        Ok(Self { adapters })
    }

    /// Builds the default registry with the built-in adapters.
    pub fn with_defaults(chain: Arc<dyn ChainClient>, timeout: Option<Duration>) -> Self {
        let mut adapters: HashMap<ProtocolTag, Arc<dyn ProtocolAdapter>> = HashMap::new();
        adapters.insert(ProtocolTag::Lens, Arc::new(LensAdapter::new()));
        adapters.insert(ProtocolTag::Crypto, Arc::new(UdAdapter::new(chain.clone())));
        adapters.insert(ProtocolTag::Four, Arc::new(FourAdapter::new(chain, timeout)));
        Self { adapters }
    }

    /// Replaces the adapter for one tag.
    pub fn register(&mut self, tag: ProtocolTag, adapter: Arc<dyn ProtocolAdapter>) {
        self.adapters.insert(tag, adapter);
    }

    /// Returns the adapter for a tag. The completeness check at
    /// construction guarantees presence.
    pub fn get(&self, tag: ProtocolTag) -> &Arc<dyn ProtocolAdapter> {
        self.adapters
            .get(&tag)
            .expect("registry construction verified completeness")
    }
}
