//! # OmniName Resolver
//!
//! The resolution engine: locates resolver contracts through a TLD's
//! registry, performs forward (name → address) and reverse (address → name)
//! resolution across many TLDs and chains with forward-verification of
//! reverse records, batches lookups through multicall aggregation, and
//! dispatches reserved suffixes to protocol adapters.
//!
//! ## Example
//!
//! ```rust,ignore
//! use omniname_resolver::{EngineConfig, OmniName};
//!
//! let engine = OmniName::new();
//! let address = engine.get_address("example.bnb", Default::default()).await?;
//! let name = engine
//!     .get_domain_name(GetDomainNameOpts {
//!         address: "0x2886d6792503e04b19640c1f1430d23219af177f".into(),
//!         ..Default::default()
//!     })
//!     .await;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod batch;
mod engine;
mod locator;
pub mod protocols;

pub use batch::{BatchAddressRequest, BatchDomainNameRequest};
pub use engine::{create_engine, EngineConfig, GetAddressOpts, GetDomainNameOpts, OmniName};
pub use locator::{BytecodeProbe, ResolverHandle, ResolverLocator};
pub use protocols::{AdapterRegistry, ProtocolTag};

// Re-export the result types callers consume alongside the engine.
pub use omniname_core::error::{OmniNameError, Result};
pub use omniname_core::types::{BatchAddressEntry, BatchDomainEntry, TldInfo};
