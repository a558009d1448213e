//! # OmniName TLD Hub
//!
//! Client for the verified TLD hub, the registry-of-registries that maps
//! TLD strings to their chain, registry contract, and resolver-selection
//! metadata. TLD info is cached as an all-or-nothing snapshot; per-chain
//! TLD lists are cached with a staleness window.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod hub;

pub use hub::{TldHub, TldHubConfig};
