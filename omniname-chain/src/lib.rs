//! # OmniName Chain Access
//!
//! EVM chain access for the resolution engine: a JSON-RPC [`ChainClient`]
//! implementation over HTTP, a minimal ABI codec covering the fixed
//! hub/registry/resolver contract surface, and the timeout/cancellation
//! wrapper applied around asynchronous chain operations.
//!
//! [`ChainClient`]: omniname_core::ChainClient

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod abi;
mod client;
mod timeout;

pub use client::{ChainClientConfig, HttpChainClient};
pub use timeout::with_timeout;
