//! # OmniName Core
//!
//! Core types, errors, and traits for the OmniName cross-chain naming engine.
//!
//! This crate provides the foundational building blocks used by all other
//! OmniName crates:
//!
//! - **Types**: TLD metadata, batch result entries, address helpers
//! - **Errors**: Comprehensive error types with context
//! - **Constants**: Hub/registry contract addresses and protocol constants
//! - **Traits**: Capability interfaces for chain access and protocol adapters
//! - **Cancel**: Cooperative cancellation token threaded through chain calls

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod cancel;
pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use cancel::CancelToken;
pub use constants::*;
pub use error::{OmniNameError, Result};
pub use traits::*;
pub use types::*;
