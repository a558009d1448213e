//! In-memory caches for OmniName TLD metadata.
//!
//! Two policies live here, each behind its own type so they stay
//! independently testable:
//!
//! - [`TtlCache`]: bounded per-entry TTL cache (per-chain TLD lists,
//!   resolver capability probes)
//! - [`SnapshotCache`]: all-or-nothing cache replaced wholesale by each hub
//!   refresh (TLD info)

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod cache;

pub use cache::{CacheConfig, CacheStats, SnapshotCache, TtlCache};
