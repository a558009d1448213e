//! # OmniName Name Handling
//!
//! Validation, normalization, user-perceived character counting, and
//! content-identifier (namehash) derivation for domain names.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod namehash;
mod validate;

pub use namehash::{labelhash, namehash, reverse_node, tld_namehash};
pub use validate::{count_characters, normalize, validate_name};
