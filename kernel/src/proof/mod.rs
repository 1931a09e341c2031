//! Proof module: canonical serialization and content hashing.
//!
//! Every byte sequence that participates in a determinism guarantee (result
//! records, trace lines, artifact digests) flows through this module.

pub mod canon;
pub mod hash;
pub mod hash_domain;
