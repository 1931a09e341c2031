//! Waymark Kernel: the deterministic core shared by the search and MDP engines.
//!
//! # API Surface
//!
//! - [`rng::SeededRng`] -- explicitly seeded randomness context (never global)
//! - [`trace::TraceRecorder`] -- sequence-numbered event log with an optional cap
//! - [`result`] -- algorithm names and search metrics shared by result records
//! - [`proof::canon::canonical_json_bytes`] -- the single canonical JSON writer
//! - [`proof::hash::canonical_hash`] -- domain-separated SHA-256 content hashes
//!
//! # Module Dependency Direction
//!
//! `proof` ← `schema` ← `trace` ← `result`
//!
//! `rng` depends on nothing internal. Engines depend on the kernel; the kernel
//! never depends on an engine.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod proof;
pub mod result;
pub mod rng;
pub mod schema;
pub mod trace;
