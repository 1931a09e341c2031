//! Waymark Harness: reference domains and the run pipeline around the engines.
//!
//! The harness turns a [`config::RunConfig`] plus a domain into byte-level
//! artifacts (canonical result record, JSONL trace, digests) and persists
//! them to a fail-closed artifact directory.
//!
//! The harness does NOT implement search or solver logic. It delegates to
//! `waymark-search` and `waymark-mdp`; domains provide problem data only.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod artifact_dir;
pub mod config;
pub mod domains;
pub mod runner;
pub mod scenarios;

pub use config::RunConfig;
pub use runner::{run_mdp, run_search, RunArtifacts, RunError};
