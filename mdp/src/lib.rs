//! Waymark MDP: value iteration and policy iteration over finite MDPs.
//!
//! This crate depends only on `waymark_kernel`.
//!
//! # Pipeline
//!
//! ```text
//! impl Mdp  ──TabularModel::build──▶  TabularModel  ──solver──▶  MdpResult
//!            (validates once, fails     (index-addressed
//!             fast on bad input)         outcome tables)
//! ```
//!
//! Both solvers share one Bellman backup and one greedy tie-break rule
//! ([`bellman::greedy_action`]), so their policies are directly comparable.

#![forbid(unsafe_code)]

pub mod bellman;
pub mod config;
pub mod contract;
pub mod error;
pub mod model;
pub mod policy_iteration;
pub mod result;
pub mod value_iteration;

pub use config::{PolicyIterationConfig, ValueIterationConfig};
pub use contract::{Mdp, Transition};
pub use error::MdpError;
pub use model::TabularModel;
pub use policy_iteration::policy_iteration;
pub use result::{MdpMetrics, MdpResult, SolveStatus};
pub use value_iteration::value_iteration;
