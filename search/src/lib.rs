//! Waymark Search: deterministic graph search over an abstract problem.
//!
//! This crate depends only on `waymark_kernel`. It does NOT depend on the MDP
//! engine or on `waymark_harness`.
//!
//! # Crate dependency graph
//!
//! ```text
//! waymark_kernel  ←  waymark_search  ←  waymark_harness
//! (rng, trace,       (frontiers,         (domains, runner,
//!  canon, hash)       BFS/DFS/UCS/A*)     artifacts)
//! ```
//!
//! # Key types
//!
//! - [`SearchProblem`] -- the capability trait a domain implements
//! - [`Heuristic`] -- admissible estimate for A*, implemented for closures
//! - [`SearchPolicy`] -- expansion budget, trace options and seed echo
//! - [`SearchResult`] -- versioned outcome with metrics and optional trace
//!
//! Entry points: [`bfs`], [`dfs`], [`ucs`], [`astar`].

#![forbid(unsafe_code)]

pub mod contract;
pub mod error;
pub mod frontier;
pub mod node;
pub mod policy;
pub mod result;
pub mod search;

pub use contract::{Heuristic, SearchProblem, Successor, ZeroHeuristic};
pub use error::SearchError;
pub use policy::SearchPolicy;
pub use result::{SearchResult, SearchStatus};
pub use search::{astar, bfs, dfs, ucs};
