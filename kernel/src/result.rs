//! Shared pieces of the versioned result record.
//!
//! The full records live next to their engines (`SearchResult` in the search
//! crate, `MdpResult` in the mdp crate). This module holds what both need:
//! the stable algorithm names, search metrics, and the wall-clock stopwatch.

use std::time::Instant;

use crate::proof::canon::number_or_null;

/// Algorithm identifier with a stable serialized name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Algorithm {
    Bfs,
    Dfs,
    Ucs,
    AStar,
    ValueIteration,
    PolicyIteration,
}

impl Algorithm {
    /// All algorithms in declaration order.
    pub const ALL: &[Algorithm] = &[
        Self::Bfs,
        Self::Dfs,
        Self::Ucs,
        Self::AStar,
        Self::ValueIteration,
        Self::PolicyIteration,
    ];

    /// The serialized name (stable across the `2.0` line).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bfs => "bfs",
            Self::Dfs => "dfs",
            Self::Ucs => "ucs",
            Self::AStar => "astar",
            Self::ValueIteration => "value_iteration",
            Self::PolicyIteration => "policy_iteration",
        }
    }

    /// Parse a serialized name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.as_str() == name)
    }

    /// Whether this algorithm runs over the search problem protocol.
    #[must_use]
    pub const fn is_search(self) -> bool {
        matches!(self, Self::Bfs | Self::Dfs | Self::Ucs | Self::AStar)
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution instrumentation for a search run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SearchMetrics {
    /// Nodes popped and expanded (stale pops excluded).
    pub expanded: u64,
    /// Successor edges produced by the problem.
    pub generated_edges: u64,
    /// Re-insertions of already expanded states at a strictly lower cost.
    pub reopens: u64,
    /// Frontier size high-water mark.
    pub max_frontier: u64,
    /// Wall-clock cost. Observational: excluded from canonical bytes.
    pub elapsed_seconds: f64,
}

impl SearchMetrics {
    /// JSON object with every field.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        let mut obj = self.normative_json_value();
        obj["elapsed_seconds"] = number_or_null(self.elapsed_seconds);
        obj
    }

    /// JSON object without the wall-clock field.
    #[must_use]
    pub fn normative_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "expanded": self.expanded,
            "generated_edges": self.generated_edges,
            "max_frontier": self.max_frontier,
            "reopens": self.reopens,
        })
    }
}

/// Monotonic wall-clock stopwatch for `elapsed_seconds`.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started: Instant,
}

impl Stopwatch {
    #[must_use]
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
}
