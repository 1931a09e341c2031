//! `SearchResult`: the versioned record returned by every search entry point.

use std::fmt::Debug;

use waymark_kernel::proof::canon::{canonical_json_bytes, number_or_null};
use waymark_kernel::proof::hash::{canonical_hash, ContentHash, HashDomain};
use waymark_kernel::result::{Algorithm, SearchMetrics};
use waymark_kernel::trace::{debug_label, Trace};

/// How a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchStatus {
    /// A goal node was popped.
    Success,
    /// The frontier emptied without reaching a goal.
    NoSolution,
    /// `max_expansions` ran out first. Says nothing about whether a path exists.
    BudgetExceeded,
}

impl SearchStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NoSolution => "no_solution",
            Self::BudgetExceeded => "budget_exceeded",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(Self::Success),
            "no_solution" => Some(Self::NoSolution),
            "budget_exceeded" => Some(Self::BudgetExceeded),
            _ => None,
        }
    }
}

impl std::fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a search call. Immutable once returned.
#[derive(Debug, Clone)]
pub struct SearchResult<S, A> {
    pub schema_version: String,
    pub algorithm: Algorithm,
    pub problem_id: String,
    pub status: SearchStatus,
    /// Path cost; `f64::INFINITY` unless `status` is `Success`.
    pub cost: f64,
    /// States from start to goal; empty unless `status` is `Success`.
    pub path: Vec<S>,
    /// `actions[i]` leads from `path[i]` to `path[i + 1]`.
    pub actions: Vec<A>,
    pub metrics: SearchMetrics,
    pub seed: Option<u64>,
    /// Present when the policy enabled tracing.
    pub trace: Option<Trace>,
}

impl<S: Debug, A: Debug> SearchResult<S, A> {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == SearchStatus::Success
    }

    /// Full JSON record, wall-clock metrics included.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        let mut obj = self.normative_json_value();
        obj["metrics"] = self.metrics.to_json_value();
        obj
    }

    /// JSON record without observational fields.
    #[must_use]
    pub fn normative_json_value(&self) -> serde_json::Value {
        let path: Vec<String> = self.path.iter().map(debug_label).collect();
        let actions: Vec<String> = self.actions.iter().map(debug_label).collect();
        serde_json::json!({
            "actions": actions,
            "algorithm": self.algorithm.as_str(),
            "cost": number_or_null(self.cost),
            "metrics": self.metrics.normative_json_value(),
            "path": path,
            "problem_id": self.problem_id,
            "schema_version": self.schema_version,
            "seed": self.seed,
            "status": self.status.as_str(),
        })
    }

    /// Canonical bytes of the normative record.
    ///
    /// Same seed, same algorithm, same problem: same bytes.
    #[must_use]
    pub fn to_canonical_json_bytes(&self) -> Vec<u8> {
        canonical_json_bytes(&self.normative_json_value())
    }

    #[must_use]
    pub fn digest(&self) -> ContentHash {
        canonical_hash(HashDomain::SearchResult, &self.to_canonical_json_bytes())
    }
}
