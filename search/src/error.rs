//! Typed search errors.
//!
//! `SearchError` covers domain contract violations and invalid policies only.
//! "No path" and "budget exhausted" are normal outcomes expressed through
//! [`crate::SearchStatus`], never errors.

/// Contract violation detected while searching.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchError {
    /// An edge reported a negative cost.
    #[error("negative edge cost {cost} on {from} -> {to}")]
    NegativeEdgeCost { from: String, to: String, cost: f64 },

    /// An edge reported NaN or an infinite cost.
    #[error("non-finite edge cost {cost} on {from} -> {to}")]
    NonFiniteEdgeCost { from: String, to: String, cost: f64 },

    /// The heuristic returned NaN, an infinity or a negative value.
    #[error("heuristic returned {value} for {state}")]
    NonFiniteHeuristic { state: String, value: f64 },

    /// The search policy is unusable.
    #[error("invalid search policy: {detail}")]
    InvalidPolicy { detail: String },
}
