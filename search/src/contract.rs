//! Problem protocol: what a domain must provide to be searched.

use std::fmt::Debug;
use std::hash::Hash;

/// One outgoing edge produced by [`SearchProblem::successors`].
#[derive(Debug, Clone, PartialEq)]
pub struct Successor<S, A> {
    pub action: A,
    pub state: S,
    /// Edge cost. Must be finite and non-negative.
    pub cost: f64,
}

impl<S, A> Successor<S, A> {
    #[must_use]
    pub fn new(action: A, state: S, cost: f64) -> Self {
        Self {
            action,
            state,
            cost,
        }
    }
}

/// A search domain.
///
/// # Contract
///
/// - `successors` must be deterministic: same state, same edges, same order.
///   The order is the tie-break order for equal priorities.
/// - Edge costs are finite and non-negative. Violations are reported as
///   [`crate::SearchError`] at first detection, never clamped.
/// - A state with no successors is implicitly terminal.
pub trait SearchProblem {
    type State: Clone + Eq + Hash + Debug;
    type Action: Clone + Debug;

    /// Stable identifier echoed into results and trace headers.
    fn problem_id(&self) -> &str;

    fn start(&self) -> Self::State;

    fn is_goal(&self, state: &Self::State) -> bool;

    fn successors(&self, state: &Self::State) -> Vec<Successor<Self::State, Self::Action>>;
}

/// Remaining-cost estimate for A*.
///
/// Admissibility is assumed, not verified. Consistency is not required; an
/// inconsistent heuristic only raises the reopen count.
pub trait Heuristic<S> {
    fn estimate(&self, state: &S) -> f64;
}

impl<S, F> Heuristic<S> for F
where
    F: Fn(&S) -> f64,
{
    fn estimate(&self, state: &S) -> f64 {
        self(state)
    }
}

/// The trivial heuristic; A* with it behaves exactly like UCS.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroHeuristic;

impl<S> Heuristic<S> for ZeroHeuristic {
    fn estimate(&self, _state: &S) -> f64 {
        0.0
    }
}
