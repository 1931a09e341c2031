//! MDP protocol: what a decision domain must provide to be solved.

use std::fmt::Debug;
use std::hash::Hash;

/// One outcome of taking an action.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<S> {
    pub state: S,
    pub probability: f64,
}

impl<S> Transition<S> {
    #[must_use]
    pub fn new(state: S, probability: f64) -> Self {
        Self { state, probability }
    }
}

/// A finite Markov decision process.
///
/// # Contract
///
/// - `states` is finite, duplicate-free and deterministic in order. Its order
///   is the order of values and policies in every result.
/// - `actions(s)` order is the tie-break order when several actions reach the
///   maximal Q-value. Non-terminal states must have at least one action.
/// - For every non-terminal `(s, a)`, probabilities are non-negative and sum
///   to 1 within `1e-9`, and every successor is listed in `states`.
/// - `discount` lies in `[0, 1]`.
///
/// Violations are reported by [`crate::TabularModel::build`] before any sweep.
pub trait Mdp {
    type State: Clone + Eq + Hash + Debug;
    type Action: Clone + Debug;

    /// Stable identifier echoed into results and trace headers.
    fn mdp_id(&self) -> &str;

    fn states(&self) -> Vec<Self::State>;

    fn actions(&self, state: &Self::State) -> Vec<Self::Action>;

    fn transitions(
        &self,
        state: &Self::State,
        action: &Self::Action,
    ) -> Vec<Transition<Self::State>>;

    fn reward(&self, state: &Self::State, action: &Self::Action, next: &Self::State) -> f64;

    fn discount(&self) -> f64;

    fn is_terminal(&self, state: &Self::State) -> bool;

    /// Fixed value of a terminal state.
    fn terminal_value(&self, _state: &Self::State) -> f64 {
        0.0
    }
}
