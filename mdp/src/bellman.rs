//! Bellman backups, the greedy tie-break rule, and iterative policy evaluation.
//!
//! Value tables and policies here are index-addressed: `values[s]` for state
//! index `s`, `policy[s] = Some(action_index)` for non-terminal states and
//! `None` for terminal ones.

use crate::model::TabularModel;

/// Q-values within this absolute distance of the maximum count as tied.
pub const GREEDY_TIE_TOLERANCE: f64 = 1e-12;

/// `Q(s, a) = Σ p · (r + γ · V(s'))`.
#[must_use]
pub fn q_value<S, A>(model: &TabularModel<S, A>, s: usize, a: usize, values: &[f64]) -> f64 {
    let gamma = model.discount();
    model
        .outcomes(s, a)
        .iter()
        .map(|o| o.probability * (o.reward + gamma * values[o.next]))
        .sum()
}

/// The greedy action of state `s` and its Q-value.
///
/// Ties go to the first action, in domain order, whose Q-value is within
/// [`GREEDY_TIE_TOLERANCE`] of the maximum. Returns `None` for terminal
/// states.
#[must_use]
pub fn greedy_action<S, A>(
    model: &TabularModel<S, A>,
    s: usize,
    values: &[f64],
) -> Option<(usize, f64)> {
    let qs: Vec<f64> = (0..model.actions(s).len())
        .map(|a| q_value(model, s, a, values))
        .collect();
    let best = qs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    qs.iter()
        .position(|&q| q >= best - GREEDY_TIE_TOLERANCE)
        .map(|a| (a, qs[a]))
}

/// Greedy policy against `values`, for every state.
#[must_use]
pub fn greedy_policy<S, A>(model: &TabularModel<S, A>, values: &[f64]) -> Vec<Option<usize>> {
    (0..model.len())
        .map(|s| greedy_action(model, s, values).map(|(a, _)| a))
        .collect()
}

/// Result of [`evaluate_policy`].
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub values: Vec<f64>,
    /// Synchronous sweeps performed.
    pub sweeps: u64,
    /// Largest absolute change in the final sweep.
    pub delta: f64,
    /// Whether `delta` dropped below the tolerance within `max_sweeps`.
    pub converged: bool,
    /// Q-value computations performed.
    pub backups: u64,
}

/// Iteratively evaluate a fixed policy, starting from `initial`.
///
/// Each sweep recomputes every non-terminal state's value with the action
/// fixed by `policy`; terminal states keep their value from `initial`. Stops
/// once the largest change is below `tolerance` or after `max_sweeps`.
#[must_use]
pub fn evaluate_policy<S, A>(
    model: &TabularModel<S, A>,
    policy: &[Option<usize>],
    initial: &[f64],
    tolerance: f64,
    max_sweeps: u64,
) -> Evaluation {
    let mut values = initial.to_vec();
    let mut sweeps = 0;
    let mut delta = f64::INFINITY;
    let mut backups = 0;
    while sweeps < max_sweeps {
        let mut next = values.clone();
        for s in model.non_terminal() {
            if let Some(a) = policy[s] {
                next[s] = q_value(model, s, a, &values);
                backups += 1;
            }
        }
        delta = max_abs_change(&values, &next);
        values = next;
        sweeps += 1;
        if delta < tolerance {
            break;
        }
    }
    Evaluation {
        values,
        sweeps,
        delta,
        converged: delta < tolerance,
        backups,
    }
}

/// `max |a[i] - b[i]|`, 0 for empty tables.
#[must_use]
pub fn max_abs_change(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}
