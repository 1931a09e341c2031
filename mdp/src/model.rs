//! `TabularModel`: a validated, index-addressed copy of an [`Mdp`].
//!
//! Solvers never call back into the domain. Everything they need (successor
//! indices, probabilities, rewards) is compiled here once, so a contract
//! violation surfaces before the first sweep.

use std::collections::HashMap;

use waymark_kernel::trace::debug_label;

use crate::contract::Mdp;
use crate::error::MdpError;

/// Absolute tolerance on `|sum(p) - 1|` for each `(state, action)`.
pub const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// One compiled `(next, probability, reward)` outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outcome {
    pub next: usize,
    pub probability: f64,
    pub reward: f64,
}

#[derive(Debug, Clone)]
struct StateRow<A> {
    terminal: bool,
    terminal_value: f64,
    actions: Vec<A>,
    /// `outcomes[a]` lists the outcomes of `actions[a]`.
    outcomes: Vec<Vec<Outcome>>,
}

/// Validated tabular form of an MDP. State index = position in `states()`.
#[derive(Debug, Clone)]
pub struct TabularModel<S, A> {
    id: String,
    discount: f64,
    states: Vec<S>,
    rows: Vec<StateRow<A>>,
    index: HashMap<S, usize>,
}

impl<S, A> TabularModel<S, A>
where
    S: Clone + Eq + std::hash::Hash + std::fmt::Debug,
    A: Clone + std::fmt::Debug,
{
    /// Validate `mdp` and compile it.
    ///
    /// # Errors
    ///
    /// Returns the first contract violation found, scanning states in order
    /// and actions in domain order.
    pub fn build<M>(mdp: &M) -> Result<Self, MdpError>
    where
        M: Mdp<State = S, Action = A>,
    {
        let discount = mdp.discount();
        if !(0.0..=1.0).contains(&discount) {
            return Err(MdpError::InvalidDiscount { discount });
        }

        let states = mdp.states();
        let mut index = HashMap::with_capacity(states.len());
        for (i, s) in states.iter().enumerate() {
            if index.insert(s.clone(), i).is_some() {
                return Err(MdpError::DuplicateState {
                    state: debug_label(s),
                });
            }
        }

        let mut rows = Vec::with_capacity(states.len());
        for s in &states {
            if mdp.is_terminal(s) {
                let value = mdp.terminal_value(s);
                if !value.is_finite() {
                    return Err(MdpError::NonFiniteTerminalValue {
                        state: debug_label(s),
                        value,
                    });
                }
                rows.push(StateRow {
                    terminal: true,
                    terminal_value: value,
                    actions: Vec::new(),
                    outcomes: Vec::new(),
                });
                continue;
            }

            let actions = mdp.actions(s);
            if actions.is_empty() {
                return Err(MdpError::NoActions {
                    state: debug_label(s),
                });
            }
            let mut outcomes = Vec::with_capacity(actions.len());
            for a in &actions {
                outcomes.push(compile_action(mdp, &index, s, a)?);
            }
            rows.push(StateRow {
                terminal: false,
                terminal_value: 0.0,
                actions,
                outcomes,
            });
        }

        Ok(Self {
            id: mdp.mdp_id().to_string(),
            discount,
            states,
            rows,
            index,
        })
    }
}

fn compile_action<M: Mdp>(
    mdp: &M,
    index: &HashMap<M::State, usize>,
    s: &M::State,
    a: &M::Action,
) -> Result<Vec<Outcome>, MdpError> {
    let mut compiled = Vec::new();
    let mut sum = 0.0;
    for t in mdp.transitions(s, a) {
        if t.probability < 0.0 {
            return Err(MdpError::NegativeProbability {
                state: debug_label(s),
                action: debug_label(a),
                next: debug_label(&t.state),
                probability: t.probability,
            });
        }
        let Some(&next) = index.get(&t.state) else {
            return Err(MdpError::UnknownSuccessor {
                state: debug_label(s),
                action: debug_label(a),
                next: debug_label(&t.state),
            });
        };
        let reward = mdp.reward(s, a, &t.state);
        if !reward.is_finite() {
            return Err(MdpError::NonFiniteReward {
                state: debug_label(s),
                action: debug_label(a),
                next: debug_label(&t.state),
                reward,
            });
        }
        sum += t.probability;
        compiled.push(Outcome {
            next,
            probability: t.probability,
            reward,
        });
    }
    if sum.is_nan() || (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(MdpError::ProbabilitySum {
            state: debug_label(s),
            action: debug_label(a),
            sum,
        });
    }
    Ok(compiled)
}

impl<S, A> TabularModel<S, A> {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn discount(&self) -> f64 {
        self.discount
    }

    /// Number of states.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    #[must_use]
    pub fn states(&self) -> &[S] {
        &self.states
    }

    #[must_use]
    pub fn state(&self, s: usize) -> &S {
        &self.states[s]
    }

    #[must_use]
    pub fn is_terminal(&self, s: usize) -> bool {
        self.rows[s].terminal
    }

    #[must_use]
    pub fn terminal_value(&self, s: usize) -> f64 {
        self.rows[s].terminal_value
    }

    /// Actions of state `s` in domain order; empty for terminal states.
    #[must_use]
    pub fn actions(&self, s: usize) -> &[A] {
        &self.rows[s].actions
    }

    #[must_use]
    pub fn outcomes(&self, s: usize, a: usize) -> &[Outcome] {
        &self.rows[s].outcomes[a]
    }

    /// Indices of non-terminal states, in state order.
    pub fn non_terminal(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.rows.len()).filter(move |&s| !self.rows[s].terminal)
    }

    /// Starting value table: terminal values for terminal states, 0 elsewhere.
    #[must_use]
    pub fn initial_values(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.terminal_value).collect()
    }
}

impl<S: Eq + std::hash::Hash, A> TabularModel<S, A> {
    /// Index of a state, if listed.
    #[must_use]
    pub fn index_of(&self, state: &S) -> Option<usize> {
        self.index.get(state).copied()
    }
}
