//! `LinearChain`: states `0..len`, one unit-cost step to the right.

use waymark_search::{SearchProblem, Successor};

/// A straight line of `len` states. Start `0`, goal `len - 1`.
#[derive(Debug, Clone)]
pub struct LinearChain {
    len: u32,
    id: String,
}

impl LinearChain {
    /// A chain of `len` states. Lengths below 1 are raised to 1.
    #[must_use]
    pub fn new(len: u32) -> Self {
        let len = len.max(1);
        Self {
            len,
            id: format!("linear-chain-{len}"),
        }
    }

    #[must_use]
    pub fn goal(&self) -> u32 {
        self.len - 1
    }

    /// Remaining steps to the goal. Exact, hence admissible and consistent.
    #[must_use]
    pub fn heuristic(&self, state: &u32) -> f64 {
        f64::from(self.goal().saturating_sub(*state))
    }
}

impl SearchProblem for LinearChain {
    type State = u32;
    type Action = &'static str;

    fn problem_id(&self) -> &str {
        &self.id
    }

    fn start(&self) -> u32 {
        0
    }

    fn is_goal(&self, state: &u32) -> bool {
        *state == self.goal()
    }

    fn successors(&self, state: &u32) -> Vec<Successor<u32, &'static str>> {
        if *state < self.goal() {
            vec![Successor::new("step", state + 1, 1.0)]
        } else {
            Vec::new()
        }
    }
}
