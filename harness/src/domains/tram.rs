//! The tram domain: from block 1 to block `n`, either walk one block or ride
//! the tram from `s` to `2s`.
//!
//! [`TramProblem`] is the deterministic search version. [`TramMdp`] makes the
//! tram unreliable: it departs with probability `1 - fail_prob` and otherwise
//! leaves the rider where they were, still charging the fare.

use waymark_mdp::{Mdp, Transition};
use waymark_search::{SearchProblem, Successor};

/// Action costs shared by both tram variants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TramCosts {
    pub walk: f64,
    pub tram: f64,
}

impl Default for TramCosts {
    fn default() -> Self {
        Self {
            walk: 1.0,
            tram: 2.0,
        }
    }
}

impl TramCosts {
    fn of(self, action: TramAction) -> f64 {
        match action {
            TramAction::Walk => self.walk,
            TramAction::Tram => self.tram,
        }
    }

    fn cheapest(self) -> f64 {
        self.walk.min(self.tram)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TramAction {
    Walk,
    Tram,
}

/// Actions available at block `s`, walk first.
fn available(n: u32, s: u32) -> Vec<TramAction> {
    let mut out = Vec::with_capacity(2);
    if s < n {
        out.push(TramAction::Walk);
    }
    if s.checked_mul(2).is_some_and(|t| t <= n) {
        out.push(TramAction::Tram);
    }
    out
}

fn destination(s: u32, action: TramAction) -> u32 {
    match action {
        TramAction::Walk => s + 1,
        TramAction::Tram => s * 2,
    }
}

/// Deterministic tram search problem. Blocks `1..=n`, start 1, goal `n`.
#[derive(Debug, Clone)]
pub struct TramProblem {
    n: u32,
    costs: TramCosts,
    id: String,
    /// `min_steps[s]`: fewest actions from block `s` to `n`.
    min_steps: Vec<u32>,
}

impl TramProblem {
    /// Tram problem with the default costs (walk 1, tram 2).
    #[must_use]
    pub fn new(n: u32) -> Self {
        Self::with_costs(n, TramCosts::default())
    }

    /// `n` below 1 is raised to 1.
    #[must_use]
    pub fn with_costs(n: u32, costs: TramCosts) -> Self {
        let n = n.max(1);
        Self {
            n,
            costs,
            id: format!("tram-{n}"),
            min_steps: min_steps_table(n),
        }
    }

    #[must_use]
    pub fn blocks(&self) -> u32 {
        self.n
    }

    /// Fewest remaining actions times the cheapest action cost.
    ///
    /// Admissible for any non-negative costs.
    #[must_use]
    pub fn heuristic(&self, state: &u32) -> f64 {
        let steps = self
            .min_steps
            .get(*state as usize)
            .copied()
            .unwrap_or_default();
        f64::from(steps) * self.costs.cheapest()
    }

    /// Optimal plan cost from block 1 by backward dynamic programming.
    ///
    /// An oracle independent of the search engines.
    #[must_use]
    pub fn optimal_cost(&self) -> f64 {
        let n = self.n as usize;
        let mut best = vec![0.0; n + 1];
        for s in (1..self.n).rev() {
            best[s as usize] = available(self.n, s)
                .into_iter()
                .map(|a| self.costs.of(a) + best[destination(s, a) as usize])
                .fold(f64::INFINITY, f64::min);
        }
        best[1]
    }
}

/// Unit-cost distance to `n` for every block, filled right to left.
fn min_steps_table(n: u32) -> Vec<u32> {
    let mut steps = vec![0; n as usize + 1];
    for s in (1..n).rev() {
        steps[s as usize] = available(n, s)
            .into_iter()
            .map(|a| 1 + steps[destination(s, a) as usize])
            .min()
            .unwrap_or(0);
    }
    steps
}

impl SearchProblem for TramProblem {
    type State = u32;
    type Action = TramAction;

    fn problem_id(&self) -> &str {
        &self.id
    }

    fn start(&self) -> u32 {
        1
    }

    fn is_goal(&self, state: &u32) -> bool {
        *state == self.n
    }

    fn successors(&self, state: &u32) -> Vec<Successor<u32, TramAction>> {
        available(self.n, *state)
            .into_iter()
            .map(|a| Successor::new(a, destination(*state, a), self.costs.of(a)))
            .collect()
    }
}

/// Stochastic tram. Reward is the negated action cost; block `n` is terminal.
#[derive(Debug, Clone)]
pub struct TramMdp {
    n: u32,
    fail_prob: f64,
    costs: TramCosts,
    discount: f64,
    id: String,
}

impl TramMdp {
    /// Default failure probability of the tram.
    pub const DEFAULT_FAIL_PROB: f64 = 0.9;

    /// Undiscounted tram MDP with default costs.
    #[must_use]
    pub fn new(n: u32, fail_prob: f64) -> Self {
        let n = n.max(1);
        Self {
            n,
            fail_prob,
            costs: TramCosts::default(),
            discount: 1.0,
            id: format!("tram-mdp-{n}-fail-{fail_prob}"),
        }
    }

    #[must_use]
    pub fn with_costs(mut self, costs: TramCosts) -> Self {
        self.costs = costs;
        self
    }

    #[must_use]
    pub fn with_discount(mut self, discount: f64) -> Self {
        self.discount = discount;
        self
    }

    #[must_use]
    pub fn blocks(&self) -> u32 {
        self.n
    }
}

impl Mdp for TramMdp {
    type State = u32;
    type Action = TramAction;

    fn mdp_id(&self) -> &str {
        &self.id
    }

    fn states(&self) -> Vec<u32> {
        (1..=self.n).collect()
    }

    fn actions(&self, state: &u32) -> Vec<TramAction> {
        if self.is_terminal(state) {
            Vec::new()
        } else {
            available(self.n, *state)
        }
    }

    fn transitions(&self, state: &u32, action: &TramAction) -> Vec<Transition<u32>> {
        match action {
            TramAction::Walk => vec![Transition::new(state + 1, 1.0)],
            TramAction::Tram => vec![
                Transition::new(state * 2, 1.0 - self.fail_prob),
                Transition::new(*state, self.fail_prob),
            ],
        }
    }

    fn reward(&self, _state: &u32, action: &TramAction, _next: &u32) -> f64 {
        -self.costs.of(*action)
    }

    fn discount(&self) -> f64 {
        self.discount
    }

    fn is_terminal(&self, state: &u32) -> bool {
        *state == self.n
    }
}

/// Fixed-width three-row table of a tram policy: blocks, actions, values.
///
/// Actions print as `w` (walk), `t` (tram) or `.` (terminal).
#[must_use]
pub fn render_tram_grid(values: &[(u32, f64)], policy: &[(u32, TramAction)]) -> String {
    const WIDTH: usize = 8;
    let mut blocks = String::from("s :");
    let mut actions = String::from("pi:");
    let mut vals = String::from("V :");
    for (s, v) in values {
        let a = match policy.iter().find(|(p, _)| p == s).map(|(_, a)| a) {
            Some(TramAction::Walk) => "w",
            Some(TramAction::Tram) => "t",
            None => ".",
        };
        blocks.push_str(&format!("{s:>WIDTH$}"));
        actions.push_str(&format!("{a:>WIDTH$}"));
        vals.push_str(&format!("{v:>WIDTH$.2}"));
    }
    [blocks, actions, vals].join("\n")
}
