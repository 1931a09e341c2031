//! MDP solver properties over seeded random MDPs, plus the closed-form
//! scenarios.

use proptest::prelude::*;

use waymark_harness::domains::TramMdp;
use waymark_kernel::rng::SeededRng;
use waymark_kernel::trace::{TraceEventBody, TraceEventKind, TraceOptions};
use waymark_mdp::bellman::q_value;
use waymark_mdp::{
    policy_iteration, value_iteration, Mdp, PolicyIterationConfig, TabularModel, Transition,
    ValueIterationConfig,
};

/// Random MDP over states `0..n`; the last state is terminal.
#[derive(Debug)]
struct RandomMdp {
    id: String,
    discount: f64,
    /// `rows[s][a]`: (reward, outcomes).
    rows: Vec<Vec<(f64, Vec<(usize, f64)>)>>,
}

impl RandomMdp {
    fn generate(seed: u64, n: usize, discount: f64, nonnegative: bool) -> Self {
        let mut rng = SeededRng::new(seed);
        let mut rows = Vec::with_capacity(n);
        for _ in 0..n - 1 {
            let actions = rng.gen_range(1..4).unwrap();
            let mut row = Vec::new();
            for _ in 0..actions {
                let mut weights = vec![0u64; n];
                for _ in 0..rng.gen_range(1..4).unwrap() {
                    weights[rng.gen_index(n).unwrap()] += rng.gen_range(1..10).unwrap();
                }
                let total: u64 = weights.iter().sum();
                #[allow(clippy::cast_precision_loss)]
                let outcomes = weights
                    .iter()
                    .enumerate()
                    .filter(|(_, w)| **w > 0)
                    .map(|(s, &w)| (s, w as f64 / total as f64))
                    .collect();
                #[allow(clippy::cast_precision_loss)]
                let reward = rng.gen_range(0..11).unwrap() as f64;
                let reward = if nonnegative { reward } else { reward - 5.0 };
                row.push((reward, outcomes));
            }
            rows.push(row);
        }
        rows.push(Vec::new());
        Self {
            id: format!("random-mdp-{seed}"),
            discount,
            rows,
        }
    }
}

impl Mdp for RandomMdp {
    type State = usize;
    type Action = usize;

    fn mdp_id(&self) -> &str {
        &self.id
    }
    fn states(&self) -> Vec<usize> {
        (0..self.rows.len()).collect()
    }
    fn actions(&self, s: &usize) -> Vec<usize> {
        (0..self.rows[*s].len()).collect()
    }
    fn transitions(&self, s: &usize, a: &usize) -> Vec<Transition<usize>> {
        self.rows[*s][*a]
            .1
            .iter()
            .map(|&(t, p)| Transition::new(t, p))
            .collect()
    }
    fn reward(&self, s: &usize, a: &usize, _next: &usize) -> f64 {
        self.rows[*s][*a].0
    }
    fn discount(&self) -> f64 {
        self.discount
    }
    fn is_terminal(&self, s: &usize) -> bool {
        *s + 1 == self.rows.len()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn value_and_policy_iteration_agree(seed in any::<u64>(), n in 2usize..8, gamma in 0.5f64..0.95) {
        let mdp = RandomMdp::generate(seed, n, gamma, false);
        let vi = value_iteration(&mdp, &ValueIterationConfig::default()).unwrap();
        let pi = policy_iteration(&mdp, &PolicyIterationConfig::default()).unwrap();
        prop_assert!(vi.is_converged());
        prop_assert!(pi.is_converged());

        for ((s, v), (_, w)) in vi.values.iter().zip(&pi.values) {
            prop_assert!((v - w).abs() < 1e-6, "state {}: vi={} pi={}", s, v, w);
        }

        // Policies agree wherever the greedy choice is not a near tie.
        let model = TabularModel::build(&mdp).unwrap();
        let values: Vec<f64> = vi.values.iter().map(|(_, v)| *v).collect();
        for ((s, a_vi), (_, a_pi)) in vi.policy.iter().zip(&pi.policy) {
            if a_vi != a_pi {
                let gap = (q_value(&model, *s, *a_vi, &values) - q_value(&model, *s, *a_pi, &values)).abs();
                prop_assert!(gap < 1e-6, "state {}: actions {} vs {} differ by {}", s, a_vi, a_pi, gap);
            }
        }
    }

    #[test]
    fn value_iteration_rises_monotonically_from_zero(seed in any::<u64>(), n in 2usize..8, gamma in 0.5f64..0.95) {
        let mdp = RandomMdp::generate(seed, n, gamma, true);
        let config = ValueIterationConfig::default().with_trace(TraceOptions::full());
        let vi = value_iteration(&mdp, &config).unwrap();
        let trace = vi.trace.as_ref().unwrap();
        let mut previous = vec![0.0; n];
        for event in trace.events_of_kind(TraceEventKind::IterationSweep) {
            let TraceEventBody::IterationSweep { values, .. } = &event.body else {
                unreachable!("filtered by kind");
            };
            for (i, (_, v)) in values.iter().enumerate() {
                prop_assert!(*v >= previous[i] - 1e-12);
                previous[i] = *v;
            }
        }
    }

    #[test]
    fn solvers_are_idempotent(seed in any::<u64>(), n in 2usize..8) {
        let mdp = RandomMdp::generate(seed, n, 0.9, false);
        let config = PolicyIterationConfig::default().with_trace(TraceOptions::full());
        let a = policy_iteration(&mdp, &config).unwrap();
        let b = policy_iteration(&mdp, &config).unwrap();
        prop_assert_eq!(a.to_canonical_json_bytes().unwrap(), b.to_canonical_json_bytes().unwrap());
        prop_assert_eq!(a.trace, b.trace);
    }
}

/// A -> B -> T, reward 1 on entering T, discount 0.9.
struct ThreeStateChain;

impl Mdp for ThreeStateChain {
    type State = char;
    type Action = &'static str;

    fn mdp_id(&self) -> &str {
        "three-state-chain"
    }
    fn states(&self) -> Vec<char> {
        vec!['A', 'B', 'T']
    }
    fn actions(&self, s: &char) -> Vec<&'static str> {
        if *s == 'T' {
            Vec::new()
        } else {
            vec!["go"]
        }
    }
    fn transitions(&self, s: &char, _a: &&'static str) -> Vec<Transition<char>> {
        let next = if *s == 'A' { 'B' } else { 'T' };
        vec![Transition::new(next, 1.0)]
    }
    fn reward(&self, _s: &char, _a: &&'static str, next: &char) -> f64 {
        if *next == 'T' {
            1.0
        } else {
            0.0
        }
    }
    fn discount(&self) -> f64 {
        0.9
    }
    fn is_terminal(&self, s: &char) -> bool {
        *s == 'T'
    }
}

#[test]
fn three_state_chain_matches_closed_form() {
    let config = ValueIterationConfig::default().with_tolerance(1e-6);
    let vi = value_iteration(&ThreeStateChain, &config).unwrap();
    assert!(vi.is_converged());
    assert!(vi.iterations <= 3);
    assert!((vi.value_of(&'B').unwrap() - 1.0).abs() < 1e-6);
    assert!((vi.value_of(&'A').unwrap() - 0.9).abs() < 1e-6);
    assert!(vi.value_of(&'T').unwrap().abs() < f64::EPSILON);
    assert_eq!(vi.policy.len(), 2);

    let pi = policy_iteration(&ThreeStateChain, &PolicyIterationConfig::default()).unwrap();
    assert_eq!(pi.policy, vi.policy);
}

#[test]
fn tram_solvers_agree() {
    for fail_prob in [0.0, 0.25, 0.5, 0.9] {
        let mdp = TramMdp::new(24, fail_prob);
        let vi = value_iteration(&mdp, &ValueIterationConfig::default()).unwrap();
        let pi = policy_iteration(&mdp, &PolicyIterationConfig::default()).unwrap();
        assert!(vi.is_converged() && pi.is_converged(), "fail_prob={fail_prob}");
        for ((_, v), (_, w)) in vi.values.iter().zip(&pi.values) {
            assert!((v - w).abs() < 1e-6, "fail_prob={fail_prob}");
        }
    }
}

#[test]
fn iteration_cap_is_a_status_not_an_error() {
    let mdp = TramMdp::new(40, 0.5);
    let vi = value_iteration(&mdp, &ValueIterationConfig::default().with_max_iterations(2)).unwrap();
    assert!(!vi.is_converged());
    assert_eq!(vi.iterations, 2);
    assert_eq!(vi.values.len(), 40);
}
