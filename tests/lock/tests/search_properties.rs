//! Search engine properties over seeded random graphs.
//!
//! Each case draws a graph from a proptest-chosen seed, so failures shrink to
//! a small reproducible (seed, nodes, extra edges) triple.

use proptest::prelude::*;

use waymark_harness::domains::{LinearChain, RandomGraph, TramProblem};
use waymark_kernel::rng::SeededRng;
use waymark_search::{
    astar, bfs, dfs, ucs, SearchPolicy, SearchProblem, SearchResult, SearchStatus, Successor,
};

fn graph(seed: u64, nodes: u32, extra: u32) -> RandomGraph {
    RandomGraph::generate(&mut SeededRng::new(seed), nodes, extra).unwrap()
}

/// Path and actions follow real edges and the edge costs sum to `cost`.
fn assert_valid_path<P: SearchProblem>(problem: &P, r: &SearchResult<P::State, P::Action>)
where
    P::Action: PartialEq,
{
    assert_eq!(r.path.first(), Some(&problem.start()));
    assert!(problem.is_goal(r.path.last().unwrap()));
    assert_eq!(r.actions.len() + 1, r.path.len());
    let mut total = 0.0;
    for (i, action) in r.actions.iter().enumerate() {
        let edge: Vec<Successor<P::State, P::Action>> = problem
            .successors(&r.path[i])
            .into_iter()
            .filter(|s| s.action == *action && s.state == r.path[i + 1])
            .collect();
        assert_eq!(edge.len(), 1, "step {i} does not follow an edge");
        total += edge[0].cost;
    }
    assert!((total - r.cost).abs() < 1e-9);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn ucs_and_astar_agree_on_optimal_cost(seed in any::<u64>(), nodes in 2u32..60, extra in 0u32..150) {
        let g = graph(seed, nodes, extra);
        let policy = SearchPolicy::default();
        let u = ucs(&g, &policy).unwrap();
        let exact = astar(&g, &|s: &u32| g.heuristic(s), &policy).unwrap();
        let half = astar(&g, &|s: &u32| g.heuristic(s) / 2.0, &policy).unwrap();

        prop_assert_eq!(u.status, SearchStatus::Success);
        prop_assert_eq!(Some(u.cost), g.exact_distance(0));
        prop_assert!((exact.cost - u.cost).abs() < 1e-9);
        prop_assert!((half.cost - u.cost).abs() < 1e-9);
        assert_valid_path(&g, &u);
        assert_valid_path(&g, &exact);
    }

    #[test]
    fn consistent_heuristic_expands_no_more_than_ucs(seed in any::<u64>(), nodes in 2u32..60, extra in 0u32..150) {
        let g = graph(seed, nodes, extra);
        let policy = SearchPolicy::default();
        let u = ucs(&g, &policy).unwrap();
        let exact = astar(&g, &|s: &u32| g.heuristic(s), &policy).unwrap();
        let half = astar(&g, &|s: &u32| g.heuristic(s) / 2.0, &policy).unwrap();

        prop_assert!(exact.metrics.expanded <= half.metrics.expanded);
        prop_assert!(half.metrics.expanded <= u.metrics.expanded);
        prop_assert_eq!(exact.metrics.reopens, 0);
        prop_assert_eq!(half.metrics.reopens, 0);
        prop_assert_eq!(u.metrics.reopens, 0);
    }

    #[test]
    fn bfs_finds_fewest_edges(seed in any::<u64>(), nodes in 2u32..60, extra in 0u32..150) {
        let g = graph(seed, nodes, extra);
        let b = bfs(&g, &SearchPolicy::default()).unwrap();
        prop_assert_eq!(Some(b.actions.len()), g.fewest_edges_to_goal());
        prop_assert_eq!(b.metrics.reopens, 0);
        assert_valid_path(&g, &b);
    }

    #[test]
    fn dfs_finds_a_valid_path_no_cheaper_than_optimal(seed in any::<u64>(), nodes in 2u32..60, extra in 0u32..150) {
        let g = graph(seed, nodes, extra);
        let d = dfs(&g, &SearchPolicy::default()).unwrap();
        prop_assert_eq!(d.status, SearchStatus::Success);
        prop_assert!(d.cost + 1e-9 >= g.exact_distance(0).unwrap());
        assert_valid_path(&g, &d);
    }

    #[test]
    fn budget_caps_expansions(seed in any::<u64>(), nodes in 2u32..60, extra in 0u32..150, k in 1u64..40) {
        let g = graph(seed, nodes, extra);
        let full = ucs(&g, &SearchPolicy::default()).unwrap();
        let capped = ucs(&g, &SearchPolicy::default().with_max_expansions(k)).unwrap();
        prop_assert!(capped.metrics.expanded <= k);
        if full.metrics.expanded <= k {
            prop_assert_eq!(capped.to_canonical_json_bytes(), full.to_canonical_json_bytes());
        } else {
            prop_assert_eq!(capped.status, SearchStatus::BudgetExceeded);
            prop_assert_eq!(capped.metrics.expanded, k);
            prop_assert!(capped.cost.is_infinite());
            prop_assert!(capped.path.is_empty());
        }
    }
}

/// Heuristic that overestimates at one state and corrects afterwards: A*
/// first closes `b` through the expensive edge, then reopens it.
#[test]
fn inconsistent_heuristic_reopens_exactly_once() {
    struct Diamond;
    impl SearchProblem for Diamond {
        type State = char;
        type Action = char;
        fn problem_id(&self) -> &str {
            "diamond"
        }
        fn start(&self) -> char {
            's'
        }
        fn is_goal(&self, s: &char) -> bool {
            *s == 'g'
        }
        fn successors(&self, s: &char) -> Vec<Successor<char, char>> {
            let edges: &[(char, f64)] = match s {
                's' => &[('a', 1.0), ('b', 3.0)],
                'a' => &[('b', 1.0)],
                'b' => &[('g', 5.0)],
                _ => &[],
            };
            edges.iter().map(|&(t, c)| Successor::new(t, t, c)).collect()
        }
    }
    let h = |s: &char| if *s == 'a' { 5.0 } else { 0.0 };

    let policy = SearchPolicy::default();
    let a = astar(&Diamond, &h, &policy).unwrap();
    let u = ucs(&Diamond, &policy).unwrap();
    assert!((a.cost - 7.0).abs() < 1e-12);
    assert!((u.cost - 7.0).abs() < 1e-12);
    assert_eq!(a.path, vec!['s', 'a', 'b', 'g']);
    assert_eq!(a.metrics.reopens, 1);
    assert_eq!(a.metrics.expanded, 5);
    assert_eq!(u.metrics.reopens, 0);
}

#[test]
fn five_state_chain_scenario() {
    let chain = LinearChain::new(5);
    let policy = SearchPolicy::default();
    let results = [
        bfs(&chain, &policy).unwrap(),
        ucs(&chain, &policy).unwrap(),
        astar(&chain, &|s: &u32| chain.heuristic(s), &policy).unwrap(),
    ];
    for r in &results {
        assert_eq!(r.status, SearchStatus::Success);
        assert!((r.cost - 4.0).abs() < f64::EPSILON);
        assert_eq!(r.path, vec![0, 1, 2, 3, 4]);
        assert_eq!(r.actions.len(), 4);
        assert_eq!(r.metrics.expanded, 5);
        assert_eq!(r.metrics.generated_edges, 4);
    }
}

#[test]
fn tram_heuristic_never_loses_optimality() {
    for n in 1..=120 {
        let tram = TramProblem::new(n);
        let u = ucs(&tram, &SearchPolicy::default()).unwrap();
        let a = astar(&tram, &|s: &u32| tram.heuristic(s), &SearchPolicy::default()).unwrap();
        assert!((u.cost - tram.optimal_cost()).abs() < 1e-9, "n={n}");
        assert!((a.cost - u.cost).abs() < 1e-9, "n={n}");
        assert_valid_path(&tram, &a);
    }
}
