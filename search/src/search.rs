//! Search entry points and the shared expansion loop.
//!
//! All four algorithms run the same loop and differ only in the frontier
//! discipline and the relaxation rule:
//!
//! | algorithm | frontier    | priority   | relaxation       |
//! |-----------|-------------|------------|------------------|
//! | BFS       | FIFO        | n/a        | first discovery  |
//! | DFS       | LIFO        | n/a        | first discovery  |
//! | UCS       | best-first  | `g`        | strictly cheaper |
//! | A*        | best-first  | `g + h`    | strictly cheaper |
//!
//! The goal test runs when a node is popped, so a start state that is a goal
//! yields cost 0 after one expansion.

use std::collections::HashMap;

use waymark_kernel::result::{Algorithm, SearchMetrics, Stopwatch};
use waymark_kernel::schema::RESULT_SCHEMA_VERSION;
use waymark_kernel::trace::{debug_label, TraceEventBody, TraceRecorder};

use crate::contract::{Heuristic, SearchProblem, Successor, ZeroHeuristic};
use crate::error::SearchError;
use crate::frontier::{BestFirstFrontier, FifoFrontier, Frontier, LifoFrontier};
use crate::node::{FrontierKey, NodeArena, NodeId};
use crate::policy::SearchPolicy;
use crate::result::{SearchResult, SearchStatus};

type Outcome<P> =
    Result<SearchResult<<P as SearchProblem>::State, <P as SearchProblem>::Action>, SearchError>;

/// Breadth-first search: fewest edges, edge costs ignored for ordering.
///
/// The reported `cost` is the accumulated step cost along that path.
///
/// # Errors
///
/// Returns [`SearchError`] on an invalid policy or an edge with a negative or
/// non-finite cost.
pub fn bfs<P: SearchProblem>(problem: &P, policy: &SearchPolicy) -> Outcome<P> {
    run(
        problem,
        &ZeroHeuristic,
        FifoFrontier::new(),
        Algorithm::Bfs,
        policy,
    )
}

/// Depth-first graph search. The last generated successor is explored first.
///
/// Complete on finite problems, not optimal.
///
/// # Errors
///
/// Same as [`bfs`].
pub fn dfs<P: SearchProblem>(problem: &P, policy: &SearchPolicy) -> Outcome<P> {
    run(
        problem,
        &ZeroHeuristic,
        LifoFrontier::new(),
        Algorithm::Dfs,
        policy,
    )
}

/// Uniform-cost search: optimal for non-negative edge costs.
///
/// # Errors
///
/// Same as [`bfs`].
pub fn ucs<P: SearchProblem>(problem: &P, policy: &SearchPolicy) -> Outcome<P> {
    run(
        problem,
        &ZeroHeuristic,
        BestFirstFrontier::new(),
        Algorithm::Ucs,
        policy,
    )
}

/// A* search with priority `g + h`.
///
/// Optimal when `heuristic` is admissible. An inconsistent heuristic may
/// reopen expanded states; each improvement counts once in `reopens`.
///
/// # Errors
///
/// Same as [`bfs`], plus [`SearchError::NonFiniteHeuristic`] when the
/// heuristic returns NaN, an infinity or a negative value.
pub fn astar<P, H>(problem: &P, heuristic: &H, policy: &SearchPolicy) -> Outcome<P>
where
    P: SearchProblem,
    H: Heuristic<P::State>,
{
    run(
        problem,
        heuristic,
        BestFirstFrontier::new(),
        Algorithm::AStar,
        policy,
    )
}

/// When a newly generated successor may enter the frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relaxation {
    /// Only states never seen before (BFS, DFS).
    FirstDiscovery,
    /// Unseen states, or seen states reached at a strictly lower cost.
    StrictlyCheaper,
}

#[allow(clippy::too_many_lines)]
fn run<P, H, F>(
    problem: &P,
    heuristic: &H,
    mut frontier: F,
    algorithm: Algorithm,
    policy: &SearchPolicy,
) -> Outcome<P>
where
    P: SearchProblem,
    H: Heuristic<P::State>,
    F: Frontier,
{
    policy.validate()?;

    let stopwatch = Stopwatch::start();
    let relaxation = match algorithm {
        Algorithm::Ucs | Algorithm::AStar => Relaxation::StrictlyCheaper,
        _ => Relaxation::FirstDiscovery,
    };
    let informed = algorithm == Algorithm::AStar;

    tracing::debug!(
        algorithm = algorithm.as_str(),
        problem = problem.problem_id(),
        max_expansions = ?policy.max_expansions,
        "search started"
    );

    let mut arena: NodeArena<P::State, P::Action> = NodeArena::new();
    // Lowest g at which each state is enqueued or expanded.
    let mut best_g: HashMap<P::State, f64> = HashMap::new();
    // g at which each state was last expanded.
    let mut closed: HashMap<P::State, f64> = HashMap::new();
    let mut recorder = TraceRecorder::new(policy.trace);
    let mut metrics = SearchMetrics::default();

    let start = problem.start();
    let h0 = if informed {
        checked_estimate(heuristic, &start)?
    } else {
        0.0
    };
    best_g.insert(start.clone(), 0.0);
    let root = arena.push_root(start);
    frontier.push(
        FrontierKey {
            priority: h0,
            insertion_order: arena.get(root).insertion_order,
        },
        root,
    );

    let mut goal: Option<NodeId> = None;
    let status = loop {
        let Some(id) = frontier.pop() else {
            break SearchStatus::NoSolution;
        };
        let node = arena.get(id);
        let (state, g, depth) = (node.state.clone(), node.g, node.depth);

        let superseded = best_g.get(&state).is_some_and(|&best| g > best);
        let already_closed = closed.get(&state).is_some_and(|&done| done <= g);
        if superseded || already_closed {
            continue;
        }

        if policy
            .max_expansions
            .is_some_and(|cap| metrics.expanded >= cap)
        {
            break SearchStatus::BudgetExceeded;
        }

        closed.insert(state.clone(), g);
        metrics.expanded += 1;
        recorder.record_with(|| TraceEventBody::Expand {
            state: debug_label(&state),
            g,
            depth,
        });

        if problem.is_goal(&state) {
            recorder.record_with(|| TraceEventBody::GoalFound {
                state: debug_label(&state),
                cost: g,
            });
            goal = Some(id);
            break SearchStatus::Success;
        }

        for succ in problem.successors(&state) {
            metrics.generated_edges += 1;
            check_edge_cost(&state, &succ)?;
            if recorder.records_edges() {
                recorder.record_with(|| TraceEventBody::GenerateEdge {
                    from: debug_label(&state),
                    to: debug_label(&succ.state),
                    action: debug_label(&succ.action),
                    cost: succ.cost,
                });
            }

            let g2 = g + succ.cost;
            let admit = match (relaxation, best_g.get(&succ.state)) {
                (_, None) => true,
                (Relaxation::FirstDiscovery, Some(_)) => false,
                (Relaxation::StrictlyCheaper, Some(&best)) => g2 < best,
            };
            if !admit {
                continue;
            }

            if let Some(&previous) = closed.get(&succ.state) {
                metrics.reopens += 1;
                tracing::trace!(
                    state = %debug_label(&succ.state),
                    previous_g = previous,
                    new_g = g2,
                    "reopen"
                );
            }

            let h = if informed {
                checked_estimate(heuristic, &succ.state)?
            } else {
                0.0
            };
            best_g.insert(succ.state.clone(), g2);
            let child = arena.push_child(id, succ.action, succ.state, g2);
            frontier.push(
                FrontierKey {
                    priority: g2 + h,
                    insertion_order: arena.get(child).insertion_order,
                },
                child,
            );
        }
    };

    metrics.max_frontier = frontier.high_water();
    metrics.elapsed_seconds = stopwatch.elapsed_seconds();

    let (cost, path, actions) = match goal {
        Some(id) => {
            let (path, actions) = arena.path_to(id);
            (arena.get(id).g, path, actions)
        }
        None => (f64::INFINITY, Vec::new(), Vec::new()),
    };

    tracing::debug!(
        algorithm = algorithm.as_str(),
        problem = problem.problem_id(),
        status = status.as_str(),
        cost,
        expanded = metrics.expanded,
        generated_edges = metrics.generated_edges,
        reopens = metrics.reopens,
        max_frontier = metrics.max_frontier,
        "search finished"
    );

    Ok(SearchResult {
        schema_version: RESULT_SCHEMA_VERSION.to_string(),
        algorithm,
        problem_id: problem.problem_id().to_string(),
        status,
        cost,
        path,
        actions,
        metrics,
        seed: policy.seed,
        trace: recorder.finish(algorithm, problem.problem_id()),
    })
}

fn check_edge_cost<S, A>(from: &S, succ: &Successor<S, A>) -> Result<(), SearchError>
where
    S: std::fmt::Debug,
{
    if !succ.cost.is_finite() {
        return Err(SearchError::NonFiniteEdgeCost {
            from: debug_label(from),
            to: debug_label(&succ.state),
            cost: succ.cost,
        });
    }
    if succ.cost < 0.0 {
        return Err(SearchError::NegativeEdgeCost {
            from: debug_label(from),
            to: debug_label(&succ.state),
            cost: succ.cost,
        });
    }
    Ok(())
}

fn checked_estimate<S, H>(heuristic: &H, state: &S) -> Result<f64, SearchError>
where
    S: std::fmt::Debug,
    H: Heuristic<S>,
{
    let value = heuristic.estimate(state);
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(SearchError::NonFiniteHeuristic {
            state: debug_label(state),
            value,
        })
    }
}
