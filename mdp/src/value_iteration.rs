//! Value iteration with synchronous sweeps.

use waymark_kernel::result::{Algorithm, Stopwatch};
use waymark_kernel::trace::TraceRecorder;

use crate::bellman::{greedy_action, greedy_policy, max_abs_change};
use crate::config::ValueIterationConfig;
use crate::contract::Mdp;
use crate::error::MdpError;
use crate::model::TabularModel;
use crate::result::{sweep_event, MdpMetrics, MdpResult, Solved, SolveStatus};

/// Solve `mdp` by value iteration.
///
/// Values start at 0 (terminal states at their terminal value). Each sweep
/// sets `V'(s) = max_a Q(s, a)` for every non-terminal state from the previous
/// table. Stops when the largest change is below `config.tolerance`; the
/// policy is then extracted greedily from the final table.
///
/// # Errors
///
/// Returns [`MdpError`] if the configuration is invalid or the MDP violates
/// its contract. Hitting `max_iterations` is not an error.
pub fn value_iteration<M: Mdp>(
    mdp: &M,
    config: &ValueIterationConfig,
) -> Result<MdpResult<M::State, M::Action>, MdpError> {
    config.validate()?;
    let model = TabularModel::build(mdp)?;
    Ok(solve(&model, config))
}

/// Value iteration over an already validated model.
#[must_use]
pub fn solve<S, A>(model: &TabularModel<S, A>, config: &ValueIterationConfig) -> MdpResult<S, A>
where
    S: Clone + std::fmt::Debug,
    A: Clone + std::fmt::Debug,
{
    let stopwatch = Stopwatch::start();
    let mut recorder = TraceRecorder::new(config.trace);
    let mut metrics = MdpMetrics::default();
    let mut values = model.initial_values();
    let mut delta = f64::INFINITY;
    let mut status = SolveStatus::DidNotConverge;

    tracing::debug!(
        algorithm = Algorithm::ValueIteration.as_str(),
        mdp = model.id(),
        states = model.len(),
        tolerance = config.tolerance,
        "value iteration started"
    );

    for iteration in 1..=config.max_iterations {
        let mut next = values.clone();
        for s in model.non_terminal() {
            if let Some((_, q)) = greedy_action(model, s, &values) {
                next[s] = q;
            }
            metrics.bellman_backups += model.actions(s).len() as u64;
        }
        delta = max_abs_change(&values, &next);
        values = next;
        metrics.iterations = iteration;

        recorder.record_with(|| {
            sweep_event(model, iteration, delta, &values, &greedy_policy(model, &values))
        });
        tracing::trace!(iteration, delta, "sweep");

        if delta < config.tolerance {
            status = SolveStatus::Converged;
            break;
        }
    }

    let policy = greedy_policy(model, &values);
    metrics.elapsed_seconds = stopwatch.elapsed_seconds();

    tracing::debug!(
        algorithm = Algorithm::ValueIteration.as_str(),
        mdp = model.id(),
        status = status.as_str(),
        iterations = metrics.iterations,
        delta,
        bellman_backups = metrics.bellman_backups,
        "value iteration finished"
    );

    MdpResult::assemble(
        model,
        Algorithm::ValueIteration,
        config.seed,
        Solved {
            status,
            values,
            policy,
            delta,
            metrics,
            trace: recorder.finish(Algorithm::ValueIteration, model.id()),
        },
    )
}
