//! Policy iteration with iterative policy evaluation.

use waymark_kernel::result::{Algorithm, Stopwatch};
use waymark_kernel::trace::TraceRecorder;

use crate::bellman::{evaluate_policy, greedy_policy, max_abs_change};
use crate::config::PolicyIterationConfig;
use crate::contract::Mdp;
use crate::error::MdpError;
use crate::model::TabularModel;
use crate::result::{sweep_event, MdpMetrics, MdpResult, Solved, SolveStatus};

/// Solve `mdp` by policy iteration.
///
/// Starts from the first action of every non-terminal state. Each round
/// evaluates the current policy (warm-started from the previous round's
/// values), then replaces every action with the greedy one. The run converges
/// when a round changes no action.
///
/// # Errors
///
/// Returns [`MdpError`] if the configuration is invalid or the MDP violates
/// its contract. Hitting `max_iterations` is not an error.
pub fn policy_iteration<M: Mdp>(
    mdp: &M,
    config: &PolicyIterationConfig,
) -> Result<MdpResult<M::State, M::Action>, MdpError> {
    config.validate()?;
    let model = TabularModel::build(mdp)?;
    Ok(solve(&model, config))
}

/// Policy iteration over an already validated model.
#[must_use]
pub fn solve<S, A>(model: &TabularModel<S, A>, config: &PolicyIterationConfig) -> MdpResult<S, A>
where
    S: Clone + std::fmt::Debug,
    A: Clone + std::fmt::Debug,
{
    let stopwatch = Stopwatch::start();
    let mut recorder = TraceRecorder::new(config.trace);
    let mut metrics = MdpMetrics::default();
    let mut values = model.initial_values();
    let mut policy: Vec<Option<usize>> = (0..model.len())
        .map(|s| (!model.is_terminal(s)).then_some(0))
        .collect();
    let mut delta = f64::INFINITY;
    let mut status = SolveStatus::DidNotConverge;

    tracing::debug!(
        algorithm = Algorithm::PolicyIteration.as_str(),
        mdp = model.id(),
        states = model.len(),
        eval_tolerance = config.eval_tolerance,
        "policy iteration started"
    );

    for round in 1..=config.max_iterations {
        let eval = evaluate_policy(
            model,
            &policy,
            &values,
            config.eval_tolerance,
            config.eval_max_sweeps,
        );
        metrics.evaluation_sweeps += eval.sweeps;
        metrics.bellman_backups += eval.backups;
        if !eval.converged {
            tracing::warn!(
                round,
                sweeps = eval.sweeps,
                delta = eval.delta,
                "policy evaluation hit its sweep cap"
            );
        }
        delta = max_abs_change(&values, &eval.values);
        values = eval.values;

        let improved = greedy_policy(model, &values);
        metrics.bellman_backups += model
            .non_terminal()
            .map(|s| model.actions(s).len() as u64)
            .sum::<u64>();
        let changed = improved
            .iter()
            .zip(&policy)
            .filter(|(new, old)| new != old)
            .count();
        policy = improved;
        metrics.iterations = round;

        recorder.record_with(|| sweep_event(model, round, delta, &values, &policy));
        tracing::trace!(round, delta, changed, "improvement");

        if changed == 0 {
            status = SolveStatus::Converged;
            break;
        }
    }

    metrics.elapsed_seconds = stopwatch.elapsed_seconds();

    tracing::debug!(
        algorithm = Algorithm::PolicyIteration.as_str(),
        mdp = model.id(),
        status = status.as_str(),
        iterations = metrics.iterations,
        evaluation_sweeps = metrics.evaluation_sweeps,
        bellman_backups = metrics.bellman_backups,
        "policy iteration finished"
    );

    MdpResult::assemble(
        model,
        Algorithm::PolicyIteration,
        config.seed,
        Solved {
            status,
            values,
            policy,
            delta,
            metrics,
            trace: recorder.finish(Algorithm::PolicyIteration, model.id()),
        },
    )
}
