//! `MdpResult`: the versioned record returned by both solvers.

use std::fmt::Debug;

use waymark_kernel::proof::canon::{canonical_json_bytes, finite_number, number_or_null, CanonError};
use waymark_kernel::proof::hash::{canonical_hash, ContentHash, HashDomain};
use waymark_kernel::result::Algorithm;
use waymark_kernel::schema::RESULT_SCHEMA_VERSION;
use waymark_kernel::trace::{debug_label, Trace, TraceEventBody};

use crate::model::TabularModel;

/// How a solver run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveStatus {
    Converged,
    /// The iteration cap was reached first. Values and policy are the best
    /// found so far.
    DidNotConverge,
}

impl SolveStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Converged => "converged",
            Self::DidNotConverge => "did_not_converge",
        }
    }
}

impl std::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution instrumentation for a solver run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MdpMetrics {
    /// Value-iteration sweeps, or policy-iteration rounds.
    pub iterations: u64,
    /// Policy-evaluation sweeps across all rounds (0 for value iteration).
    pub evaluation_sweeps: u64,
    /// Q-value computations.
    pub bellman_backups: u64,
    /// Observational: excluded from canonical bytes.
    pub elapsed_seconds: f64,
}

impl MdpMetrics {
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        let mut obj = self.normative_json_value();
        obj["elapsed_seconds"] = number_or_null(self.elapsed_seconds);
        obj
    }

    #[must_use]
    pub fn normative_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "bellman_backups": self.bellman_backups,
            "evaluation_sweeps": self.evaluation_sweeps,
            "iterations": self.iterations,
        })
    }
}

/// Outcome of a solver call. Immutable once returned.
#[derive(Debug, Clone)]
pub struct MdpResult<S, A> {
    pub schema_version: String,
    pub algorithm: Algorithm,
    pub mdp_id: String,
    pub status: SolveStatus,
    /// Value of every state, in state order.
    pub values: Vec<(S, f64)>,
    /// Chosen action of every non-terminal state, in state order.
    pub policy: Vec<(S, A)>,
    /// Same as `metrics.iterations`.
    pub iterations: u64,
    /// Largest absolute value change in the last sweep (VI) or the last
    /// round (PI).
    pub delta: f64,
    pub metrics: MdpMetrics,
    pub seed: Option<u64>,
    pub trace: Option<Trace>,
}

impl<S: PartialEq + Debug, A: Debug> MdpResult<S, A> {
    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.status == SolveStatus::Converged
    }

    #[must_use]
    pub fn value_of(&self, state: &S) -> Option<f64> {
        self.values.iter().find(|(s, _)| s == state).map(|&(_, v)| v)
    }

    #[must_use]
    pub fn action_for(&self, state: &S) -> Option<&A> {
        self.policy.iter().find(|(s, _)| s == state).map(|(_, a)| a)
    }

    /// Full JSON record, wall-clock metrics included.
    ///
    /// # Errors
    ///
    /// [`CanonError::NonFiniteNumber`] if a value diverged.
    pub fn to_json_value(&self) -> Result<serde_json::Value, CanonError> {
        let mut obj = self.normative_json_value()?;
        obj["metrics"] = self.metrics.to_json_value();
        Ok(obj)
    }

    /// JSON record without observational fields.
    ///
    /// # Errors
    ///
    /// [`CanonError::NonFiniteNumber`] if a value diverged.
    pub fn normative_json_value(&self) -> Result<serde_json::Value, CanonError> {
        let values = self
            .values
            .iter()
            .map(|(s, v)| Ok(serde_json::json!({"state": debug_label(s), "value": finite_number(*v)?})))
            .collect::<Result<Vec<_>, CanonError>>()?;
        let policy: Vec<serde_json::Value> = self
            .policy
            .iter()
            .map(|(s, a)| serde_json::json!({"action": debug_label(a), "state": debug_label(s)}))
            .collect();
        Ok(serde_json::json!({
            "algorithm": self.algorithm.as_str(),
            "delta": number_or_null(self.delta),
            "iterations": self.iterations,
            "mdp_id": self.mdp_id,
            "metrics": self.metrics.normative_json_value(),
            "policy": policy,
            "schema_version": self.schema_version,
            "seed": self.seed,
            "status": self.status.as_str(),
            "values": values,
        }))
    }

    /// Canonical bytes of the normative record.
    ///
    /// # Errors
    ///
    /// [`CanonError::NonFiniteNumber`] if a value diverged.
    pub fn to_canonical_json_bytes(&self) -> Result<Vec<u8>, CanonError> {
        Ok(canonical_json_bytes(&self.normative_json_value()?))
    }

    /// # Errors
    ///
    /// Same as [`MdpResult::to_canonical_json_bytes`].
    pub fn digest(&self) -> Result<ContentHash, CanonError> {
        Ok(canonical_hash(
            HashDomain::MdpResult,
            &self.to_canonical_json_bytes()?,
        ))
    }
}

/// Index-addressed solver output, before labels are attached.
pub(crate) struct Solved {
    pub status: SolveStatus,
    pub values: Vec<f64>,
    pub policy: Vec<Option<usize>>,
    pub delta: f64,
    pub metrics: MdpMetrics,
    pub trace: Option<Trace>,
}

impl<S: Clone, A: Clone> MdpResult<S, A> {
    pub(crate) fn assemble(
        model: &TabularModel<S, A>,
        algorithm: Algorithm,
        seed: Option<u64>,
        solved: Solved,
    ) -> Self {
        let values = model
            .states()
            .iter()
            .cloned()
            .zip(solved.values)
            .collect();
        let policy = solved
            .policy
            .iter()
            .enumerate()
            .filter_map(|(s, a)| a.map(|a| (model.state(s).clone(), model.actions(s)[a].clone())))
            .collect();
        Self {
            schema_version: RESULT_SCHEMA_VERSION.to_string(),
            algorithm,
            mdp_id: model.id().to_string(),
            status: solved.status,
            values,
            policy,
            iterations: solved.metrics.iterations,
            delta: solved.delta,
            metrics: solved.metrics,
            seed,
            trace: solved.trace,
        }
    }
}

/// `iteration_sweep` trace payload: labelled values and policy.
pub(crate) fn sweep_event<S: Debug, A: Debug>(
    model: &TabularModel<S, A>,
    iteration: u64,
    delta: f64,
    values: &[f64],
    policy: &[Option<usize>],
) -> TraceEventBody {
    TraceEventBody::IterationSweep {
        iteration,
        delta,
        values: model
            .states()
            .iter()
            .zip(values)
            .map(|(s, &v)| (debug_label(s), v))
            .collect(),
        policy: policy
            .iter()
            .enumerate()
            .filter_map(|(s, a)| {
                a.map(|a| (debug_label(model.state(s)), debug_label(&model.actions(s)[a])))
            })
            .collect(),
    }
}
