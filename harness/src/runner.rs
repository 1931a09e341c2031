//! Harness runner: run one algorithm under a [`RunConfig`] and package the
//! result record and trace as content-addressed artifacts.
//!
//! # Pipeline
//!
//! ```text
//! RunConfig → engine policy/config → bfs | dfs | ucs | astar | VI | PI
//!   → canonical result bytes → trace JSONL bytes → digests → RunArtifacts
//! ```
//!
//! The runner implements no algorithm logic itself. Everything it hashes is
//! produced by the engines' canonical serializers.

use waymark_kernel::proof::canon::{canonical_json_bytes, CanonError};
use waymark_kernel::proof::hash::{canonical_hash, ContentHash, HashDomain};
use waymark_kernel::result::Algorithm;
use waymark_kernel::rng::RngError;
use waymark_kernel::trace::Trace;
use waymark_mdp::{policy_iteration, value_iteration, Mdp, MdpError};
use waymark_search::{astar, bfs, dfs, ucs, Heuristic, SearchError, SearchProblem};

use crate::config::RunConfig;

/// Manifest format tag written into `digests.json`.
pub const ARTIFACT_FORMAT: &str = "waymark.artifacts.v1";

/// Error during a harness run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("invalid run config: {detail}")]
    Config { detail: String },
    /// The configured algorithm belongs to the other engine.
    #[error("{algorithm} cannot run on a {engine} problem")]
    WrongEngine {
        algorithm: Algorithm,
        engine: &'static str,
    },
    #[error("unknown scenario `{name}`")]
    UnknownScenario { name: String },
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Mdp(#[from] MdpError),
    #[error(transparent)]
    Canon(#[from] CanonError),
    #[error(transparent)]
    Rng(#[from] RngError),
}

/// Byte-level output of one run, ready to persist or compare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunArtifacts {
    pub algorithm: Algorithm,
    /// Canonical JSON of the normative result record.
    pub result_bytes: Vec<u8>,
    pub result_digest: ContentHash,
    /// JSONL trace; `None` when tracing was off.
    pub trace_bytes: Option<Vec<u8>>,
    pub trace_digest: Option<ContentHash>,
    pub config_digest: ContentHash,
}

/// Hash domain of the result record an algorithm produces.
#[must_use]
pub fn result_domain(algorithm: Algorithm) -> HashDomain {
    if algorithm.is_search() {
        HashDomain::SearchResult
    } else {
        HashDomain::MdpResult
    }
}

impl RunArtifacts {
    fn pack(
        config: &RunConfig,
        result_bytes: Vec<u8>,
        trace: Option<&Trace>,
    ) -> Result<Self, RunError> {
        let result_digest = canonical_hash(result_domain(config.algorithm), &result_bytes);
        let trace_bytes = trace.map(Trace::to_jsonl_bytes).transpose()?;
        let trace_digest = trace_bytes
            .as_deref()
            .map(|b| canonical_hash(HashDomain::TraceStream, b));
        Ok(Self {
            algorithm: config.algorithm,
            result_bytes,
            result_digest,
            trace_bytes,
            trace_digest,
            config_digest: config.digest()?,
        })
    }

    /// The `digests.json` document.
    #[must_use]
    pub fn manifest_json(&self) -> serde_json::Value {
        let mut artifacts = vec![serde_json::json!({
            "content_hash": self.result_digest.as_str(),
            "name": crate::artifact_dir::RESULT_FILENAME,
        })];
        if let Some(trace_digest) = &self.trace_digest {
            artifacts.push(serde_json::json!({
                "content_hash": trace_digest.as_str(),
                "name": crate::artifact_dir::TRACE_FILENAME,
            }));
        }
        serde_json::json!({
            "algorithm": self.algorithm.as_str(),
            "artifacts": artifacts,
            "config_digest": self.config_digest.as_str(),
            "format": ARTIFACT_FORMAT,
        })
    }

    #[must_use]
    pub fn manifest_bytes(&self) -> Vec<u8> {
        canonical_json_bytes(&self.manifest_json())
    }

    /// One digest binding the result, the trace and the configuration.
    #[must_use]
    pub fn manifest_digest(&self) -> ContentHash {
        canonical_hash(HashDomain::ArtifactManifest, &self.manifest_bytes())
    }
}

/// Run a search algorithm. `heuristic` is consulted only by A*.
///
/// # Errors
///
/// [`RunError::WrongEngine`] for an MDP algorithm, [`RunError::Search`] for
/// an invalid policy or a contract violation by the problem.
pub fn run_search<P, H>(problem: &P, heuristic: &H, config: &RunConfig) -> Result<RunArtifacts, RunError>
where
    P: SearchProblem,
    H: Heuristic<P::State>,
{
    let policy = config.search_policy();
    let result = match config.algorithm {
        Algorithm::Bfs => bfs(problem, &policy)?,
        Algorithm::Dfs => dfs(problem, &policy)?,
        Algorithm::Ucs => ucs(problem, &policy)?,
        Algorithm::AStar => astar(problem, heuristic, &policy)?,
        other => {
            return Err(RunError::WrongEngine {
                algorithm: other,
                engine: "search",
            })
        }
    };
    tracing::debug!(
        algorithm = %config.algorithm,
        problem = problem.problem_id(),
        status = %result.status,
        expanded = result.metrics.expanded,
        "search run packaged"
    );
    RunArtifacts::pack(config, result.to_canonical_json_bytes(), result.trace.as_ref())
}

/// Run an MDP solver.
///
/// # Errors
///
/// [`RunError::WrongEngine`] for a search algorithm, [`RunError::Mdp`] for an
/// invalid configuration or MDP, [`RunError::Canon`] if values diverged to
/// infinity.
pub fn run_mdp<M: Mdp>(mdp: &M, config: &RunConfig) -> Result<RunArtifacts, RunError> {
    let result = match config.algorithm {
        Algorithm::ValueIteration => value_iteration(mdp, &config.value_iteration_config())?,
        Algorithm::PolicyIteration => policy_iteration(mdp, &config.policy_iteration_config())?,
        other => {
            return Err(RunError::WrongEngine {
                algorithm: other,
                engine: "mdp",
            })
        }
    };
    tracing::debug!(
        algorithm = %config.algorithm,
        mdp = mdp.mdp_id(),
        status = %result.status,
        iterations = result.iterations,
        "mdp run packaged"
    );
    RunArtifacts::pack(config, result.to_canonical_json_bytes()?, result.trace.as_ref())
}
