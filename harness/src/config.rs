//! `RunConfig`: the JSON document that picks an algorithm and its settings.
//!
//! ```json
//! {"algorithm": "astar", "seed": 7, "max_expansions": 10000, "trace": true}
//! ```
//!
//! Every field except `algorithm` has a default. Unknown fields are rejected.
//! `tolerance` and `max_iterations` fall back to the solver defaults when
//! absent; search runs ignore them.

use serde::{Deserialize, Serialize};

use waymark_kernel::proof::canon::canonical_json_bytes;
use waymark_kernel::proof::hash::{canonical_hash, ContentHash, HashDomain};
use waymark_kernel::result::Algorithm;
use waymark_kernel::trace::TraceOptions;
use waymark_mdp::{PolicyIterationConfig, ValueIterationConfig};
use waymark_search::SearchPolicy;

use crate::runner::RunError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    #[serde(with = "algorithm_name")]
    pub algorithm: Algorithm,
    #[serde(default)]
    pub seed: Option<u64>,
    /// Search expansion budget.
    #[serde(default)]
    pub max_expansions: Option<u64>,
    /// Value-iteration tolerance, or the policy-evaluation tolerance.
    #[serde(default)]
    pub tolerance: Option<f64>,
    /// Value-iteration sweeps, or policy-iteration rounds.
    #[serde(default)]
    pub max_iterations: Option<u64>,
    #[serde(default)]
    pub trace: bool,
    #[serde(default = "record_edges_default")]
    pub record_edges: bool,
    #[serde(default)]
    pub max_trace_events: Option<u64>,
}

fn record_edges_default() -> bool {
    true
}

impl RunConfig {
    /// Defaults for everything but the algorithm.
    #[must_use]
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            seed: None,
            max_expansions: None,
            tolerance: None,
            max_iterations: None,
            trace: false,
            record_edges: record_edges_default(),
            max_trace_events: None,
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_max_expansions(mut self, max_expansions: u64) -> Self {
        self.max_expansions = Some(max_expansions);
        self
    }

    /// Turn tracing on, edges included.
    #[must_use]
    pub fn traced(mut self) -> Self {
        self.trace = true;
        self
    }

    /// Parse a JSON document.
    ///
    /// # Errors
    ///
    /// [`RunError::Config`] for malformed JSON, a missing or unknown
    /// algorithm, mistyped values or unknown fields.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, RunError> {
        serde_json::from_slice(bytes).map_err(|e| RunError::Config {
            detail: e.to_string(),
        })
    }

    /// Canonical bytes with every default filled in.
    ///
    /// # Errors
    ///
    /// [`RunError::Config`] if a field cannot be represented (a non-finite
    /// tolerance).
    pub fn to_canonical_json_bytes(&self) -> Result<Vec<u8>, RunError> {
        if self.tolerance.is_some_and(|t| !t.is_finite()) {
            return Err(RunError::Config {
                detail: "tolerance must be finite".into(),
            });
        }
        let value = serde_json::to_value(self).map_err(|e| RunError::Config {
            detail: e.to_string(),
        })?;
        Ok(canonical_json_bytes(&value))
    }

    /// # Errors
    ///
    /// Same as [`RunConfig::to_canonical_json_bytes`].
    pub fn digest(&self) -> Result<ContentHash, RunError> {
        Ok(canonical_hash(
            HashDomain::RunConfig,
            &self.to_canonical_json_bytes()?,
        ))
    }

    /// Engine trace options. With `trace` off this is
    /// [`TraceOptions::disabled`] whatever the other trace fields say.
    #[must_use]
    pub fn trace_options(&self) -> TraceOptions {
        if !self.trace {
            return TraceOptions::disabled();
        }
        TraceOptions {
            enabled: self.trace,
            record_edges: self.record_edges,
            max_events: self.max_trace_events,
        }
    }

    #[must_use]
    pub fn search_policy(&self) -> SearchPolicy {
        SearchPolicy {
            max_expansions: self.max_expansions,
            trace: self.trace_options(),
            seed: self.seed,
        }
    }

    #[must_use]
    pub fn value_iteration_config(&self) -> ValueIterationConfig {
        let defaults = ValueIterationConfig::default();
        ValueIterationConfig {
            tolerance: self.tolerance.unwrap_or(defaults.tolerance),
            max_iterations: self.max_iterations.unwrap_or(defaults.max_iterations),
            trace: self.trace_options(),
            seed: self.seed,
        }
    }

    #[must_use]
    pub fn policy_iteration_config(&self) -> PolicyIterationConfig {
        let defaults = PolicyIterationConfig::default();
        PolicyIterationConfig {
            max_iterations: self.max_iterations.unwrap_or(defaults.max_iterations),
            eval_tolerance: self.tolerance.unwrap_or(defaults.eval_tolerance),
            trace: self.trace_options(),
            seed: self.seed,
            ..defaults
        }
    }
}

/// Serde adapter: [`Algorithm`] as its stable name.
mod algorithm_name {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use waymark_kernel::result::Algorithm;

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(algorithm: &Algorithm, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(algorithm.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Algorithm, D::Error> {
        let name = String::deserialize(d)?;
        Algorithm::parse(&name).ok_or_else(|| D::Error::custom(format!("unknown algorithm `{name}`")))
    }
}
