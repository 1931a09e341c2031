//! Search policy: budget, trace collection and seed echo.

use waymark_kernel::trace::TraceOptions;

use crate::error::SearchError;

/// Per-call search configuration.
///
/// `max_expansions` is the only termination guarantee on infinite or
/// unbounded problems. With `Some(k)`, exactly `k` expansions are permitted;
/// the check runs before expanding a popped non-stale node, so stale
/// discards never consume budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchPolicy {
    pub max_expansions: Option<u64>,
    pub trace: TraceOptions,
    /// Echoed into the result. The search engines never draw from an RNG.
    pub seed: Option<u64>,
}

impl SearchPolicy {
    #[must_use]
    pub fn with_max_expansions(mut self, max_expansions: u64) -> Self {
        self.max_expansions = Some(max_expansions);
        self
    }

    #[must_use]
    pub fn with_trace(mut self, trace: TraceOptions) -> Self {
        self.trace = trace;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reject budgets that can never make progress.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidPolicy`] for a zero expansion budget or a
    /// zero trace cap on an enabled trace.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_expansions == Some(0) {
            return Err(SearchError::InvalidPolicy {
                detail: "max_expansions must be at least 1".into(),
            });
        }
        if self.trace.enabled && self.trace.max_events == Some(0) {
            return Err(SearchError::InvalidPolicy {
                detail: "trace max_events must be at least 1 when tracing is enabled".into(),
            });
        }
        Ok(())
    }
}
