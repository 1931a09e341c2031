//! Solver configuration.

use waymark_kernel::trace::TraceOptions;

use crate::error::MdpError;

/// Value iteration settings.
///
/// Converged when the largest absolute change in one sweep is below
/// `tolerance`. Running out of `max_iterations` is reported as
/// `did_not_converge`, not as an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueIterationConfig {
    pub tolerance: f64,
    pub max_iterations: u64,
    pub trace: TraceOptions,
    /// Echoed into the result. The solvers never draw from an RNG.
    pub seed: Option<u64>,
}

impl Default for ValueIterationConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 100_000,
            trace: TraceOptions::disabled(),
            seed: None,
        }
    }
}

impl ValueIterationConfig {
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
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

    /// # Errors
    ///
    /// [`MdpError::InvalidTolerance`] for a non-positive or non-finite
    /// tolerance, [`MdpError::InvalidIterationLimit`] for a zero cap,
    /// [`MdpError::InvalidTraceOptions`] for an enabled trace capped at zero
    /// events.
    pub fn validate(&self) -> Result<(), MdpError> {
        check_tolerance(self.tolerance)?;
        check_limit("max_iterations", self.max_iterations)?;
        check_trace(self.trace)
    }
}

/// Policy iteration settings.
///
/// Each round evaluates the current policy with synchronous sweeps (until
/// `eval_tolerance` or `eval_max_sweeps`) and then improves it greedily.
/// Converged when an improvement step changes no action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyIterationConfig {
    pub max_iterations: u64,
    pub eval_tolerance: f64,
    pub eval_max_sweeps: u64,
    pub trace: TraceOptions,
    pub seed: Option<u64>,
}

impl Default for PolicyIterationConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
            eval_tolerance: 1e-10,
            eval_max_sweeps: 100_000,
            trace: TraceOptions::disabled(),
            seed: None,
        }
    }
}

impl PolicyIterationConfig {
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    #[must_use]
    pub fn with_eval_tolerance(mut self, eval_tolerance: f64) -> Self {
        self.eval_tolerance = eval_tolerance;
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

    /// # Errors
    ///
    /// Same rules as [`ValueIterationConfig::validate`], applied to the
    /// evaluation tolerance and to both caps.
    pub fn validate(&self) -> Result<(), MdpError> {
        check_tolerance(self.eval_tolerance)?;
        check_limit("max_iterations", self.max_iterations)?;
        check_limit("eval_max_sweeps", self.eval_max_sweeps)?;
        check_trace(self.trace)
    }
}

fn check_tolerance(tolerance: f64) -> Result<(), MdpError> {
    if tolerance.is_finite() && tolerance > 0.0 {
        Ok(())
    } else {
        Err(MdpError::InvalidTolerance { tolerance })
    }
}

fn check_limit(name: &str, value: u64) -> Result<(), MdpError> {
    if value == 0 {
        return Err(MdpError::InvalidIterationLimit {
            detail: format!("{name} must be at least 1"),
        });
    }
    Ok(())
}

fn check_trace(trace: TraceOptions) -> Result<(), MdpError> {
    if trace.enabled && trace.max_events == Some(0) {
        return Err(MdpError::InvalidTraceOptions {
            detail: "max_events must be at least 1 when tracing is enabled".into(),
        });
    }
    Ok(())
}
