//! Typed MDP errors.
//!
//! Only contract violations and unusable configurations are errors. Hitting
//! the iteration cap is a normal outcome ([`crate::SolveStatus::DidNotConverge`]).

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MdpError {
    #[error("discount {discount} outside [0, 1]")]
    InvalidDiscount { discount: f64 },

    #[error("tolerance {tolerance} must be finite and positive")]
    InvalidTolerance { tolerance: f64 },

    #[error("invalid iteration limit: {detail}")]
    InvalidIterationLimit { detail: String },

    #[error("state {state} listed more than once")]
    DuplicateState { state: String },

    #[error("non-terminal state {state} has no actions")]
    NoActions { state: String },

    #[error("negative probability {probability} for {state} --{action}--> {next}")]
    NegativeProbability {
        state: String,
        action: String,
        next: String,
        probability: f64,
    },

    #[error("probabilities for {state} --{action}--> sum to {sum}, not 1")]
    ProbabilitySum {
        state: String,
        action: String,
        sum: f64,
    },

    #[error("{state} --{action}--> {next}: successor is not a listed state")]
    UnknownSuccessor {
        state: String,
        action: String,
        next: String,
    },

    #[error("non-finite reward {reward} for {state} --{action}--> {next}")]
    NonFiniteReward {
        state: String,
        action: String,
        next: String,
        reward: f64,
    },

    #[error("non-finite terminal value {value} for {state}")]
    NonFiniteTerminalValue { state: String, value: f64 },

    #[error("invalid trace options: {detail}")]
    InvalidTraceOptions { detail: String },
}
