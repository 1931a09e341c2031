//! Reference domains used by the runner, the lock tests and the benches.

pub mod chain;
pub mod random_graph;
pub mod tram;

pub use chain::LinearChain;
pub use random_graph::RandomGraph;
pub use tram::{TramAction, TramCosts, TramMdp, TramProblem};
