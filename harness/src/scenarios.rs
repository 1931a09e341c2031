//! Named, fully pinned runs shared by the fixture binary, the lock tests and
//! the benches.
//!
//! A scenario fixes the domain, its size, the generator seed and the run
//! configuration, so its artifacts are a pure function of the name.

use waymark_kernel::result::Algorithm;
use waymark_kernel::rng::SeededRng;

use crate::config::RunConfig;
use crate::domains::{LinearChain, RandomGraph, TramMdp, TramProblem};
use crate::runner::{run_mdp, run_search, RunArtifacts, RunError};

/// Seed of every generated scenario domain.
pub const SCENARIO_SEED: u64 = 2024;

pub const SCENARIOS: &[&str] = &[
    "chain-bfs",
    "tram-astar",
    "random-ucs",
    "random-astar",
    "random-dfs",
    "tram-vi",
    "tram-pi",
];

/// Run a scenario by name.
///
/// # Errors
///
/// [`RunError::UnknownScenario`] for a name outside [`SCENARIOS`]; otherwise
/// whatever the run itself raises.
pub fn run_scenario(name: &str) -> Result<RunArtifacts, RunError> {
    match name {
        "chain-bfs" => {
            let chain = LinearChain::new(64);
            run_search(&chain, &|s: &u32| chain.heuristic(s), &RunConfig::new(Algorithm::Bfs).traced())
        }
        "tram-astar" => {
            let tram = TramProblem::new(200);
            run_search(&tram, &|s: &u32| tram.heuristic(s), &RunConfig::new(Algorithm::AStar).traced())
        }
        "random-ucs" | "random-astar" | "random-dfs" => {
            let algorithm = match name {
                "random-ucs" => Algorithm::Ucs,
                "random-astar" => Algorithm::AStar,
                _ => Algorithm::Dfs,
            };
            let graph = RandomGraph::generate(&mut SeededRng::new(SCENARIO_SEED), 300, 900)?;
            let mut config = RunConfig::new(algorithm).traced().with_seed(SCENARIO_SEED);
            config.max_trace_events = Some(500);
            run_search(&graph, &|s: &u32| graph.heuristic(s), &config)
        }
        "tram-vi" | "tram-pi" => {
            let algorithm = if name == "tram-vi" {
                Algorithm::ValueIteration
            } else {
                Algorithm::PolicyIteration
            };
            let mdp = TramMdp::new(20, 0.5);
            run_mdp(&mdp, &RunConfig::new(algorithm).traced())
        }
        _ => Err(RunError::UnknownScenario {
            name: name.to_string(),
        }),
    }
}
