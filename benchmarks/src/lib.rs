//! Shared fixtures for the waymark benchmark suites.

use waymark_harness::domains::RandomGraph;
use waymark_kernel::proof::hash::{canonical_hash, ContentHash, HashDomain};
use waymark_kernel::rng::SeededRng;

/// Seed for every generated benchmark input.
pub const REGIME_SEED: u64 = 7;

/// Random graph drawn from [`REGIME_SEED`].
///
/// # Panics
///
/// Panics if generation fails. Benchmark setup failures are fatal.
#[must_use]
pub fn regime_graph(nodes: u32, extra_edges: u32) -> RandomGraph {
    RandomGraph::generate(&mut SeededRng::new(REGIME_SEED), nodes, extra_edges)
        .expect("graph generation")
}

/// Digest of a benchmarked run's canonical output.
#[must_use]
pub fn guard_digest(canonical_bytes: &[u8]) -> ContentHash {
    canonical_hash(HashDomain::BenchGuard, canonical_bytes)
}

/// Run `produce` twice and require identical canonical bytes.
///
/// Called once per regime before timing, so a benchmark never reports
/// numbers for a nondeterministic workload.
///
/// # Panics
///
/// Panics if the two runs disagree.
pub fn assert_stable(name: &str, produce: impl Fn() -> Vec<u8>) -> ContentHash {
    let first = guard_digest(&produce());
    let second = guard_digest(&produce());
    assert_eq!(first, second, "{name}: output is not deterministic");
    first
}
