//! In-process determinism: same inputs, same bytes.
//!
//! Covers repeated runs, concurrent runs on separate threads, seed echo, and
//! the exclusion of wall-clock metrics from canonical bytes.

use waymark_harness::domains::{LinearChain, RandomGraph, TramMdp, TramProblem};
use waymark_harness::scenarios::{run_scenario, SCENARIOS};
use waymark_kernel::rng::SeededRng;
use waymark_kernel::trace::TraceOptions;
use waymark_mdp::{value_iteration, ValueIterationConfig};
use waymark_search::{astar, ucs, SearchPolicy, SearchProblem};

#[test]
fn scenarios_identical_across_ten_runs() {
    for name in SCENARIOS {
        let first = run_scenario(name).unwrap();
        for _ in 1..10 {
            let other = run_scenario(name).unwrap();
            assert_eq!(first.result_bytes, other.result_bytes, "{name}: result bytes differ");
            assert_eq!(first.trace_bytes, other.trace_bytes, "{name}: trace bytes differ");
        }
    }
}

#[test]
fn concurrent_runs_do_not_interfere() {
    let sequential: Vec<_> = SCENARIOS.iter().map(|n| run_scenario(n).unwrap()).collect();
    let concurrent: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = SCENARIOS
            .iter()
            .map(|n| scope.spawn(move || run_scenario(n).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(sequential, concurrent);
}

#[test]
fn independently_seeded_generators_match() {
    let seeds = [0u64, 1, 99, u64::MAX];
    for seed in seeds {
        let a = RandomGraph::generate(&mut SeededRng::new(seed), 50, 120).unwrap();
        let b = RandomGraph::generate(&mut SeededRng::new(seed), 50, 120).unwrap();
        let policy = SearchPolicy::default()
            .with_seed(seed)
            .with_trace(TraceOptions::full());
        let ra = ucs(&a, &policy).unwrap();
        let rb = ucs(&b, &policy).unwrap();
        assert_eq!(ra.to_canonical_json_bytes(), rb.to_canonical_json_bytes());
        assert_eq!(
            ra.trace.as_ref().unwrap().to_jsonl_bytes().unwrap(),
            rb.trace.as_ref().unwrap().to_jsonl_bytes().unwrap()
        );
        assert_eq!(ra.seed, Some(seed));
    }
}

#[test]
fn forked_generator_streams_differ_but_repeat() {
    let parent = SeededRng::new(5);
    let g1 = RandomGraph::generate(&mut parent.fork(1), 40, 80).unwrap();
    let g2 = RandomGraph::generate(&mut parent.fork(2), 40, 80).unwrap();
    let g1_again = RandomGraph::generate(&mut parent.fork(1), 40, 80).unwrap();
    let p = SearchPolicy::default();
    assert_eq!(
        ucs(&g1, &p).unwrap().to_canonical_json_bytes(),
        ucs(&g1_again, &p).unwrap().to_canonical_json_bytes()
    );
    assert_ne!(g1.problem_id(), g2.problem_id());
}

#[test]
fn wall_clock_is_observational() {
    let tram = TramProblem::new(300);
    let mut a = astar(&tram, &|s: &u32| tram.heuristic(s), &SearchPolicy::default()).unwrap();
    let b = astar(&tram, &|s: &u32| tram.heuristic(s), &SearchPolicy::default()).unwrap();
    a.metrics.elapsed_seconds += 1.0;
    assert_ne!(a.to_json_value(), b.to_json_value());
    assert_eq!(a.to_canonical_json_bytes(), b.to_canonical_json_bytes());

    let mdp = TramMdp::new(30, 0.3);
    let mut v = value_iteration(&mdp, &ValueIterationConfig::default()).unwrap();
    let w = value_iteration(&mdp, &ValueIterationConfig::default()).unwrap();
    v.metrics.elapsed_seconds = 1e6;
    assert_eq!(v.digest().unwrap(), w.digest().unwrap());
}

#[test]
fn canonical_result_has_no_elapsed_field() {
    let chain = LinearChain::new(5);
    let r = ucs(&chain, &SearchPolicy::default()).unwrap();
    let text = String::from_utf8(r.to_canonical_json_bytes()).unwrap();
    assert!(!text.contains("elapsed"));
    assert!(r.to_json_value()["metrics"]["elapsed_seconds"].is_number());
}

#[test]
fn scenario_artifacts_are_canonical_json() {
    use waymark_kernel::proof::canon::canonical_json_bytes;

    for name in SCENARIOS {
        let art = run_scenario(name).unwrap();
        let result: serde_json::Value = serde_json::from_slice(&art.result_bytes).unwrap();
        assert_eq!(canonical_json_bytes(&result), art.result_bytes, "{name}");
        assert_eq!(result["schema_version"], "2.0", "{name}");
        assert_eq!(result["algorithm"], art.algorithm.as_str(), "{name}");

        let trace = art.trace_bytes.as_ref().unwrap();
        for line in trace.split(|b| *b == b'\n').filter(|l| !l.is_empty()) {
            let value: serde_json::Value = serde_json::from_slice(line).unwrap();
            assert_eq!(canonical_json_bytes(&value), line, "{name}");
        }
    }
}

#[test]
fn scenario_traces_survive_parse_and_reserialize() {
    use waymark_kernel::trace::Trace;

    for name in SCENARIOS {
        let art = run_scenario(name).unwrap();
        let bytes = art.trace_bytes.as_ref().unwrap();
        let parsed = Trace::from_jsonl_bytes(bytes).unwrap();
        assert_eq!(&parsed.to_jsonl_bytes().unwrap(), bytes, "{name}");
        assert_eq!(parsed.digest().unwrap(), art.trace_digest.clone().unwrap(), "{name}");
    }
}
