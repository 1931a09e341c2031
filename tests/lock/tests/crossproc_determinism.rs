//! Cross-process determinism.
//!
//! Spawns the `run_fixture` binary under several environment variants and
//! asserts identical stdout, then checks the binary against in-process runs.
//! Proves that artifacts are not influenced by cwd, locale or unrelated
//! environment variables.

use std::path::Path;
use std::process::Command;

use waymark_harness::artifact_dir::read_artifacts;
use waymark_harness::scenarios::{run_scenario, SCENARIOS};

const BIN: &str = env!("CARGO_BIN_EXE_run_fixture");

fn workspace_root() -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .to_string_lossy()
        .to_string()
}

/// Run the binary with the given cwd, extra args and environment overrides.
fn run_variant(work_dir: &str, args: &[&str], env_overrides: &[(&str, &str)]) -> String {
    let mut command = Command::new(BIN);
    command.current_dir(work_dir).args(args);

    command
        .env_remove("LC_ALL")
        .env_remove("LC_COLLATE")
        .env_remove("LANG")
        .env_remove("LANGUAGE");

    for &(key, val) in env_overrides {
        command.env(key, val);
    }

    let output = command.output().unwrap_or_else(|e| {
        panic!("failed to spawn {BIN} (work_dir={work_dir}, overrides={env_overrides:?}): {e}")
    });

    assert!(
        output.status.success(),
        "run_fixture exited with {}: stderr={}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );

    String::from_utf8(output.stdout).expect("stdout is valid UTF-8")
}

#[test]
fn crossproc_determinism_four_env_variants() {
    let root = workspace_root();
    let baseline = run_variant(&root, &[], &[]);

    assert_eq!(baseline.lines().count(), SCENARIOS.len());
    assert!(
        baseline.lines().all(|l| l.contains(" result=sha256:")),
        "baseline output missing result digests:\n{baseline}"
    );

    let alt_cwd = std::env::temp_dir();
    let alt_cwd = alt_cwd.to_string_lossy();
    let variant_cwd = run_variant(&alt_cwd, &[], &[]);
    assert_eq!(
        baseline, variant_cwd,
        "output differs when cwd changes from {root} to {alt_cwd}"
    );

    let variant_locale = run_variant(&root, &[], &[("LC_ALL", "C"), ("LANG", "C")]);
    assert_eq!(baseline, variant_locale, "output differs when LC_ALL=C LANG=C");

    let variant_noise = run_variant(
        &root,
        &[],
        &[
            ("WAYMARK_NOISE", "should_not_matter"),
            ("TZ", "America/New_York"),
            ("HOME", "/nonexistent"),
            ("WAYMARK_LOG", "trace"),
        ],
    );
    assert_eq!(
        baseline, variant_noise,
        "output differs with spurious env vars or verbose logging"
    );
}

#[test]
fn crossproc_matches_inproc() {
    let stdout = run_variant(&workspace_root(), &[], &[]);
    for (line, name) in stdout.lines().zip(SCENARIOS) {
        let art = run_scenario(name).unwrap();
        assert!(line.starts_with(&format!("scenario={name} ")), "{line}");
        assert!(line.contains(&format!("result={}", art.result_digest)), "{line}");
        assert!(line.contains(&format!("manifest={}", art.manifest_digest())), "{line}");
    }
}

#[test]
fn crossproc_written_directories_verify() {
    let out = tempfile::tempdir().unwrap();
    let out_path = out.path().to_string_lossy().to_string();
    run_variant(&workspace_root(), &["--write", &out_path, "tram-pi", "random-astar"], &[]);

    for name in ["tram-pi", "random-astar"] {
        let loaded = read_artifacts(&out.path().join(name)).unwrap();
        assert_eq!(loaded, run_scenario(name).unwrap(), "{name}");
    }
}

#[test]
fn unknown_scenario_exits_nonzero() {
    let output = Command::new(BIN).arg("maze").output().unwrap();
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
