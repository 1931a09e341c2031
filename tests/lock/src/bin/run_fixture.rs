//! Fixture binary: run pinned scenarios and print their digests.
//!
//! Usage: `run_fixture [--write <dir>] [scenario ...]`
//!
//! With no scenario arguments every scenario runs. Each prints one line:
//!
//! ```text
//! scenario=<name> result=sha256:... trace=sha256:... manifest=sha256:...
//! ```
//!
//! With `--write <dir>`, each scenario's artifacts also go to `<dir>/<name>/`.
//! Logs go to stderr (filter via `WAYMARK_LOG`), never to stdout.

use std::path::PathBuf;

use tracing_subscriber::{fmt, EnvFilter};
use waymark_harness::artifact_dir::write_artifacts;
use waymark_harness::scenarios::{run_scenario, SCENARIOS};

fn main() {
    let filter = EnvFilter::try_from_env("WAYMARK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let mut out_dir: Option<PathBuf> = None;
    let mut names: Vec<String> = Vec::new();
    while let Some(arg) = args.next() {
        if arg == "--write" {
            let Some(dir) = args.next() else {
                eprintln!("usage: run_fixture [--write <dir>] [scenario ...]");
                std::process::exit(2);
            };
            out_dir = Some(PathBuf::from(dir));
        } else {
            names.push(arg);
        }
    }
    if names.is_empty() {
        names = SCENARIOS.iter().map(|s| (*s).to_string()).collect();
    }

    for name in &names {
        let artifacts = match run_scenario(name) {
            Ok(a) => a,
            Err(e) => {
                eprintln!("scenario {name} failed: {e}");
                std::process::exit(1);
            }
        };
        if let Some(dir) = &out_dir {
            if let Err(e) = write_artifacts(&dir.join(name), &artifacts) {
                eprintln!("writing {name} failed: {e}");
                std::process::exit(1);
            }
        }
        let trace = artifacts
            .trace_digest
            .as_ref()
            .map_or_else(|| "none".to_string(), ToString::to_string);
        println!(
            "scenario={name} result={} trace={trace} manifest={}",
            artifacts.result_digest,
            artifacts.manifest_digest()
        );
    }
}
