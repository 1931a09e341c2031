//! Artifact directory persistence: write/read [`RunArtifacts`] to/from disk.
//!
//! # Directory layout
//!
//! ```text
//! <dir>/
//!   digests.json   canonical JSON manifest: algorithm, config digest, artifact hashes
//!   result.json    canonical JSON, normative result record
//!   trace.jsonl    line-delimited trace (only for traced runs)
//! ```
//!
//! The directory path is never part of any hash surface. The manifest's
//! artifact list is the source of truth for which files must exist.
//!
//! # Fail-closed semantics
//!
//! - Missing manifest or declared artifact → error
//! - Extra undeclared files → error
//! - Content hash mismatch → error
//! - Non-canonical manifest, unknown format, unreadable trace → error

use std::collections::BTreeSet;
use std::path::Path;

use waymark_kernel::proof::canon::canonical_json_bytes;
use waymark_kernel::proof::hash::{canonical_hash, ContentHash, HashDomain};
use waymark_kernel::result::Algorithm;
use waymark_kernel::schema::{is_compatible, RESULT_SCHEMA_VERSION};
use waymark_kernel::trace::{Trace, TraceParseError};

use crate::runner::{result_domain, RunArtifacts, ARTIFACT_FORMAT};

pub const MANIFEST_FILENAME: &str = "digests.json";
pub const RESULT_FILENAME: &str = "result.json";
pub const TRACE_FILENAME: &str = "trace.jsonl";

/// Error writing or reading an artifact directory.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactDirError {
    #[error("I/O error: {detail}")]
    Io { detail: String },
    #[error("missing manifest digests.json")]
    MissingManifest,
    #[error("manifest parse error: {detail}")]
    ManifestParse { detail: String },
    #[error("manifest is not canonical JSON")]
    ManifestNotCanonical,
    #[error("unsupported manifest format: {found}")]
    ManifestFormat { found: String },
    #[error("manifest entry invalid: {detail}")]
    ManifestEntryInvalid { detail: String },
    #[error("missing artifact: {name}")]
    MissingArtifact { name: String },
    #[error("undeclared extra file: {name}")]
    ExtraFile { name: String },
    #[error("digest mismatch for {name}: stored={stored}, recomputed={recomputed}")]
    DigestMismatch {
        name: String,
        stored: String,
        recomputed: String,
    },
    #[error("result record is unreadable: {detail}")]
    InvalidResult { detail: String },
    #[error("result schema {found} is not readable by this build")]
    IncompatibleSchema { found: String },
    #[error("trace is unreadable: {0}")]
    Trace(#[from] TraceParseError),
}

/// Write `artifacts` into `dir`, creating it if needed.
///
/// Every file goes through a temp file and a rename.
///
/// # Errors
///
/// [`ArtifactDirError::Io`] on any filesystem failure.
pub fn write_artifacts(dir: &Path, artifacts: &RunArtifacts) -> Result<(), ArtifactDirError> {
    std::fs::create_dir_all(dir).map_err(|e| ArtifactDirError::Io {
        detail: format!("create_dir_all: {e}"),
    })?;
    write_atomic(dir.join(RESULT_FILENAME), &artifacts.result_bytes)?;
    if let Some(trace) = &artifacts.trace_bytes {
        write_atomic(dir.join(TRACE_FILENAME), trace)?;
    }
    write_atomic(dir.join(MANIFEST_FILENAME), &artifacts.manifest_bytes())?;
    tracing::debug!(
        dir = %dir.display(),
        algorithm = %artifacts.algorithm,
        result = %artifacts.result_digest,
        "artifacts written"
    );
    Ok(())
}

/// Load an artifact directory and re-verify every declared digest.
///
/// # Errors
///
/// Returns an [`ArtifactDirError`] for the first violation found.
pub fn read_artifacts(dir: &Path) -> Result<RunArtifacts, ArtifactDirError> {
    let manifest_bytes =
        read_file(dir, MANIFEST_FILENAME).map_err(|_| ArtifactDirError::MissingManifest)?;
    let manifest: serde_json::Value =
        serde_json::from_slice(&manifest_bytes).map_err(|e| ArtifactDirError::ManifestParse {
            detail: e.to_string(),
        })?;
    if canonical_json_bytes(&manifest) != manifest_bytes {
        return Err(ArtifactDirError::ManifestNotCanonical);
    }

    let format = manifest["format"].as_str().unwrap_or("");
    if format != ARTIFACT_FORMAT {
        return Err(ArtifactDirError::ManifestFormat {
            found: format.to_string(),
        });
    }
    let algorithm = manifest["algorithm"]
        .as_str()
        .and_then(Algorithm::parse)
        .ok_or_else(|| ArtifactDirError::ManifestEntryInvalid {
            detail: "missing or unknown \"algorithm\"".into(),
        })?;
    let config_digest = parse_hash(&manifest["config_digest"], "config_digest")?;
    let entries = manifest["artifacts"]
        .as_array()
        .ok_or_else(|| ArtifactDirError::ManifestParse {
            detail: "\"artifacts\" is not an array".into(),
        })?;

    let mut declared: BTreeSet<String> = BTreeSet::new();
    let mut result = None;
    let mut trace = None;
    for entry in entries {
        let name = entry["name"]
            .as_str()
            .ok_or_else(|| ArtifactDirError::ManifestEntryInvalid {
                detail: "missing \"name\" field".into(),
            })?
            .to_string();
        let stored = parse_hash(&entry["content_hash"], &name)?;
        let domain = match name.as_str() {
            RESULT_FILENAME => result_domain(algorithm),
            TRACE_FILENAME => HashDomain::TraceStream,
            _ => {
                return Err(ArtifactDirError::ManifestEntryInvalid {
                    detail: format!("unknown artifact {name}"),
                })
            }
        };
        if !declared.insert(name.clone()) {
            return Err(ArtifactDirError::ManifestEntryInvalid {
                detail: format!("{name} declared twice"),
            });
        }

        let content = read_file(dir, &name)
            .map_err(|_| ArtifactDirError::MissingArtifact { name: name.clone() })?;
        let recomputed = canonical_hash(domain, &content);
        if recomputed != stored {
            return Err(ArtifactDirError::DigestMismatch {
                name,
                stored: stored.to_string(),
                recomputed: recomputed.to_string(),
            });
        }
        if name == RESULT_FILENAME {
            result = Some((content, recomputed));
        } else {
            trace = Some((content, recomputed));
        }
    }

    for filename in list_files(dir)? {
        if filename != MANIFEST_FILENAME && !declared.contains(&filename) {
            return Err(ArtifactDirError::ExtraFile { name: filename });
        }
    }

    let (result_bytes, result_digest) = result.ok_or_else(|| ArtifactDirError::MissingArtifact {
        name: RESULT_FILENAME.to_string(),
    })?;
    check_result_record(&result_bytes, algorithm)?;
    if let Some((bytes, _)) = &trace {
        let parsed = Trace::from_jsonl_bytes(bytes)?;
        if parsed.algorithm != algorithm {
            return Err(ArtifactDirError::ManifestEntryInvalid {
                detail: format!("trace algorithm {} differs from {algorithm}", parsed.algorithm),
            });
        }
    }
    let (trace_bytes, trace_digest) = trace.unzip();

    Ok(RunArtifacts {
        algorithm,
        result_bytes,
        result_digest,
        trace_bytes,
        trace_digest,
        config_digest,
    })
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn parse_hash(value: &serde_json::Value, field: &str) -> Result<ContentHash, ArtifactDirError> {
    value
        .as_str()
        .and_then(ContentHash::parse)
        .ok_or_else(|| ArtifactDirError::ManifestEntryInvalid {
            detail: format!("missing or malformed hash for {field}"),
        })
}

/// The result record must parse, carry a readable schema and name the
/// manifest's algorithm.
fn check_result_record(bytes: &[u8], algorithm: Algorithm) -> Result<(), ArtifactDirError> {
    let record: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| ArtifactDirError::InvalidResult {
            detail: e.to_string(),
        })?;
    let schema = record["schema_version"].as_str().unwrap_or("");
    if !is_compatible(schema, RESULT_SCHEMA_VERSION) {
        return Err(ArtifactDirError::IncompatibleSchema {
            found: schema.to_string(),
        });
    }
    if record["algorithm"].as_str() != Some(algorithm.as_str()) {
        return Err(ArtifactDirError::InvalidResult {
            detail: format!("record algorithm differs from manifest {algorithm}"),
        });
    }
    Ok(())
}

/// Write bytes to a path via temp file + rename (best-effort atomicity on Unix).
fn write_atomic(path: impl AsRef<Path>, content: &[u8]) -> Result<(), ArtifactDirError> {
    let path = path.as_ref();
    let dir = path.parent().ok_or_else(|| ArtifactDirError::Io {
        detail: "no parent directory".into(),
    })?;

    let temp_name = format!(
        ".tmp_{}",
        path.file_name().unwrap_or_default().to_string_lossy()
    );
    let temp_path = dir.join(temp_name);

    std::fs::write(&temp_path, content).map_err(|e| ArtifactDirError::Io {
        detail: format!("write {}: {e}", temp_path.display()),
    })?;
    std::fs::rename(&temp_path, path).map_err(|e| ArtifactDirError::Io {
        detail: format!("rename {} → {}: {e}", temp_path.display(), path.display()),
    })?;
    Ok(())
}

fn read_file(dir: &Path, filename: &str) -> Result<Vec<u8>, std::io::Error> {
    std::fs::read(dir.join(filename))
}

/// Regular files in `dir`, by name, skipping `write_atomic` leftovers.
fn list_files(dir: &Path) -> Result<BTreeSet<String>, ArtifactDirError> {
    let io = |what: &str, e: std::io::Error| ArtifactDirError::Io {
        detail: format!("{what}: {e}"),
    };
    let mut files = BTreeSet::new();
    for entry in std::fs::read_dir(dir).map_err(|e| io("read_dir", e))? {
        let entry = entry.map_err(|e| io("dir entry", e))?;
        let file_type = entry.file_type().map_err(|e| io("file_type", e))?;
        if file_type.is_file() {
            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with(".tmp_") {
                    files.insert(name.to_string());
                }
            }
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;
    use crate::domains::{LinearChain, TramMdp};
    use crate::runner::{run_mdp, run_search};
    use waymark_search::ZeroHeuristic;

    fn traced_search() -> RunArtifacts {
        let chain = LinearChain::new(5);
        run_search(&chain, &ZeroHeuristic, &RunConfig::new(Algorithm::Bfs).traced()).unwrap()
    }

    #[test]
    fn write_read_roundtrip() {
        let art = traced_search();
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path(), &art).unwrap();
        assert_eq!(read_artifacts(dir.path()).unwrap(), art);
    }

    #[test]
    fn untraced_mdp_run_has_no_trace_file() {
        let art = run_mdp(&TramMdp::new(6, 0.5), &RunConfig::new(Algorithm::ValueIteration)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path(), &art).unwrap();
        assert!(!dir.path().join(TRACE_FILENAME).exists());
        assert_eq!(read_artifacts(dir.path()).unwrap(), art);
    }

    #[test]
    fn read_fails_on_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_artifacts(dir.path()).unwrap_err();
        assert!(matches!(err, ArtifactDirError::MissingManifest));
    }

    #[test]
    fn read_fails_on_extra_file() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path(), &traced_search()).unwrap();
        std::fs::write(dir.path().join("rogue.txt"), b"surprise").unwrap();
        let err = read_artifacts(dir.path()).unwrap_err();
        assert!(matches!(err, ArtifactDirError::ExtraFile { .. }));
    }

    #[test]
    fn leftover_temp_files_are_ignored() {
        let art = traced_search();
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path(), &art).unwrap();
        std::fs::write(dir.path().join(".tmp_result.json"), b"partial").unwrap();
        assert_eq!(read_artifacts(dir.path()).unwrap(), art);
    }

    #[test]
    fn read_fails_on_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path(), &traced_search()).unwrap();
        std::fs::remove_file(dir.path().join(TRACE_FILENAME)).unwrap();
        let err = read_artifacts(dir.path()).unwrap_err();
        assert!(matches!(err, ArtifactDirError::MissingArtifact { name } if name == TRACE_FILENAME));
    }

    #[test]
    fn read_fails_on_tampered_result() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path(), &traced_search()).unwrap();
        let path = dir.path().join(RESULT_FILENAME);
        let tampered = String::from_utf8(std::fs::read(&path).unwrap())
            .unwrap()
            .replace("\"success\"", "\"no_solution\"");
        std::fs::write(&path, tampered).unwrap();
        let err = read_artifacts(dir.path()).unwrap_err();
        assert!(matches!(err, ArtifactDirError::DigestMismatch { name, .. } if name == RESULT_FILENAME));
    }

    #[test]
    fn read_fails_on_non_canonical_manifest() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path(), &traced_search()).unwrap();
        let path = dir.path().join(MANIFEST_FILENAME);
        let mut bytes = std::fs::read(&path).unwrap();
        bytes.push(b'\n');
        std::fs::write(&path, bytes).unwrap();
        let err = read_artifacts(dir.path()).unwrap_err();
        assert!(matches!(err, ArtifactDirError::ManifestNotCanonical));
    }

    #[test]
    fn read_fails_on_foreign_format() {
        let art = traced_search();
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path(), &art).unwrap();
        let mut manifest = art.manifest_json();
        manifest["format"] = serde_json::json!("waymark.artifacts.v0");
        std::fs::write(dir.path().join(MANIFEST_FILENAME), canonical_json_bytes(&manifest)).unwrap();
        let err = read_artifacts(dir.path()).unwrap_err();
        assert!(matches!(err, ArtifactDirError::ManifestFormat { .. }));
    }

    #[test]
    fn rewrite_over_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path(), &traced_search()).unwrap();
        let chain = LinearChain::new(5);
        let second = run_search(&chain, &ZeroHeuristic, &RunConfig::new(Algorithm::Ucs).traced()).unwrap();
        write_artifacts(dir.path(), &second).unwrap();
        assert_eq!(read_artifacts(dir.path()).unwrap(), second);
    }
}
