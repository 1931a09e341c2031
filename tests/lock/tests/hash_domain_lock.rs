//! Locks the set of digest domains and their byte strings.
//!
//! A renamed or re-versioned domain silently changes every stored digest, so
//! the exact list is pinned here along with two reference digests. Domain
//! literals may only be spelled out in `hash_domain.rs`.

use std::path::{Path, PathBuf};

use waymark_kernel::proof::hash::{canonical_hash, HashDomain};

#[test]
fn domain_list_is_pinned() {
    let names: Vec<String> = HashDomain::ALL.iter().map(ToString::to_string).collect();
    assert_eq!(
        names,
        [
            "SearchResult",
            "MdpResult",
            "TraceStream",
            "RunConfig",
            "ArtifactManifest",
            "BenchGuard",
        ],
        "adding or removing a domain must update this list"
    );
}

#[test]
fn domain_bytes_follow_the_naming_scheme() {
    for domain in HashDomain::ALL {
        let bytes = domain.as_bytes();
        let Some(body) = bytes
            .strip_prefix(b"WAYMARK::")
            .and_then(|b| b.strip_suffix(b"::V2\0"))
        else {
            panic!("{domain} is not WAYMARK::<NAME>::V2\\0");
        };
        assert!(
            body.iter().all(|b| b.is_ascii_uppercase() || *b == b'_'),
            "{domain} name part is not SCREAMING_SNAKE"
        );
        assert_eq!(bytes.iter().filter(|b| **b == 0).count(), 1, "{domain}");
    }
}

#[test]
fn pinned_digest_vectors() {
    assert_eq!(
        canonical_hash(HashDomain::SearchResult, b"{}").as_str(),
        "sha256:064609f3c94e655e2ae9788d364b9316e251a9edb362922445008552f0b35a02"
    );
    assert_eq!(
        canonical_hash(HashDomain::MdpResult, b"{}").as_str(),
        "sha256:c43abb8429f64ad022235be7cc4d705a0f9fd4ca8f8aa2c08887e91947b6cc8c"
    );
}

/// The only file allowed to spell out a domain literal is `hash_domain.rs`.
#[test]
fn no_raw_domain_literals_outside_authority() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
    let pattern = "b\"WAYMARK::";
    let authority_file = "hash_domain.rs";
    let mut violations = Vec::new();

    for krate in ["kernel", "search", "mdp", "harness"] {
        for path in walk(&root.join(krate).join("src")) {
            if path.extension().and_then(|e| e.to_str()) != Some("rs")
                || path.file_name().and_then(|n| n.to_str()) == Some(authority_file)
            {
                continue;
            }
            let Ok(content) = std::fs::read_to_string(&path) else {
                continue;
            };
            for (i, line) in content.lines().enumerate() {
                let trimmed = line.trim();
                if !trimmed.starts_with("//") && trimmed.contains(pattern) {
                    violations.push(format!("  {}:{}: {}", path.display(), i + 1, trimmed));
                }
            }
        }
    }

    assert!(
        violations.is_empty(),
        "raw WAYMARK:: domain literals found outside {authority_file}:\n{}",
        violations.join("\n")
    );
}

/// Every file under `dir`.
fn walk(dir: &Path) -> Vec<PathBuf> {
    let mut results = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                results.extend(walk(&path));
            } else {
                results.push(path);
            }
        }
    }
    results
}
