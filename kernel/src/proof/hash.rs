//! Domain-separated SHA-256 digests.
//!
//! [`canonical_hash`] is the only function that produces a [`ContentHash`].
//! Fixture output, artifact manifests and lock tests all compare its
//! rendering, `"sha256:<64 lowercase hex>"`.

use sha2::{Digest, Sha256};

pub use super::hash_domain::HashDomain;

const PREFIX: &str = "sha256:";
const HEX_LEN: usize = 64;

/// A rendered SHA-256 digest.
///
/// Always `"sha256:"` followed by exactly 64 lowercase hex characters, so two
/// hashes compare equal exactly when their digests do.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash(String);

impl ContentHash {
    /// Parse a stored digest, e.g. from an artifact manifest.
    ///
    /// Returns `None` unless `s` has exactly the shape [`canonical_hash`]
    /// produces. Uppercase hex is rejected: it would hash-compare unequal to
    /// the canonical rendering.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let hex_part = s.strip_prefix(PREFIX)?;
        let well_formed = hex_part.len() == HEX_LEN
            && hex_part
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        well_formed.then(|| Self(s.to_string()))
    }

    #[must_use]
    pub fn algorithm(&self) -> &str {
        "sha256"
    }

    #[must_use]
    pub fn hex_digest(&self) -> &str {
        &self.0[PREFIX.len()..]
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// `sha256(domain || data)`.
#[must_use]
pub fn canonical_hash(domain: HashDomain, data: &[u8]) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(domain.as_bytes());
    hasher.update(data);
    ContentHash(format!("{PREFIX}{}", hex::encode(hasher.finalize())))
}
