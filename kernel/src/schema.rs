//! Schema version tags for exposed records.
//!
//! Both the result record and the trace stream are on the `2.0` line.
//! Evolution within a major line is additive-only: a reader for `M.n`
//! accepts any `M.k` with `k <= n`.

/// Version tag written into every result record.
pub const RESULT_SCHEMA_VERSION: &str = "2.0";

/// Version tag written into every trace header.
pub const TRACE_SCHEMA_VERSION: &str = "2.0";

/// A parsed `major.minor` schema version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
}

impl SchemaVersion {
    /// Parse `"M.m"`. Returns `None` for anything else.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let (major, minor) = s.split_once('.')?;
        if major.is_empty() || minor.is_empty() {
            return None;
        }
        if !major.bytes().all(|b| b.is_ascii_digit()) || !minor.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        Some(Self {
            major: major.parse().ok()?,
            minor: minor.parse().ok()?,
        })
    }

    /// Whether a record tagged `self` can be read by a reader at `reader`.
    #[must_use]
    pub fn is_readable_by(self, reader: Self) -> bool {
        self.major == reader.major && self.minor <= reader.minor
    }
}

impl std::fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Check a version tag found in a record against the version this build writes.
#[must_use]
pub fn is_compatible(found: &str, current: &str) -> bool {
    match (SchemaVersion::parse(found), SchemaVersion::parse(current)) {
        (Some(found), Some(current)) => found.is_readable_by(current),
        _ => false,
    }
}
