//! Domain separators: one per kind of artifact that gets a digest.
//!
//! The byte strings live only here. A result digest can never collide with a
//! trace digest of the same bytes because the prefixes differ.

/// Expands a `Variant => bytes` list into the enum, `as_bytes`, `ALL` and
/// `Display`.
macro_rules! define_hash_domains {
    (
        $(
            $(#[$meta:meta])*
            $variant:ident => $bytes:expr
        ),+ $(,)?
    ) => {
        /// Prefix fed to SHA-256 ahead of the hashed bytes.
        ///
        /// Null-terminated; the `::V2` suffix follows the `2.0` schema line.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum HashDomain {
            $(
                $(#[$meta])*
                $variant,
            )+
        }

        impl HashDomain {
            #[must_use]
            pub const fn as_bytes(&self) -> &'static [u8] {
                match self {
                    $( Self::$variant => $bytes, )+
                }
            }

            /// Every domain, in declaration order.
            pub const ALL: &[HashDomain] = &[
                $( Self::$variant, )+
            ];
        }

        impl core::fmt::Display for HashDomain {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                match self {
                    $( Self::$variant => write!(f, stringify!($variant)), )+
                }
            }
        }
    };
}

define_hash_domains! {
    /// Normative projection of a search result record.
    SearchResult => b"WAYMARK::SEARCH_RESULT::V2\0",

    /// Normative projection of an MDP solver result record.
    MdpResult => b"WAYMARK::MDP_RESULT::V2\0",

    /// Full line-delimited trace stream (header + events).
    TraceStream => b"WAYMARK::TRACE_STREAM::V2\0",

    /// Run configuration echo.
    RunConfig => b"WAYMARK::RUN_CONFIG::V2\0",

    /// Artifact directory manifest (normative projection).
    ArtifactManifest => b"WAYMARK::ARTIFACT_MANIFEST::V2\0",

    /// Canonical output of a benchmarked workload, compared run to run.
    BenchGuard => b"WAYMARK::BENCH_GUARD::V2\0",
}
