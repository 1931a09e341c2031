//! Deterministic RNG service.
//!
//! A [`SeededRng`] is an explicitly constructed context object: there is no
//! global instance and no constructor that reads system entropy. Two contexts
//! built from the same seed produce the same stream on every platform.
//!
//! The search engines never consult the RNG (their tie-breaking is insertion
//! order). It exists for domain generators and randomized variants, and its
//! seed is echoed into result metadata.
//!
//! Not cryptographic.

use std::ops::Range;

/// Errors raised by range-based sampling.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RngError {
    /// `gen_range` was called with `start >= end`.
    #[error("empty sampling range {start}..{end}")]
    EmptyRange { start: u64, end: u64 },
    /// `gen_bool` was called with a probability outside `[0, 1]`.
    #[error("probability out of range: {p}")]
    InvalidProbability { p: String },
}

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// Finalizer from SplitMix64; a good 64-bit bit mixer on its own.
#[must_use]
pub fn mix64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

/// Derive an independent child seed for `stream` from a parent seed.
///
/// Used to give concurrent or nested runs their own non-interfering streams.
#[must_use]
pub fn derive_seed(seed: u64, stream: u64) -> u64 {
    mix64(seed ^ mix64(stream.wrapping_add(GOLDEN_GAMMA)))
}

/// Seeded SplitMix64 generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededRng {
    seed: u64,
    state: u64,
}

impl SeededRng {
    /// Create a context from an explicit seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { seed, state: seed }
    }

    /// The seed most recently installed (via [`SeededRng::new`] or [`SeededRng::reseed`]).
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Restart the stream from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.state = seed;
    }

    /// A child context whose stream is independent of this one's.
    ///
    /// Forking does not advance the parent.
    #[must_use]
    pub fn fork(&self, stream: u64) -> Self {
        Self::new(derive_seed(self.seed, stream))
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(GOLDEN_GAMMA);
        mix64(self.state)
    }

    pub fn next_u32(&mut self) -> u32 {
        // Upper half has the better-mixed bits.
        #[allow(clippy::cast_possible_truncation)]
        let hi = (self.next_u64() >> 32) as u32;
        hi
    }

    /// Uniform float in `[0, 1)` with 53 bits of precision.
    pub fn next_f64(&mut self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let mantissa = (self.next_u64() >> 11) as f64;
        mantissa * (1.0 / (1u64 << 53) as f64)
    }

    /// Uniform integer in `range`, without modulo bias.
    ///
    /// # Errors
    ///
    /// Returns [`RngError::EmptyRange`] if `range.start >= range.end`.
    pub fn gen_range(&mut self, range: Range<u64>) -> Result<u64, RngError> {
        if range.start >= range.end {
            return Err(RngError::EmptyRange {
                start: range.start,
                end: range.end,
            });
        }
        let span = range.end - range.start;
        // Reject draws from the final partial bucket.
        let zone = u64::MAX - (u64::MAX % span);
        loop {
            let x = self.next_u64();
            if x < zone {
                return Ok(range.start + x % span);
            }
        }
    }

    /// Uniform index in `0..len`.
    ///
    /// # Errors
    ///
    /// Returns [`RngError::EmptyRange`] if `len == 0`.
    pub fn gen_index(&mut self, len: usize) -> Result<usize, RngError> {
        let idx = self.gen_range(0..len as u64)?;
        #[allow(clippy::cast_possible_truncation)]
        Ok(idx as usize)
    }

    /// `true` with probability `p`.
    ///
    /// # Errors
    ///
    /// Returns [`RngError::InvalidProbability`] if `p` is not in `[0, 1]`.
    pub fn gen_bool(&mut self, p: f64) -> Result<bool, RngError> {
        if !(0.0..=1.0).contains(&p) {
            return Err(RngError::InvalidProbability { p: p.to_string() });
        }
        Ok(self.next_f64() < p)
    }

    /// Fisher–Yates shuffle in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            // 0..=i is never empty.
            if let Ok(j) = self.gen_index(i + 1) {
                items.swap(i, j);
            }
        }
    }

    /// A uniformly chosen element, or `None` for an empty slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        let idx = self.gen_index(items.len()).ok()?;
        items.get(idx)
    }
}
