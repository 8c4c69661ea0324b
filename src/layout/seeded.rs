//! Deterministic string-seeded random stream.
//!
//! A key is folded into a 32-bit seed with FNV-1a, and the seed drives a
//! mulberry32 generator. The same key always yields the same stream, which
//! keeps a sprite's placement stable across re-layouts.

/// FNV-1a 32-bit offset basis.
const FNV_OFFSET_BASIS: u32 = 2_166_136_261;

/// FNV-1a 32-bit prime.
const FNV_PRIME: u32 = 16_777_619;

/// Increment added to the accumulator on every draw.
const GOLDEN_STEP: u32 = 0x6D2B_79F5;

/// 2^32 as a float, used to normalize a `u32` into `[0, 1)`.
const U32_RANGE: f64 = 4_294_967_296.0;

/// Folds a key into a 32-bit seed.
///
/// The fold runs over UTF-16 code units so that keys containing non-ASCII
/// characters hash the same as they would in a browser.
#[must_use]
pub fn hash_seed(key: &str) -> u32 {
    key.encode_utf16().fold(FNV_OFFSET_BASIS, |hash, unit| {
        (hash ^ u32::from(unit)).wrapping_mul(FNV_PRIME)
    })
}

/// Repeatable pseudo-random stream seeded from a string key.
///
/// No external entropy is involved: two instances built from the same key
/// produce identical sequences, element for element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededRandom {
    state: u32,
}

impl SeededRandom {
    /// Creates a stream from a raw 32-bit seed.
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Creates a stream from a string key via [`hash_seed`].
    #[must_use]
    pub fn from_key(key: &str) -> Self {
        Self::new(hash_seed(key))
    }

    /// Returns the next raw 32-bit output.
    pub const fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(GOLDEN_STEP);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Returns the next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / U32_RANGE
    }
}

impl Iterator for SeededRandom {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.next_f64())
    }
}
