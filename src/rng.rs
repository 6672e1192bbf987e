// 🎲 Seeded Pseudo-Random Source - FNV-1a hash + LCG stream
// Every random decision in this crate flows through SeededRng so that
// identical seeds reproduce identical output bit-for-bit. No component may
// touch the wall clock or OS randomness for a generation decision.

use serde::{Deserialize, Serialize};

// ============================================================================
// FNV-1a STRING HASH
// ============================================================================

/// Hash an arbitrary string to a 32-bit seed (FNV-1a).
///
/// Offset basis 0x811c9dc5, prime 0x01000193, XOR-then-multiply per byte
/// with unsigned 32-bit overflow.
pub fn fnv1a_hash(input: &str) -> u32 {
    const OFFSET_BASIS: u32 = 0x811c_9dc5;
    const PRIME: u32 = 0x0100_0193;

    let mut hash = OFFSET_BASIS;
    for byte in input.bytes() {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

// ============================================================================
// SEEDED RNG (LCG)
// ============================================================================

/// Deterministic pseudo-random stream over a linear-congruential generator.
///
/// Recurrence: `state = state * 1664525 + 1013904223 mod 2^32`.
/// Same seed, same sequence - this is the reproducibility contract the
/// whole generator is built on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    /// Create a stream from a numeric seed.
    pub fn new(seed: u32) -> Self {
        SeededRng { state: seed }
    }

    /// Create a stream from a string seed via FNV-1a.
    pub fn from_str_seed(seed: &str) -> Self {
        SeededRng::new(fnv1a_hash(seed))
    }

    /// Next draw in [0, 1).
    pub fn next(&mut self) -> f64 {
        self.state = self
            .state
            .wrapping_mul(1_664_525)
            .wrapping_add(1_013_904_223);
        self.state as f64 / 4_294_967_296.0
    }

    /// Uniform integer in [min, max], inclusive on both ends.
    pub fn range(&mut self, min: u32, max: u32) -> u32 {
        debug_assert!(min <= max, "range bounds inverted");
        min + (self.next() * (max - min + 1) as f64) as u32
    }

    /// Uniform dollar amount in [min, max], rounded to cents.
    pub fn amount(&mut self, min: f64, max: f64) -> f64 {
        round_cents(min + self.next() * (max - min))
    }

    /// Bernoulli trial: true with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next() < p
    }

    /// Uniform draw from a non-empty collection.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        assert!(!items.is_empty(), "pick from empty collection");
        let index = self.range(0, items.len() as u32 - 1) as usize;
        &items[index]
    }

    /// Fixed-size subset without replacement: draw a count in
    /// [min, max], Fisher-Yates shuffle a copy, take the front.
    pub fn pick_distinct<T: Clone>(&mut self, items: &[T], min: u32, max: u32) -> Vec<T> {
        let count = self.range(min, max) as usize;
        let mut pool: Vec<T> = items.to_vec();
        let len = pool.len();
        for i in (1..len).rev() {
            let j = self.range(0, i as u32) as usize;
            pool.swap(i, j);
        }
        pool.truncate(count.min(len));
        pool
    }
}

/// Round a dollar amount to whole cents.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

// ============================================================================
// TESTS
// ============================================================================
