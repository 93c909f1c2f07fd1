//! Deterministic pseudo-random engine.
//!
//! A 64-bit linear congruential generator whose state is kept as four 16-bit
//! limbs. The limb arithmetic below reproduces the reference sequence
//! bit-for-bit, including the 32-bit truncation of the running carry, so it
//! must not be replaced by a native `u64` multiply.

use crate::errors::{PrngError, PrngResult};
use rand::Rng;

/// Four 16-bit words, most significant first.
pub type PrngSeed = [u16; 4];

const MULTIPLIER: PrngSeed = [0x5D58, 0x8B65, 0x6C07, 0x8965];
const INCREMENT: PrngSeed = [0, 0, 0x0026, 0x9EC3];
const TWO_POW_32: f64 = 4_294_967_296.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prng {
    seed: PrngSeed,
    starting_seed: PrngSeed,
}

impl Prng {
    /// Creates an engine from an explicit seed, or a freshly generated one.
    pub fn new(seed: Option<PrngSeed>) -> Self {
        let seed = seed.unwrap_or_else(Self::generate_seed);
        Self {
            seed,
            starting_seed: seed,
        }
    }

    /// Creates an engine from the `a,b,c,d` string form. Anything that is not
    /// exactly four well-formed 16-bit integers falls back to a generated seed.
    pub fn from_seed_str(text: &str) -> Self {
        Self::new(Some(parse_seed(text).unwrap_or_else(Self::generate_seed)))
    }

    pub fn generate_seed() -> PrngSeed {
        let mut rng = rand::rng();
        [rng.random(), rng.random(), rng.random(), rng.random()]
    }

    pub fn seed(&self) -> PrngSeed {
        self.seed
    }

    pub fn starting_seed(&self) -> PrngSeed {
        self.starting_seed
    }

    /// Replaces the current state. The starting seed is left untouched.
    pub fn set_seed(&mut self, seed: PrngSeed) {
        self.seed = seed;
    }

    /// The current state as `a,b,c,d`.
    pub fn seed_string(&self) -> String {
        format_seed(&self.seed)
    }

    /// Advances one frame and returns the upper 32 bits of the new state.
    pub fn next(&mut self) -> u32 {
        self.seed = multiply_add(&self.seed, &MULTIPLIER, &INCREMENT);
        ((self.seed[0] as u32) << 16) + self.seed[1] as u32
    }

    /// A real number in `[0, 1)`.
    pub fn random(&mut self) -> f64 {
        self.next() as f64 / TWO_POW_32
    }

    /// An integer in `[0, n)`.
    pub fn random_int(&mut self, n: u32) -> u32 {
        let result = self.next() as u64;
        ((result * n as u64) >> 32) as u32
    }

    /// An integer in `[from, to)`. An empty or inverted range yields `from`
    /// after still consuming one frame.
    pub fn random_range(&mut self, from: u32, to: u32) -> u32 {
        let result = self.next() as u64;
        let span = to.saturating_sub(from) as u64;
        ((result * span) >> 32) as u32 + from
    }

    /// True with probability `numerator / denominator`, decided by an integer
    /// comparison against `random_int(denominator)`.
    pub fn random_chance(&mut self, numerator: u32, denominator: u32) -> bool {
        self.random_int(denominator) < numerator
    }

    pub fn sample<'a, T>(&mut self, items: &'a [T]) -> PrngResult<&'a T> {
        if items.is_empty() {
            return Err(PrngError::EmptySample);
        }
        let index = self.random_int(items.len() as u32) as usize;
        Ok(&items[index])
    }

    /// In-place Fisher-Yates pass over `items[start..end]`.
    pub fn shuffle<T>(&mut self, items: &mut [T], start: usize, end: Option<usize>) {
        let end = end.unwrap_or(items.len()).min(items.len());
        let mut start = start;
        while start + 1 < end {
            let next_index = self.random_range(start as u32, end as u32) as usize;
            if start != next_index {
                items.swap(start, next_index);
            }
            start += 1;
        }
    }
}

/// Parses `a,b,c,d` into a seed. Returns `None` unless there are exactly four
/// integers that each fit in 16 bits.
pub fn parse_seed(text: &str) -> Option<PrngSeed> {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    if parts.len() != 4 {
        return None;
    }
    let mut seed = [0u16; 4];
    for (slot, part) in seed.iter_mut().zip(parts) {
        *slot = part.parse().ok()?;
    }
    Some(seed)
}

pub fn format_seed(seed: &PrngSeed) -> String {
    seed.iter().map(u16::to_string).collect::<Vec<_>>().join(",")
}

/// `a * b + c` over four 16-bit limbs.
fn multiply_add(a: &PrngSeed, b: &PrngSeed, c: &PrngSeed) -> PrngSeed {
    let mut out = [0u16; 4];
    let mut carry: u64 = 0;

    for out_index in (0..4).rev() {
        for b_index in out_index..4 {
            let a_index = 3 - (b_index - out_index);
            carry += a[a_index] as u64 * b[b_index] as u64;
        }
        carry += c[out_index] as u64;
        out[out_index] = (carry & 0xFFFF) as u16;
        // The carry is truncated to 32 bits before the shift.
        carry = (carry & 0xFFFF_FFFF) >> 16;
    }

    out
}
