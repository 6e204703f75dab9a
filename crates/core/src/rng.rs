//! RNG module - seeded random sources for board generation and refill
//!
//! Every random draw the engine makes goes through a [`RandomSource`] owned by
//! the game state, so the same seed always produces the same boards.
//! The default source is a simple LCG; tests can inject scripted sources.

use crate::types::GemKind;

/// A seedable source of uniform draws
pub trait RandomSource {
    /// Random value in `[0, max)`. `max` is never zero.
    fn next_range(&mut self, max: u32) -> u32;

    /// Restart the sequence from `seed`
    fn reseed(&mut self, seed: u32);

    /// Uniform gem kind from the first `gem_types` palette entries
    fn next_gem(&mut self, gem_types: u8) -> GemKind {
        let count = (gem_types as usize).clamp(1, GemKind::COUNT);
        let idx = self.next_range(count as u32) as usize;
        GemKind::ALL[idx]
    }

    /// Uniform pick from a non-empty candidate list
    fn choose(&mut self, candidates: &[GemKind]) -> Option<GemKind> {
        if candidates.is_empty() {
            return None;
        }
        let idx = self.next_range(candidates.len() as u32) as usize;
        candidates.get(idx).copied()
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_range(&mut self, max: u32) -> u32 {
        (**self).next_range(max)
    }

    fn reseed(&mut self, seed: u32) {
        (**self).reseed(seed)
    }
}

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Current state, usable as a seed to continue the same sequence
    pub fn state(&self) -> u32 {
        self.state
    }
}

impl RandomSource for SimpleRng {
    fn next_range(&mut self, max: u32) -> u32 {
        // Low bits of a power-of-two LCG are weak; use the high half.
        (self.next_u32() >> 16) % max.max(1)
    }

    fn reseed(&mut self, seed: u32) {
        *self = Self::new(seed);
    }
}

impl Default for SimpleRng {
    fn default() -> Self {
        Self::new(1)
    }
}
