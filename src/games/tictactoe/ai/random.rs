//! Injectable randomness for the non-deterministic tiers.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Source of uniform choices.
pub trait RandomSource: Send + Sync {
    /// Picks an index in `0..len`. Callers never pass `len == 0`.
    fn pick(&mut self, len: usize) -> usize;
}

/// [`RandomSource`] backed by a seedable [`StdRng`].
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Seeds from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible stream for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn pick(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// [`RandomSource`] that replays a fixed list of choices.
///
/// Each choice is reduced modulo `len`; once exhausted it keeps
/// answering `0`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    choices: VecDeque<usize>,
}

impl ScriptedRandom {
    /// Creates a script from the given choices.
    pub fn new(choices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            choices: choices.into_iter().collect(),
        }
    }

    /// Choices not yet consumed.
    pub fn remaining(&self) -> usize {
        self.choices.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn pick(&mut self, len: usize) -> usize {
        self.choices.pop_front().unwrap_or(0) % len
    }
}
