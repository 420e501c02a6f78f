//! Random colours for the guess card.

use akigame_core::rng::DeterministicRng;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// OS-seeded [`DeterministicRng`].
#[derive(Debug)]
pub struct SystemRng(StdRng);

impl SystemRng {
    /// Seeds from the operating system.
    #[must_use]
    pub fn from_os() -> Self {
        Self(StdRng::from_os_rng())
    }

    /// Fixed seed, for reproducible runs.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl DeterministicRng for SystemRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        self.0.random_range(min..=max)
    }
}
