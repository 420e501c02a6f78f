//! Random number source.
//!
//! Only cosmetic choices (embed colours) are random. Tests inject a
//! predictable implementation.

/// Abstraction over random number generation.
pub trait DeterministicRng: Send + Sync {
    /// Generate a random `u32` in the range `[min, max]` inclusive.
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32;
}
