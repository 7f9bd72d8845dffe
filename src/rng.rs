//! Seedable pseudorandom numbers for humanization.

/// A pseudorandom number generator (PRNG) for applications that don't require
/// cryptographically secure random numbers.
///
/// Always constructed from an explicit seed so a performance can be replayed
/// exactly, which is what the tests rely on.
#[derive(Debug, Clone)]
pub struct Rng(oorandom::Rand64);

impl Default for Rng {
    fn default() -> Self {
        Self::new_with_seed(0)
    }
}

impl Rng {
    /// Pass the same number to get the same stream back again.
    pub fn new_with_seed(seed: u64) -> Self {
        Self(oorandom::Rand64::new(seed as u128))
    }

    pub fn rand_u64(&mut self) -> u64 {
        self.0.rand_u64()
    }

    pub fn rand_float(&mut self) -> f64 {
        self.0.rand_float()
    }

    /// Uniform in `range` (end exclusive). An empty range yields its start.
    pub fn rand_range(&mut self, range: std::ops::Range<u64>) -> u64 {
        if range.start >= range.end {
            return range.start;
        }
        self.0.rand_range(range)
    }

    /// Fisher-Yates shuffle.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.rand_range(0..(i as u64 + 1)) as usize;
            items.swap(i, j);
        }
    }
}
