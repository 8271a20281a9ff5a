/*!
 * Random Source
 * Injectable randomness for workload and command generation
 */

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of random draws used by the generators
///
/// Scenario tests inject a seeded or scripted source so runs are reproducible.
pub trait RandomSource: Send {
    /// Uniform draw in `[0, 1)`
    fn next_f64(&mut self) -> f64;

    /// Uniform integer in `[min, max]`; returns `min` when the range is empty
    fn range_inclusive(&mut self, min: u64, max: u64) -> u64;
}

/// `StdRng`-backed source
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Deterministic source
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Source seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl RandomSource for SeededRandom {
    #[inline]
    fn next_f64(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    #[inline]
    fn range_inclusive(&mut self, min: u64, max: u64) -> u64 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..=max)
    }
}
