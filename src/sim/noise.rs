//! Seedable noise for the simulated sensors.

use rand::prelude::*;
use rand::rngs::SmallRng;
use rand_distr::{Normal, StandardNormal};

/// Noise generator with configurable seed for reproducibility
#[derive(Clone, Debug)]
pub struct NoiseGenerator {
    rng: SmallRng,
}

impl NoiseGenerator {
    /// Seed 0 draws from entropy; any other seed is deterministic.
    pub fn new(seed: u64) -> Self {
        let rng = if seed == 0 {
            SmallRng::from_entropy()
        } else {
            SmallRng::seed_from_u64(seed)
        };
        Self { rng }
    }

    /// Zero-mean Gaussian sample.
    #[inline]
    pub fn gaussian(&mut self, stddev: f32) -> f32 {
        if stddev <= 0.0 {
            return 0.0;
        }
        let n: f32 = self.rng.sample(StandardNormal);
        n * stddev
    }

    /// Gaussian sample around `mean`; `mean` itself for an invalid spread.
    pub fn normal(&mut self, mean: f32, stddev: f32) -> f32 {
        match Normal::new(mean, stddev) {
            Ok(dist) => dist.sample(&mut self.rng),
            Err(_) => mean,
        }
    }

    /// True with the given probability.
    #[inline]
    pub fn chance(&mut self, probability: f32) -> bool {
        self.rng.r#gen::<f32>() < probability
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_seed() {
        let mut a = NoiseGenerator::new(42);
        let mut b = NoiseGenerator::new(42);
        for _ in 0..50 {
            assert_eq!(a.gaussian(1.0), b.gaussian(1.0));
        }
    }

    #[test]
    fn test_zero_spread() {
        let mut noise = NoiseGenerator::new(7);
        assert_eq!(noise.gaussian(0.0), 0.0);
        assert_eq!(noise.normal(2.5, -1.0), 2.5);
        assert!(!noise.chance(0.0));
    }
}
