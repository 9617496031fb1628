use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};

use super::{ParamGen, Result};

/// A parameter generator sampling from a probabilistic distribution.
pub struct RandParamGen<R: Rng, D: Distribution<f32>> {
    rng: R,
    distribution: D,
    remaining: usize,
}

impl<R: Rng, D: Distribution<f32>> RandParamGen<R, D> {
    /// Creates a new `RandParamGen`.
    ///
    /// # Arguments
    /// * `rng` - A random number generator.
    /// * `distribution` - The distribution to sample the values from.
    /// * `limit` - The maximum amount of values to generate.
    pub fn new(rng: R, distribution: D, limit: usize) -> Self {
        Self {
            rng,
            distribution,
            remaining: limit,
        }
    }
}

impl<R: Rng> RandParamGen<R, Uniform<f32>> {
    /// Creates a new `RandParamGen` over the half open range `[low, high)`.
    ///
    /// # Returns
    /// An error if the range is invalid (low >= high or non finite bounds).
    pub fn uniform(rng: R, limit: usize, low: f32, high: f32) -> Result<Self> {
        Ok(Self::new(rng, Uniform::new(low, high)?, limit))
    }
}

impl<R: Rng> RandParamGen<R, Normal<f32>> {
    /// Creates a new `RandParamGen` with a normal distribution.
    ///
    /// # Returns
    /// An error if `std_dev` is not finite.
    pub fn normal(rng: R, limit: usize, mean: f32, std_dev: f32) -> Result<Self> {
        Ok(Self::new(rng, Normal::new(mean, std_dev)?, limit))
    }
}

impl<R: Rng, D: Distribution<f32>> ParamGen for RandParamGen<R, D> {
    fn sample(&mut self, n: usize) -> Option<Vec<f32>> {
        if self.remaining == 0 {
            return None;
        }

        let n = n.min(self.remaining);
        self.remaining -= n;

        let sample = (0..n)
            .map(|_| self.distribution.sample(&mut self.rng))
            .collect();

        Some(sample)
    }
}
