//! # Demo support
//!
//! Goal sampling for the demo executable and benchmarks. The random number
//! generator is owned by the sampler and seeded explicitly, so a demo run can
//! be reproduced from its seed.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Point2;
use rand::{rngs::StdRng, Rng, SeedableRng};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Samples goals uniformly from the square `[-area_m, area_m]^2`.
#[derive(Debug, Clone)]
pub struct GoalSampler {
    rng: StdRng,

    /// Half width of the sampling area
    area_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GoalSampler {
    /// Create a new sampler over `[-area_m, area_m]^2`.
    ///
    /// # Panics
    /// - If `area_m` is not positive and finite.
    pub fn new(seed: u64, area_m: f64) -> Self {
        assert!(
            area_m.is_finite() && area_m > 0.0,
            "Sampling area must be positive, found {}",
            area_m
        );

        Self {
            rng: StdRng::seed_from_u64(seed),
            area_m,
        }
    }

    /// Draw the next goal.
    pub fn sample(&mut self) -> Point2<f64> {
        Point2::new(
            self.rng.gen_range(-self.area_m..=self.area_m),
            self.rng.gen_range(-self.area_m..=self.area_m),
        )
    }
}

impl Iterator for GoalSampler {
    type Item = Point2<f64>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.sample())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_same_seed_same_goals() {
        let a: Vec<_> = GoalSampler::new(42, 50.0).take(20).collect();
        let b: Vec<_> = GoalSampler::new(42, 50.0).take(20).collect();
        let c: Vec<_> = GoalSampler::new(43, 50.0).take(20).collect();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_goals_within_area() {
        for g in GoalSampler::new(7, 2.5).take(1000) {
            assert!(g.x.abs() <= 2.5 && g.y.abs() <= 2.5);
        }
    }

    #[test]
    #[should_panic]
    fn test_invalid_area() {
        GoalSampler::new(0, 0.0);
    }
}
