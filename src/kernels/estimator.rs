//! This module contains the Monte Carlo estimator used to synthesize a single
//! missing sample between two known neighbours.
//!
//! The estimate is deliberately stochastic: `N` normal draws centred on the
//! midpoint, with a standard deviation proportional to the step between the
//! neighbours, are averaged. The expected value is the midpoint and the
//! variance of the estimate is `spread² / N`.
//!
//! The draws are taken as standard-normal deviations and only their average
//! is scaled, so the running sum stays small for any finite neighbours.

use ndarray::Array1;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};

use crate::config::EstimatorConfig;
use crate::error::PipelineError;

//==================================================================================
// 1. The Estimator Seam
//==================================================================================

/// Produces the value of one missing sample from its two neighbours.
///
/// Implementations must fail only when either neighbour is non-finite.
pub trait GapEstimator {
    fn estimate(&mut self, before: f64, after: f64) -> Result<f64, PipelineError>;
}

//==================================================================================
// 2. Monte Carlo Implementation
//==================================================================================

pub struct MonteCarloEstimator {
    num_simulations: usize,
    spread_factor: f64,
    rng: StdRng,
}

impl MonteCarloEstimator {
    /// Builds an estimator from config. A configured seed makes every run
    /// reproducible; otherwise the generator is seeded from the OS.
    pub fn new(config: &EstimatorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            num_simulations: config.num_simulations.max(1),
            spread_factor: config.spread_factor,
            rng,
        }
    }

    pub fn num_simulations(&self) -> usize {
        self.num_simulations
    }
}

impl GapEstimator for MonteCarloEstimator {
    fn estimate(&mut self, before: f64, after: f64) -> Result<f64, PipelineError> {
        if !before.is_finite() || !after.is_finite() {
            return Err(PipelineError::Estimation { before, after });
        }

        // Halve before adding so two large finite inputs cannot overflow.
        let mean = before / 2.0 + after / 2.0;
        let half_step = (after / 2.0 - before / 2.0).abs();
        if half_step == 0.0 || self.spread_factor == 0.0 {
            return Ok(mean);
        }
        let spread = (half_step * (2.0 * self.spread_factor)).min(f64::MAX);

        let deviations: Array1<f64> =
            Distribution::<f64>::sample_iter(StandardNormal, &mut self.rng)
                .take(self.num_simulations)
                .collect();
        let average_deviation = deviations.mean().ok_or_else(|| {
            PipelineError::InternalError("estimator drew no samples".to_string())
        })?;

        // Saturate at the finite range when the scaled deviation leaves it.
        Ok((mean + spread * average_deviation).clamp(f64::MIN, f64::MAX))
    }
}
