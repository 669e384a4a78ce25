//! Travel-time risk simulation.
//!
//! # Model
//!
//! Each trial draws one day-wide noise factor `f` and prices every selected
//! route at `wage(travel · f + unload)`. Unloading time is not perturbed.
//! The trial total is the sum over routes.
//!
//! # Reproducibility
//!
//! All factors are drawn up front from one seeded generator, then trials are
//! evaluated in parallel with `rayon`. The output depends only on the seed,
//! never on the thread count.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, LogNormal};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::distribution::CostDistribution;
use crate::error::{Result, RoutingError};
use crate::evaluation::WageFunction;
use crate::models::Route;

/// Default number of Monte Carlo trials.
pub const DEFAULT_TRIALS: usize = 1000;

/// Default random seed.
pub const DEFAULT_SEED: u64 = 100;

/// Distribution of the per-trial travel-time factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoiseModel {
    /// `exp(N(mu, sigma))`.
    LogNormal {
        /// Mean of the underlying normal.
        mu: f64,
        /// Standard deviation of the underlying normal.
        sigma: f64,
    },
    /// The same factor every trial.
    Fixed {
        /// Multiplier applied to every route duration.
        factor: f64,
    },
}

impl Default for NoiseModel {
    fn default() -> Self {
        NoiseModel::LogNormal {
            mu: 0.03,
            sigma: 0.07,
        }
    }
}

impl NoiseModel {
    /// Checks the parameters.
    pub fn validate(&self) -> Result<()> {
        match *self {
            NoiseModel::LogNormal { mu, sigma } => {
                if !mu.is_finite() || !sigma.is_finite() || sigma < 0.0 {
                    return Err(RoutingError::SimulationParameter(format!(
                        "lognormal noise needs finite mu and sigma >= 0, got mu={mu} sigma={sigma}"
                    )));
                }
            }
            NoiseModel::Fixed { factor } => {
                if !factor.is_finite() || factor < 0.0 {
                    return Err(RoutingError::SimulationParameter(format!(
                        "fixed noise factor must be finite and non-negative, got {factor}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Draws `count` factors from `rng`, in order.
    pub fn draw<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Result<Vec<f64>> {
        match *self {
            NoiseModel::LogNormal { mu, sigma } => {
                let dist = LogNormal::new(mu, sigma)
                    .map_err(|e| RoutingError::SimulationParameter(e.to_string()))?;
                Ok((0..count).map(|_| dist.sample(rng)).collect())
            }
            NoiseModel::Fixed { factor } => Ok(vec![factor; count]),
        }
    }
}

/// Parameters of a [`CostRiskSimulator`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostRiskConfig {
    /// Number of Monte Carlo trials.
    pub trials: usize,
    /// Travel-time factor distribution.
    pub noise: NoiseModel,
    /// Driver wage applied to each perturbed route duration.
    pub wage: WageFunction,
    /// Seed for the factor and trial generators.
    pub seed: u64,
}

impl Default for CostRiskConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            noise: NoiseModel::default(),
            wage: WageFunction::default(),
            seed: DEFAULT_SEED,
        }
    }
}

/// Monte Carlo estimate of fleet wage cost under travel-time uncertainty.
///
/// # Examples
///
/// ```
/// use store_routing::models::Route;
/// use store_routing::simulation::{CostRiskConfig, CostRiskSimulator, NoiseModel};
///
/// let routes = vec![Route::new(vec!["A".into()], 7200.0, true).unwrap()];
/// let sim = CostRiskSimulator::new(CostRiskConfig {
///     trials: 1,
///     noise: NoiseModel::Fixed { factor: 1.0 },
///     ..CostRiskConfig::default()
/// })
/// .unwrap();
///
/// let dist = sim.run(&routes).unwrap();
/// assert_eq!(dist.samples(), &[sim.base_cost(&routes)]);
/// assert_eq!(sim.base_cost(&routes), 450.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CostRiskSimulator {
    config: CostRiskConfig,
}

impl CostRiskSimulator {
    /// Creates a simulator, validating every parameter before any trial runs.
    pub fn new(config: CostRiskConfig) -> Result<Self> {
        if config.trials == 0 {
            return Err(RoutingError::SimulationParameter(
                "trial count must be positive".into(),
            ));
        }
        config.noise.validate()?;
        config.wage.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CostRiskConfig {
        &self.config
    }

    /// Fleet wage cost with unperturbed durations.
    pub fn base_cost(&self, routes: &[Route]) -> f64 {
        routes
            .iter()
            .map(|r| self.config.wage.cost_for_seconds(r.duration()))
            .sum()
    }

    /// Runs all trials using the configured seed.
    pub fn run(&self, routes: &[Route]) -> Result<CostDistribution> {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        self.run_with_rng(routes, &mut rng)
    }

    /// Runs all trials drawing noise from a caller-supplied generator.
    pub fn run_with_rng<R: Rng + ?Sized>(&self, routes: &[Route], rng: &mut R) -> Result<CostDistribution> {
        let factors = self.config.noise.draw(self.config.trials, rng)?;
        let samples: Vec<f64> = factors
            .par_iter()
            .map(|&factor| self.trial_cost(routes, factor))
            .collect();

        info!(
            trials = samples.len(),
            routes = routes.len(),
            "travel-time risk simulation finished"
        );
        Ok(CostDistribution::new(samples))
    }

    /// Fleet cost for one trial with the given noise factor.
    pub fn trial_cost(&self, routes: &[Route], factor: f64) -> f64 {
        routes
            .iter()
            .map(|r| {
                let seconds = r.travel_duration() * factor + r.unload_duration();
                self.config.wage.cost_for_seconds(seconds)
            })
            .sum()
    }
}
