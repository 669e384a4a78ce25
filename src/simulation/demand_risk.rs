//! Demand risk simulation.
//!
//! Re-draws every store's demand from its historical samples and prices each
//! route whose drawn load no longer fits on a truck at a fixed wet-lease
//! cost (hiring an extra truck with driver for the overflow).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::cost_risk::{DEFAULT_SEED, DEFAULT_TRIALS};
use super::distribution::CostDistribution;
use crate::error::{Result, RoutingError};
use crate::evaluation::{CapacityFilter, DemandAnnotator, DEFAULT_VEHICLE_CAPACITY};
use crate::models::{DayType, DemandTable, Route};

/// Default cost of one wet-leased truck.
pub const DEFAULT_WET_LEASE_COST: f64 = 2000.0;

/// Parameters of a [`DemandRiskSimulator`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemandRiskConfig {
    /// Number of Monte Carlo trials.
    pub trials: usize,
    /// Seed for the per-trial generators.
    pub seed: u64,
    /// Truck capacity in demand units.
    pub vehicle_capacity: f64,
    /// Flat cost of each extra truck a trial needs.
    pub wet_lease_cost: f64,
}

impl Default for DemandRiskConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            seed: DEFAULT_SEED,
            vehicle_capacity: DEFAULT_VEHICLE_CAPACITY,
            wet_lease_cost: DEFAULT_WET_LEASE_COST,
        }
    }
}

/// Monte Carlo estimate of overflow cost under demand uncertainty.
///
/// Every trial gets its own generator, seeded from a master generator
/// before any trial runs, so results do not depend on thread count.
#[derive(Debug, Clone, PartialEq)]
pub struct DemandRiskSimulator {
    config: DemandRiskConfig,
    capacity: CapacityFilter,
}

impl DemandRiskSimulator {
    /// Creates a simulator, validating every parameter up front.
    pub fn new(config: DemandRiskConfig) -> Result<Self> {
        if config.trials == 0 {
            return Err(RoutingError::SimulationParameter(
                "trial count must be positive".into(),
            ));
        }
        if !config.wet_lease_cost.is_finite() || config.wet_lease_cost < 0.0 {
            return Err(RoutingError::SimulationParameter(format!(
                "wet lease cost must be finite and non-negative, got {}",
                config.wet_lease_cost
            )));
        }
        let capacity = CapacityFilter::new(config.vehicle_capacity)?;
        Ok(Self { config, capacity })
    }

    pub fn config(&self) -> &DemandRiskConfig {
        &self.config
    }

    /// Runs all trials using the configured seed.
    ///
    /// Fails before any trial if a stop has no demand record or no samples
    /// for `day`.
    pub fn run(&self, routes: &[Route], table: &DemandTable, day: DayType) -> Result<CostDistribution> {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        self.run_with_rng(routes, table, day, &mut rng)
    }

    /// Runs all trials with per-trial seeds drawn from `rng`.
    pub fn run_with_rng<R: Rng + ?Sized>(
        &self,
        routes: &[Route],
        table: &DemandTable,
        day: DayType,
        rng: &mut R,
    ) -> Result<CostDistribution> {
        check_samples(routes, table, day)?;

        let seeds: Vec<u64> = (0..self.config.trials).map(|_| rng.random()).collect();
        let annotator = DemandAnnotator::default();
        let samples = seeds
            .par_iter()
            .map(|&seed| {
                let mut trial_rng = StdRng::seed_from_u64(seed);
                let mut drawn = routes.to_vec();
                annotator.annotate_sampled(&mut drawn, table, day, &mut trial_rng)?;
                let overflowing = drawn.iter().filter(|r| !self.capacity.admits(r)).count();
                Ok(overflowing as f64 * self.config.wet_lease_cost)
            })
            .collect::<Result<Vec<f64>>>()?;

        info!(
            trials = samples.len(),
            routes = routes.len(),
            %day,
            "demand risk simulation finished"
        );
        Ok(CostDistribution::new(samples))
    }
}

fn check_samples(routes: &[Route], table: &DemandTable, day: DayType) -> Result<()> {
    for stop in routes.iter().flat_map(|r| r.stops()) {
        let record = table.get(stop).ok_or_else(|| RoutingError::MissingDemand {
            store: stop.clone(),
            day,
        })?;
        if record.series(day).samples.is_empty() {
            return Err(RoutingError::EmptyDemandSamples {
                store: stop.clone(),
                day,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DaySeries, DemandRecord};

    fn table() -> DemandTable {
        let mut t = DemandTable::new();
        t.insert(
            "A",
            DemandRecord::new(DaySeries::new(10.0, vec![10.0, 20.0]), DaySeries::new(5.0, vec![5.0])),
        );
        t.insert(
            "B",
            DemandRecord::new(DaySeries::new(10.0, vec![10.0]), DaySeries::new(5.0, vec![])),
        );
        t
    }

    fn route(stops: &[&str]) -> Route {
        Route::new(stops.iter().map(|s| s.to_string()).collect(), 1000.0, true).expect("valid")
    }

    fn sim(trials: usize) -> DemandRiskSimulator {
        DemandRiskSimulator::new(DemandRiskConfig {
            trials,
            ..DemandRiskConfig::default()
        })
        .expect("valid")
    }

    #[test]
    fn test_costs_are_multiples_of_wet_lease() {
        // A+B draws 20 or 30 against capacity 26.
        let dist = sim(500).run(&[route(&["A", "B"])], &table(), DayType::Weekday).unwrap();
        assert!(dist.samples().iter().all(|&c| c == 0.0 || c == 2000.0));
        assert!(dist.samples().contains(&0.0));
        assert!(dist.samples().contains(&2000.0));
    }

    #[test]
    fn test_deterministic_samples_never_overflow() {
        let dist = sim(50).run(&[route(&["B"])], &table(), DayType::Weekday).unwrap();
        assert!(dist.samples().iter().all(|&c| c == 0.0));
    }

    #[test]
    fn test_reproducible_with_seed() {
        let routes = [route(&["A", "B"]), route(&["A"])];
        let a = sim(100).run(&routes, &table(), DayType::Weekday).unwrap();
        let b = sim(100).run(&routes, &table(), DayType::Weekday).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_samples_fail_before_trials() {
        let err = sim(10).run(&[route(&["B"])], &table(), DayType::Saturday).unwrap_err();
        assert!(matches!(err, RoutingError::EmptyDemandSamples { .. }));
        let err = sim(10).run(&[route(&["Z"])], &table(), DayType::Weekday).unwrap_err();
        assert!(matches!(err, RoutingError::MissingDemand { .. }));
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(DemandRiskSimulator::new(DemandRiskConfig {
            trials: 0,
            ..DemandRiskConfig::default()
        })
        .is_err());
        assert!(DemandRiskSimulator::new(DemandRiskConfig {
            vehicle_capacity: 0.0,
            ..DemandRiskConfig::default()
        })
        .is_err());
    }
}
