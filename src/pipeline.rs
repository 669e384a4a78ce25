//! End-to-end planning runs.
//!
//! [`Planner`] wires the stages together in their fixed order:
//!
//! ```text
//! partition → generate → annotate → capacity filter → select → simulate
//! ```
//!
//! Every stage is also usable on its own; the planner only owns the
//! configuration and the hand-off between stages.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::PlannerConfig;
use crate::constructive::{generate_candidates, Sectors, SectorPartitioner};
use crate::error::Result;
use crate::instance::Instance;
use crate::models::{CandidatePool, DayType};
use crate::selection::{MicroLpBackend, MipBackend, RouteSelector, Selection, SelectionOutcome};
use crate::simulation::{CostDistribution, CostRiskSimulator, CostSummary, DemandRiskSimulator};

/// Risk figures for one selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    /// Day type the selection was planned for.
    pub day: DayType,
    /// Number of routes in the selection.
    pub routes: usize,
    /// Planning cost of the selection.
    pub planned_cost: f64,
    /// Wage cost with unperturbed durations.
    pub base_wage_cost: f64,
    /// Wage cost under travel-time noise.
    pub travel: CostSummary,
    /// Wet-lease cost under demand re-draws.
    pub demand: CostSummary,
    /// Per-trial wage totals behind `travel`.
    pub travel_samples: CostDistribution,
    /// Per-trial wet-lease totals behind `demand`.
    pub demand_samples: CostDistribution,
}

/// Runs the planning pipeline with one configuration.
///
/// # Examples
///
/// ```no_run
/// use store_routing::config::PlannerConfig;
/// use store_routing::instance::Instance;
/// use store_routing::models::DayType;
/// use store_routing::pipeline::Planner;
///
/// let instance = Instance::from_path("instance.json")?;
/// let planner = Planner::new(PlannerConfig::default())?;
/// let selection = planner.optimize(&instance, DayType::Weekday)?.into_selection()?;
/// let report = planner.simulate(&instance, &selection)?;
/// println!("{:.2} .. {:.2}", report.travel.ci_low, report.travel.ci_high);
/// # Ok::<(), store_routing::error::RoutingError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Planner<B = MicroLpBackend> {
    config: PlannerConfig,
    backend: B,
}

impl Planner<MicroLpBackend> {
    /// Creates a planner with the bundled MIP backend.
    pub fn new(config: PlannerConfig) -> Result<Self> {
        Self::with_backend(config, MicroLpBackend::new())
    }
}

impl<B: MipBackend + Clone> Planner<B> {
    /// Creates a planner over any MIP backend. The configuration is validated.
    pub fn with_backend(config: PlannerConfig, backend: B) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, backend })
    }

    /// The validated configuration.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Splits the instance's stores into sectors around the depot.
    ///
    /// The depot's own coordinates in the instance take precedence over
    /// the configured reference point.
    pub fn partition(&self, instance: &Instance) -> Result<Sectors> {
        let reference = instance.depot_coordinates().unwrap_or(self.config.depot);
        SectorPartitioner::new(reference).partition(&instance.nodes)
    }

    /// Builds the unannotated candidate pool.
    pub fn generate(&self, instance: &Instance) -> Result<CandidatePool> {
        let sectors = self.partition(instance)?;
        generate_candidates(&instance.matrix, &sectors, &self.config.generation)
    }

    /// Builds the pool, attaches expected demand for `day` and drops routes
    /// that do not fit on a truck.
    pub fn candidates(&self, instance: &Instance, day: DayType) -> Result<CandidatePool> {
        let mut pool = self.generate(instance)?;
        self.config
            .annotator()?
            .annotate(pool.routes_mut(), &instance.demand, day)?;
        let pool = self.config.capacity_filter()?.apply(pool);
        info!(%day, routes = pool.len(), "candidate pool ready for selection");
        Ok(pool)
    }

    /// Selects the cheapest exact cover for `day`.
    pub fn optimize(&self, instance: &Instance, day: DayType) -> Result<SelectionOutcome> {
        let pool = self.candidates(instance, day)?;
        self.selector()?.select(&pool, &instance.demand, day)
    }

    /// The route selector this planner uses.
    pub fn selector(&self) -> Result<RouteSelector<B>> {
        Ok(RouteSelector::with_backend(
            self.backend.clone(),
            self.config.cost_model(),
            self.config.fleet.fleet_size,
        )?
        .with_time_limit(self.config.time_limit()))
    }

    /// Runs both risk simulators on a selection.
    pub fn simulate(&self, instance: &Instance, selection: &Selection) -> Result<RiskReport> {
        let level = self.config.simulation.confidence_level;

        let cost_sim = CostRiskSimulator::new(self.config.cost_risk())?;
        let travel_samples = cost_sim.run(&selection.routes)?;
        let demand_samples = DemandRiskSimulator::new(self.config.demand_risk())?.run(
            &selection.routes,
            &instance.demand,
            selection.day,
        )?;

        let report = RiskReport {
            day: selection.day,
            routes: selection.len(),
            planned_cost: selection.total_cost(),
            base_wage_cost: cost_sim.base_cost(&selection.routes),
            travel: travel_samples.summary(level)?,
            demand: demand_samples.summary(level)?,
            travel_samples,
            demand_samples,
        };
        info!(
            day = %report.day,
            mean_wage = report.travel.mean,
            mean_wet_lease = report.demand.mean,
            "risk simulation complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RoutingError;
    use crate::simulation::NoiseModel;

    const INSTANCE: &str = r#"{
        "depot": "DC",
        "nodes": [
            { "name": "DC", "lat": 0.0, "long": 0.0 },
            { "name": "S1", "lat": -1.0, "long": 1.0 },
            { "name": "S2", "lat": -1.0, "long": -1.0 },
            { "name": "E1", "lat": 1.0, "long": 1.0 },
            { "name": "W1", "lat": 1.0, "long": -1.0 }
        ],
        "durations": {
            "names": ["DC", "S1", "S2", "E1", "W1"],
            "rows": [
                [0, 1800, 1900, 2000, 2100],
                [1800, 0, 600, 1500, 3000],
                [1900, 600, 0, 3000, 1500],
                [2000, 1500, 3000, 0, 2500],
                [2100, 3000, 1500, 2500, 0]
            ]
        },
        "demand": {
            "S1": { "weekday": { "expected": 10, "samples": [8, 12] }, "saturday": { "expected": 5, "samples": [5] } },
            "S2": { "weekday": { "expected": 10, "samples": [9, 11] }, "saturday": { "expected": 0, "samples": [0] } },
            "E1": { "weekday": { "expected": 20, "samples": [18, 22] }, "saturday": { "expected": 5, "samples": [5] } },
            "W1": { "weekday": { "expected": 6, "samples": [6] }, "saturday": { "expected": 5, "samples": [5] } }
        }
    }"#;

    fn instance() -> Instance {
        Instance::from_json_str(INSTANCE).expect("valid instance")
    }

    #[test]
    fn test_candidates_respect_capacity() {
        let planner = Planner::new(PlannerConfig::default()).unwrap();
        let pool = planner.candidates(&instance(), DayType::Weekday).unwrap();
        assert!(!pool.is_empty());
        assert!(pool.iter().all(|r| r.demand() <= 26.0));
        // E1 (20) cannot share a truck with S1 or S2 (10 each).
        assert!(!pool.iter().any(|r| r.visits("E1") && (r.visits("S1") || r.visits("S2"))));
        assert!(pool.iter().any(|r| r.stops() == ["S1", "S2"]));
    }

    #[test]
    fn test_optimize_covers_active_stores_once() {
        let planner = Planner::new(PlannerConfig::default()).unwrap();
        let inst = instance();
        for day in DayType::ALL {
            let selection = planner.optimize(&inst, day).unwrap().into_selection().unwrap();
            for store in inst.demand.active_stores(day) {
                assert_eq!(selection.times_visited(store), 1, "{store} on {day}");
            }
            assert!(selection.len() <= planner.config().fleet.fleet_size);
        }
    }

    #[test]
    fn test_fleet_of_one_is_infeasible() {
        let mut config = PlannerConfig::default();
        config.fleet.fleet_size = 1;
        let planner = Planner::new(config).unwrap();
        let outcome = planner.optimize(&instance(), DayType::Weekday).unwrap();
        assert!(outcome.selection().is_none());
        assert!(matches!(
            outcome.into_selection(),
            Err(RoutingError::InfeasibleOptimization { .. })
        ));
    }

    #[test]
    fn test_simulate_with_fixed_noise() {
        let mut config = PlannerConfig::default();
        config.simulation.trials = 20;
        config.simulation.noise = NoiseModel::Fixed { factor: 1.0 };
        let planner = Planner::new(config).unwrap();
        let inst = instance();
        let selection = planner
            .optimize(&inst, DayType::Weekday)
            .unwrap()
            .into_selection()
            .unwrap();
        let report = planner.simulate(&inst, &selection).unwrap();
        assert_eq!(report.travel.trials, 20);
        assert!((report.travel.mean - report.base_wage_cost).abs() < 1e-6);
        assert_eq!(report.travel.min, report.travel.max);
        assert!(report.demand.min >= 0.0);
    }
}
