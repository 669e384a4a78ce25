//! Planner configuration.
//!
//! Every section has defaults matching the reference network (Auckland
//! depot, 26-unit trucks, 60 trucks), so an empty JSON object is a valid
//! configuration:
//!
//! ```
//! use store_routing::config::PlannerConfig;
//!
//! let config = PlannerConfig::from_json_str(r#"{ "fleet": { "fleet_size": 40 } }"#).unwrap();
//! assert_eq!(config.fleet.fleet_size, 40);
//! assert_eq!(config.fleet.vehicle_capacity, 26.0);
//! assert_eq!(config.simulation.trials, 1000);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constructive::{GenerationOptions, SectorPartitioner};
use crate::error::{Result, RoutingError};
use crate::evaluation::{
    CapacityFilter, DemandAnnotator, RouteCostModel, WageFunction, DEFAULT_UNLOAD_SECONDS_PER_UNIT,
    DEFAULT_VEHICLE_CAPACITY,
};
use crate::models::Coordinates;
use crate::selection::DEFAULT_FLEET_SIZE;
use crate::simulation::{
    CostRiskConfig, DemandRiskConfig, NoiseModel, DEFAULT_SEED, DEFAULT_TRIALS, DEFAULT_WET_LEASE_COST,
};

/// Reference depot position.
pub const DEFAULT_DEPOT: Coordinates = Coordinates {
    lat: -36.94904179,
    long: 174.8080123,
};

/// Fleet limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    /// Truck capacity in demand units.
    pub vehicle_capacity: f64,
    /// Maximum number of trucks per day.
    pub fleet_size: usize,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            vehicle_capacity: DEFAULT_VEHICLE_CAPACITY,
            fleet_size: DEFAULT_FLEET_SIZE,
        }
    }
}

/// Demand annotation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemandConfig {
    /// Unloading time per demand unit, in seconds.
    pub unload_seconds_per_unit: f64,
}

impl Default for DemandConfig {
    fn default() -> Self {
        Self {
            unload_seconds_per_unit: DEFAULT_UNLOAD_SECONDS_PER_UNIT,
        }
    }
}

/// Route cost parameters. The capacity for the over-capacity penalty comes
/// from [`FleetConfig::vehicle_capacity`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    /// Currency per second of route duration.
    pub cost_per_second: f64,
    /// Duration above which the overtime penalty applies.
    pub max_route_seconds: f64,
    /// Fixed penalty for long routes.
    pub overtime_penalty: f64,
    /// Fixed penalty for routes over the truck capacity.
    pub over_capacity_penalty: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        let model = RouteCostModel::default();
        Self {
            cost_per_second: model.cost_per_second,
            max_route_seconds: model.max_route_seconds,
            overtime_penalty: model.overtime_penalty,
            over_capacity_penalty: model.over_capacity_penalty,
        }
    }
}

/// Route selection solver settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Wall-clock limit for one solve; `null` waits indefinitely.
    pub time_limit_secs: Option<f64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: Some(120.0),
        }
    }
}

/// Monte Carlo settings shared by both simulators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of Monte Carlo trials per simulator.
    pub trials: usize,
    /// Random seed for both simulators.
    pub seed: u64,
    /// Travel-time factor distribution.
    pub noise: NoiseModel,
    /// Driver wage used by the travel-time simulation.
    pub wage: WageFunction,
    /// Level of the reported confidence interval.
    pub confidence_level: f64,
    /// Cost of one extra truck for an overflowing route.
    pub wet_lease_cost: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            seed: DEFAULT_SEED,
            noise: NoiseModel::default(),
            wage: WageFunction::default(),
            confidence_level: 0.95,
            wet_lease_cost: DEFAULT_WET_LEASE_COST,
        }
    }
}

/// Complete planner configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Sector reference point when the instance does not locate the depot.
    pub depot: Coordinates,
    /// Truck capacity and fleet size.
    pub fleet: FleetConfig,
    /// Demand annotation.
    pub demand: DemandConfig,
    /// Route cost parameters.
    pub cost: CostConfig,
    /// MIP solve limits.
    pub solver: SolverConfig,
    /// Risk simulation settings.
    pub simulation: SimulationConfig,
    /// Candidate pool construction.
    pub generation: GenerationOptions,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            depot: DEFAULT_DEPOT,
            fleet: FleetConfig::default(),
            demand: DemandConfig::default(),
            cost: CostConfig::default(),
            solver: SolverConfig::default(),
            simulation: SimulationConfig::default(),
            generation: GenerationOptions::default(),
        }
    }
}

impl PlannerConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Checks every section.
    pub fn validate(&self) -> Result<()> {
        if !self.depot.is_finite() {
            return Err(RoutingError::Config("depot coordinates must be finite".into()));
        }
        if !self.fleet.vehicle_capacity.is_finite() || self.fleet.vehicle_capacity <= 0.0 {
            return Err(RoutingError::Config(format!(
                "fleet.vehicle_capacity must be positive, got {}",
                self.fleet.vehicle_capacity
            )));
        }
        if self.fleet.fleet_size == 0 {
            return Err(RoutingError::Config("fleet.fleet_size must be at least 1".into()));
        }
        let unload = self.demand.unload_seconds_per_unit;
        if !unload.is_finite() || unload < 0.0 {
            return Err(RoutingError::Config(format!(
                "demand.unload_seconds_per_unit must be non-negative, got {unload}"
            )));
        }
        self.cost_model().validate()?;
        if let Some(secs) = self.solver.time_limit_secs {
            if !secs.is_finite() || secs <= 0.0 {
                return Err(RoutingError::Config(format!(
                    "solver.time_limit_secs must be positive, got {secs}"
                )));
            }
        }
        let sim = &self.simulation;
        if sim.trials == 0 {
            return Err(RoutingError::Config("simulation.trials must be positive".into()));
        }
        if !(sim.confidence_level > 0.0 && sim.confidence_level < 1.0) {
            return Err(RoutingError::Config(format!(
                "simulation.confidence_level must be in (0, 1), got {}",
                sim.confidence_level
            )));
        }
        if !sim.wet_lease_cost.is_finite() || sim.wet_lease_cost < 0.0 {
            return Err(RoutingError::Config(format!(
                "simulation.wet_lease_cost must be non-negative, got {}",
                sim.wet_lease_cost
            )));
        }
        sim.noise
            .validate()
            .and_then(|_| sim.wage.validate())
            .map_err(|e| RoutingError::Config(format!("simulation: {e}")))?;
        self.generation.validate()
    }

    /// Sector partitioner around the configured depot.
    pub fn sector_partitioner(&self) -> SectorPartitioner {
        SectorPartitioner::new(self.depot)
    }

    /// Demand annotator with the configured unloading rate.
    pub fn annotator(&self) -> Result<DemandAnnotator> {
        DemandAnnotator::new(self.demand.unload_seconds_per_unit)
    }

    /// Capacity filter for the fleet's trucks.
    pub fn capacity_filter(&self) -> Result<CapacityFilter> {
        CapacityFilter::new(self.fleet.vehicle_capacity)
    }

    /// Route cost model with the fleet's vehicle capacity.
    pub fn cost_model(&self) -> RouteCostModel {
        RouteCostModel {
            cost_per_second: self.cost.cost_per_second,
            max_route_seconds: self.cost.max_route_seconds,
            overtime_penalty: self.cost.overtime_penalty,
            over_capacity_penalty: self.cost.over_capacity_penalty,
            vehicle_capacity: self.fleet.vehicle_capacity,
        }
    }

    /// Solver time limit, if any.
    pub fn time_limit(&self) -> Option<Duration> {
        self.solver.time_limit_secs.map(Duration::from_secs_f64)
    }

    /// Travel-time simulator settings.
    pub fn cost_risk(&self) -> CostRiskConfig {
        CostRiskConfig {
            trials: self.simulation.trials,
            noise: self.simulation.noise,
            wage: self.simulation.wage,
            seed: self.simulation.seed,
        }
    }

    /// Demand simulator settings.
    pub fn demand_risk(&self) -> DemandRiskConfig {
        DemandRiskConfig {
            trials: self.simulation.trials,
            seed: self.simulation.seed,
            vehicle_capacity: self.fleet.vehicle_capacity,
            wet_lease_cost: self.simulation.wet_lease_cost,
        }
    }
}
