//! Monte Carlo risk analysis of a route selection.
//!
//! - [`CostRiskSimulator`]: day-wide travel-time noise priced with the driver wage
//! - [`DemandRiskSimulator`]: demand re-draws priced by wet-leased overflow trucks
//! - [`CostDistribution`]: per-trial totals and their [`CostSummary`]

mod cost_risk;
mod demand_risk;
mod distribution;

pub use cost_risk::{CostRiskConfig, CostRiskSimulator, NoiseModel, DEFAULT_SEED, DEFAULT_TRIALS};
pub use demand_risk::{DemandRiskConfig, DemandRiskSimulator, DEFAULT_WET_LEASE_COST};
pub use distribution::{CostDistribution, CostSummary};
