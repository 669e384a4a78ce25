//! Route demand, capacity and cost evaluation.
//!
//! - [`DemandAnnotator`]: aggregate demand and unloading time per route
//! - [`CapacityFilter`]: drops routes that do not fit on one truck
//! - [`RouteCostModel`]: planning cost used by the route selector
//! - [`WageFunction`]: piecewise regular/overtime driver wage

mod capacity;
mod cost;
mod demand;

pub use capacity::{CapacityFilter, DEFAULT_VEHICLE_CAPACITY};
pub use cost::{cents_to_currency, RouteCostModel, WageFunction};
pub use demand::{DemandAnnotator, DEFAULT_UNLOAD_SECONDS_PER_UNIT};
