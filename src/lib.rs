//! # store-routing
//!
//! Daily delivery planning for a single-depot retail network: candidate
//! route generation, set-partition route selection, and Monte Carlo cost
//! risk analysis.
//!
//! ## Modules
//!
//! - [`models`]: nodes, routes, the candidate pool and demand records
//! - [`distance`]: travel-duration matrix with name lookup
//! - [`constructive`]: sector partition and nearest-neighbor route construction
//! - [`evaluation`]: demand annotation, capacity filter, route cost and wage
//! - [`selection`]: set-partition program and pluggable MIP backends
//! - [`simulation`]: travel-time and demand risk simulators
//! - [`config`], [`instance`]: JSON configuration and problem instances
//! - [`pipeline`]: end-to-end planner

pub mod config;
pub mod constructive;
pub mod distance;
pub mod error;
pub mod evaluation;
pub mod instance;
pub mod models;
pub mod pipeline;
pub mod selection;
pub mod simulation;
