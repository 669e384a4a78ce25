//! Domain model types for store delivery planning.
//!
//! Provides locations (the depot and stores), candidate routes and the pool
//! that holds them, and per-store demand keyed by day type.

mod demand;
mod node;
mod pool;
mod route;

pub use demand::{DaySeries, DayType, DemandRecord, DemandTable};
pub use node::{Coordinates, Node};
pub use pool::CandidatePool;
pub use route::{Route, MAX_STOPS};
