//! Candidate route construction.
//!
//! - [`SectorPartitioner`]: half-plane split of stores around the depot, O(n)
//! - [`RouteBuilder`]: nearest-neighbor chains of 1 to 4 stops and exhaustive pairs
//! - [`generate_candidates`]: per-sector pool generation, parallel over sectors

mod generate;
mod nearest_neighbor;
mod sector;

pub use generate::{generate_candidates, GenerationOptions};
pub use nearest_neighbor::RouteBuilder;
pub use sector::{Sector, SectorPartitioner, Sectors};
