//! Candidate pool generation across all sectors.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{RouteBuilder, Sector, Sectors};
use crate::distance::DurationMatrix;
use crate::error::{Result, RoutingError};
use crate::models::{CandidatePool, Route, MAX_STOPS};

/// Which route families to generate per sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    /// Include depot → store → depot round trips.
    pub include_single_stop: bool,
    /// Include every ordered pair of stores within a sector.
    pub include_exhaustive_pairs: bool,
    /// Longest nearest-neighbor chain to build (2 to 4).
    pub max_stops: usize,
    /// Drop routes whose stop sequence repeats an earlier one.
    pub deduplicate: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            include_single_stop: true,
            include_exhaustive_pairs: true,
            max_stops: MAX_STOPS,
            deduplicate: true,
        }
    }
}

impl GenerationOptions {
    /// Checks that `max_stops` is within 2..=4.
    pub fn validate(&self) -> Result<()> {
        if !(2..=MAX_STOPS).contains(&self.max_stops) {
            return Err(RoutingError::Config(format!(
                "generation.max_stops must be between 2 and {MAX_STOPS}, got {}",
                self.max_stops
            )));
        }
        Ok(())
    }
}

/// Builds the full candidate pool for all sectors.
///
/// Sectors are built in parallel against the shared read-only matrix. The
/// pool order is deterministic: sectors in [`Sector::ALL`] order, and within
/// a sector single stops, then pairs, triples, quadruples (all returning to
/// the depot), then the exhaustive pairs.
pub fn generate_candidates(
    matrix: &DurationMatrix,
    sectors: &Sectors,
    options: &GenerationOptions,
) -> Result<CandidatePool> {
    options.validate()?;

    let per_sector: Vec<Vec<Route>> = Sector::ALL
        .as_slice()
        .par_iter()
        .map(|&sector| build_sector(matrix, sectors.get(sector), options))
        .collect::<Result<_>>()?;

    let mut pool: CandidatePool = per_sector.into_iter().flatten().collect();
    let generated = pool.len();
    let removed = if options.deduplicate {
        pool.deduplicate()
    } else {
        0
    };

    info!(
        south = sectors.south.len(),
        east = sectors.east.len(),
        west = sectors.west.len(),
        generated,
        removed,
        "candidate pool generated"
    );
    Ok(pool)
}

fn build_sector(
    matrix: &DurationMatrix,
    stores: &[String],
    options: &GenerationOptions,
) -> Result<Vec<Route>> {
    let builder = RouteBuilder::new(matrix);
    let mut routes = Vec::new();
    if options.include_single_stop {
        routes.extend(builder.build_single_stop(stores)?);
    }
    for stop_count in 2..=options.max_stops {
        routes.extend(builder.build_chained(stores, stop_count, true)?);
    }
    if options.include_exhaustive_pairs {
        routes.extend(builder.build_all_pairs_exhaustive(stores)?);
    }
    Ok(routes)
}
