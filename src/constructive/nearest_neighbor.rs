//! Nearest-neighbor candidate route construction.
//!
//! Each route starts at one store of the input list and is extended greedily:
//! the next stop is the nearest node of the whole matrix that is neither the
//! depot nor already on the route (see [`DurationMatrix::nearest_neighbor`]
//! for the exact tie-break). A k-stop route is built by first building the
//! (k−1)-stop route from the same start and extending it by one stop.
//!
//! # Complexity
//!
//! O(s · k · n) for s start stores, k stops and n matrix nodes.

use tracing::debug;

use crate::distance::DurationMatrix;
use crate::error::{Result, RoutingError};
use crate::models::{Route, MAX_STOPS};

/// A partially built route in index space.
#[derive(Debug, Clone)]
struct Chain {
    stops: Vec<usize>,
    travel: f64,
}

/// Builds candidate routes of one to four stops from a duration matrix.
///
/// Every method validates its store list up front: an unknown store fails
/// with [`RoutingError::UnknownNode`], the depot with
/// [`RoutingError::DepotAsStore`]. Routes that cannot be completed (no valid
/// next stop, or an unreachable leg) are left out of the result.
///
/// # Examples
///
/// ```
/// use store_routing::constructive::RouteBuilder;
/// use store_routing::distance::DurationMatrix;
///
/// let names: Vec<String> = ["DC", "A", "B"].iter().map(|s| s.to_string()).collect();
/// let rows = vec![
///     vec![0.0, 100.0, 120.0],
///     vec![90.0, 0.0, 50.0],
///     vec![80.0, 60.0, 0.0],
/// ];
/// let matrix = DurationMatrix::from_rows(names, rows, "DC").unwrap();
/// let builder = RouteBuilder::new(&matrix);
///
/// let pairs = builder.build_pairs(&["A"], true).unwrap();
/// assert_eq!(pairs[0].stops(), &["A".to_string(), "B".to_string()][..]);
/// assert_eq!(pairs[0].duration(), 100.0 + 50.0 + 80.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RouteBuilder<'a> {
    matrix: &'a DurationMatrix,
}

impl<'a> RouteBuilder<'a> {
    /// Creates a builder over a read-only matrix.
    pub fn new(matrix: &'a DurationMatrix) -> Self {
        Self { matrix }
    }

    /// One round trip per store: depot → store → depot.
    pub fn build_single_stop<S: AsRef<str>>(&self, stores: &[S]) -> Result<Vec<Route>> {
        self.build_chained(stores, 1, true)
    }

    /// Two-stop routes: each store followed by its nearest valid neighbor.
    ///
    /// Duration is depot → first + first → second, plus second → depot when
    /// `final_stop` is set.
    pub fn build_pairs<S: AsRef<str>>(&self, stores: &[S], final_stop: bool) -> Result<Vec<Route>> {
        self.build_chained(stores, 2, final_stop)
    }

    /// Three-stop routes: the open pair routes extended by one more nearest neighbor.
    pub fn build_triples<S: AsRef<str>>(&self, stores: &[S], final_stop: bool) -> Result<Vec<Route>> {
        self.build_chained(stores, 3, final_stop)
    }

    /// Four-stop routes: the open triple routes extended by one more nearest neighbor.
    pub fn build_quadruples<S: AsRef<str>>(&self, stores: &[S], final_stop: bool) -> Result<Vec<Route>> {
        self.build_chained(stores, 4, final_stop)
    }

    /// Nearest-neighbor routes with `stop_count` stops, one per start store.
    pub fn build_chained<S: AsRef<str>>(
        &self,
        stores: &[S],
        stop_count: usize,
        final_stop: bool,
    ) -> Result<Vec<Route>> {
        if stop_count == 0 || stop_count > MAX_STOPS {
            return Err(RoutingError::Config(format!(
                "stop count must be between 1 and {MAX_STOPS}, got {stop_count}"
            )));
        }
        let starts = self.resolve(stores)?;
        let chains = self.chains(&starts, stop_count);
        Ok(chains
            .into_iter()
            .filter_map(|c| self.finish(c, final_stop))
            .collect())
    }

    /// Every ordered pair of distinct stores from the input list.
    ///
    /// Unlike the nearest-neighbor builders this only pairs stores within
    /// `stores`, and all routes return to the depot.
    pub fn build_all_pairs_exhaustive<S: AsRef<str>>(&self, stores: &[S]) -> Result<Vec<Route>> {
        let indices = self.resolve(stores)?;
        let depot = self.matrix.depot();
        let mut routes = Vec::new();
        for &a in &indices {
            for &b in &indices {
                if a == b {
                    continue;
                }
                let chain = Chain {
                    stops: vec![a, b],
                    travel: self.matrix.get(depot, a) + self.matrix.get(a, b),
                };
                routes.extend(self.finish(chain, true));
            }
        }
        Ok(routes)
    }

    fn resolve<S: AsRef<str>>(&self, stores: &[S]) -> Result<Vec<usize>> {
        let indices = self.matrix.indices_of(stores)?;
        if indices.contains(&self.matrix.depot()) {
            return Err(RoutingError::DepotAsStore {
                name: self.matrix.depot_name().to_string(),
            });
        }
        Ok(indices)
    }

    /// Open chains of `stop_count` stops; built from the (stop_count − 1) chains.
    fn chains(&self, starts: &[usize], stop_count: usize) -> Vec<Chain> {
        if stop_count == 1 {
            let depot = self.matrix.depot();
            return starts
                .iter()
                .map(|&s| Chain {
                    stops: vec![s],
                    travel: self.matrix.get(depot, s),
                })
                .collect();
        }
        self.chains(starts, stop_count - 1)
            .into_iter()
            .filter_map(|c| self.extend(c))
            .collect()
    }

    fn extend(&self, mut chain: Chain) -> Option<Chain> {
        let last = *chain.stops.last()?;
        match self.matrix.nearest_neighbor(last, &chain.stops) {
            Some((next, leg)) => {
                chain.stops.push(next);
                chain.travel += leg;
                Some(chain)
            }
            None => {
                debug!(
                    start = self.matrix.name(chain.stops[0]),
                    stops = chain.stops.len(),
                    "no valid next stop, route not extended"
                );
                None
            }
        }
    }

    fn finish(&self, chain: Chain, final_stop: bool) -> Option<Route> {
        let mut travel = chain.travel;
        if final_stop {
            let last = *chain.stops.last()?;
            travel += self.matrix.get(last, self.matrix.depot());
        }
        if !travel.is_finite() {
            debug!(
                start = self.matrix.name(chain.stops[0]),
                "route has an unreachable leg, skipped"
            );
            return None;
        }
        let stops = chain
            .stops
            .iter()
            .map(|&i| self.matrix.name(i).to_string())
            .collect();
        Some(Route::from_parts(stops, travel, final_stop))
    }
}
