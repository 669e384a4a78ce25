//! Demand annotation of candidate routes.

use rand::Rng;

use crate::error::{Result, RoutingError};
use crate::models::{DayType, DemandTable, Route};

/// Default unloading time per demand unit (7.5 minutes).
pub const DEFAULT_UNLOAD_SECONDS_PER_UNIT: f64 = 450.0;

/// Attaches aggregate demand and unloading time to routes.
///
/// For each route, `demand = Σ demand[store][day]` over its stops and the
/// duration grows by `demand × unload_seconds_per_unit`. Unloading time is
/// always recomputed from the route's travel time, so annotating again (for
/// instance with a fresh demand draw) replaces the previous figure.
///
/// All lookups are done before any route is touched: a missing store leaves
/// the routes unchanged and returns [`RoutingError::MissingDemand`].
///
/// # Examples
///
/// ```
/// use store_routing::evaluation::DemandAnnotator;
/// use store_routing::models::{DayType, DaySeries, DemandRecord, DemandTable, Route};
///
/// let mut table = DemandTable::new();
/// table.insert("A", DemandRecord::new(DaySeries::new(4.0, vec![]), DaySeries::new(2.0, vec![])));
/// table.insert("B", DemandRecord::new(DaySeries::new(6.0, vec![]), DaySeries::new(0.0, vec![])));
///
/// let mut routes = vec![Route::new(vec!["A".into(), "B".into()], 1000.0, true).unwrap()];
/// DemandAnnotator::default().annotate(&mut routes, &table, DayType::Weekday).unwrap();
/// assert_eq!(routes[0].demand(), 10.0);
/// assert_eq!(routes[0].duration(), 1000.0 + 10.0 * 450.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemandAnnotator {
    unload_seconds_per_unit: f64,
}

impl Default for DemandAnnotator {
    fn default() -> Self {
        Self {
            unload_seconds_per_unit: DEFAULT_UNLOAD_SECONDS_PER_UNIT,
        }
    }
}

impl DemandAnnotator {
    /// Creates an annotator with the given per-unit unloading time.
    ///
    /// Fails if the value is negative or not finite.
    pub fn new(unload_seconds_per_unit: f64) -> Result<Self> {
        if !unload_seconds_per_unit.is_finite() || unload_seconds_per_unit < 0.0 {
            return Err(RoutingError::SimulationParameter(format!(
                "unload seconds per unit must be finite and non-negative, got {unload_seconds_per_unit}"
            )));
        }
        Ok(Self {
            unload_seconds_per_unit,
        })
    }

    /// Unloading time per demand unit, in seconds.
    pub fn unload_seconds_per_unit(&self) -> f64 {
        self.unload_seconds_per_unit
    }

    /// Planning demand of one route.
    pub fn route_demand(&self, route: &Route, table: &DemandTable, day: DayType) -> Result<f64> {
        route.stops().iter().map(|s| table.expected(s, day)).sum()
    }

    /// Annotates routes with planning demand for the day type.
    pub fn annotate(&self, routes: &mut [Route], table: &DemandTable, day: DayType) -> Result<()> {
        let demands = routes
            .iter()
            .map(|r| self.route_demand(r, table, day))
            .collect::<Result<Vec<f64>>>()?;
        self.apply(routes, &demands);
        Ok(())
    }

    /// Annotates routes with one random historical draw per store per route.
    ///
    /// Each call re-draws independently, so repeated calls give the Monte
    /// Carlo samples for the route feasibility question.
    pub fn annotate_sampled<R: Rng + ?Sized>(
        &self,
        routes: &mut [Route],
        table: &DemandTable,
        day: DayType,
        rng: &mut R,
    ) -> Result<()> {
        let mut demands = Vec::with_capacity(routes.len());
        for route in routes.iter() {
            let mut total = 0.0;
            for stop in route.stops() {
                total += table.sample(stop, day, rng)?;
            }
            demands.push(total);
        }
        self.apply(routes, &demands);
        Ok(())
    }

    fn apply(&self, routes: &mut [Route], demands: &[f64]) {
        for (route, &demand) in routes.iter_mut().zip(demands) {
            route.set_load(demand, demand * self.unload_seconds_per_unit);
        }
    }
}
