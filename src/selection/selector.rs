//! Set-partition route selection.
//!
//! # Formulation
//!
//! One binary variable `x_r` per candidate route:
//!
//! ```text
//! minimize    Σ_r cost(r) · x_r
//! subject to  Σ_{r ∋ s} x_r = 1     for every store s with nonzero demand
//!             Σ_r x_r      ≤ F      (fleet size)
//!             x_r ∈ {0, 1}
//! ```
//!
//! Costs enter the program in whole cents, so every coefficient is an exact
//! integer in `f64`. Stores without demand for the day type get no cover
//! constraint; they may be visited but need not be.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::microlp::MicroLpBackend;
use super::program::{BinaryProgram, LinearConstraint, MipBackend, MipStatus, Relation};
use crate::distance::DurationMatrix;
use crate::error::{Result, RoutingError};
use crate::evaluation::{cents_to_currency, RouteCostModel};
use crate::models::{CandidatePool, DayType, DemandTable, Route};

/// Default maximum number of trucks.
pub const DEFAULT_FLEET_SIZE: usize = 60;

/// The set-partition program for one candidate pool and day type.
#[derive(Debug, Clone)]
pub struct SetPartitionProgram {
    /// The binary program handed to the backend.
    pub program: BinaryProgram,
    /// Cost of each candidate route in cents, by pool index.
    pub costs_cents: Vec<i64>,
    /// Stores that must be covered exactly once.
    pub active_stores: Vec<String>,
    /// Active stores that no candidate route visits.
    pub uncovered_stores: Vec<String>,
}

/// Routes chosen by the optimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    /// Day type the selection was made for.
    pub day: DayType,
    /// Chosen candidate-pool indices, ascending.
    pub indices: Vec<usize>,
    /// The chosen routes, in index order.
    pub routes: Vec<Route>,
    /// Sum of route costs in cents.
    pub total_cost_cents: i64,
}

impl Selection {
    /// Number of trucks used.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if no route was selected.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Total planning cost in currency units.
    pub fn total_cost(&self) -> f64 {
        cents_to_currency(self.total_cost_cents)
    }

    /// Total duration of all selected routes, in seconds.
    pub fn total_duration(&self) -> f64 {
        self.routes.iter().map(Route::duration).sum()
    }

    /// Number of selected routes that visit a store.
    pub fn times_visited(&self, store: &str) -> usize {
        self.routes.iter().filter(|r| r.visits(store)).count()
    }

    /// Checks a selection read back from disk against an instance's matrix.
    ///
    /// Every route must satisfy the [`Route::new`] invariants, carry a finite
    /// non-negative load, and visit only non-depot nodes of `matrix`.
    pub fn validate(&self, matrix: &DurationMatrix) -> Result<()> {
        for (i, route) in self.routes.iter().enumerate() {
            let rebuilt = Route::new(route.stops().to_vec(), route.travel_duration(), route.is_final());
            let load_ok = [route.demand(), route.unload_duration()]
                .iter()
                .all(|v| v.is_finite() && *v >= 0.0);
            if rebuilt.is_none() || !load_ok {
                return Err(RoutingError::Config(format!(
                    "selected route {i} ({}) is not a valid route",
                    route.stops().join(" -> ")
                )));
            }
            for stop in route.stops() {
                if matrix.index_of(stop)? == matrix.depot() {
                    return Err(RoutingError::DepotAsStore { name: stop.clone() });
                }
            }
        }
        Ok(())
    }
}

/// Outcome of a selection run.
///
/// Infeasibility, unboundedness and timeouts are regular outcomes so the
/// caller can relax constraints and retry. Use
/// [`into_selection`](SelectionOutcome::into_selection) to turn them into a
/// [`RoutingError::InfeasibleOptimization`].
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionOutcome {
    /// An optimal partition was found.
    Optimal(Selection),
    /// No combination of candidates covers every active store within the fleet size.
    Infeasible {
        /// Active stores no candidate visits (empty if the fleet size is the binding limit).
        uncovered_stores: Vec<String>,
        /// Diagnostic message.
        detail: String,
    },
    /// The solver reported an unbounded objective.
    Unbounded,
    /// The wall-clock limit expired.
    TimedOut {
        /// The limit that expired.
        limit: Duration,
    },
}

impl SelectionOutcome {
    /// Solver status of this outcome.
    pub fn status(&self) -> MipStatus {
        match self {
            SelectionOutcome::Optimal(_) => MipStatus::Optimal,
            SelectionOutcome::Infeasible { .. } => MipStatus::Infeasible,
            SelectionOutcome::Unbounded => MipStatus::Unbounded,
            SelectionOutcome::TimedOut { .. } => MipStatus::TimedOut,
        }
    }

    /// The selection, if optimal.
    pub fn selection(&self) -> Option<&Selection> {
        match self {
            SelectionOutcome::Optimal(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the selection or an [`RoutingError::InfeasibleOptimization`].
    pub fn into_selection(self) -> Result<Selection> {
        let status = self.status().to_string();
        match self {
            SelectionOutcome::Optimal(s) => Ok(s),
            SelectionOutcome::Infeasible { detail, .. } => {
                Err(RoutingError::InfeasibleOptimization { status, detail })
            }
            SelectionOutcome::Unbounded => Err(RoutingError::InfeasibleOptimization {
                status,
                detail: "objective is unbounded".into(),
            }),
            SelectionOutcome::TimedOut { limit } => Err(RoutingError::InfeasibleOptimization {
                status,
                detail: format!("no solution within {:.1}s", limit.as_secs_f64()),
            }),
        }
    }
}

/// Chooses a minimum-cost exact cover of the active stores.
///
/// # Examples
///
/// ```
/// use store_routing::evaluation::RouteCostModel;
/// use store_routing::models::{CandidatePool, DayType, DaySeries, DemandRecord, DemandTable, Route};
/// use store_routing::selection::RouteSelector;
///
/// let mut demand = DemandTable::new();
/// for s in ["A", "B"] {
///     demand.insert(s, DemandRecord::new(DaySeries::new(1.0, vec![]), DaySeries::new(1.0, vec![])));
/// }
/// let route = |stops: &[&str], secs: f64| {
///     Route::new(stops.iter().map(|s| s.to_string()).collect(), secs, true).unwrap()
/// };
/// let pool: CandidatePool = vec![
///     route(&["A"], 3000.0),
///     route(&["B"], 3000.0),
///     route(&["A", "B"], 4000.0),
/// ]
/// .into();
///
/// let selector = RouteSelector::new(RouteCostModel::default(), 60).unwrap();
/// let selection = selector
///     .select(&pool, &demand, DayType::Weekday)
///     .unwrap()
///     .into_selection()
///     .unwrap();
/// assert_eq!(selection.indices, vec![2]);
/// assert_eq!(selection.total_cost(), 250.0);
/// ```
#[derive(Debug, Clone)]
pub struct RouteSelector<B = MicroLpBackend> {
    backend: B,
    cost_model: RouteCostModel,
    fleet_size: usize,
    time_limit: Option<Duration>,
}

impl RouteSelector<MicroLpBackend> {
    /// Creates a selector using the bundled `microlp` backend.
    pub fn new(cost_model: RouteCostModel, fleet_size: usize) -> Result<Self> {
        Self::with_backend(MicroLpBackend::new(), cost_model, fleet_size)
    }
}

impl<B: MipBackend> RouteSelector<B> {
    /// Creates a selector over any MIP backend.
    ///
    /// Fails if the fleet size is zero or the cost model is invalid.
    pub fn with_backend(backend: B, cost_model: RouteCostModel, fleet_size: usize) -> Result<Self> {
        if fleet_size == 0 {
            return Err(RoutingError::SimulationParameter(
                "fleet size must be at least 1".into(),
            ));
        }
        cost_model.validate()?;
        Ok(Self {
            backend,
            cost_model,
            fleet_size,
            time_limit: None,
        })
    }

    /// Sets the wall-clock limit for the backend.
    pub fn with_time_limit(mut self, limit: Option<Duration>) -> Self {
        self.time_limit = limit;
        self
    }

    /// Maximum number of routes in a solution.
    pub fn fleet_size(&self) -> usize {
        self.fleet_size
    }

    /// Builds the set-partition program for a pool and set of active stores.
    pub fn formulate<S: AsRef<str>>(&self, pool: &CandidatePool, active_stores: &[S]) -> SetPartitionProgram {
        let costs_cents: Vec<i64> = pool.iter().map(|r| self.cost_model.cost_cents(r)).collect();

        let mut visits: HashMap<&str, Vec<usize>> = HashMap::new();
        for (r, route) in pool.iter().enumerate() {
            for stop in route.stops() {
                visits.entry(stop.as_str()).or_default().push(r);
            }
        }

        let mut constraints = Vec::with_capacity(active_stores.len() + 1);
        let mut uncovered_stores = Vec::new();
        for store in active_stores {
            let store = store.as_ref();
            let routes = visits.get(store).map(Vec::as_slice).unwrap_or_default();
            if routes.is_empty() {
                uncovered_stores.push(store.to_string());
            }
            constraints.push(LinearConstraint {
                name: format!("cover[{store}]"),
                terms: routes.iter().map(|&r| (r, 1.0)).collect(),
                relation: Relation::Equal,
                rhs: 1.0,
            });
        }
        constraints.push(LinearConstraint {
            name: "fleet".into(),
            terms: (0..pool.len()).map(|r| (r, 1.0)).collect(),
            relation: Relation::LessOrEqual,
            rhs: self.fleet_size as f64,
        });

        SetPartitionProgram {
            program: BinaryProgram {
                objective: costs_cents.iter().map(|&c| c as f64).collect(),
                constraints,
            },
            costs_cents,
            active_stores: active_stores.iter().map(|s| s.as_ref().to_string()).collect(),
            uncovered_stores,
        }
    }

    /// Selects routes covering every store with nonzero demand on `day`.
    ///
    /// Routes are read as-is: annotate and filter the pool beforehand.
    pub fn select(&self, pool: &CandidatePool, demand: &DemandTable, day: DayType) -> Result<SelectionOutcome> {
        let active = demand.active_stores(day);
        let formulation = self.formulate(pool, &active);

        if !formulation.uncovered_stores.is_empty() {
            let detail = format!(
                "{} active store(s) are on no candidate route: {}",
                formulation.uncovered_stores.len(),
                formulation.uncovered_stores.join(", ")
            );
            warn!(%detail, "route selection infeasible before solving");
            return Ok(SelectionOutcome::Infeasible {
                uncovered_stores: formulation.uncovered_stores,
                detail,
            });
        }

        info!(
            backend = self.backend.name(),
            routes = pool.len(),
            active_stores = active.len(),
            fleet_size = self.fleet_size,
            %day,
            "solving route selection"
        );
        let solution = self.backend.solve(&formulation.program, self.time_limit)?;

        let outcome = match solution.status {
            MipStatus::Optimal => {
                SelectionOutcome::Optimal(self.extract(pool, &formulation, &solution.values, day)?)
            }
            MipStatus::Infeasible => SelectionOutcome::Infeasible {
                uncovered_stores: Vec::new(),
                detail: format!(
                    "no combination of {} candidate routes covers all {} active stores with at most {} trucks",
                    pool.len(),
                    active.len(),
                    self.fleet_size
                ),
            },
            MipStatus::Unbounded => SelectionOutcome::Unbounded,
            MipStatus::TimedOut => SelectionOutcome::TimedOut {
                limit: self.time_limit.unwrap_or_default(),
            },
        };

        match &outcome {
            SelectionOutcome::Optimal(s) => info!(
                routes = s.len(),
                total_cost = s.total_cost(),
                "route selection optimal"
            ),
            other => warn!(status = %other.status(), "route selection did not reach an optimum"),
        }
        Ok(outcome)
    }

    fn extract(
        &self,
        pool: &CandidatePool,
        formulation: &SetPartitionProgram,
        values: &[bool],
        day: DayType,
    ) -> Result<Selection> {
        if values.len() != pool.len() {
            return Err(RoutingError::Backend(format!(
                "assignment has {} values for {} routes",
                values.len(),
                pool.len()
            )));
        }
        let violated = formulation.program.violated(values);
        if let Some(first) = violated.first() {
            return Err(RoutingError::Backend(format!(
                "assignment violates {} constraint(s), first: {}",
                violated.len(),
                first.name
            )));
        }

        let indices: Vec<usize> = (0..values.len()).filter(|&i| values[i]).collect();
        let routes = indices.iter().filter_map(|&i| pool.get(i).cloned()).collect();
        let total_cost_cents = indices.iter().map(|&i| formulation.costs_cents[i]).sum();
        Ok(Selection {
            day,
            indices,
            routes,
            total_cost_cents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DaySeries, DemandRecord};
    use crate::selection::MipSolution;

    fn route(stops: &[&str], secs: f64) -> Route {
        Route::new(stops.iter().map(|s| s.to_string()).collect(), secs, true).expect("valid")
    }

    fn demand(weekday: &[(&str, f64)]) -> DemandTable {
        let mut t = DemandTable::new();
        for &(s, d) in weekday {
            t.insert(s, DemandRecord::new(DaySeries::new(d, vec![]), DaySeries::new(1.0, vec![])));
        }
        t
    }

    fn pool() -> CandidatePool {
        vec![
            route(&["A"], 2000.0),
            route(&["B"], 2000.0),
            route(&["C"], 2000.0),
            route(&["A", "B"], 2500.0),
            route(&["B", "C"], 2600.0),
            route(&["A", "C"], 3900.0),
        ]
        .into()
    }

    struct FixedBackend(MipSolution);

    impl MipBackend for FixedBackend {
        fn name(&self) -> &str {
            "fixed"
        }

        fn solve(&self, _program: &BinaryProgram, _time_limit: Option<Duration>) -> Result<MipSolution> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_exact_cover_minimum_cost() {
        let selector = RouteSelector::new(RouteCostModel::default(), 60).unwrap();
        let table = demand(&[("A", 1.0), ("B", 1.0), ("C", 1.0)]);
        let s = selector
            .select(&pool(), &table, DayType::Weekday)
            .unwrap()
            .into_selection()
            .unwrap();
        // {A,B} + {C} = 2500 + 2000 seconds is the cheapest partition.
        assert_eq!(s.indices, vec![2, 3]);
        assert_eq!(s.total_cost_cents, 28_125);
        for store in ["A", "B", "C"] {
            assert_eq!(s.times_visited(store), 1);
        }
    }

    #[test]
    fn test_fleet_size_is_respected() {
        let selector = RouteSelector::new(RouteCostModel::default(), 1).unwrap();
        let table = demand(&[("A", 1.0), ("B", 1.0)]);
        let s = selector
            .select(&pool(), &table, DayType::Weekday)
            .unwrap()
            .into_selection()
            .unwrap();
        assert_eq!(s.indices, vec![3]);
    }

    #[test]
    fn test_zero_demand_store_is_not_required() {
        let selector = RouteSelector::new(RouteCostModel::default(), 60).unwrap();
        let table = demand(&[("A", 1.0), ("B", 0.0), ("C", 1.0)]);
        let s = selector
            .select(&pool(), &table, DayType::Weekday)
            .unwrap()
            .into_selection()
            .unwrap();
        assert_eq!(s.times_visited("A"), 1);
        assert_eq!(s.times_visited("C"), 1);
        // A-C at 3900s undercuts two 2000s round trips.
        assert_eq!(s.indices, vec![5]);
    }

    #[test]
    fn test_uncovered_store_is_infeasible() {
        let selector = RouteSelector::new(RouteCostModel::default(), 60).unwrap();
        let table = demand(&[("A", 1.0), ("D", 2.0)]);
        let outcome = selector.select(&pool(), &table, DayType::Weekday).unwrap();
        match &outcome {
            SelectionOutcome::Infeasible { uncovered_stores, .. } => {
                assert_eq!(uncovered_stores, &vec!["D".to_string()]);
            }
            other => panic!("expected infeasible, got {other:?}"),
        }
        assert!(matches!(
            outcome.into_selection(),
            Err(RoutingError::InfeasibleOptimization { .. })
        ));
    }

    #[test]
    fn test_fleet_too_small_is_infeasible() {
        let selector = RouteSelector::new(RouteCostModel::default(), 1).unwrap();
        let table = demand(&[("A", 1.0), ("B", 1.0), ("C", 1.0)]);
        let outcome = selector.select(&pool(), &table, DayType::Weekday).unwrap();
        assert_eq!(outcome.status(), MipStatus::Infeasible);
        assert!(outcome.selection().is_none());
    }

    #[test]
    fn test_timeout_is_reported() {
        let backend = FixedBackend(MipSolution::without_assignment(MipStatus::TimedOut));
        let selector = RouteSelector::with_backend(backend, RouteCostModel::default(), 5)
            .unwrap()
            .with_time_limit(Some(Duration::from_secs(3)));
        let table = demand(&[("A", 1.0)]);
        let outcome = selector.select(&pool(), &table, DayType::Weekday).unwrap();
        assert_eq!(
            outcome,
            SelectionOutcome::TimedOut {
                limit: Duration::from_secs(3)
            }
        );
        let err = outcome.into_selection().unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_invalid_backend_assignment_is_rejected() {
        // Picks both A and A-B, covering A twice.
        let values = vec![true, false, false, true, false, false];
        let backend = FixedBackend(MipSolution::optimal(0.0, values));
        let selector = RouteSelector::with_backend(backend, RouteCostModel::default(), 5).unwrap();
        let table = demand(&[("A", 1.0), ("B", 1.0)]);
        let err = selector.select(&pool(), &table, DayType::Weekday).unwrap_err();
        assert!(matches!(err, RoutingError::Backend(_)));
    }

    #[test]
    fn test_formulation_shape() {
        let selector = RouteSelector::new(RouteCostModel::default(), 7).unwrap();
        let f = selector.formulate(&pool(), &["A", "C"]);
        assert_eq!(f.program.num_variables(), 6);
        assert_eq!(f.program.constraints.len(), 3);
        assert_eq!(f.program.constraints[0].terms, vec![(0, 1.0), (3, 1.0), (5, 1.0)]);
        assert_eq!(f.program.constraints[2].rhs, 7.0);
        assert_eq!(f.costs_cents[0], 12_500);
    }

    #[test]
    fn test_loaded_selection_validation() {
        let names = ["DC", "A", "B", "C"].map(String::from).to_vec();
        let rows: Vec<Vec<f64>> = (0..4)
            .map(|i| (0..4).map(|j| if i == j { 0.0 } else { 100.0 }).collect())
            .collect();
        let matrix = DurationMatrix::from_rows(names, rows, "DC").unwrap();
        let selection = |routes: Vec<Route>| Selection {
            day: DayType::Weekday,
            indices: (0..routes.len()).collect(),
            routes,
            total_cost_cents: 0,
        };

        assert!(selection(vec![route(&["A", "B"], 2500.0), route(&["C"], 2000.0)])
            .validate(&matrix)
            .is_ok());

        let err = selection(vec![route(&["Z"], 2000.0)]).validate(&matrix).unwrap_err();
        assert!(matches!(err, RoutingError::UnknownNode { ref name } if name == "Z"));

        let err = selection(vec![route(&["A", "DC"], 2000.0)]).validate(&matrix).unwrap_err();
        assert!(matches!(err, RoutingError::DepotAsStore { .. }));

        // Deserialization bypasses the constructor checks.
        let json = r#"{
            "day": "weekday",
            "indices": [0],
            "routes": [{ "stops": ["A", "A"], "travel_duration": 100.0, "is_final": true, "demand": 2.0 }],
            "total_cost_cents": 0
        }"#;
        let repeated: Selection = serde_json::from_str(json).unwrap();
        assert!(matches!(repeated.validate(&matrix), Err(RoutingError::Config(_))));

        let negative = selection(vec![route(&["A"], 2000.0).with_load(-5.0, 0.0)]);
        assert!(matches!(negative.validate(&matrix), Err(RoutingError::Config(_))));
    }

    #[test]
    fn test_zero_fleet_rejected() {
        assert!(matches!(
            RouteSelector::new(RouteCostModel::default(), 0),
            Err(RoutingError::SimulationParameter(_))
        ));
    }
}
