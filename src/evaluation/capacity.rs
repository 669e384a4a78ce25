//! Vehicle capacity filter.

use tracing::debug;

use crate::error::{Result, RoutingError};
use crate::models::{CandidatePool, Route};

/// Default truck capacity in demand units.
pub const DEFAULT_VEHICLE_CAPACITY: f64 = 26.0;

/// Keeps routes whose aggregate demand fits on one truck (`demand <= capacity`).
///
/// # Examples
///
/// ```
/// use store_routing::evaluation::CapacityFilter;
/// use store_routing::models::Route;
///
/// let filter = CapacityFilter::new(26.0).unwrap();
/// let full = Route::new(vec!["A".into()], 100.0, true).unwrap().with_load(26.0, 0.0);
/// let over = Route::new(vec!["B".into()], 100.0, true).unwrap().with_load(27.0, 0.0);
/// assert!(filter.admits(&full));
/// assert!(!filter.admits(&over));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapacityFilter {
    capacity: f64,
}

impl Default for CapacityFilter {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_VEHICLE_CAPACITY,
        }
    }
}

impl CapacityFilter {
    /// Creates a filter; the capacity must be positive and finite.
    pub fn new(capacity: f64) -> Result<Self> {
        if !capacity.is_finite() || capacity <= 0.0 {
            return Err(RoutingError::SimulationParameter(format!(
                "vehicle capacity must be positive, got {capacity}"
            )));
        }
        Ok(Self { capacity })
    }

    /// Capacity in demand units.
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Returns `true` if the route's demand fits.
    pub fn admits(&self, route: &Route) -> bool {
        route.demand() <= self.capacity
    }

    /// Removes over-capacity routes from a pool.
    pub fn apply(&self, mut pool: CandidatePool) -> CandidatePool {
        let before = pool.len();
        pool.retain(|r| self.admits(r));
        debug!(
            capacity = self.capacity,
            removed = before - pool.len(),
            kept = pool.len(),
            "capacity filter applied"
        );
        pool
    }

    /// Returns copies of the routes that fit.
    pub fn filter(&self, routes: &[Route]) -> Vec<Route> {
        routes.iter().filter(|r| self.admits(r)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(demand: f64) -> Route {
        Route::new(vec!["A".into()], 10.0, true)
            .expect("valid")
            .with_load(demand, 0.0)
    }

    #[test]
    fn test_boundary_is_kept() {
        let f = CapacityFilter::default();
        let kept = f.filter(&[loaded(25.5), loaded(26.0), loaded(26.01)]);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_apply_pool() {
        let f = CapacityFilter::new(10.0).unwrap();
        let pool: CandidatePool = vec![loaded(5.0), loaded(11.0), loaded(10.0)].into();
        let filtered = f.apply(pool);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| r.demand() <= 10.0));
    }

    #[test]
    fn test_idempotent() {
        let f = CapacityFilter::new(10.0).unwrap();
        let routes = vec![loaded(1.0), loaded(20.0), loaded(10.0), loaded(10.5)];
        let once = f.filter(&routes);
        assert_eq!(f.filter(&once), once);
    }

    #[test]
    fn test_rejects_non_positive_capacity() {
        assert!(CapacityFilter::new(0.0).is_err());
        assert!(CapacityFilter::new(-5.0).is_err());
        assert!(CapacityFilter::new(f64::NAN).is_err());
    }
}
