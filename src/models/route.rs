//! Candidate delivery route.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Maximum number of stores on one route.
pub const MAX_STOPS: usize = 4;

/// An ordered sequence of store visits served by one truck.
///
/// The depot is implicit: every route leaves from it, and a *final* route
/// also returns to it. The duration is split into the travel component set at
/// construction and the unloading component attached by the demand
/// annotator, so the pre-unload baseline is always available.
///
/// # Examples
///
/// ```
/// use store_routing::models::Route;
///
/// let route = Route::new(vec!["A".into(), "B".into()], 230.0, true).unwrap();
/// assert_eq!(route.len(), 2);
/// assert_eq!(route.duration(), 230.0);
///
/// let loaded = route.with_load(4.0, 1800.0);
/// assert_eq!(loaded.demand(), 4.0);
/// assert_eq!(loaded.duration(), 2030.0);
/// assert_eq!(loaded.travel_duration(), 230.0);
///
/// assert!(Route::new(vec!["A".into(), "A".into()], 10.0, true).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    stops: Vec<String>,
    travel_duration: f64,
    is_final: bool,
    #[serde(default)]
    demand: f64,
    #[serde(default)]
    unload_duration: f64,
}

impl Route {
    /// Creates a route, checking the stop invariants.
    ///
    /// Returns `None` if there are no stops, more than [`MAX_STOPS`], a
    /// repeated stop, or a negative/non-finite travel duration.
    pub fn new(stops: Vec<String>, travel_duration: f64, is_final: bool) -> Option<Self> {
        if stops.is_empty() || stops.len() > MAX_STOPS {
            return None;
        }
        let distinct: HashSet<&String> = stops.iter().collect();
        if distinct.len() != stops.len() {
            return None;
        }
        if !travel_duration.is_finite() || travel_duration < 0.0 {
            return None;
        }
        Some(Self::from_parts(stops, travel_duration, is_final))
    }

    /// Constructor for builders that already guarantee the invariants.
    pub(crate) fn from_parts(stops: Vec<String>, travel_duration: f64, is_final: bool) -> Self {
        debug_assert!(!stops.is_empty() && stops.len() <= MAX_STOPS);
        Self {
            stops,
            travel_duration,
            is_final,
            demand: 0.0,
            unload_duration: 0.0,
        }
    }

    /// Returns this route with demand and unloading time attached.
    pub fn with_load(mut self, demand: f64, unload_duration: f64) -> Self {
        self.set_load(demand, unload_duration);
        self
    }

    /// Replaces the attached demand and unloading time.
    pub fn set_load(&mut self, demand: f64, unload_duration: f64) {
        self.demand = demand;
        self.unload_duration = unload_duration;
    }

    /// Store identifiers in visit order.
    pub fn stops(&self) -> &[String] {
        &self.stops
    }

    /// Number of stores visited.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Always `false` for a constructed route; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Returns `true` if the route visits the given store.
    pub fn visits(&self, store: &str) -> bool {
        self.stops.iter().any(|s| s == store)
    }

    /// Last store on the route.
    pub fn last_stop(&self) -> &str {
        self.stops.last().map(String::as_str).unwrap_or_default()
    }

    /// `true` if the duration includes the return leg to the depot.
    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// Driving time in seconds, excluding unloading.
    pub fn travel_duration(&self) -> f64 {
        self.travel_duration
    }

    /// Unloading time in seconds attached by the demand annotator.
    pub fn unload_duration(&self) -> f64 {
        self.unload_duration
    }

    /// Total duration in seconds: travel plus unloading.
    pub fn duration(&self) -> f64 {
        self.travel_duration + self.unload_duration
    }

    /// Aggregate demand in units (zero until annotated).
    pub fn demand(&self) -> f64 {
        self.demand
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_route_new_valid() {
        let r = Route::new(names(&["A", "B", "C"]), 500.0, true).expect("valid");
        assert_eq!(r.len(), 3);
        assert!(r.visits("B"));
        assert!(!r.visits("D"));
        assert_eq!(r.last_stop(), "C");
        assert!(r.is_final());
        assert_eq!(r.demand(), 0.0);
    }

    #[test]
    fn test_route_new_rejects_invalid() {
        assert!(Route::new(vec![], 10.0, true).is_none());
        assert!(Route::new(names(&["A", "B", "C", "D", "E"]), 10.0, true).is_none());
        assert!(Route::new(names(&["A", "B", "A"]), 10.0, true).is_none());
        assert!(Route::new(names(&["A"]), -1.0, true).is_none());
        assert!(Route::new(names(&["A"]), f64::NAN, true).is_none());
    }

    #[test]
    fn test_reload_does_not_accumulate() {
        let mut r = Route::new(names(&["A"]), 100.0, true).expect("valid");
        r.set_load(2.0, 900.0);
        r.set_load(3.0, 1350.0);
        assert_eq!(r.duration(), 1450.0);
        assert_eq!(r.travel_duration(), 100.0);
    }
}
