//! Candidate route pool.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::Route;

/// The candidate routes of one pipeline run, addressed by index.
///
/// # Examples
///
/// ```
/// use store_routing::models::{CandidatePool, Route};
///
/// let mut pool = CandidatePool::new();
/// pool.push(Route::new(vec!["A".into()], 100.0, true).unwrap());
/// pool.push(Route::new(vec!["A".into()], 120.0, true).unwrap());
/// assert_eq!(pool.len(), 2);
/// pool.deduplicate();
/// assert_eq!(pool.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidatePool {
    routes: Vec<Route>,
}

impl CandidatePool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a route at the next index.
    pub fn push(&mut self, route: Route) {
        self.routes.push(route);
    }

    /// Number of candidate routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// All routes in index order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Mutable access for in-place enrichment.
    pub fn routes_mut(&mut self) -> &mut [Route] {
        &mut self.routes
    }

    /// Route at an index.
    pub fn get(&self, index: usize) -> Option<&Route> {
        self.routes.get(index)
    }

    /// Iterates routes in index order.
    pub fn iter(&self) -> std::slice::Iter<'_, Route> {
        self.routes.iter()
    }

    /// Keeps only routes matching the predicate.
    pub fn retain<F: FnMut(&Route) -> bool>(&mut self, f: F) {
        self.routes.retain(f);
    }

    /// Drops routes whose stop sequence repeats an earlier route's.
    ///
    /// Returns the number of routes removed.
    pub fn deduplicate(&mut self) -> usize {
        let before = self.routes.len();
        let mut seen: HashSet<Vec<String>> = HashSet::new();
        self.routes.retain(|r| seen.insert(r.stops().to_vec()));
        before - self.routes.len()
    }

    /// Consumes the pool.
    pub fn into_routes(self) -> Vec<Route> {
        self.routes
    }
}

impl From<Vec<Route>> for CandidatePool {
    fn from(routes: Vec<Route>) -> Self {
        Self { routes }
    }
}

impl FromIterator<Route> for CandidatePool {
    fn from_iter<I: IntoIterator<Item = Route>>(iter: I) -> Self {
        Self {
            routes: iter.into_iter().collect(),
        }
    }
}

impl Extend<Route> for CandidatePool {
    fn extend<I: IntoIterator<Item = Route>>(&mut self, iter: I) {
        self.routes.extend(iter);
    }
}

impl IntoIterator for CandidatePool {
    type Item = Route;
    type IntoIter = std::vec::IntoIter<Route>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.into_iter()
    }
}

impl<'a> IntoIterator for &'a CandidatePool {
    type Item = &'a Route;
    type IntoIter = std::slice::Iter<'a, Route>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(stops: &[&str], d: f64) -> Route {
        Route::new(stops.iter().map(|s| s.to_string()).collect(), d, true).expect("valid")
    }

    #[test]
    fn test_pool_empty() {
        let p = CandidatePool::new();
        assert!(p.is_empty());
        assert!(p.get(0).is_none());
    }

    #[test]
    fn test_deduplicate_keeps_first() {
        let mut p: CandidatePool = vec![
            route(&["A", "B"], 10.0),
            route(&["B", "A"], 11.0),
            route(&["A", "B"], 12.0),
        ]
        .into();
        assert_eq!(p.deduplicate(), 1);
        assert_eq!(p.len(), 2);
        assert_eq!(p.get(0).map(|r| r.duration()), Some(10.0));
        assert_eq!(p.get(1).map(|r| r.stops()[0].as_str()), Some("B"));
    }

    #[test]
    fn test_retain_and_collect() {
        let mut p: CandidatePool = (1..=4).map(|i| route(&["A"], i as f64)).collect();
        p.retain(|r| r.duration() > 2.0);
        assert_eq!(p.len(), 2);
        let total: f64 = p.iter().map(|r| r.duration()).sum();
        assert_eq!(total, 7.0);
    }
}
