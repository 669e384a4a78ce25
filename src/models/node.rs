//! Node and coordinate types.

use serde::{Deserialize, Serialize};

/// A geographic position in decimal degrees.
///
/// # Examples
///
/// ```
/// use store_routing::models::Coordinates;
///
/// let c = Coordinates::new(-36.9, 174.8);
/// assert!(c.is_finite());
/// assert!(!Coordinates::new(f64::NAN, 174.8).is_finite());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub long: f64,
}

impl Coordinates {
    /// Creates a coordinate pair.
    pub fn new(lat: f64, long: f64) -> Self {
        Self { lat, long }
    }

    /// Returns `true` if both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.long.is_finite()
    }
}

/// A named location: either a store or the single distribution depot.
///
/// # Examples
///
/// ```
/// use store_routing::models::{Coordinates, Node};
///
/// let depot = Node::depot("Distribution Centre", Coordinates::new(-36.95, 174.81));
/// assert!(depot.is_depot());
///
/// let store = Node::store("Countdown Mt Eden").with_coordinates(Coordinates::new(-36.87, 174.76));
/// assert!(!store.is_depot());
/// assert_eq!(store.name(), "Countdown Mt Eden");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    name: String,
    coordinates: Option<Coordinates>,
    is_depot: bool,
}

impl Node {
    /// Creates a store node without coordinates.
    pub fn store(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            coordinates: None,
            is_depot: false,
        }
    }

    /// Creates the depot node.
    pub fn depot(name: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            name: name.into(),
            coordinates: Some(coordinates),
            is_depot: true,
        }
    }

    /// Attaches coordinates to this node.
    pub fn with_coordinates(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    /// Node identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Coordinates, if known.
    pub fn coordinates(&self) -> Option<Coordinates> {
        self.coordinates
    }

    /// `true` for the distribution depot.
    pub fn is_depot(&self) -> bool {
        self.is_depot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_has_no_coordinates() {
        let n = Node::store("A");
        assert_eq!(n.name(), "A");
        assert!(n.coordinates().is_none());
        assert!(!n.is_depot());
    }

    #[test]
    fn test_depot() {
        let d = Node::depot("DC", Coordinates::new(1.0, 2.0));
        assert!(d.is_depot());
        assert_eq!(d.coordinates(), Some(Coordinates::new(1.0, 2.0)));
    }

    #[test]
    fn test_non_finite_coordinates() {
        assert!(!Coordinates::new(0.0, f64::INFINITY).is_finite());
        assert!(Coordinates::new(0.0, 0.0).is_finite());
    }
}
