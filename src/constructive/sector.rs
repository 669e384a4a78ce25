//! Geographic sector partitioning.
//!
//! # Algorithm
//!
//! Splits stores into three disjoint groups with half-plane tests against a
//! reference point (the depot): everything strictly south of it, and the
//! northern half split strictly east/west. Stores lying exactly on the
//! reference latitude, or on the reference longitude in the northern half,
//! belong to no sector.
//!
//! # Complexity
//!
//! O(n) where n = number of nodes.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RoutingError};
use crate::models::{Coordinates, Node};

/// One of the three delivery sectors around the depot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sector {
    /// Latitude below the depot.
    South,
    /// North of the depot, longitude above it.
    East,
    /// North of the depot, longitude below it.
    West,
}

impl Sector {
    /// All sectors in generation order.
    pub const ALL: [Sector; 3] = [Sector::South, Sector::East, Sector::West];
}

/// Store names grouped by sector, each in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sectors {
    /// Stores south of the depot.
    pub south: Vec<String>,
    /// Stores north-east of the depot.
    pub east: Vec<String>,
    /// Stores north-west of the depot.
    pub west: Vec<String>,
}

impl Sectors {
    /// Stores of one sector.
    pub fn get(&self, sector: Sector) -> &[String] {
        match sector {
            Sector::South => &self.south,
            Sector::East => &self.east,
            Sector::West => &self.west,
        }
    }

    /// Sectors with their stores, in [`Sector::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Sector, &[String])> {
        Sector::ALL.into_iter().map(move |s| (s, self.get(s)))
    }

    /// Total number of classified stores.
    pub fn len(&self) -> usize {
        self.south.len() + self.east.len() + self.west.len()
    }

    /// Returns `true` if no store was classified.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Classifies stores by half-plane tests against a fixed reference point.
///
/// # Examples
///
/// ```
/// use store_routing::constructive::{Sector, SectorPartitioner};
/// use store_routing::models::{Coordinates, Node};
///
/// let partitioner = SectorPartitioner::new(Coordinates::new(0.0, 0.0));
/// let nodes = vec![
///     Node::store("S").with_coordinates(Coordinates::new(-1.0, 5.0)),
///     Node::store("E").with_coordinates(Coordinates::new(1.0, 1.0)),
///     Node::store("W").with_coordinates(Coordinates::new(1.0, -1.0)),
///     Node::store("Edge").with_coordinates(Coordinates::new(0.0, 3.0)),
/// ];
/// let sectors = partitioner.partition(&nodes).unwrap();
/// assert_eq!(sectors.south, vec!["S"]);
/// assert_eq!(sectors.east, vec!["E"]);
/// assert_eq!(sectors.west, vec!["W"]);
/// assert_eq!(partitioner.classify(Coordinates::new(0.0, 3.0)), None);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SectorPartitioner {
    reference: Coordinates,
}

impl SectorPartitioner {
    /// Creates a partitioner around the given reference point.
    pub fn new(reference: Coordinates) -> Self {
        Self { reference }
    }

    /// Reference point the half-planes are cut at.
    pub fn reference(&self) -> Coordinates {
        self.reference
    }

    /// Sector of a single position, or `None` on a boundary.
    pub fn classify(&self, position: Coordinates) -> Option<Sector> {
        let r = self.reference;
        if position.lat < r.lat {
            Some(Sector::South)
        } else if position.lat > r.lat {
            if position.long > r.long {
                Some(Sector::East)
            } else if position.long < r.long {
                Some(Sector::West)
            } else {
                None
            }
        } else {
            None
        }
    }

    /// Partitions the non-depot nodes into sectors.
    ///
    /// Fails with [`RoutingError::InvalidCoordinates`] if the reference point
    /// or any store lacks finite coordinates.
    pub fn partition(&self, nodes: &[Node]) -> Result<Sectors> {
        if !self.reference.is_finite() {
            return Err(RoutingError::InvalidCoordinates {
                name: "sector reference point".to_string(),
            });
        }

        let mut sectors = Sectors::default();
        for node in nodes.iter().filter(|n| !n.is_depot()) {
            let position = node
                .coordinates()
                .filter(Coordinates::is_finite)
                .ok_or_else(|| RoutingError::InvalidCoordinates {
                    name: node.name().to_string(),
                })?;

            let name = node.name().to_string();
            match self.classify(position) {
                Some(Sector::South) => sectors.south.push(name),
                Some(Sector::East) => sectors.east.push(name),
                Some(Sector::West) => sectors.west.push(name),
                None => tracing::debug!(store = %name, "store lies on a sector boundary"),
            }
        }
        Ok(sectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(name: &str, lat: f64, long: f64) -> Node {
        Node::store(name).with_coordinates(Coordinates::new(lat, long))
    }

    fn partitioner() -> SectorPartitioner {
        SectorPartitioner::new(Coordinates::new(-36.94904179, 174.8080123))
    }

    #[test]
    fn test_partition_auckland() {
        let nodes = vec![
            Node::depot("DC", Coordinates::new(-36.94904179, 174.8080123)),
            store("Papakura", -37.06, 174.94),
            store("Botany", -36.93, 174.91),
            store("Henderson", -36.88, 174.63),
            store("Manukau", -36.99, 174.88),
        ];
        let s = partitioner().partition(&nodes).expect("valid");
        assert_eq!(s.south, vec!["Papakura", "Manukau"]);
        assert_eq!(s.east, vec!["Botany"]);
        assert_eq!(s.west, vec!["Henderson"]);
        assert_eq!(s.len(), 4);
    }

    #[test]
    fn test_boundaries_belong_to_no_sector() {
        let p = SectorPartitioner::new(Coordinates::new(0.0, 0.0));
        assert_eq!(p.classify(Coordinates::new(0.0, 1.0)), None);
        assert_eq!(p.classify(Coordinates::new(0.0, -1.0)), None);
        assert_eq!(p.classify(Coordinates::new(1.0, 0.0)), None);
        // South of the reference the longitude does not matter.
        assert_eq!(p.classify(Coordinates::new(-1.0, 0.0)), Some(Sector::South));
    }

    #[test]
    fn test_sectors_are_disjoint() {
        let p = SectorPartitioner::new(Coordinates::new(0.0, 0.0));
        let nodes: Vec<Node> = (0..25)
            .map(|i| store(&format!("S{i}"), (i % 5) as f64 - 2.0, (i / 5) as f64 - 2.0))
            .collect();
        let s = p.partition(&nodes).expect("valid");
        let mut all: Vec<&String> = s.south.iter().chain(&s.east).chain(&s.west).collect();
        let n = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), n);
        // 10 south, 4 east, 4 west; the 7 boundary points are dropped.
        assert_eq!((s.south.len(), s.east.len(), s.west.len()), (10, 4, 4));
    }

    #[test]
    fn test_missing_coordinates_is_error() {
        let err = partitioner().partition(&[Node::store("Nowhere")]).unwrap_err();
        assert!(matches!(err, RoutingError::InvalidCoordinates { ref name } if name == "Nowhere"));
    }

    #[test]
    fn test_non_finite_coordinates_is_error() {
        let err = partitioner().partition(&[store("Bad", f64::NAN, 174.0)]).unwrap_err();
        assert!(matches!(err, RoutingError::InvalidCoordinates { .. }));
    }

    #[test]
    fn test_iter_order() {
        let s = Sectors {
            south: vec!["a".into()],
            east: vec![],
            west: vec!["b".into()],
        };
        let order: Vec<Sector> = s.iter().map(|(sec, _)| sec).collect();
        assert_eq!(order, vec![Sector::South, Sector::East, Sector::West]);
    }
}
