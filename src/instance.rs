//! JSON problem instances.
//!
//! An instance bundles everything one planning run reads:
//!
//! ```json
//! {
//!   "depot": "DC",
//!   "nodes": [
//!     { "name": "DC", "lat": -36.95, "long": 174.81 },
//!     { "name": "A",  "lat": -36.99, "long": 174.88 }
//!   ],
//!   "durations": {
//!     "names": ["DC", "A"],
//!     "rows": [[0, 900], [880, 0]]
//!   },
//!   "demand": {
//!     "A": {
//!       "weekday":  { "expected": 8, "samples": [7, 8, 9] },
//!       "saturday": { "expected": 4, "samples": [3, 4] }
//!     }
//!   }
//! }
//! ```
//!
//! A `null` duration means the pair is unreachable.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::distance::DurationMatrix;
use crate::error::{Result, RoutingError};
use crate::models::{Coordinates, DayType, DemandTable, Node};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct NodeEntry {
    name: String,
    lat: f64,
    long: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DurationTable {
    names: Vec<String>,
    rows: Vec<Vec<Option<f64>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct InstanceFile {
    depot: String,
    #[serde(default)]
    nodes: Vec<NodeEntry>,
    durations: DurationTable,
    demand: DemandTable,
}

/// A validated problem instance.
#[derive(Debug, Clone)]
pub struct Instance {
    /// Travel durations between every pair of nodes, depot included.
    pub matrix: DurationMatrix,
    /// Nodes with known locations, in file order.
    pub nodes: Vec<Node>,
    /// Expected and historical demand per store and day type.
    pub demand: DemandTable,
}

impl Instance {
    /// Parses and validates an instance from JSON text.
    ///
    /// Fails if the matrix is malformed, a node or demand store is not in
    /// the matrix, the depot has a demand record, a demand figure is negative,
    /// or a node appears twice.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: InstanceFile = serde_json::from_str(json)?;
        Self::from_file(file)
    }

    /// Reads and validates an instance file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let instance = Self::from_json_str(&text)?;
        info!(
            path = %path.as_ref().display(),
            nodes = instance.matrix.size(),
            stores = instance.demand.len(),
            "instance loaded"
        );
        Ok(instance)
    }

    fn from_file(file: InstanceFile) -> Result<Self> {
        let rows = file
            .durations
            .rows
            .into_iter()
            .map(|row| row.into_iter().map(|d| d.unwrap_or(f64::INFINITY)).collect())
            .collect();
        let matrix = DurationMatrix::from_rows(file.durations.names, rows, &file.depot)?;

        let mut seen = HashSet::new();
        let mut nodes = Vec::with_capacity(file.nodes.len());
        for entry in file.nodes {
            matrix.index_of(&entry.name)?;
            if !seen.insert(entry.name.clone()) {
                return Err(RoutingError::Config(format!("node {} listed twice", entry.name)));
            }
            let coordinates = Coordinates::new(entry.lat, entry.long);
            if !coordinates.is_finite() {
                return Err(RoutingError::InvalidCoordinates { name: entry.name });
            }
            nodes.push(if entry.name == file.depot {
                Node::depot(entry.name, coordinates)
            } else {
                Node::store(entry.name).with_coordinates(coordinates)
            });
        }

        for store in file.demand.stores() {
            matrix.index_of(store)?;
            if store == matrix.depot_name() {
                return Err(RoutingError::DepotAsStore {
                    name: store.to_string(),
                });
            }
            let Some(record) = file.demand.get(store) else {
                continue;
            };
            for day in DayType::ALL {
                let series = record.series(day);
                let mut values = std::iter::once(&series.expected).chain(&series.samples);
                if let Some(&value) = values.find(|v| !v.is_finite() || **v < 0.0) {
                    return Err(RoutingError::InvalidDemand {
                        store: store.to_string(),
                        day,
                        value,
                    });
                }
            }
        }

        for day in DayType::ALL {
            for store in file.demand.active_stores(day) {
                if !seen.contains(store) {
                    warn!(store, %day, "store with demand has no location and cannot be routed");
                }
            }
        }

        Ok(Self {
            matrix,
            nodes,
            demand: file.demand,
        })
    }

    /// Coordinates of the depot node, if listed.
    pub fn depot_coordinates(&self) -> Option<Coordinates> {
        self.nodes
            .iter()
            .find(|n| n.is_depot())
            .and_then(Node::coordinates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "depot": "DC",
        "nodes": [
            { "name": "DC", "lat": 0.0, "long": 0.0 },
            { "name": "A", "lat": -1.0, "long": 1.0 },
            { "name": "B", "lat": 1.0, "long": 1.0 }
        ],
        "durations": {
            "names": ["DC", "A", "B"],
            "rows": [[0, 100, 120], [100, 0, null], [120, 60, 0]]
        },
        "demand": {
            "A": { "weekday": { "expected": 5, "samples": [4, 6] }, "saturday": { "expected": 0 } },
            "B": { "weekday": { "expected": 3 }, "saturday": { "expected": 2, "samples": [2] } }
        }
    }"#;

    #[test]
    fn test_load_sample() {
        let inst = Instance::from_json_str(SAMPLE).unwrap();
        assert_eq!(inst.matrix.size(), 3);
        assert_eq!(inst.matrix.depot_name(), "DC");
        assert!(inst.matrix.duration("A", "B").unwrap().is_infinite());
        assert_eq!(inst.nodes.len(), 3);
        assert!(inst.nodes[0].is_depot());
        assert_eq!(inst.depot_coordinates(), Some(Coordinates::new(0.0, 0.0)));
        assert_eq!(inst.demand.expected("A", DayType::Weekday).unwrap(), 5.0);
        assert_eq!(inst.demand.active_stores(DayType::Saturday), vec!["B"]);
    }

    #[test]
    fn test_unknown_demand_store() {
        let json = SAMPLE.replace(r#""B": { "weekday""#, r#""Z": { "weekday""#);
        assert!(matches!(
            Instance::from_json_str(&json),
            Err(RoutingError::UnknownNode { .. })
        ));
    }

    #[test]
    fn test_negative_demand_rejected() {
        let json = SAMPLE.replace(r#""weekday": { "expected": 3 }"#, r#""weekday": { "expected": -30 }"#);
        match Instance::from_json_str(&json) {
            Err(RoutingError::InvalidDemand { store, day, value }) => {
                assert_eq!(store, "B");
                assert_eq!(day, DayType::Weekday);
                assert_eq!(value, -30.0);
            }
            other => panic!("expected InvalidDemand, got {other:?}"),
        }

        let json = SAMPLE.replace("[4, 6]", "[4, -1]");
        assert!(matches!(
            Instance::from_json_str(&json),
            Err(RoutingError::InvalidDemand { day: DayType::Weekday, .. })
        ));
    }

    #[test]
    fn test_depot_with_demand() {
        let json = SAMPLE.replace(r#""B": { "weekday""#, r#""DC": { "weekday""#);
        assert!(matches!(
            Instance::from_json_str(&json),
            Err(RoutingError::DepotAsStore { .. })
        ));
    }

    #[test]
    fn test_malformed_rows() {
        let json = SAMPLE.replace("[120, 60, 0]", "[120, 60]");
        assert!(matches!(
            Instance::from_json_str(&json),
            Err(RoutingError::MalformedMatrix(_))
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            Instance::from_json_str("{\"depot\": 3}"),
            Err(RoutingError::Json(_))
        ));
    }
}
