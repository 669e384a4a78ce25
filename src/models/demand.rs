//! Per-store demand records keyed by day type.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RoutingError};

/// The day types with distinct demand profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayType {
    /// Monday to Friday.
    Weekday,
    /// Saturday deliveries.
    Saturday,
}

impl DayType {
    /// All day types, in column order.
    pub const ALL: [DayType; 2] = [DayType::Weekday, DayType::Saturday];

    /// Lowercase label used in files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            DayType::Weekday => "weekday",
            DayType::Saturday => "saturday",
        }
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "weekday" => Ok(DayType::Weekday),
            "saturday" | "weekend" => Ok(DayType::Saturday),
            other => Err(format!("unknown day type '{other}' (expected weekday or saturday)")),
        }
    }
}

/// Demand of one store for one day type.
///
/// `expected` is the planning figure; `samples` are historical observations
/// used for randomized re-draws.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DaySeries {
    /// Planning demand (units).
    pub expected: f64,
    /// Historical demand observations (units).
    #[serde(default)]
    pub samples: Vec<f64>,
}

impl DaySeries {
    /// Creates a series with a planning value and historical samples.
    pub fn new(expected: f64, samples: Vec<f64>) -> Self {
        Self { expected, samples }
    }
}

/// Demand of one store across all day types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemandRecord {
    /// Weekday demand.
    pub weekday: DaySeries,
    /// Saturday demand.
    pub saturday: DaySeries,
}

impl DemandRecord {
    /// Creates a record from its two day series.
    pub fn new(weekday: DaySeries, saturday: DaySeries) -> Self {
        Self { weekday, saturday }
    }

    /// The series for a day type.
    pub fn series(&self, day: DayType) -> &DaySeries {
        match day {
            DayType::Weekday => &self.weekday,
            DayType::Saturday => &self.saturday,
        }
    }
}

/// Demand records for all stores.
///
/// Lookups of unknown stores fail with [`RoutingError::MissingDemand`] rather
/// than reading as zero.
///
/// # Examples
///
/// ```
/// use store_routing::models::{DayType, DaySeries, DemandRecord, DemandTable};
///
/// let mut table = DemandTable::new();
/// table.insert(
///     "A",
///     DemandRecord::new(DaySeries::new(5.0, vec![4.0, 6.0]), DaySeries::new(0.0, vec![])),
/// );
/// assert_eq!(table.expected("A", DayType::Weekday).unwrap(), 5.0);
/// assert_eq!(table.active_stores(DayType::Saturday).len(), 0);
/// assert!(table.expected("missing", DayType::Weekday).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DemandTable {
    records: BTreeMap<String, DemandRecord>,
}

impl DemandTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the record for a store.
    pub fn insert(&mut self, store: impl Into<String>, record: DemandRecord) {
        self.records.insert(store.into(), record);
    }

    /// Record for a store, if present.
    pub fn get(&self, store: &str) -> Option<&DemandRecord> {
        self.records.get(store)
    }

    /// Number of stores with a record.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the table has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Store identifiers in sorted order.
    pub fn stores(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    fn series(&self, store: &str, day: DayType) -> Result<&DaySeries> {
        self.records
            .get(store)
            .map(|r| r.series(day))
            .ok_or_else(|| RoutingError::MissingDemand {
                store: store.to_string(),
                day,
            })
    }

    /// Planning demand of a store for a day type.
    pub fn expected(&self, store: &str, day: DayType) -> Result<f64> {
        self.series(store, day).map(|s| s.expected)
    }

    /// Draws one historical sample uniformly at random.
    pub fn sample<R: Rng + ?Sized>(&self, store: &str, day: DayType, rng: &mut R) -> Result<f64> {
        let series = self.series(store, day)?;
        if series.samples.is_empty() {
            return Err(RoutingError::EmptyDemandSamples {
                store: store.to_string(),
                day,
            });
        }
        let k = rng.random_range(0..series.samples.len());
        Ok(series.samples[k])
    }

    /// Stores with nonzero planning demand for a day type, in sorted order.
    pub fn active_stores(&self, day: DayType) -> Vec<&str> {
        self.records
            .iter()
            .filter(|(_, r)| r.series(day).expected != 0.0)
            .map(|(s, _)| s.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn table() -> DemandTable {
        let mut t = DemandTable::new();
        t.insert(
            "A",
            DemandRecord::new(DaySeries::new(6.0, vec![5.0, 7.0]), DaySeries::new(3.0, vec![3.0])),
        );
        t.insert(
            "B",
            DemandRecord::new(DaySeries::new(0.0, vec![]), DaySeries::new(2.0, vec![])),
        );
        t
    }

    #[test]
    fn test_day_type_parse() {
        assert_eq!("weekday".parse::<DayType>(), Ok(DayType::Weekday));
        assert_eq!("Saturday".parse::<DayType>(), Ok(DayType::Saturday));
        assert!("sunday".parse::<DayType>().is_err());
    }

    #[test]
    fn test_expected_lookup() {
        let t = table();
        assert_eq!(t.expected("A", DayType::Weekday).unwrap(), 6.0);
        assert_eq!(t.expected("A", DayType::Saturday).unwrap(), 3.0);
    }

    #[test]
    fn test_missing_store_is_error() {
        let t = table();
        let err = t.expected("Z", DayType::Weekday).unwrap_err();
        assert!(matches!(err, RoutingError::MissingDemand { .. }));
    }

    #[test]
    fn test_active_stores_by_day() {
        let t = table();
        assert_eq!(t.active_stores(DayType::Weekday), vec!["A"]);
        assert_eq!(t.active_stores(DayType::Saturday), vec!["A", "B"]);
    }

    #[test]
    fn test_sample_draws_from_history() {
        let t = table();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let d = t.sample("A", DayType::Weekday, &mut rng).unwrap();
            assert!(d == 5.0 || d == 7.0);
        }
    }

    #[test]
    fn test_sample_without_history() {
        let t = table();
        let mut rng = StdRng::seed_from_u64(7);
        let err = t.sample("B", DayType::Weekday, &mut rng).unwrap_err();
        assert!(matches!(err, RoutingError::EmptyDemandSamples { .. }));
    }
}
