//! Dense travel-duration matrix with name lookup.

use std::collections::HashMap;

use crate::error::{Result, RoutingError};

/// A dense n×n matrix of travel durations (seconds) stored in row-major order.
///
/// Rows and columns are addressed by node index; the index of each node name
/// is resolved once at construction. Column order is the order of `names`
/// and is the canonical order used for nearest-neighbor tie-breaks.
///
/// # Examples
///
/// ```
/// use store_routing::distance::DurationMatrix;
///
/// let names = vec!["DC".to_string(), "A".to_string(), "B".to_string()];
/// let rows = vec![
///     vec![0.0, 100.0, 120.0],
///     vec![90.0, 0.0, 50.0],
///     vec![80.0, 50.0, 0.0],
/// ];
/// let m = DurationMatrix::from_rows(names, rows, "DC").unwrap();
/// assert_eq!(m.size(), 3);
/// assert_eq!(m.depot(), 0);
/// assert_eq!(m.duration("A", "B").unwrap(), 50.0);
/// assert!(m.index_of("Z").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct DurationMatrix {
    names: Vec<String>,
    index: HashMap<String, usize>,
    data: Vec<f64>,
    size: usize,
    depot: usize,
}

impl DurationMatrix {
    /// Builds a matrix from row vectors, validating shape and values.
    ///
    /// Fails if the rows are not square over `names`, a name repeats, the
    /// depot is not among the names, or any entry is negative or NaN.
    /// Infinite entries are allowed and mean "unreachable".
    pub fn from_rows(names: Vec<String>, rows: Vec<Vec<f64>>, depot: &str) -> Result<Self> {
        let size = names.len();
        if size == 0 {
            return Err(RoutingError::MalformedMatrix("matrix has no nodes".into()));
        }
        if rows.len() != size {
            return Err(RoutingError::MalformedMatrix(format!(
                "expected {size} rows, found {}",
                rows.len()
            )));
        }

        let mut data = Vec::with_capacity(size * size);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(RoutingError::MalformedMatrix(format!(
                    "row {} ({}) has {} columns, expected {size}",
                    i,
                    names[i],
                    row.len()
                )));
            }
            if let Some(j) = row.iter().position(|d| d.is_nan() || *d < 0.0) {
                return Err(RoutingError::MalformedMatrix(format!(
                    "invalid duration {} from {} to {}",
                    row[j], names[i], names[j]
                )));
            }
            data.extend(row);
        }

        let mut index = HashMap::with_capacity(size);
        for (i, name) in names.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(RoutingError::MalformedMatrix(format!("duplicate node name {name}")));
            }
        }

        let depot = *index
            .get(depot)
            .ok_or_else(|| RoutingError::MalformedMatrix(format!("depot {depot} is not a matrix node")))?;

        Ok(Self {
            names,
            index,
            data,
            size,
            depot,
        })
    }

    /// Returns the duration from index `from` to index `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Duration between two named nodes.
    pub fn duration(&self, from: &str, to: &str) -> Result<f64> {
        Ok(self.get(self.index_of(from)?, self.index_of(to)?))
    }

    /// Resolves a node name to its index.
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| RoutingError::UnknownNode {
                name: name.to_string(),
            })
    }

    /// Resolves every name, failing on the first unknown one.
    pub fn indices_of<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<usize>> {
        names.iter().map(|n| self.index_of(n.as_ref())).collect()
    }

    /// Name of the node at an index.
    pub fn name(&self, index: usize) -> &str {
        &self.names[index]
    }

    /// All node names in column order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Index of the depot.
    pub fn depot(&self) -> usize {
        self.depot
    }

    /// Name of the depot.
    pub fn depot_name(&self) -> &str {
        &self.names[self.depot]
    }

    /// Number of nodes in this matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Nearest valid next stop from `from`.
    ///
    /// Candidates are scanned in column order. A column qualifies when it is
    /// not the depot, not `from`, not in `exclude`, and its duration is finite
    /// and strictly positive. Only a strictly smaller duration replaces the
    /// incumbent, so exact ties go to the first column.
    ///
    /// Returns `None` if no column qualifies.
    pub fn nearest_neighbor(&self, from: usize, exclude: &[usize]) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for to in 0..self.size {
            if to == self.depot || to == from || exclude.contains(&to) {
                continue;
            }
            let d = self.get(from, to);
            if !d.is_finite() || d <= 0.0 {
                continue;
            }
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((to, d));
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> DurationMatrix {
        DurationMatrix::from_rows(
            names(&["A", "DC", "B", "C"]),
            vec![
                vec![0.0, 5.0, 30.0, 30.0],
                vec![100.0, 0.0, 120.0, 130.0],
                vec![40.0, 80.0, 0.0, 10.0],
                vec![40.0, 90.0, 10.0, 0.0],
            ],
            "DC",
        )
        .expect("valid")
    }

    #[test]
    fn test_lookup_by_name() {
        let m = sample();
        assert_eq!(m.depot(), 1);
        assert_eq!(m.depot_name(), "DC");
        assert_eq!(m.duration("DC", "A").unwrap(), 100.0);
        assert_eq!(m.index_of("C").unwrap(), 3);
        assert_eq!(m.name(2), "B");
    }

    #[test]
    fn test_unknown_node() {
        let m = sample();
        let err = m.indices_of(&["A", "Q"]).unwrap_err();
        assert!(matches!(err, RoutingError::UnknownNode { ref name } if name == "Q"));
    }

    #[test]
    fn test_rejects_bad_shape() {
        let err = DurationMatrix::from_rows(names(&["A", "B"]), vec![vec![0.0, 1.0]], "A");
        assert!(matches!(err, Err(RoutingError::MalformedMatrix(_))));
        let err = DurationMatrix::from_rows(names(&["A", "B"]), vec![vec![0.0, 1.0], vec![1.0]], "A");
        assert!(matches!(err, Err(RoutingError::MalformedMatrix(_))));
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = DurationMatrix::from_rows(names(&["A", "B"]), vec![vec![0.0, -1.0], vec![1.0, 0.0]], "A");
        assert!(matches!(err, Err(RoutingError::MalformedMatrix(_))));
        let err = DurationMatrix::from_rows(names(&["A", "B"]), vec![vec![0.0, f64::NAN], vec![1.0, 0.0]], "A");
        assert!(matches!(err, Err(RoutingError::MalformedMatrix(_))));
    }

    #[test]
    fn test_rejects_duplicate_and_missing_depot() {
        let rows = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
        assert!(DurationMatrix::from_rows(names(&["A", "A"]), rows.clone(), "A").is_err());
        assert!(DurationMatrix::from_rows(names(&["A", "B"]), rows, "DC").is_err());
    }

    #[test]
    fn test_nearest_skips_depot_and_self() {
        let m = sample();
        // A -> DC is 5 but the depot never qualifies; B and C tie at 30, B comes first.
        assert_eq!(m.nearest_neighbor(0, &[]), Some((2, 30.0)));
    }

    #[test]
    fn test_nearest_with_exclusions() {
        let m = sample();
        assert_eq!(m.nearest_neighbor(0, &[2]), Some((3, 30.0)));
        assert_eq!(m.nearest_neighbor(0, &[2, 3]), None);
    }

    #[test]
    fn test_nearest_ignores_zero_and_infinite() {
        let m = DurationMatrix::from_rows(
            names(&["DC", "A", "B", "C"]),
            vec![
                vec![0.0, 1.0, 1.0, 1.0],
                vec![1.0, 0.0, 0.0, f64::INFINITY],
                vec![1.0, 1.0, 0.0, 1.0],
                vec![1.0, 1.0, 1.0, 0.0],
            ],
            "DC",
        )
        .expect("valid");
        assert_eq!(m.nearest_neighbor(1, &[]), None);
    }
}
