//! Error taxonomy for the planning pipeline.
//!
//! Construction-time errors (bad matrix, unknown stores, missing demand) abort
//! a run. Optimizer infeasibility is a normal outcome and only becomes an
//! error when the caller asks for it via
//! [`SelectionOutcome::into_selection`](crate::selection::SelectionOutcome::into_selection).

use thiserror::Error;

use crate::models::DayType;

/// Errors raised by the planning pipeline.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// A node or store name is not a row/column of the duration matrix.
    #[error("node not found in duration matrix: {name}")]
    UnknownNode {
        /// The missing name.
        name: String,
    },

    /// The depot was listed where a store is expected.
    #[error("depot {name} cannot be routed as a store")]
    DepotAsStore {
        /// The depot name.
        name: String,
    },

    /// A store has no demand record for the requested day type.
    #[error("no demand record for store {store} on {day}")]
    MissingDemand {
        /// Store identifier.
        store: String,
        /// Day type that was requested.
        day: DayType,
    },

    /// Demand sampling was requested but the store has no historical samples.
    #[error("no historical demand samples for store {store} on {day}")]
    EmptyDemandSamples {
        /// Store identifier.
        store: String,
        /// Day type that was requested.
        day: DayType,
    },

    /// A demand figure is negative or not a finite number.
    #[error("invalid demand {value} for store {store} on {day}")]
    InvalidDemand {
        /// Store identifier.
        store: String,
        /// Day type of the offending series.
        day: DayType,
        /// The rejected value.
        value: f64,
    },

    /// The duration matrix is structurally invalid.
    #[error("malformed duration matrix: {0}")]
    MalformedMatrix(String),

    /// A node carries non-finite coordinates.
    #[error("invalid coordinates for node {name}")]
    InvalidCoordinates {
        /// Node name.
        name: String,
    },

    /// The set-partition program has no acceptable solution.
    #[error("route selection failed ({status}): {detail}")]
    InfeasibleOptimization {
        /// Solver status label (`infeasible`, `timed out`, ...).
        status: String,
        /// Human readable diagnostic.
        detail: String,
    },

    /// A simulation, fleet or capacity parameter is out of range.
    #[error("invalid parameter: {0}")]
    SimulationParameter(String),

    /// The MIP backend failed or returned an assignment that breaks the formulation.
    #[error("solver backend error: {0}")]
    Backend(String),

    /// Configuration could not be loaded or failed validation.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Reading an input file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// An input file is not valid JSON for the expected schema.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RoutingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_unknown_node() {
        let err = RoutingError::UnknownNode {
            name: "Store A".to_string(),
        };
        assert_eq!(err.to_string(), "node not found in duration matrix: Store A");
    }

    #[test]
    fn test_display_missing_demand() {
        let err = RoutingError::MissingDemand {
            store: "Store B".to_string(),
            day: DayType::Saturday,
        };
        assert_eq!(err.to_string(), "no demand record for store Store B on saturday");
    }

    #[test]
    fn test_display_invalid_demand() {
        let err = RoutingError::InvalidDemand {
            store: "B".into(),
            day: DayType::Weekday,
            value: -30.0,
        };
        assert_eq!(err.to_string(), "invalid demand -30 for store B on weekday");
    }

    #[test]
    fn test_json_conversion() {
        let parse: std::result::Result<u32, _> = serde_json::from_str("not json");
        let err: RoutingError = parse.unwrap_err().into();
        assert!(matches!(err, RoutingError::Json(_)));
    }
}
