//! Route cost and driver wage functions.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RoutingError};
use crate::models::Route;

/// Planning cost of a route for the route selector.
///
/// `cost = cost_per_second × duration`, plus `overtime_penalty` when the
/// duration exceeds `max_route_seconds`, plus `over_capacity_penalty` when
/// the demand exceeds `vehicle_capacity`. Costs are rounded to whole cents
/// once per route so that sums over thousands of routes are exact.
///
/// # Examples
///
/// ```
/// use store_routing::evaluation::RouteCostModel;
/// use store_routing::models::Route;
///
/// let model = RouteCostModel::default();
/// let short = Route::new(vec!["A".into()], 3600.0, true).unwrap();
/// assert_eq!(model.cost(&short), 225.0);
///
/// // 900.0625 rounds to 900.06, plus the long-route penalty.
/// let long = Route::new(vec!["B".into()], 14401.0, true).unwrap();
/// assert_eq!(model.cost_cents(&long), 290_006);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteCostModel {
    /// Currency per second of route duration.
    pub cost_per_second: f64,
    /// Duration above which the overtime penalty applies.
    pub max_route_seconds: f64,
    /// Fixed penalty for long routes.
    pub overtime_penalty: f64,
    /// Fixed penalty for over-capacity routes.
    pub over_capacity_penalty: f64,
    /// Capacity used for the over-capacity check.
    pub vehicle_capacity: f64,
}

impl Default for RouteCostModel {
    fn default() -> Self {
        Self {
            cost_per_second: 0.0625,
            max_route_seconds: 4.0 * 3600.0,
            overtime_penalty: 2000.0,
            over_capacity_penalty: 2000.0,
            vehicle_capacity: super::DEFAULT_VEHICLE_CAPACITY,
        }
    }
}

impl RouteCostModel {
    /// Checks that all parameters are finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("cost_per_second", self.cost_per_second),
            ("max_route_seconds", self.max_route_seconds),
            ("overtime_penalty", self.overtime_penalty),
            ("over_capacity_penalty", self.over_capacity_penalty),
            ("vehicle_capacity", self.vehicle_capacity),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(RoutingError::Config(format!(
                    "cost.{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Route cost in whole cents.
    pub fn cost_cents(&self, route: &Route) -> i64 {
        let mut cents = (route.duration() * self.cost_per_second * 100.0).round() as i64;
        if route.duration() > self.max_route_seconds {
            cents += (self.overtime_penalty * 100.0).round() as i64;
        }
        if route.demand() > self.vehicle_capacity {
            cents += (self.over_capacity_penalty * 100.0).round() as i64;
        }
        cents
    }

    /// Route cost in currency units.
    pub fn cost(&self, route: &Route) -> f64 {
        cents_to_currency(self.cost_cents(route))
    }
}

/// Converts whole cents to currency units.
pub fn cents_to_currency(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Piecewise driver wage for one route.
///
/// Below the threshold every hour is paid at `regular_rate`; at or above it
/// the hours past the threshold are paid `overtime_rate` on top.
///
/// # Examples
///
/// ```
/// use store_routing::evaluation::WageFunction;
///
/// let wage = WageFunction::default();
/// assert_eq!(wage.cost(2.0), 450.0);
/// assert_eq!(wage.cost(4.0), 900.0);
/// assert_eq!(wage.cost(5.0), 5.0 * 225.0 + 275.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WageFunction {
    /// Hourly rate for every hour worked.
    pub regular_rate: f64,
    /// Extra hourly rate for hours past the threshold.
    pub overtime_rate: f64,
    /// Hours before overtime starts.
    pub threshold_hours: f64,
}

impl Default for WageFunction {
    fn default() -> Self {
        Self {
            regular_rate: 225.0,
            overtime_rate: 275.0,
            threshold_hours: 4.0,
        }
    }
}

impl WageFunction {
    /// Checks that all rates and the threshold are finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("regular_rate", self.regular_rate),
            ("overtime_rate", self.overtime_rate),
            ("threshold_hours", self.threshold_hours),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(RoutingError::SimulationParameter(format!(
                    "wage {name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Wage cost for a route of the given length in hours.
    pub fn cost(&self, hours: f64) -> f64 {
        if hours < self.threshold_hours {
            hours * self.regular_rate
        } else {
            hours * self.regular_rate + (hours - self.threshold_hours) * self.overtime_rate
        }
    }

    /// Wage cost for a route of the given length in seconds.
    pub fn cost_for_seconds(&self, seconds: f64) -> f64 {
        self.cost(seconds / 3600.0)
    }
}
