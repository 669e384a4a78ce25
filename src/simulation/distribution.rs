//! Trial-cost distributions and their summary statistics.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::error::{Result, RoutingError};

/// Per-trial totals produced by a simulator, in trial order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostDistribution {
    samples: Vec<f64>,
}

/// Aggregates of a [`CostDistribution`].
///
/// The interval is a two-sided Student-t confidence interval for the mean,
/// `mean ± t(level, n-1) · s / √n`. With a single trial it collapses to the
/// mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostSummary {
    /// Number of trials summarised.
    pub trials: usize,
    /// Smallest trial total.
    pub min: f64,
    /// Sample mean.
    pub mean: f64,
    /// Largest trial total.
    pub max: f64,
    /// Sample standard deviation (`n - 1` denominator).
    pub std_dev: f64,
    /// Two-sided confidence level of the interval, in `(0, 1)`.
    pub confidence_level: f64,
    /// Lower bound of the interval for the mean.
    pub ci_low: f64,
    /// Upper bound of the interval for the mean.
    pub ci_high: f64,
}

impl CostDistribution {
    /// Wraps trial totals.
    pub fn new(samples: Vec<f64>) -> Self {
        Self { samples }
    }

    /// Trial totals in trial order.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Number of trials.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns `true` if there are no trials.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Consumes the distribution, returning the raw trial array.
    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }

    /// Computes min, mean, max, standard deviation and a confidence interval.
    ///
    /// # Examples
    ///
    /// ```
    /// use store_routing::simulation::CostDistribution;
    ///
    /// let dist = CostDistribution::new(vec![10.0, 12.0, 14.0]);
    /// let s = dist.summary(0.95).unwrap();
    /// assert_eq!(s.min, 10.0);
    /// assert_eq!(s.mean, 12.0);
    /// assert_eq!(s.max, 14.0);
    /// assert!(s.ci_low < 12.0 && s.ci_high > 12.0);
    /// ```
    pub fn summary(&self, confidence_level: f64) -> Result<CostSummary> {
        if !(confidence_level > 0.0 && confidence_level < 1.0) {
            return Err(RoutingError::SimulationParameter(format!(
                "confidence level must be in (0, 1), got {confidence_level}"
            )));
        }
        let n = self.samples.len();
        if n == 0 {
            return Err(RoutingError::SimulationParameter(
                "cannot summarise an empty distribution".into(),
            ));
        }

        let min = self.samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = self.samples.iter().sum::<f64>() / n as f64;

        if n == 1 {
            return Ok(CostSummary {
                trials: n,
                min,
                mean,
                max,
                std_dev: 0.0,
                confidence_level,
                ci_low: mean,
                ci_high: mean,
            });
        }

        let variance = self.samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        let std_dev = variance.sqrt();
        let std_err = std_dev / (n as f64).sqrt();

        let t = StudentsT::new(0.0, 1.0, (n - 1) as f64)
            .map_err(|e| RoutingError::SimulationParameter(e.to_string()))?;
        let half_width = t.inverse_cdf(1.0 - (1.0 - confidence_level) / 2.0) * std_err;

        Ok(CostSummary {
            trials: n,
            min,
            mean,
            max,
            std_dev,
            confidence_level,
            ci_low: mean - half_width,
            ci_high: mean + half_width,
        })
    }
}

impl From<Vec<f64>> for CostDistribution {
    fn from(samples: Vec<f64>) -> Self {
        Self::new(samples)
    }
}
