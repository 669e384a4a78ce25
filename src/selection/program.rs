//! Solver-agnostic binary integer program and backend contract.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Relation between a constraint's left-hand side and its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relation {
    /// `lhs == rhs`
    Equal,
    /// `lhs <= rhs`
    LessOrEqual,
    /// `lhs >= rhs`
    GreaterOrEqual,
}

/// A named linear constraint over binary variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearConstraint {
    /// Label used in diagnostics.
    pub name: String,
    /// Sparse `(variable, coefficient)` terms.
    pub terms: Vec<(usize, f64)>,
    /// Relation to the right-hand side.
    pub relation: Relation,
    /// Right-hand side constant.
    pub rhs: f64,
}

impl LinearConstraint {
    /// Evaluates the left-hand side for a 0/1 assignment.
    pub fn lhs(&self, values: &[bool]) -> f64 {
        self.terms
            .iter()
            .filter(|(v, _)| values.get(*v).copied().unwrap_or(false))
            .map(|(_, c)| c)
            .sum()
    }

    /// Returns `true` if the assignment satisfies this constraint.
    pub fn is_satisfied(&self, values: &[bool], tol: f64) -> bool {
        let lhs = self.lhs(values);
        match self.relation {
            Relation::Equal => (lhs - self.rhs).abs() <= tol,
            Relation::LessOrEqual => lhs <= self.rhs + tol,
            Relation::GreaterOrEqual => lhs >= self.rhs - tol,
        }
    }
}

/// Minimize `Σ objective[i] · x_i` over `x ∈ {0,1}^n` subject to linear constraints.
///
/// # Examples
///
/// ```
/// use store_routing::selection::{BinaryProgram, LinearConstraint, Relation};
///
/// let program = BinaryProgram {
///     objective: vec![3.0, 5.0],
///     constraints: vec![LinearConstraint {
///         name: "pick one".into(),
///         terms: vec![(0, 1.0), (1, 1.0)],
///         relation: Relation::Equal,
///         rhs: 1.0,
///     }],
/// };
/// assert!(program.is_feasible(&[true, false]));
/// assert!(!program.is_feasible(&[true, true]));
/// assert_eq!(program.objective_value(&[false, true]), 5.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BinaryProgram {
    /// Objective coefficient per variable.
    pub objective: Vec<f64>,
    /// Constraints over the variables.
    pub constraints: Vec<LinearConstraint>,
}

impl BinaryProgram {
    /// Number of decision variables.
    pub fn num_variables(&self) -> usize {
        self.objective.len()
    }

    /// Objective value of an assignment.
    pub fn objective_value(&self, values: &[bool]) -> f64 {
        self.objective
            .iter()
            .zip(values)
            .filter(|(_, x)| **x)
            .map(|(c, _)| c)
            .sum()
    }

    /// Constraints violated by an assignment.
    pub fn violated(&self, values: &[bool]) -> Vec<&LinearConstraint> {
        self.constraints
            .iter()
            .filter(|c| !c.is_satisfied(values, 1e-6))
            .collect()
    }

    /// Returns `true` if the assignment satisfies every constraint.
    pub fn is_feasible(&self, values: &[bool]) -> bool {
        values.len() == self.num_variables() && self.violated(values).is_empty()
    }
}

/// Terminal status reported by a MIP backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MipStatus {
    /// An optimal assignment was found.
    Optimal,
    /// No assignment satisfies the constraints.
    Infeasible,
    /// The objective is unbounded.
    Unbounded,
    /// The wall-clock limit expired before the search finished.
    TimedOut,
}

impl fmt::Display for MipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MipStatus::Optimal => "optimal",
            MipStatus::Infeasible => "infeasible",
            MipStatus::Unbounded => "unbounded",
            MipStatus::TimedOut => "timed out",
        })
    }
}

/// Result of one backend call.
#[derive(Debug, Clone, PartialEq)]
pub struct MipSolution {
    /// Solver status.
    pub status: MipStatus,
    /// Objective value when optimal.
    pub objective: Option<f64>,
    /// Variable assignment when optimal; empty otherwise.
    pub values: Vec<bool>,
}

impl MipSolution {
    /// An optimal solution.
    pub fn optimal(objective: f64, values: Vec<bool>) -> Self {
        Self {
            status: MipStatus::Optimal,
            objective: Some(objective),
            values,
        }
    }

    /// A solution-less outcome with the given status.
    pub fn without_assignment(status: MipStatus) -> Self {
        Self {
            status,
            objective: None,
            values: Vec::new(),
        }
    }
}

/// A mixed-integer programming backend.
///
/// Any solver that accepts a linear objective over binary variables with
/// linear equality/inequality constraints can implement this. Infeasibility
/// and timeouts are reported through [`MipStatus`]; `Err` is reserved for
/// backend failures.
pub trait MipBackend: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Solves the program, giving up after `time_limit` if set.
    fn solve(&self, program: &BinaryProgram, time_limit: Option<Duration>) -> Result<MipSolution>;
}
