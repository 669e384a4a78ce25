//! Pure-Rust MIP backend built on `good_lp` with the `microlp` solver.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use good_lp::constraint::{eq, geq, leq};
use good_lp::{microlp, variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable};
use tracing::warn;

use super::program::{BinaryProgram, MipBackend, MipSolution, MipStatus, Relation};
use crate::error::{Result, RoutingError};

/// Branch-and-bound backend using `microlp` through `good_lp`.
///
/// `microlp` has no native time limit, so a limited solve runs on a helper
/// thread and the caller stops waiting when the limit expires. The abandoned
/// search keeps running in the background until it finishes on its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLpBackend;

impl MicroLpBackend {
    /// Creates the backend.
    pub fn new() -> Self {
        Self
    }
}

impl MipBackend for MicroLpBackend {
    fn name(&self) -> &str {
        "microlp"
    }

    fn solve(&self, program: &BinaryProgram, time_limit: Option<Duration>) -> Result<MipSolution> {
        let Some(limit) = time_limit else {
            return solve_blocking(program);
        };

        let (tx, rx) = mpsc::channel();
        let owned = program.clone();
        thread::Builder::new()
            .name("mip-solve".into())
            .spawn(move || {
                // The receiver is gone after a timeout; nothing to report then.
                let _ = tx.send(solve_blocking(&owned));
            })?;

        match rx.recv_timeout(limit) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                warn!(limit_secs = limit.as_secs_f64(), "MIP solve timed out");
                Ok(MipSolution::without_assignment(MipStatus::TimedOut))
            }
            Err(RecvTimeoutError::Disconnected) => {
                Err(RoutingError::Backend("solver thread exited without a result".into()))
            }
        }
    }
}

fn solve_blocking(program: &BinaryProgram) -> Result<MipSolution> {
    let n = program.num_variables();
    if n == 0 {
        let values = Vec::new();
        return Ok(if program.is_feasible(&values) {
            MipSolution::optimal(0.0, values)
        } else {
            MipSolution::without_assignment(MipStatus::Infeasible)
        });
    }

    let mut vars = ProblemVariables::new();
    let xs: Vec<Variable> = (0..n).map(|_| vars.add(variable().binary())).collect();

    let objective: Expression = xs
        .iter()
        .zip(&program.objective)
        .map(|(&x, &c)| c * x)
        .sum();
    let mut model = vars.minimise(objective).using(microlp);

    for c in &program.constraints {
        let lhs: Expression = c.terms.iter().map(|&(v, coef)| coef * xs[v]).sum();
        let constraint = match c.relation {
            Relation::Equal => eq(lhs, c.rhs),
            Relation::LessOrEqual => leq(lhs, c.rhs),
            Relation::GreaterOrEqual => geq(lhs, c.rhs),
        };
        model.add_constraint(constraint);
    }

    match model.solve() {
        Ok(solution) => {
            let values: Vec<bool> = xs.iter().map(|&x| solution.value(x) > 0.5).collect();
            let objective = program.objective_value(&values);
            Ok(MipSolution::optimal(objective, values))
        }
        Err(ResolutionError::Infeasible) => Ok(MipSolution::without_assignment(MipStatus::Infeasible)),
        Err(ResolutionError::Unbounded) => Ok(MipSolution::without_assignment(MipStatus::Unbounded)),
        Err(other) => Err(RoutingError::Backend(other.to_string())),
    }
}
