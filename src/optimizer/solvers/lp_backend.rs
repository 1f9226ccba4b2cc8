//! `good_lp` backend for [`LpSolver`]
//!
//! Translates a [`LinearProblem`] into a `good_lp` model solved with the
//! pure-Rust minilp simplex, so no native solver library is needed on the
//! controller.
//!
//! minilp has no time limit of its own. The solve runs on a dedicated worker
//! thread and the caller waits at most `time_limit` for it; on expiry the
//! worker is detached and its result dropped when it eventually finishes.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use good_lp::solvers::minilp::minilp;
use good_lp::{
    constraint, variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel,
    Variable,
};

use crate::optimizer::lp::{LinearExpr, LinearProblem, LpSolver, Relation, SolverOutput, SolverStatus};

#[derive(Debug, Clone, Copy, Default)]
pub struct GoodLpSolver;

impl GoodLpSolver {
    pub fn new() -> Self {
        Self
    }
}

impl LpSolver for GoodLpSolver {
    fn solve(&self, problem: &LinearProblem, time_limit: Duration) -> SolverOutput {
        if let Err(msg) = problem.check_references() {
            return SolverOutput::failed(SolverStatus::Error, msg);
        }

        // minilp does not accept inverted bounds, and they are infeasible anyway
        if let Some(v) = problem.variables.iter().find(|v| v.is_empty_domain()) {
            return SolverOutput::failed(
                SolverStatus::Infeasible,
                format!(
                    "variable {} has empty bounds [{}, {}]",
                    v.name,
                    v.lower.unwrap_or(f64::NEG_INFINITY),
                    v.upper.unwrap_or(f64::INFINITY)
                ),
            );
        }

        let owned = problem.clone();
        let (tx, rx) = mpsc::channel();
        let spawned = thread::Builder::new()
            .name("lp-solver".to_string())
            .spawn(move || {
                let _ = tx.send(run_minilp(&owned));
            });
        if let Err(e) = spawned {
            return SolverOutput::failed(SolverStatus::Error, format!("failed to start solver thread: {e}"));
        }

        match rx.recv_timeout(time_limit) {
            Ok(output) => output,
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    time_limit_ms = time_limit.as_millis() as u64,
                    problem = %problem.name,
                    "LP solver exceeded its time limit"
                );
                SolverOutput::failed(
                    SolverStatus::Error,
                    format!("time limit of {:?} exceeded", time_limit),
                )
            }
            Err(RecvTimeoutError::Disconnected) => SolverOutput::failed(
                SolverStatus::Error,
                "solver worker terminated without a result",
            ),
        }
    }

    fn name(&self) -> &str {
        "good_lp/minilp"
    }
}

fn run_minilp(problem: &LinearProblem) -> SolverOutput {
    let mut vars = ProblemVariables::new();
    let handles: Vec<Variable> = problem
        .variables
        .iter()
        .map(|def| {
            let mut definition = variable().name(def.name.clone());
            if let Some(lo) = def.lower {
                definition = definition.min(lo);
            }
            if let Some(hi) = def.upper {
                definition = definition.max(hi);
            }
            vars.add(definition)
        })
        .collect();

    let objective = to_expression(&problem.objective, &handles);
    let mut model = vars.minimise(objective).using(minilp);

    for c in &problem.constraints {
        let lhs = to_expression(&c.lhs, &handles);
        let rhs = c.rhs;
        model = match c.relation {
            Relation::Eq => model.with(constraint!(lhs == rhs)),
            Relation::Le => model.with(constraint!(lhs <= rhs)),
            Relation::Ge => model.with(constraint!(lhs >= rhs)),
        };
    }

    match model.solve() {
        Ok(solution) => SolverOutput::optimal(handles.iter().map(|v| solution.value(*v)).collect()),
        Err(ResolutionError::Infeasible) => {
            SolverOutput::failed(SolverStatus::Infeasible, "problem is infeasible")
        }
        Err(ResolutionError::Unbounded) => {
            SolverOutput::failed(SolverStatus::Unbounded, "objective is unbounded")
        }
        Err(other) => SolverOutput::failed(SolverStatus::Error, other.to_string()),
    }
}

fn to_expression(expr: &LinearExpr, handles: &[Variable]) -> Expression {
    expr.terms
        .iter()
        .fold(Expression::from(expr.constant), |acc, (var, coefficient)| {
            acc + *coefficient * handles[var.0]
        })
}
