//! Runs the solver on a built problem and turns its output into an
//! [`OptimizationResult`]. Non-optimal outcomes are reported as-is; nothing
//! here retries, relaxes or fills in missing values.

use std::time::{Duration, Instant};

use crate::domain::{FailureStatus, OptimalSchedule, OptimizationResult};

use super::builder::HvacProblem;
use super::lp::{LpSolver, SolverOutput, SolverStatus, VarId};

pub fn solve_and_extract(solver: &dyn LpSolver, hp: &HvacProblem, time_limit: Duration) -> OptimizationResult {
    tracing::trace!(lp = %hp.problem.to_lp_format(), "solver input");

    let started = Instant::now();
    let output = solver.solve(&hp.problem, time_limit);
    let elapsed_ms = started.elapsed().as_millis() as u64;

    tracing::debug!(
        solver = solver.name(),
        status = %output.status,
        elapsed_ms,
        "solver returned"
    );

    interpret(hp, output)
}

/// Classifies a solver output against the problem it was produced for.
pub fn interpret(hp: &HvacProblem, output: SolverOutput) -> OptimizationResult {
    match output.status {
        SolverStatus::Optimal => {}
        SolverStatus::Infeasible => {
            tracing::warn!(detail = ?output.message, "HVAC schedule is infeasible");
            return not_solved(FailureStatus::Infeasible, output.message);
        }
        SolverStatus::Unbounded => {
            // energy is boxed, so this points at a broken formulation
            tracing::error!(
                detail = ?output.message,
                variables = hp.problem.num_variables(),
                "solver reported HVAC problem as unbounded"
            );
            return not_solved(FailureStatus::Unbounded, output.message);
        }
        SolverStatus::Error => {
            tracing::error!(detail = ?output.message, "LP solver failed");
            return not_solved(FailureStatus::SolverError, output.message);
        }
    }

    let Some(values) = output.values else {
        tracing::error!("solver reported optimal without an assignment");
        return not_solved(
            FailureStatus::SolverError,
            Some("optimal status without variable values".to_string()),
        );
    };

    let expected = hp.problem.num_variables();
    if values.len() != expected {
        tracing::error!(got = values.len(), expected, "solver assignment has wrong size");
        return not_solved(
            FailureStatus::SolverError,
            Some(format!("expected {} variable values, got {}", expected, values.len())),
        );
    }
    if let Some(idx) = values.iter().position(|v| !v.is_finite()) {
        let name = &hp.problem.variables[idx].name;
        tracing::error!(variable = %name, "solver assignment contains a non-finite value");
        return not_solved(
            FailureStatus::SolverError,
            Some(format!("non-finite value for {}", name)),
        );
    }

    let pick = |ids: &[VarId]| ids.iter().map(|v| values[v.0]).collect::<Vec<f64>>();
    let schedule = pick(&hp.energy);
    let temperatures = pick(&hp.temp);

    // sizes were checked above, so every referenced variable has a value
    let total_cost = hp.cost_expr.evaluate(&values).unwrap_or_default();
    let total_comfort_deviation = hp.comfort_expr.evaluate(&values).unwrap_or_default();
    let objective_value = hp.problem.objective.evaluate(&values).unwrap_or_default();

    tracing::info!(
        horizon = hp.horizon(),
        total_cost,
        total_comfort_deviation,
        objective_value,
        "optimal HVAC schedule found"
    );

    OptimizationResult::Optimal(OptimalSchedule {
        schedule,
        temperatures,
        total_cost,
        total_comfort_deviation,
        objective_value,
        weights: hp.weights,
    })
}

fn not_solved(status: FailureStatus, message: Option<String>) -> OptimizationResult {
    OptimizationResult::NotSolved { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ObjectiveWeights, ScheduleRequest};
    use crate::optimizer::builder::ProblemBuilder;
    use crate::optimizer::lp::LinearProblem;
    use mockall::mock;
    use rstest::rstest;

    mock! {
        pub Solver {}
        impl LpSolver for Solver {
            fn solve(&self, problem: &LinearProblem, time_limit: Duration) -> SolverOutput;
            fn name(&self) -> &str;
        }
    }

    fn problem() -> HvacProblem {
        let req = ScheduleRequest {
            energy_prices: vec![0.2, 0.1],
            comfort_min: 20.0,
            comfort_max: 24.0,
            initial_temp: 19.0,
            horizon_hours: 2,
            hvac_max_capacity: 4.0,
            temp_change_per_unit_energy: 0.5,
            cost_weight: 0.5,
            comfort_weight: 0.5,
        };
        ProblemBuilder::default()
            .build(&req, ObjectiveWeights { cost: 0.5, comfort: 0.5 })
            .unwrap()
    }

    #[test]
    fn test_optimal_output_is_read_back() {
        let hp = problem();
        // energy, temp, below, above
        let values = vec![2.0, 0.0, 20.0, 20.0, 0.0, 0.0, 0.0, 0.0];
        let result = interpret(&hp, SolverOutput::optimal(values));

        let s = result.optimal().expect("optimal");
        assert_eq!(s.schedule, vec![2.0, 0.0]);
        assert_eq!(s.temperatures, vec![20.0, 20.0]);
        assert!((s.total_cost - 0.4).abs() < 1e-12);
        assert_eq!(s.total_comfort_deviation, 0.0);
        assert!((s.objective_value - 0.2).abs() < 1e-12);
        assert_eq!(s.weights, ObjectiveWeights { cost: 0.5, comfort: 0.5 });
    }

    #[rstest]
    #[case(SolverStatus::Infeasible, FailureStatus::Infeasible)]
    #[case(SolverStatus::Unbounded, FailureStatus::Unbounded)]
    #[case(SolverStatus::Error, FailureStatus::SolverError)]
    fn test_failures_are_never_schedules(#[case] status: SolverStatus, #[case] expected: FailureStatus) {
        let hp = problem();
        let result = interpret(&hp, SolverOutput::failed(status, "boom"));
        assert_eq!(
            result,
            OptimizationResult::NotSolved {
                status: expected,
                message: Some("boom".to_string()),
            }
        );
    }

    #[test]
    fn test_non_optimal_values_are_discarded() {
        let hp = problem();
        let output = SolverOutput {
            status: SolverStatus::Infeasible,
            values: Some(vec![0.0; 8]),
            message: None,
        };
        assert_eq!(interpret(&hp, output).failure_status(), Some(FailureStatus::Infeasible));
    }

    #[rstest]
    #[case(None)]
    #[case(Some(vec![0.0; 3]))]
    #[case(Some(vec![0.0, f64::NAN, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]))]
    fn test_broken_optimal_assignment_is_solver_error(#[case] values: Option<Vec<f64>>) {
        let hp = problem();
        let output = SolverOutput {
            status: SolverStatus::Optimal,
            values,
            message: None,
        };
        assert_eq!(interpret(&hp, output).failure_status(), Some(FailureStatus::SolverError));
    }

    #[test]
    fn test_time_limit_is_forwarded() {
        let hp = problem();
        let mut solver = MockSolver::new();
        solver.expect_name().return_const("mock".to_string());
        solver
            .expect_solve()
            .withf(|p, limit| p.num_variables() == 8 && *limit == Duration::from_secs(7))
            .times(1)
            .returning(|_, _| SolverOutput::failed(SolverStatus::Error, "license expired"));

        let result = solve_and_extract(&solver, &hp, Duration::from_secs(7));
        assert_eq!(result.failure_status(), Some(FailureStatus::SolverError));
    }
}
