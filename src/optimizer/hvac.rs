use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::domain::{OptimizationResult, ScheduleRequest};

use super::builder::ProblemBuilder;
use super::extractor::solve_and_extract;
use super::lp::LpSolver;
use super::types::{ScheduleResult, DEFAULT_TIME_LIMIT};
use super::weights::normalize_weights;

/// Normalize → build → solve → extract, one fresh problem per call.
///
/// Holds no per-call state, so one instance can serve concurrent callers as
/// long as the solver backend can.
#[derive(Clone)]
pub struct HvacOptimizer {
    solver: Arc<dyn LpSolver>,
    builder: ProblemBuilder,
    time_limit: Duration,
}

impl HvacOptimizer {
    pub fn new(solver: Arc<dyn LpSolver>) -> Self {
        Self {
            solver,
            builder: ProblemBuilder::default(),
            time_limit: DEFAULT_TIME_LIMIT,
        }
    }

    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }

    pub fn with_horizon_warning(mut self, horizon_warning: usize) -> Self {
        self.builder = ProblemBuilder::new(horizon_warning);
        self
    }

    pub fn time_limit(&self) -> Duration {
        self.time_limit
    }

    pub fn optimize(&self, request: &ScheduleRequest) -> ScheduleResult<OptimizationResult> {
        self.optimize_with_limit(request, self.time_limit)
    }

    /// Same as [`optimize`](Self::optimize) with a one-off time limit.
    pub fn optimize_with_limit(
        &self,
        request: &ScheduleRequest,
        time_limit: Duration,
    ) -> ScheduleResult<OptimizationResult> {
        let started = Instant::now();

        let normalized = normalize_weights(request.cost_weight, request.comfort_weight)?;
        let problem = self.builder.build(request, normalized.weights)?;
        let result = solve_and_extract(self.solver.as_ref(), &problem, time_limit);

        tracing::info!(
            horizon = request.horizon_hours,
            solver = self.solver.name(),
            optimal = result.is_optimal(),
            weights_adjusted = normalized.was_adjusted,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "HVAC optimization finished"
        );

        Ok(result)
    }
}

#[cfg(feature = "optimization")]
impl Default for HvacOptimizer {
    fn default() -> Self {
        Self::new(Arc::new(super::solvers::GoodLpSolver::new()))
    }
}

/// Optimizes one request with the default backend and time limit.
#[cfg(feature = "optimization")]
pub fn optimize_schedule(request: &ScheduleRequest) -> ScheduleResult<OptimizationResult> {
    HvacOptimizer::default().optimize(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FailureStatus;
    use crate::optimizer::lp::{LinearProblem, SolverOutput, SolverStatus};
    use crate::optimizer::ScheduleError;
    use mockall::mock;

    mock! {
        pub Solver {}
        impl LpSolver for Solver {
            fn solve(&self, problem: &LinearProblem, time_limit: Duration) -> SolverOutput;
            fn name(&self) -> &str;
        }
    }

    fn request() -> ScheduleRequest {
        ScheduleRequest {
            energy_prices: vec![0.10, 0.12, 0.15, 0.20, 0.18, 0.11],
            comfort_min: 20.0,
            comfort_max: 24.0,
            initial_temp: 22.5,
            horizon_hours: 6,
            hvac_max_capacity: 5.0,
            temp_change_per_unit_energy: 0.8,
            cost_weight: 0.6,
            comfort_weight: 0.4,
        }
    }

    #[test]
    fn test_invalid_request_never_reaches_solver() {
        let mut solver = MockSolver::new();
        solver.expect_solve().never();
        solver.expect_name().return_const("mock".to_string());
        let optimizer = HvacOptimizer::new(Arc::new(solver));

        let mut req = request();
        req.comfort_min = 25.0;
        req.comfort_max = 21.0;
        assert!(matches!(optimizer.optimize(&req), Err(ScheduleError::InvalidRequest(_))));

        let mut req = request();
        req.energy_prices.pop();
        assert!(matches!(optimizer.optimize(&req), Err(ScheduleError::InvalidRequest(_))));
    }

    #[test]
    fn test_weights_are_normalized_before_building() {
        let mut solver = MockSolver::new();
        solver.expect_name().return_const("mock".to_string());
        solver
            .expect_solve()
            .withf(|p, _| {
                // first objective term is 0.5 * price[0] once 0.3/0.3 is normalized
                (p.objective.terms[0].1 - 0.05).abs() < 1e-12
            })
            .times(1)
            .returning(|p, _| SolverOutput::failed(SolverStatus::Infeasible, format!("{} rejected", p.name)));

        let mut req = request();
        req.cost_weight = 0.3;
        req.comfort_weight = 0.3;
        let result = HvacOptimizer::new(Arc::new(solver)).optimize(&req).unwrap();
        assert_eq!(result.failure_status(), Some(FailureStatus::Infeasible));
    }

    #[test]
    fn test_configured_time_limit_is_forwarded() {
        let mut solver = MockSolver::new();
        solver.expect_name().return_const("mock".to_string());
        solver
            .expect_solve()
            .withf(|_, limit| *limit == Duration::from_millis(250))
            .times(1)
            .returning(|_, _| SolverOutput::failed(SolverStatus::Error, "timeout"));

        let optimizer = HvacOptimizer::new(Arc::new(solver)).with_time_limit(Duration::from_millis(250));
        assert_eq!(optimizer.time_limit(), Duration::from_millis(250));
        let result = optimizer.optimize(&request()).unwrap();
        assert_eq!(result.failure_status(), Some(FailureStatus::SolverError));
    }

    #[test]
    fn test_default_time_limit_is_one_hour() {
        let optimizer = HvacOptimizer::new(Arc::new(MockSolver::new()));
        assert_eq!(optimizer.time_limit(), Duration::from_secs(3600));
    }
}
