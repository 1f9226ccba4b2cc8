use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::config::Config;
use crate::optimizer::{HvacOptimizer, LpSolver};

/// Shared state handed to the HTTP handlers. The optimizer itself is
/// stateless; each request builds and solves its own problem.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub optimizer: Arc<HvacOptimizer>,
    /// One permit per HTTP solve in flight
    pub solve_permits: Arc<Semaphore>,
}

impl AppState {
    #[cfg(feature = "optimization")]
    pub fn new(cfg: Config) -> Self {
        Self::with_solver(cfg, Arc::new(crate::optimizer::GoodLpSolver::new()))
    }

    pub fn with_solver(cfg: Config, solver: Arc<dyn LpSolver>) -> Self {
        let optimizer = HvacOptimizer::new(solver)
            .with_time_limit(cfg.optimizer.time_limit())
            .with_horizon_warning(cfg.optimizer.horizon_warning_hours);
        let solve_permits = Arc::new(Semaphore::new(cfg.optimizer.max_concurrent_solves));
        Self {
            cfg: Arc::new(cfg),
            optimizer: Arc::new(optimizer),
            solve_permits,
        }
    }
}

#[cfg(all(test, feature = "optimization"))]
mod tests {
    use super::*;

    #[test]
    fn test_permits_follow_config() {
        let mut cfg = Config::default();
        cfg.optimizer.max_concurrent_solves = 2;
        let state = AppState::new(cfg);
        assert_eq!(state.solve_permits.available_permits(), 2);
    }
}
