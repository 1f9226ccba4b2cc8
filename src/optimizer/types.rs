use std::time::Duration;

use thiserror::Error;

/// Tolerance used when checking that objective weights sum to one.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Safety ceiling forwarded to the solver when the caller sets no limit.
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(60 * 60);

/// Horizon above which the builder logs a size warning.
pub const DEFAULT_HORIZON_WARNING: usize = 168;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ScheduleError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }
}

pub type ScheduleResult<T> = std::result::Result<T, ScheduleError>;
