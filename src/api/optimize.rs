use std::time::{Duration, Instant};

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    api::{error::ApiError, response::ApiResponse},
    controller::AppState,
    domain::{OptimizationResult, ScheduleRequest},
};

/// Body of `POST /api/v1/optimize`
#[derive(Debug, Deserialize, Validate)]
pub struct OptimizeRequest {
    #[serde(flatten)]
    #[validate(nested)]
    pub request: ScheduleRequest,
    /// Optional per-request solver limit, capped at the configured ceiling
    #[validate(range(min = 1))]
    pub time_limit_seconds: Option<u64>,
}

/// POST /api/v1/optimize - Compute an HVAC schedule
///
/// Infeasible or failed solves are still a `200`: the result carries its
/// own `outcome`. Only malformed requests are rejected, and a `503` is
/// returned while every solve permit is taken.
pub async fn optimize(
    State(state): State<AppState>,
    payload: Result<Json<OptimizeRequest>, JsonRejection>,
) -> Result<ApiResponse<OptimizationResult>, ApiError> {
    let Json(body) = payload?;
    body.validate()?;

    let max_horizon = state.cfg.optimizer.max_horizon_hours;
    if body.request.horizon_hours > max_horizon {
        return Err(ApiError::BadRequest(format!(
            "horizon_hours {} exceeds the maximum of {}",
            body.request.horizon_hours, max_horizon
        )));
    }

    let ceiling = state.optimizer.time_limit();
    let time_limit = body
        .time_limit_seconds
        .map(|secs| Duration::from_secs(secs).min(ceiling))
        .unwrap_or(ceiling);

    tracing::info!(
        horizon = body.request.horizon_hours,
        time_limit_s = time_limit.as_secs(),
        "optimization requested"
    );

    let permit = state.solve_permits.clone().try_acquire_owned().map_err(|_| {
        tracing::warn!("all solve permits in use, rejecting optimization request");
        ApiError::ServiceUnavailable("too many optimizations in progress".to_string())
    })?;

    let started = Instant::now();
    let optimizer = state.optimizer.clone();
    let request = body.request;
    let result = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        optimizer.optimize_with_limit(&request, time_limit)
    })
    .await
    .map_err(|e| ApiError::OptimizationError(format!("optimization task failed: {e}")))??;

    Ok(ApiResponse::success(result).with_duration(started.elapsed().as_millis() as u64))
}
