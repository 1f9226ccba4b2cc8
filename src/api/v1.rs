use axum::{routing::post, Router};

use crate::controller::AppState;

use super::optimize::optimize;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/optimize", post(optimize))
        .with_state(state)
}
