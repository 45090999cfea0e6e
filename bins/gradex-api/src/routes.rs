use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/exam/run", post(handlers::run_code))
        .route("/exam/submit", post(handlers::submit_code))
        .route("/health", get(handlers::health_check))
}
