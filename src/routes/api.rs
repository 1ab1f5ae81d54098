use axum::{routing::get, Router};

use crate::handlers::{health_check, ready_check};
use crate::state::AppState;
use crate::ws::handler::ws_handler;

/// Create the API routes
pub fn create_api_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
        .route("/ws", get(ws_handler))
        .with_state(app_state)
}
