use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::auth::handlers::handle_signup;
use crate::extraction::handlers::handle_extract_pdf;
use crate::history::handlers::handle_history;
use crate::state::AppState;
use crate::suggestions::handlers::{handle_get_suggestions, handle_update_suggestion_status};

/// GET /health
/// Returns a simple status object with service version.
async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "resume-coach-api"
    }))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/signup", post(handle_signup))
        .route("/extract-pdf", post(handle_extract_pdf))
        .route("/get-suggestions", post(handle_get_suggestions))
        .route("/history", get(handle_history))
        .route(
            "/update-suggestion-status",
            post(handle_update_suggestion_status),
        )
        .with_state(state)
}
