use axum::{extract::State, Json};
use serde::Serialize;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::history::{build_history, HistoryEntry};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub history: Vec<HistoryEntry>,
}

/// GET /history
pub async fn handle_history(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<HistoryResponse>, AppError> {
    let history = build_history(state.store.as_ref(), state.blob.as_ref(), user.id).await?;
    Ok(Json(HistoryResponse {
        success: true,
        history,
    }))
}
