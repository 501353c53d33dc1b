use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::feedback::{ResumeSummary, Suggestion, SuggestionStatus};
use crate::state::AppState;
use crate::suggestions::engine::generate_feedback;
use crate::suggestions::status::update_suggestion_status;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetSuggestionsRequest {
    #[serde(default)]
    pub resume_text: String,
    #[serde(default)]
    pub resume_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetSuggestionsResponse {
    pub success: bool,
    pub suggestions: Vec<Suggestion>,
    pub feedback_id: Uuid,
    pub summary: ResumeSummary,
}

/// POST /get-suggestions
pub async fn handle_get_suggestions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<GetSuggestionsRequest>,
) -> Result<Json<GetSuggestionsResponse>, AppError> {
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation("resumeText is required".to_string()));
    }
    let resume_id = request
        .resume_id
        .ok_or_else(|| AppError::Validation("resumeId is required".to_string()))?;

    let generated = generate_feedback(
        state.store.as_ref(),
        state.llm.as_ref(),
        user.id,
        resume_id,
        &request.resume_text,
    )
    .await?;

    Ok(Json(GetSuggestionsResponse {
        success: true,
        feedback_id: generated.feedback.id,
        suggestions: generated.feedback.suggestions,
        summary: generated.summary,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub feedback_id: Uuid,
    pub suggestion_index: usize,
    pub status: SuggestionStatus,
}

#[derive(Debug, Serialize)]
pub struct UpdateStatusResponse {
    pub success: bool,
}

/// POST /update-suggestion-status
pub async fn handle_update_suggestion_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<UpdateStatusResponse>, AppError> {
    update_suggestion_status(
        state.store.as_ref(),
        user.id,
        request.feedback_id,
        request.suggestion_index,
        request.status,
    )
    .await?;

    Ok(Json(UpdateStatusResponse { success: true }))
}
