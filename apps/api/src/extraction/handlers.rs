use axum::{extract::State, Json};
use base64::{engine::general_purpose, Engine as _};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::extraction::extract_and_store;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractPdfRequest {
    #[serde(default)]
    pub pdf_base64: String,
    #[serde(default)]
    pub file_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractPdfResponse {
    pub success: bool,
    pub text: String,
    pub resume_id: Uuid,
}

/// POST /extract-pdf
pub async fn handle_extract_pdf(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<ExtractPdfRequest>,
) -> Result<Json<ExtractPdfResponse>, AppError> {
    if request.pdf_base64.trim().is_empty() {
        return Err(AppError::Validation("pdfBase64 is required".to_string()));
    }
    let bytes = general_purpose::STANDARD
        .decode(request.pdf_base64.trim())
        .map_err(|_| AppError::Validation("pdfBase64 is not valid base64".to_string()))?;

    let outcome = extract_and_store(
        state.store.as_ref(),
        state.blob.as_ref(),
        user.id,
        Bytes::from(bytes),
        request.file_name,
    )
    .await?;

    Ok(Json(ExtractPdfResponse {
        success: true,
        text: outcome.text,
        resume_id: outcome.resume.id,
    }))
}
