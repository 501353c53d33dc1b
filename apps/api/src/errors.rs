use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Collaborator failure detail is logged server-side and replaced with a
/// generic message before it reaches the client.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The PDF parsed cleanly but contained no extractable text. The remedy
    /// is known (submit the text directly), so the message says so.
    #[error("PDF contained no extractable text")]
    ExtractionEmpty,

    #[error("PDF extraction failed: {0}")]
    ExtractionFailure(String),

    #[error("Model produced no usable suggestions")]
    NoSuggestions,

    #[error("Inference error: {0}")]
    Llm(String),

    #[error("Blob store error: {0}")]
    Blob(String),

    #[error("Auth provider error: {0}")]
    Auth(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Unauthorized - please log in".to_string(),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::ExtractionEmpty => (
                StatusCode::BAD_REQUEST,
                "EXTRACTION_EMPTY",
                "Could not extract text from the PDF. It may be image-based, scanned, \
                 or encrypted. Paste your resume text directly instead."
                    .to_string(),
            ),
            AppError::ExtractionFailure(msg) => {
                tracing::error!("PDF extraction error: {msg}");
                (
                    StatusCode::BAD_REQUEST,
                    "EXTRACTION_FAILED",
                    "Could not read the PDF. Paste your resume text directly instead."
                        .to_string(),
                )
            }
            AppError::NoSuggestions => (
                StatusCode::BAD_REQUEST,
                "NO_SUGGESTIONS",
                "No suggestions were generated. Ensure the resume has sufficient content."
                    .to_string(),
            ),
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Blob(msg) => {
                tracing::error!("Blob store error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Auth(msg) => {
                tracing::error!("Auth provider error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "AUTH_PROVIDER_ERROR",
                    "The identity provider could not be reached".to_string(),
                )
            }
            AppError::Store(StoreError::VersionConflict { key, .. }) => {
                tracing::warn!("Version conflict persisted after retries on {key}");
                (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    "The record was modified concurrently; retry the update".to_string(),
                )
            }
            AppError::Store(e) => {
                tracing::error!("Store error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    "A persistence error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
