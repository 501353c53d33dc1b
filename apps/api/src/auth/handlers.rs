use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{AuthError, AuthUser};
use crate::errors::AppError;
use crate::models::user::{user_key, UserProfile};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub success: bool,
    pub user: AuthUser,
}

/// POST /signup
///
/// Registers an account with the auth collaborator, then persists a profile
/// record so later features have user metadata without another provider call.
pub async fn handle_signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<Json<SignupResponse>, AppError> {
    if request.email.trim().is_empty()
        || request.password.is_empty()
        || request.name.trim().is_empty()
    {
        return Err(AppError::Validation(
            "email, password, and name are required".to_string(),
        ));
    }

    let user = state
        .auth
        .create_user(&request.email, &request.password, &request.name)
        .await
        .map_err(|e| match e {
            AuthError::Rejected(msg) => AppError::Validation(msg),
            other => AppError::Auth(other.to_string()),
        })?;

    let profile = UserProfile {
        id: user.id,
        email: request.email,
        name: request.name,
        created_at: Utc::now(),
    };
    state
        .store
        .put(
            &user_key(user.id),
            serde_json::to_value(&profile).map_err(anyhow::Error::from)?,
        )
        .await?;

    info!("Registered user {}", user.id);
    Ok(Json(SignupResponse {
        success: true,
        user,
    }))
}
