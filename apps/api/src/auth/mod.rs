//! Auth collaborator: an external identity provider issues and validates
//! bearer tokens. This service never verifies credentials itself.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

pub mod handlers;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing or invalid bearer token")]
    Unauthorized,

    #[error("auth provider rejected the request: {0}")]
    Rejected(String),

    #[error("auth provider unreachable: {0}")]
    Transport(String),
}

/// Identity the auth provider vouches for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Admin-side account creation. Provider-side rejection (duplicate email,
    /// weak password) is reported distinctly from transport failure.
    async fn create_user(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<AuthUser, AuthError>;

    /// Resolves a bearer token to the user it was issued for.
    async fn validate(&self, token: &str) -> Result<AuthUser, AuthError>;
}

/// HTTP implementation against a GoTrue-style identity endpoint.
pub struct HttpAuthProvider {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
}

#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: Uuid,
    email: String,
    #[serde(default)]
    user_metadata: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    #[serde(alias = "message", alias = "error_description")]
    msg: Option<String>,
}

impl From<ProviderUser> for AuthUser {
    fn from(user: ProviderUser) -> Self {
        let name = user
            .user_metadata
            .as_ref()
            .and_then(|m| m.get("name"))
            .and_then(|v| v.as_str())
            .map(str::to_string);
        AuthUser {
            id: user.id,
            email: user.email,
            name,
        }
    }
}

impl HttpAuthProvider {
    pub fn new(base_url: String, service_key: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
        }
    }
}

#[async_trait]
impl AuthProvider for HttpAuthProvider {
    async fn create_user(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<AuthUser, AuthError> {
        let response = self
            .client
            .post(format!("{}/admin/users", self.base_url))
            .bearer_auth(&self.service_key)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "user_metadata": { "name": name },
                // No mail server is configured; confirm accounts immediately.
                "email_confirm": true
            }))
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            let message = response
                .json::<ProviderError>()
                .await
                .ok()
                .and_then(|e| e.msg)
                .unwrap_or_else(|| format!("status {status}"));
            return Err(AuthError::Rejected(message));
        }
        if !status.is_success() {
            return Err(AuthError::Transport(format!("status {status}")));
        }

        let user: ProviderUser = response
            .json()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        Ok(user.into())
    }

    async fn validate(&self, token: &str) -> Result<AuthUser, AuthError> {
        let response = self
            .client
            .get(format!("{}/user", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        if response.status() == StatusCode::UNAUTHORIZED
            || response.status() == StatusCode::FORBIDDEN
        {
            return Err(AuthError::Unauthorized);
        }
        if !response.status().is_success() {
            return Err(AuthError::Transport(format!(
                "status {}",
                response.status()
            )));
        }

        let user: ProviderUser = response
            .json()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        Ok(user.into())
    }
}

/// Extractor placed on every protected handler: resolves the Authorization
/// bearer token through the auth collaborator before the body is touched.
pub struct CurrentUser(pub AuthUser);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .filter(|t| !t.is_empty())
            .ok_or(AppError::Unauthorized)?;

        let user = state
            .auth
            .validate(token)
            .await
            .map_err(|_| AppError::Unauthorized)?;
        Ok(CurrentUser(user))
    }
}
