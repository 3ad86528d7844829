use super::AppState;
use crate::error::ExchangeError;
use crate::session::{BackendUser, SessionBackend};
use async_trait::async_trait;
use axum::Json;
use axum::http::{HeaderMap, StatusCode, header};
use std::sync::Arc;

pub(super) type Rejection = (StatusCode, Json<serde_json::Value>);

/// Resolves a backend session token to the user it belongs to.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, access_token: &str) -> Result<BackendUser, ExchangeError>;
}

/// Verifies tokens with the backend's `GET /auth/v1/user`.
pub struct BackendTokenVerifier {
    backend: Arc<dyn SessionBackend>,
}

impl BackendTokenVerifier {
    pub fn new(backend: Arc<dyn SessionBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl TokenVerifier for BackendTokenVerifier {
    async fn verify(&self, access_token: &str) -> Result<BackendUser, ExchangeError> {
        self.backend.user(access_token).await
    }
}

/// Extract the token from `Authorization: Bearer <token>`.
pub(super) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub(super) fn unauthorized(message: &str) -> Rejection {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({"error": message})),
    )
}

pub(super) async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<BackendUser, Rejection> {
    let Some(token) = bearer_token(headers) else {
        return Err(unauthorized(
            "Unauthorized: use Authorization: Bearer <session token>",
        ));
    };
    authenticate_token(state, token).await
}

pub(super) async fn authenticate_token(state: &AppState, token: &str) -> Result<BackendUser, Rejection> {
    match state.verifier.verify(token).await {
        Ok(user) => Ok(user),
        Err(ExchangeError::Rejected { status, .. }) if matches!(status, 401 | 403) => {
            tracing::warn!(status, "bearer token rejected by backend");
            Err(unauthorized("Invalid or expired session"))
        }
        Err(error) => {
            tracing::error!("session verification failed: {error}");
            Err((
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({"error": "Session verification unavailable"})),
            ))
        }
    }
}
