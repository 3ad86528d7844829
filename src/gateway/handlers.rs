use super::AppState;
use super::auth::authenticate;
use crate::providers::sanitize_api_error;
use crate::relay::{RelayFailure, RelayReply, RelayRequest};
use axum::{
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};

/// GET /health: always public (no secrets leaked)
pub(super) async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    let body = serde_json::json!({
        "status": "ok",
        "generator": state.generator.name(),
        "require_auth": state.require_auth,
    });
    Json(body)
}

/// POST /api/chat: relay history plus mode prompt to the generator
pub(super) async fn handle_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<RelayRequest>, JsonRejection>,
) -> Response {
    if state.require_auth
        && let Err(rejection) = authenticate(&state, &headers).await
    {
        return rejection.into_response();
    }

    let Json(request) = match body {
        Ok(body) => body,
        Err(e) => {
            let err = serde_json::json!({
                "error": format!("Invalid JSON. Expected: {{\"history\": [...], \"systemPrompt\": \"...\"}} ({e})")
            });
            return (StatusCode::BAD_REQUEST, Json(err)).into_response();
        }
    };

    if request.history.is_empty() {
        let err = serde_json::json!({"error": "history must contain at least one message"});
        return (StatusCode::BAD_REQUEST, Json(err)).into_response();
    }

    tracing::debug!(
        generator = state.generator.name(),
        messages = request.history.len(),
        "relaying chat request"
    );

    match state
        .generator
        .generate(&request.system_prompt, &request.history)
        .await
    {
        Ok(response) => (StatusCode::OK, Json(RelayReply { response })).into_response(),
        Err(e) => {
            let message = sanitize_api_error(&format!("{e:#}"));
            tracing::error!(generator = state.generator.name(), "generation failed: {message}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RelayFailure { error: message }),
            )
                .into_response()
        }
    }
}
