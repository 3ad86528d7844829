use super::AppState;
use super::auth::authenticate;
use crate::conversation::{Mode, SaveConversationBody};
use axum::{
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use std::str::FromStr;

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({"error": message.into()}))).into_response()
}

fn parse_mode(raw: &str) -> Result<Mode, Response> {
    Mode::from_str(raw).map_err(|_| {
        error_response(
            StatusCode::BAD_REQUEST,
            format!("Unknown mode '{raw}'. Expected 'coach' or 'mentor'"),
        )
    })
}

/// GET /api/conversations/{mode}: the caller's stored row, 404 when absent
pub(super) async fn handle_get_conversation(
    State(state): State<AppState>,
    Path(mode): Path<String>,
    headers: HeaderMap,
) -> Response {
    let user = match authenticate(&state, &headers).await {
        Ok(user) => user,
        Err(rejection) => return rejection.into_response(),
    };
    let mode = match parse_mode(&mode) {
        Ok(mode) => mode,
        Err(response) => return response,
    };

    match state.store.load(&user.id, mode).await {
        Ok(Some(conversation)) => (StatusCode::OK, Json(conversation)).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "No conversation stored for this mode"),
        Err(e) => {
            tracing::error!(user_id = %user.id, %mode, "conversation load failed: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load conversation")
        }
    }
}

/// PUT /api/conversations/{mode}: overwrite the caller's row and notify subscribers
pub(super) async fn handle_put_conversation(
    State(state): State<AppState>,
    Path(mode): Path<String>,
    headers: HeaderMap,
    body: Result<Json<SaveConversationBody>, JsonRejection>,
) -> Response {
    let user = match authenticate(&state, &headers).await {
        Ok(user) => user,
        Err(rejection) => return rejection.into_response(),
    };
    let mode = match parse_mode(&mode) {
        Ok(mode) => mode,
        Err(response) => return response,
    };
    let Json(body) = match body {
        Ok(body) => body,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Invalid JSON. Expected: {{\"messages\": [...]}} ({e})"),
            );
        }
    };

    match state.store.save(&user.id, mode, &body.messages).await {
        Ok(conversation) => {
            let reached = state.feed.publish(&conversation);
            tracing::debug!(
                user_id = %user.id,
                %mode,
                messages = conversation.messages.len(),
                subscribers = reached,
                "conversation saved"
            );
            (StatusCode::OK, Json(conversation)).into_response()
        }
        Err(e) => {
            tracing::error!(user_id = %user.id, %mode, "conversation save failed: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save conversation")
        }
    }
}
