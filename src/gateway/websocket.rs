use super::AppState;
use super::auth::{authenticate_token, bearer_token, unauthorized};
use super::events::{ClientMessage, ServerMessage};
use crate::conversation::ConversationChange;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tokio::sync::broadcast::{self, error::RecvError};

/// Browsers cannot set headers on a websocket handshake, so the token may
/// also arrive as `?access_token=`.
#[derive(Debug, Deserialize)]
pub(super) struct WsQuery {
    access_token: Option<String>,
}

/// GET /api/conversations/ws: realtime changes to the caller's conversations
pub(super) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
) -> Response {
    let Some(token) = query
        .access_token
        .as_deref()
        .filter(|token| !token.is_empty())
        .or_else(|| bearer_token(&headers))
    else {
        return unauthorized("Unauthorized: pass ?access_token=<session token>").into_response();
    };

    let user = match authenticate_token(&state, token).await {
        Ok(user) => user,
        Err(rejection) => return rejection.into_response(),
    };

    // Subscribe before the upgrade so saves racing the handshake are not lost.
    let changes = state.feed.subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, user.id, changes))
}

async fn handle_socket(
    mut socket: WebSocket,
    user_id: String,
    mut changes: broadcast::Receiver<ConversationChange>,
) {
    if send_message(&mut socket, &ServerMessage::connected())
        .await
        .is_err()
    {
        return;
    }
    tracing::debug!(%user_id, "realtime subscriber connected");

    loop {
        tokio::select! {
            change = changes.recv() => match change {
                Ok(change) => {
                    if change.user_id != user_id {
                        continue;
                    }
                    if send_message(&mut socket, &ServerMessage::changed(change))
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(%user_id, skipped, "realtime subscriber lagged");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => {
                let Some(result) = incoming else {
                    break;
                };
                let message = match result {
                    Ok(message) => message,
                    Err(error) => {
                        tracing::debug!("websocket receive error: {error}");
                        break;
                    }
                };
                if handle_incoming(&mut socket, message).await.is_err() {
                    break;
                }
            }
        }
    }

    tracing::debug!(%user_id, "realtime subscriber disconnected");
}

/// Returns `Err` when the connection should close.
async fn handle_incoming(socket: &mut WebSocket, message: Message) -> Result<(), axum::Error> {
    match message {
        Message::Text(text) => {
            let reply = match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::Ping) => ServerMessage::Pong,
                Err(error) => ServerMessage::error(format!("invalid message: {error}")),
            };
            send_message(socket, &reply).await
        }
        Message::Ping(data) => socket.send(Message::Pong(data)).await,
        Message::Close(_) => Err(axum::Error::new("closed by client")),
        _ => Ok(()),
    }
}

async fn send_message(socket: &mut WebSocket, message: &ServerMessage) -> Result<(), axum::Error> {
    let json = message.to_json();
    socket.send(Message::Text(json.into())).await
}
