//! Axum-based HTTP gateway that fronts the generation API for chat clients.
//!
//! Routes:
//! - `GET  /health`
//! - `POST /api/chat` relays `{history, systemPrompt}` to the configured generator
//! - `GET|PUT /api/conversations/{mode}` reads or overwrites the caller's conversation row
//! - `GET  /api/conversations/ws` streams row changes for the caller
//!
//! The generation API key never leaves this process. Callers authenticate with
//! the backend session token, which is verified against the backend user endpoint.

mod auth;
mod conversations;
mod events;
mod handlers;
mod server;
mod websocket;

pub use auth::{BackendTokenVerifier, TokenVerifier};
pub use server::{build_app, is_public_bind, run_gateway, run_gateway_with_listener};

use crate::conversation::{ChangeFeed, ConversationStore};
use crate::providers::Generator;
use std::sync::Arc;

/// Maximum request body size (1MB). Long conversations are posted whole.
pub const MAX_BODY_SIZE: usize = 1_048_576;
/// Request timeout (120s). Generation calls are slow but must not hang forever.
pub const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<dyn Generator>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub store: Arc<dyn ConversationStore>,
    pub feed: ChangeFeed,
    /// Require a verified bearer token on `/api/chat`
    pub require_auth: bool,
}
