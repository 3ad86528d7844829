use super::auth::{BackendTokenVerifier, TokenVerifier};
use super::conversations::{handle_get_conversation, handle_put_conversation};
use super::handlers::{handle_chat, handle_health};
use super::websocket::ws_handler;
use super::{AppState, MAX_BODY_SIZE, REQUEST_TIMEOUT_SECS};

use crate::config::Config;
use crate::conversation::{ChangeFeed, ConversationStore, SqliteConversationStore};
use crate::providers::{self, Generator};
use crate::session::{SessionBackend, SessionExchanger};
use anyhow::{Context, Result};
use axum::{
    Router,
    http::{HeaderValue, Method, StatusCode, header},
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Returns true when the bind address is not a loopback address.
pub fn is_public_bind(host: &str) -> bool {
    !matches!(
        host,
        "127.0.0.1" | "localhost" | "::1" | "[::1]" | "0:0:0:0:0:0:0:1"
    )
}

/// Run the HTTP gateway using axum with proper HTTP/1.1 compliance.
pub async fn run_gateway(host: &str, port: u16, config: Config) -> Result<()> {
    // ── Security: refuse public bind without explicit opt-in ──
    if is_public_bind(host) && !config.gateway.allow_public_bind {
        anyhow::bail!(
            "Refusing to bind to {host}: the relay would be exposed to the internet.\n\
             Fix: use --host 127.0.0.1 (default), or set\n\
             [gateway] allow_public_bind = true in config.toml behind a TLS proxy."
        );
    }

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("parse gateway bind address {host}:{port}"))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind gateway listener on {addr}"))?;

    run_gateway_with_listener(host, listener, config).await
}

async fn build_gateway_state(config: &Config) -> Result<AppState> {
    let generator: Arc<dyn Generator> =
        providers::create_generator(&config.generation).context("create generation backend")?;
    if let Err(error) = generator.warmup().await {
        tracing::warn!(generator = generator.name(), "generator warmup failed: {error}");
    }

    let backend: Arc<dyn SessionBackend> = Arc::new(SessionExchanger::from_config(&config.backend));
    let verifier: Arc<dyn TokenVerifier> = Arc::new(BackendTokenVerifier::new(backend));

    let database_path = config.database_path();
    let store: Arc<dyn ConversationStore> = Arc::new(
        SqliteConversationStore::open(&database_path)
            .await
            .with_context(|| format!("open conversation database {}", database_path.display()))?,
    );

    Ok(AppState {
        generator,
        verifier,
        store,
        feed: ChangeFeed::new(),
        require_auth: config.gateway.require_auth,
    })
}

/// Run the HTTP gateway from a pre-bound listener.
pub async fn run_gateway_with_listener(
    host: &str,
    listener: tokio::net::TcpListener,
    config: Config,
) -> Result<()> {
    let actual_port = listener
        .local_addr()
        .context("get gateway listener local address")?
        .port();
    let display_addr = format!("{host}:{actual_port}");

    let state = build_gateway_state(&config).await?;
    print_gateway_banner(&display_addr, &state);

    let app = build_app(state, &config.gateway.allowed_origins);
    axum::serve(listener, app)
        .await
        .context("serve HTTP gateway")?;

    Ok(())
}

fn print_gateway_banner(display_addr: &str, state: &AppState) {
    println!("Gateway listening on {display_addr}");
    println!("  GET  /health");
    println!("  POST /api/chat -> {}", state.generator.name());
    println!("  GET  /api/conversations/{{mode}}");
    println!("  PUT  /api/conversations/{{mode}}");
    println!("  GET  /api/conversations/ws -> WebSocket");
    if state.require_auth {
        println!("  Bearer session token required on /api/chat");
    } else {
        println!("  /api/chat is open (gateway.require_auth = false)");
    }
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

/// Assemble the router with body-limit, timeout and CORS layers.
pub fn build_app(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/api/chat", post(handle_chat))
        .route("/api/conversations/ws", get(ws_handler))
        .route(
            "/api/conversations/{mode}",
            get(handle_get_conversation).put(handle_put_conversation),
        )
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        ))
        .layer(cors_layer(allowed_origins))
}
