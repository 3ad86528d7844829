use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `mentorbridge`.
///
/// Each stage of the sign-in and chat flow defines its own variant. Callers
/// render the `Display` text directly (retry screen or inline chat message);
/// internal code continues to use `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum BridgeError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Host context ────────────────────────────────────────────────────
    #[error("host: {0}")]
    Host(#[from] HostError),

    // ── Identity broker ─────────────────────────────────────────────────
    #[error("identity: {0}")]
    Identity(#[from] IdentityError),

    // ── Session exchange ────────────────────────────────────────────────
    #[error("session: {0}")]
    Exchange(#[from] ExchangeError),

    // ── Conversation relay ──────────────────────────────────────────────
    #[error("relay: {0}")]
    Relay(#[from] RelayError),

    // ── Conversation store ──────────────────────────────────────────────
    #[error("store: {0}")]
    Store(#[from] StoreError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Host context errors ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum HostError {
    #[error("not running inside a host container")]
    NotEmbedded,

    #[error("host {host} did not issue an identity assertion: {message}")]
    Assertion { host: String, message: String },
}

// ─── Identity broker errors ──────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum IdentityError {
    /// Silent acquisition needs the user; triggers the popup fallback.
    #[error("interaction required: {0}")]
    InteractionRequired(String),

    #[error("popup sign-in failed: {0}")]
    PopupFailed(String),

    #[error("identity provider rejected the request: {0}")]
    Provider(String),

    #[error("invalid sign-in callback: {0}")]
    Callback(String),

    #[error("identity provider unreachable: {0}")]
    Http(String),
}

impl IdentityError {
    pub fn is_interaction_required(&self) -> bool {
        matches!(self, Self::InteractionRequired(_))
    }
}

// ─── Session exchange errors ─────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Backend answered non-2xx; `body` is kept verbatim for display.
    #[error("{body}")]
    Rejected { status: u16, body: String },

    #[error("backend unreachable: {0}")]
    Http(String),

    #[error("unexpected backend response: {0}")]
    Decode(String),

    #[error("no active session")]
    NoSession,
}

// ─── Relay errors ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum RelayError {
    /// Relay answered with status >= 400; `body` is the raw response text.
    #[error("{body}")]
    Status { status: u16, body: String },

    #[error("relay unreachable: {0}")]
    Http(String),

    #[error("unexpected relay response: {0}")]
    Decode(String),
}

// ─── Store errors ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("query failed: {0}")]
    Query(String),

    #[error("stored conversation is corrupt: {0}")]
    Corrupt(String),

    #[error("remote store returned {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("sqlx: {0}")]
    Sqlx(#[from] sqlx::Error),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, BridgeError>;
