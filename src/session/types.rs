use crate::error::ExchangeError;
use crate::identity::IdentityToken;
use crate::identity::tokens::expiry_after;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Backend-issued session; `access_token` authorizes relay and storage calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub user: BackendUser,
}

impl BackendSession {
    pub fn is_expired(&self, now: DateTime<Utc>, skew: Duration) -> bool {
        self
            .expires_at
            .is_some_and(|at| at.checked_sub_signed(skew).is_none_or(|edge| edge <= now))
    }
}

/// `POST /auth/v1/token` success body.
#[derive(Debug, Deserialize)]
pub(crate) struct SessionResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Unix seconds
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: BackendUser,
}

impl SessionResponse {
    pub(crate) fn into_session(self, now: DateTime<Utc>) -> Result<BackendSession, ExchangeError> {
        let absolute = self
            .expires_at
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single());
        let expires_at = match (absolute, self.expires_in) {
            (Some(at), _) => Some(at),
            (None, Some(secs)) => Some(expiry_after(now, secs).ok_or_else(|| {
                ExchangeError::Decode(format!("session expires_in out of range: {secs}"))
            })?),
            (None, None) => None,
        };

        Ok(BackendSession {
            access_token: self.access_token,
            refresh_token: self.refresh_token.filter(|t| !t.is_empty()),
            token_type: self.token_type.unwrap_or_else(|| "bearer".into()),
            expires_at,
            user: self.user,
        })
    }
}

/// A signed-in user: identity token plus the backend session derived from it.
#[derive(Debug, Clone)]
pub struct Session {
    pub identity: IdentityToken,
    pub backend: BackendSession,
}

impl Session {
    pub fn user_id(&self) -> &str {
        &self.backend.user.id
    }

    pub fn email(&self) -> Option<&str> {
        self.backend.user.email.as_deref()
    }

    /// Bearer token for the relay and conversation endpoints.
    pub fn bearer(&self) -> &str {
        &self.backend.access_token
    }

    pub fn needs_refresh(&self, now: DateTime<Utc>, skew: Duration) -> bool {
        self.backend.is_expired(now, skew) || self.identity.is_expired(now, skew)
    }
}
