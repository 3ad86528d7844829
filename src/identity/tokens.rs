use crate::error::IdentityError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How an identity token was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquisitionSource {
    /// Cached refresh token redeemed without user interaction
    Silent,
    /// Host assertion exchanged on-behalf-of
    HostExchange,
    Popup,
    Redirect,
}

/// Identity-provider token set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityToken {
    pub access_token: String,
    pub id_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub scopes: Vec<String>,
    /// Nonce bound into the id token by an interactive flow
    pub nonce: Option<String>,
    pub source: AcquisitionSource,
}

impl IdentityToken {
    pub fn is_expired(&self, now: DateTime<Utc>, skew: Duration) -> bool {
        self
            .expires_at
            .is_some_and(|at| at.checked_sub_signed(skew).is_none_or(|edge| edge <= now))
    }
}

/// Token endpoint success body (RFC 6749 §5.1).
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: Option<String>,
    pub id_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub scope: Option<String>,
}

impl TokenResponse {
    pub(crate) fn into_identity_token(
        self,
        source: AcquisitionSource,
        nonce: Option<String>,
    ) -> Result<IdentityToken, IdentityError> {
        let access_token = self
            .access_token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                IdentityError::Provider("token response did not contain an access_token".into())
            })?;

        let expires_at = match self.expires_in {
            Some(secs) => Some(expiry_after(Utc::now(), secs).ok_or_else(|| {
                IdentityError::Provider(format!("token expires_in out of range: {secs}"))
            })?),
            None => None,
        };

        Ok(IdentityToken {
            access_token,
            id_token: self.id_token.filter(|t| !t.trim().is_empty()),
            refresh_token: self.refresh_token.filter(|t| !t.trim().is_empty()),
            expires_at,
            scopes: self
                .scope
                .map(|s| s.split_whitespace().map(String::from).collect())
                .unwrap_or_default(),
            nonce,
            source,
        })
    }
}

/// `now + secs`, or `None` when the result is not representable.
pub(crate) fn expiry_after(now: DateTime<Utc>, secs: i64) -> Option<DateTime<Utc>> {
    Duration::try_seconds(secs).and_then(|delta| now.checked_add_signed(delta))
}

/// Token endpoint error body (RFC 6749 §5.2).
#[derive(Debug, Deserialize)]
struct OAuthErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// OAuth error codes meaning "the user has to be involved".
const INTERACTION_REQUIRED_CODES: [&str; 4] = [
    "interaction_required",
    "consent_required",
    "login_required",
    "invalid_grant",
];

/// Map a failed token-endpoint response to an [`IdentityError`].
pub(crate) fn classify_token_error(status: u16, body: &str) -> IdentityError {
    match serde_json::from_str::<OAuthErrorBody>(body) {
        Ok(parsed) => {
            let detail = parsed
                .error_description
                .map_or_else(|| parsed.error.clone(), |d| format!("{}: {d}", parsed.error));
            if INTERACTION_REQUIRED_CODES.contains(&parsed.error.as_str()) {
                IdentityError::InteractionRequired(detail)
            } else {
                IdentityError::Provider(detail)
            }
        }
        Err(_) => IdentityError::Provider(format!("token endpoint returned {status}: {body}")),
    }
}
