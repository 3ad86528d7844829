use super::authorization::{AuthorizationCallback, AuthorizationRequest, PendingAuthorization};
use super::tokens::{AcquisitionSource, IdentityToken, TokenResponse, classify_token_error};
use crate::config::IdentityConfig;
use crate::error::IdentityError;
use crate::providers::http_client::build_client_with_timeout;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Mutex;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_TIMEOUT_SECS: u64 = 30;

/// One identity provider's token operations.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Acquire a token without user interaction.
    ///
    /// With a host assertion this is an on-behalf-of exchange; without one it
    /// redeems the cached account. Anything that needs the user fails with
    /// [`IdentityError::InteractionRequired`].
    async fn acquire_silent(
        &self,
        host_assertion: Option<&str>,
    ) -> Result<IdentityToken, IdentityError>;

    /// Start an interactive authorization-code request.
    fn begin_authorization(&self) -> Result<PendingAuthorization, IdentityError>;

    async fn complete_authorization(
        &self,
        pending: &PendingAuthorization,
        callback: &AuthorizationCallback,
        source: AcquisitionSource,
    ) -> Result<IdentityToken, IdentityError>;

    /// Drop any cached account.
    fn forget(&self) {}
}

/// OAuth 2.0 / OpenID Connect provider driven by [`IdentityConfig`].
pub struct OAuthIdentityProvider {
    name: String,
    client_id: String,
    client_secret: Option<String>,
    authorize_url: String,
    token_url: String,
    scope: String,
    redirect_uri: String,
    cached_refresh_token: Mutex<Option<String>>,
    client: Client,
}

impl OAuthIdentityProvider {
    pub fn from_config(config: &IdentityConfig) -> Result<Self, IdentityError> {
        let (authorize_url, token_url) = config
            .endpoints()
            .map_err(|e| IdentityError::Provider(e.to_string()))?;
        Ok(Self {
            name: config.provider.to_string(),
            client_id: config.client_id.clone(),
            client_secret: config
                .client_secret
                .clone()
                .filter(|s| !s.trim().is_empty()),
            authorize_url,
            token_url,
            scope: config.scope_string(),
            redirect_uri: config.redirect_uri.clone(),
            cached_refresh_token: Mutex::new(None),
            client: build_client_with_timeout(TOKEN_TIMEOUT_SECS),
        })
    }

    /// Seed the account cache, e.g. from a previous run.
    pub fn with_refresh_token(self, refresh_token: Option<String>) -> Self {
        self.remember(refresh_token.as_deref());
        self
    }

    pub fn cached_refresh_token(&self) -> Option<String> {
        self.cached_refresh_token
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
    }

    fn remember(&self, refresh_token: Option<&str>) {
        if let Some(token) = refresh_token.filter(|t| !t.trim().is_empty())
            && let Ok(mut guard) = self.cached_refresh_token.lock()
        {
            *guard = Some(token.to_string());
        }
    }

    fn with_client_credentials<'a>(&'a self, form: &mut Vec<(&'static str, &'a str)>) {
        form.push(("client_id", &self.client_id));
        if let Some(secret) = self.client_secret.as_deref() {
            form.push(("client_secret", secret));
        }
    }

    async fn redeem(
        &self,
        form: &[(&str, &str)],
        source: AcquisitionSource,
        nonce: Option<String>,
    ) -> Result<IdentityToken, IdentityError> {
        let response = self
            .client
            .post(&self.token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(form)
            .send()
            .await
            .map_err(|e| IdentityError::Http(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| IdentityError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(classify_token_error(status.as_u16(), &body));
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| IdentityError::Provider(format!("malformed token response: {e}")))?;
        let token = parsed.into_identity_token(source, nonce)?;
        self.remember(token.refresh_token.as_deref());
        Ok(token)
    }
}

#[async_trait]
impl IdentityProvider for OAuthIdentityProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn acquire_silent(
        &self,
        host_assertion: Option<&str>,
    ) -> Result<IdentityToken, IdentityError> {
        if let Some(assertion) = host_assertion {
            let mut form = vec![
                ("grant_type", JWT_BEARER_GRANT),
                ("assertion", assertion),
                ("scope", self.scope.as_str()),
                ("requested_token_use", "on_behalf_of"),
            ];
            self.with_client_credentials(&mut form);
            return self
                .redeem(&form, AcquisitionSource::HostExchange, None)
                .await;
        }

        let Some(refresh_token) = self.cached_refresh_token() else {
            return Err(IdentityError::InteractionRequired(
                "no cached account".into(),
            ));
        };

        let mut form = vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
            ("scope", self.scope.as_str()),
        ];
        self.with_client_credentials(&mut form);
        self.redeem(&form, AcquisitionSource::Silent, None).await
    }

    fn begin_authorization(&self) -> Result<PendingAuthorization, IdentityError> {
        PendingAuthorization::begin(&AuthorizationRequest {
            authorize_url: &self.authorize_url,
            client_id: &self.client_id,
            redirect_uri: &self.redirect_uri,
            scope: &self.scope,
        })
    }

    async fn complete_authorization(
        &self,
        pending: &PendingAuthorization,
        callback: &AuthorizationCallback,
        source: AcquisitionSource,
    ) -> Result<IdentityToken, IdentityError> {
        callback.verify(pending)?;

        let mut form = vec![
            ("grant_type", "authorization_code"),
            ("code", callback.code.as_str()),
            ("redirect_uri", pending.redirect_uri.as_str()),
            ("code_verifier", pending.code_verifier.as_str()),
        ];
        self.with_client_credentials(&mut form);
        self.redeem(&form, source, Some(pending.nonce.clone())).await
    }

    fn forget(&self) {
        if let Ok(mut guard) = self.cached_refresh_token.lock() {
            *guard = None;
        }
    }
}
