use super::types::{BackendSession, BackendUser, SessionResponse};
use crate::config::BackendConfig;
use crate::error::ExchangeError;
use crate::identity::IdentityToken;
use crate::providers::http_client::build_client_with_timeout;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;

const EXCHANGE_TIMEOUT_SECS: u64 = 30;

/// Backend-as-a-service auth operations.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Trade an identity token for a backend session.
    async fn exchange(
        &self,
        identity: &IdentityToken,
        provider: &str,
    ) -> Result<BackendSession, ExchangeError>;

    async fn sign_out(&self, session: &BackendSession) -> Result<(), ExchangeError>;

    /// Resolve the user behind a backend access token.
    async fn user(&self, access_token: &str) -> Result<BackendUser, ExchangeError>;
}

#[derive(Debug, Serialize)]
struct IdTokenGrant<'a> {
    provider: &'a str,
    id_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    access_token: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nonce: Option<&'a str>,
}

/// HTTP client for the backend's `/auth/v1` endpoints.
pub struct SessionExchanger {
    base_url: String,
    anon_key: String,
    client: Client,
}

impl SessionExchanger {
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            client: build_client_with_timeout(EXCHANGE_TIMEOUT_SECS),
        }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(&config.url, &config.anon_key)
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn read_success(response: Response) -> Result<String, ExchangeError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExchangeError::Http(e.to_string()))?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(ExchangeError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait]
impl SessionBackend for SessionExchanger {
    async fn exchange(
        &self,
        identity: &IdentityToken,
        provider: &str,
    ) -> Result<BackendSession, ExchangeError> {
        let grant = match identity.id_token.as_deref() {
            Some(id_token) => IdTokenGrant {
                provider,
                id_token,
                access_token: Some(&identity.access_token),
                nonce: identity.nonce.as_deref(),
            },
            None => IdTokenGrant {
                provider,
                id_token: &identity.access_token,
                access_token: None,
                nonce: identity.nonce.as_deref(),
            },
        };

        let url = format!("{}/auth/v1/token", self.base_url);
        let response = self
            .request(self.client.post(&url))
            .query(&[("grant_type", "id_token")])
            .json(&grant)
            .send()
            .await
            .map_err(|e| ExchangeError::Http(e.to_string()))?;

        let body = Self::read_success(response).await?;
        let parsed: SessionResponse =
            serde_json::from_str(&body).map_err(|e| ExchangeError::Decode(e.to_string()))?;

        tracing::info!(user = %parsed.user.id, provider, "backend session established");
        parsed.into_session(Utc::now())
    }

    async fn sign_out(&self, session: &BackendSession) -> Result<(), ExchangeError> {
        let url = format!("{}/auth/v1/logout", self.base_url);
        let response = self
            .request(self.client.post(&url))
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(|e| ExchangeError::Http(e.to_string()))?;
        Self::read_success(response).await.map(|_| ())
    }

    async fn user(&self, access_token: &str) -> Result<BackendUser, ExchangeError> {
        let url = format!("{}/auth/v1/user", self.base_url);
        let response = self
            .request(self.client.get(&url))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ExchangeError::Http(e.to_string()))?;

        let body = Self::read_success(response).await?;
        serde_json::from_str(&body).map_err(|e| ExchangeError::Decode(e.to_string()))
    }
}
