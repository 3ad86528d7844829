use super::wire::{RelayReply, RelayRequest};
use crate::error::RelayError;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::AUTHORIZATION;

/// One conversational turn through the relay endpoint.
#[async_trait]
pub trait Relay: Send + Sync {
    /// Returns the assistant reply, or the relay's error body for status >= 400.
    async fn send(&self, request: &RelayRequest, bearer: Option<&str>)
    -> Result<String, RelayError>;
}

/// HTTP relay client. Single POST per turn: no timeout, no retry, no streaming.
pub struct RelayClient {
    url: String,
    client: Client,
}

impl RelayClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Relay for RelayClient {
    async fn send(
        &self,
        request: &RelayRequest,
        bearer: Option<&str>,
    ) -> Result<String, RelayError> {
        let mut builder = self.client.post(&self.url).json(request);
        if let Some(token) = bearer {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| RelayError::Http(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RelayError::Http(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "relay returned an error status");
            return Err(RelayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let reply: RelayReply =
            serde_json::from_str(&body).map_err(|e| RelayError::Decode(format!("{e}: {body}")))?;
        Ok(reply.response)
    }
}
