use super::store::ConversationStore;
use super::types::{Conversation, Message, Mode};
use crate::error::StoreError;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

/// Body of `PUT /api/conversations/{mode}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveConversationBody {
    pub messages: Vec<Message>,
}

/// Conversation table reached through the gateway with the backend session token.
///
/// The gateway derives the user from the bearer token, so the `user_id`
/// argument only has to match the signed-in user; it is not sent.
pub struct RemoteConversationStore {
    base_url: String,
    access_token: String,
    client: Client,
}

impl RemoteConversationStore {
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            access_token: access_token.into(),
            client: Client::new(),
        }
    }

    fn url(&self, mode: Mode) -> String {
        format!("{}/{mode}", self.base_url.trim_end_matches('/'))
    }
}

async fn remote_error(response: reqwest::Response) -> StoreError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    StoreError::Remote { status, body }
}

impl ConversationStore for RemoteConversationStore {
    fn load<'a>(
        &'a self,
        _user_id: &'a str,
        mode: Mode,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Conversation>, StoreError>> + Send + 'a>> {
        Box::pin(async move {
            let response = self
                .client
                .get(self.url(mode))
                .bearer_auth(&self.access_token)
                .send()
                .await
                .map_err(|e| StoreError::Query(e.to_string()))?;

            match response.status() {
                StatusCode::NOT_FOUND => Ok(None),
                status if status.is_success() => response
                    .json::<Conversation>()
                    .await
                    .map(Some)
                    .map_err(|e| StoreError::Corrupt(e.to_string())),
                _ => Err(remote_error(response).await),
            }
        })
    }

    fn save<'a>(
        &'a self,
        _user_id: &'a str,
        mode: Mode,
        messages: &'a [Message],
    ) -> Pin<Box<dyn Future<Output = Result<Conversation, StoreError>> + Send + 'a>> {
        Box::pin(async move {
            let body = SaveConversationBody {
                messages: messages.to_vec(),
            };
            let response = self
                .client
                .put(self.url(mode))
                .bearer_auth(&self.access_token)
                .json(&body)
                .send()
                .await
                .map_err(|e| StoreError::Query(e.to_string()))?;

            if !response.status().is_success() {
                return Err(remote_error(response).await);
            }
            response
                .json::<Conversation>()
                .await
                .map_err(|e| StoreError::Corrupt(e.to_string()))
        })
    }
}
