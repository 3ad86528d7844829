use super::store::ConversationStore;
use super::types::{Message, Mode};
use crate::relay::{Relay, RelayRequest};
use std::sync::Arc;

/// What a call to [`ChatController::send`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Input was empty or whitespace; nothing was sent.
    Skipped,
    /// The relay answered and the reply was appended.
    Replied,
    /// The relay failed; the error text was appended as the assistant message.
    Failed,
}

/// Visible chat state for one signed-in user.
///
/// Each turn appends exactly two messages (user, then assistant) and then
/// saves the whole conversation opportunistically: a failed save is logged,
/// never shown.
pub struct ChatController {
    user_id: String,
    mode: Mode,
    messages: Vec<Message>,
    relay: Arc<dyn Relay>,
    store: Arc<dyn ConversationStore>,
    bearer: Option<String>,
}

impl ChatController {
    /// Create a controller and load the stored history for `mode`.
    pub async fn open(
        user_id: impl Into<String>,
        mode: Mode,
        relay: Arc<dyn Relay>,
        store: Arc<dyn ConversationStore>,
        bearer: Option<String>,
    ) -> Self {
        let mut controller = Self {
            user_id: user_id.into(),
            mode,
            messages: Vec::new(),
            relay,
            store,
            bearer,
        };
        controller.switch_mode(mode).await;
        controller
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Replace the bearer token after a silent session refresh.
    pub fn set_bearer(&mut self, bearer: Option<String>) {
        self.bearer = bearer;
    }

    /// Reset the visible conversation to `mode`'s stored history, or its welcome message.
    pub async fn switch_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.messages = match self.store.load(&self.user_id, mode).await {
            Ok(Some(conversation)) if !conversation.messages.is_empty() => conversation.messages,
            Ok(_) => vec![mode.welcome_message()],
            Err(error) => {
                tracing::warn!(%error, %mode, "could not load stored conversation");
                vec![mode.welcome_message()]
            }
        };
    }

    pub async fn send(&mut self, input: &str) -> SendOutcome {
        let text = input.trim();
        if text.is_empty() {
            return SendOutcome::Skipped;
        }

        self.messages.push(Message::user(text));
        let request = RelayRequest {
            history: self.messages.clone(),
            system_prompt: self.mode.system_prompt().to_string(),
        };

        let outcome = match self.relay.send(&request, self.bearer.as_deref()).await {
            Ok(reply) => {
                self.messages.push(Message::assistant(reply));
                SendOutcome::Replied
            }
            Err(error) => {
                tracing::warn!(%error, mode = %self.mode, "relay turn failed");
                self.messages.push(Message::assistant(error.to_string()));
                SendOutcome::Failed
            }
        };

        if let Err(error) = self
            .store
            .save(&self.user_id, self.mode, &self.messages)
            .await
        {
            tracing::warn!(%error, mode = %self.mode, "conversation not persisted");
        }

        outcome
    }
}
