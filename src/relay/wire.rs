use crate::conversation::Message;
use serde::{Deserialize, Serialize};

/// `POST` body of the relay endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayRequest {
    pub history: Vec<Message>,
    #[serde(rename = "systemPrompt")]
    pub system_prompt: String,
}

/// Success body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayReply {
    pub response: String,
}

/// Failure body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayFailure {
    pub error: String,
}
