use crate::conversation::{ConversationChange, Mode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Ping,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Connected {
        version: String,
    },
    ConversationChanged {
        mode: Mode,
        message_count: usize,
        updated_at: String,
    },
    Error {
        message: String,
    },
    Pong,
}

impl ServerMessage {
    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn changed(change: ConversationChange) -> Self {
        Self::ConversationChanged {
            mode: change.mode,
            message_count: change.message_count,
            updated_at: change.updated_at,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"type":"error","message":"serialization failed"}"#.to_string())
    }
}
