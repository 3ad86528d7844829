use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

const COACH_PROMPT: &str = "You are an encouraging AI coach. Help the user set concrete goals, \
break them into small next steps, and hold them accountable. Ask one focused question at a time \
and keep answers short and practical.";

const MENTOR_PROMPT: &str = "You are a thoughtful AI mentor with broad professional experience. \
Share perspective, frameworks and lessons learned, explain trade-offs, and help the user reflect \
on their own situation rather than prescribing a single answer.";

const COACH_WELCOME: &str = "Hi, I'm your AI coach. What goal would you like to work on today?";

const MENTOR_WELCOME: &str =
    "Hello, I'm your AI mentor. What's on your mind? Tell me about a challenge you're facing.";

/// The two fixed conversation modes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    #[default]
    Coach,
    Mentor,
}

impl Mode {
    /// Instruction string sent to the relay as `systemPrompt`.
    pub fn system_prompt(self) -> &'static str {
        match self {
            Self::Coach => COACH_PROMPT,
            Self::Mentor => MENTOR_PROMPT,
        }
    }

    /// Greeting shown when the user has no stored history for this mode.
    pub fn welcome_message(self) -> Message {
        let text = match self {
            Self::Coach => COACH_WELCOME,
            Self::Mentor => MENTOR_WELCOME,
        };
        Message::assistant(text)
    }
}

/// Ordered messages for one (user, mode) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub user_id: String,
    pub mode: Mode,
    pub messages: Vec<Message>,
    /// RFC 3339 timestamp of the last write
    pub updated_at: String,
}

/// Realtime notification emitted whenever a conversation row is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationChange {
    pub user_id: String,
    pub mode: Mode,
    pub message_count: usize,
    pub updated_at: String,
}
