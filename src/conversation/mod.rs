pub mod controller;
pub mod feed;
pub mod remote;
pub mod store;
pub mod types;

pub use controller::{ChatController, SendOutcome};
pub use feed::ChangeFeed;
pub use remote::{RemoteConversationStore, SaveConversationBody};
pub use store::{ConversationStore, MemoryConversationStore, SqliteConversationStore};
pub use types::{Conversation, ConversationChange, Message, Mode, Role};
