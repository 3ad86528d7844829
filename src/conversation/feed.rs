use super::types::{Conversation, ConversationChange};
use tokio::sync::broadcast;

const FEED_CAPACITY: usize = 256;

/// Fan-out of conversation row changes to realtime subscribers.
#[derive(Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ConversationChange>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(FEED_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConversationChange> {
        self.sender.subscribe()
    }

    /// Publish a saved row. Returns the number of live subscribers reached.
    pub fn publish(&self, conversation: &Conversation) -> usize {
        let change = ConversationChange {
            user_id: conversation.user_id.clone(),
            mode: conversation.mode,
            message_count: conversation.messages.len(),
            updated_at: conversation.updated_at.clone(),
        };
        // No subscribers is not an error.
        self.sender.send(change).unwrap_or(0)
    }
}
