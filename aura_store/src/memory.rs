use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use aura_core::{Message, MessageStore, NewMessage, Sender};
use tokio::sync::RwLock;

/// Process-local message store. Used by tests and by `aura chat --ephemeral`.
#[derive(Debug, Default)]
pub struct InMemoryMessageStore {
    conversations: RwLock<HashMap<String, Vec<Message>>>,
    next_id: AtomicI64,
}

impl InMemoryMessageStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every message of a conversation, oldest first.
    pub async fn all(&self, conversation_id: &str) -> Vec<Message> {
        let conversations = self.conversations.read().await;
        let mut messages = conversations
            .get(conversation_id)
            .cloned()
            .unwrap_or_default();
        messages.sort_by_key(|m| (m.timestamp, m.id));
        messages
    }

    fn stored(id: i64, message: NewMessage) -> Message {
        Message {
            id,
            conversation_id: message.conversation_id,
            sender: message.sender,
            text: message.text,
            timestamp: message.timestamp,
            sentiment: message.sentiment,
        }
    }

    async fn newest_first<F>(&self, conversation_id: &str, limit: usize, keep: F) -> Vec<Message>
    where
        F: Fn(&Message) -> bool,
    {
        let mut messages = self.all(conversation_id).await;
        messages.retain(|m| keep(m));
        messages.reverse();
        messages.truncate(limit);
        messages
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn insert(&self, message: NewMessage) -> anyhow::Result<i64> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let stored = Self::stored(id, message);

        self.conversations
            .write()
            .await
            .entry(stored.conversation_id.clone())
            .or_default()
            .push(stored);

        Ok(id)
    }

    async fn insert_exchange(
        &self,
        user: NewMessage,
        assistant: NewMessage,
    ) -> anyhow::Result<(i64, i64)> {
        let mut conversations = self.conversations.write().await;
        let user_id = self.next_id.fetch_add(2, Ordering::SeqCst) + 1;
        let assistant_id = user_id + 1;

        for stored in [
            Self::stored(user_id, user),
            Self::stored(assistant_id, assistant),
        ] {
            conversations
                .entry(stored.conversation_id.clone())
                .or_default()
                .push(stored);
        }

        Ok((user_id, assistant_id))
    }

    async fn query_recent(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<Message>> {
        Ok(self.newest_first(conversation_id, limit, |_| true).await)
    }

    async fn count(&self, conversation_id: &str) -> anyhow::Result<u64> {
        let conversations = self.conversations.read().await;
        let len = conversations.get(conversation_id).map_or(0, Vec::len);
        Ok(u64::try_from(len)?)
    }

    async fn recent_scored_user_messages(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<Message>> {
        Ok(self
            .newest_first(conversation_id, limit, |m| {
                m.sender == Sender::User && m.sentiment.is_some()
            })
            .await)
    }
}
