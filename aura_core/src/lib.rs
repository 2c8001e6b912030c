#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod error;
pub mod message;
pub mod sentiment;
pub mod util;

pub use error::GenerationError;
pub use message::{Message, NewMessage, Sender};
pub use sentiment::{LexiconSentiment, SentimentAnalyzer};
pub use util::{DEFAULT_CONVERSATION_ID, DEFAULT_PERSONA_INSTRUCTION, FALLBACK_REPLY};

/// Role a turn plays in the context handed to the generation service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of a context window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Reply produced by a generation service.
#[derive(Debug, Clone)]
pub struct Generation {
    pub text: String,
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Append-only message log keyed by conversation id.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Append a message and return its store-assigned id.
    async fn insert(&self, message: NewMessage) -> anyhow::Result<i64>;

    /// Append a user message and its reply as one unit: both are stored or
    /// neither is. Returns the two ids in order.
    async fn insert_exchange(
        &self,
        user: NewMessage,
        assistant: NewMessage,
    ) -> anyhow::Result<(i64, i64)>;

    /// The `limit` most recent messages of a conversation, newest first.
    async fn query_recent(&self, conversation_id: &str, limit: usize)
    -> anyhow::Result<Vec<Message>>;

    /// Number of messages stored for a conversation.
    async fn count(&self, conversation_id: &str) -> anyhow::Result<u64>;

    /// The `limit` most recent user messages carrying a sentiment score, newest first.
    async fn recent_scored_user_messages(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<Message>>;
}

/// Stateless request/response text generation.
///
/// Every call carries the full context; implementations must not rely on
/// any session held on the remote side.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(
        &self,
        persona: &str,
        prior_turns: &[Turn],
        new_message: &str,
    ) -> Result<Generation, GenerationError>;

    fn model(&self) -> &str;
}

#[async_trait]
impl<T: MessageStore + ?Sized> MessageStore for Arc<T> {
    async fn insert(&self, message: NewMessage) -> anyhow::Result<i64> {
        (**self).insert(message).await
    }

    async fn insert_exchange(
        &self,
        user: NewMessage,
        assistant: NewMessage,
    ) -> anyhow::Result<(i64, i64)> {
        (**self).insert_exchange(user, assistant).await
    }

    async fn query_recent(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<Message>> {
        (**self).query_recent(conversation_id, limit).await
    }

    async fn count(&self, conversation_id: &str) -> anyhow::Result<u64> {
        (**self).count(conversation_id).await
    }

    async fn recent_scored_user_messages(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<Message>> {
        (**self)
            .recent_scored_user_messages(conversation_id, limit)
            .await
    }
}

#[async_trait]
impl<T: GenerationService + ?Sized> GenerationService for Arc<T> {
    async fn generate(
        &self,
        persona: &str,
        prior_turns: &[Turn],
        new_message: &str,
    ) -> Result<Generation, GenerationError> {
        (**self).generate(persona, prior_turns, new_message).await
    }

    fn model(&self) -> &str {
        (**self).model()
    }
}
