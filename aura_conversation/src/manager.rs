//! Conversation turn manager.
//!
//! The `TurnManager` owns the turn-taking protocol: replay the last K
//! messages as explicit context, ask the generation service for a reply,
//! and commit the exchange back to the log.

use std::sync::Arc;
use std::time::Duration;

use aura_core::util::persona_with_emotion;
use aura_core::{
    DEFAULT_PERSONA_INSTRUCTION, FALLBACK_REPLY, GenerationError, GenerationService,
    LexiconSentiment, Message, MessageStore, NewMessage, SentimentAnalyzer, Turn,
};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::history::{ContextStats, MoodPoint, context_from_recent, mood_points};
use crate::locks::ConversationLocks;

/// Round up to the microsecond precision the store keeps.
fn ceil_to_micros(at: DateTime<Utc>) -> DateTime<Utc> {
    let carry = i64::from(at.timestamp_subsec_nanos() % 1_000 != 0);
    DateTime::from_timestamp_micros(at.timestamp_micros() + carry).unwrap_or(at)
}

/// Configuration for turn management.
#[derive(Debug, Clone)]
pub struct TurnConfig {
    /// Persona instruction sent with every generation call
    pub persona: String,
    /// Number of stored messages replayed as context
    pub history_limit: usize,
    /// Upper bound on a single generation call
    pub generation_timeout: Duration,
    /// Hold a per-conversation lock for the whole turn
    pub serialize_writes: bool,
    /// Default number of points returned by mood history
    pub mood_history_limit: usize,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            persona: DEFAULT_PERSONA_INSTRUCTION.to_string(),
            history_limit: 10,
            generation_timeout: Duration::from_secs(30),
            serialize_writes: true,
            mood_history_limit: 7,
        }
    }
}

impl TurnConfig {
    /// Set the persona instruction.
    #[must_use]
    pub fn with_persona(mut self, persona: String) -> Self {
        self.persona = persona;
        self
    }

    /// Set the history limit.
    #[must_use]
    pub const fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Set the generation timeout.
    #[must_use]
    pub const fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    /// Enable or disable per-conversation serialization.
    #[must_use]
    pub const fn with_serialize_writes(mut self, serialize: bool) -> Self {
        self.serialize_writes = serialize;
        self
    }
}

/// Errors that can occur while taking a turn.
///
/// Generation failures are not among them: they become
/// [`TurnOutcome::Fallback`].
#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("Message store error: {0}")]
    Store(anyhow::Error),

    #[error("Conversation id must not be empty")]
    EmptyConversationId,
}

/// A single user utterance to process.
#[derive(Debug, Clone)]
pub struct TurnRequest {
    pub conversation_id: String,
    pub user_text: String,
    /// Detected facial-expression label, if the client sent one
    pub emotion: Option<String>,
}

impl TurnRequest {
    #[must_use]
    pub fn new(conversation_id: impl Into<String>, user_text: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            user_text: user_text.into(),
            emotion: None,
        }
    }

    #[must_use]
    pub fn with_emotion(mut self, emotion: Option<String>) -> Self {
        self.emotion = emotion;
        self
    }
}

/// Result of a turn: either a committed reply or a recoverable generation failure.
#[derive(Debug)]
pub enum TurnOutcome {
    Replied {
        reply: String,
        sentiment: f32,
        user_message_id: i64,
        assistant_message_id: i64,
    },
    /// Nothing was written to the store.
    Fallback {
        error: GenerationError,
        sentiment: f32,
    },
}

impl TurnOutcome {
    /// Text to show the user: the reply, or the fixed fallback.
    #[must_use]
    pub fn reply(&self) -> &str {
        match self {
            Self::Replied { reply, .. } => reply.as_str(),
            Self::Fallback { .. } => FALLBACK_REPLY,
        }
    }

    #[must_use]
    pub fn into_reply(self) -> String {
        match self {
            Self::Replied { reply, .. } => reply,
            Self::Fallback { .. } => FALLBACK_REPLY.to_string(),
        }
    }

    #[must_use]
    pub const fn sentiment(&self) -> f32 {
        match self {
            Self::Replied { sentiment, .. } | Self::Fallback { sentiment, .. } => *sentiment,
        }
    }

    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Conversation turn manager.
///
/// Shared by reference across requests; holds no per-conversation state
/// besides the write locks.
pub struct TurnManager<G = Arc<dyn GenerationService>, S = Arc<dyn MessageStore>>
where
    G: Send + Sync,
    S: Send + Sync,
{
    generator: G,
    store: S,
    config: TurnConfig,
    locks: ConversationLocks,
    sentiment: Box<dyn SentimentAnalyzer>,
}

impl<G, S> TurnManager<G, S>
where
    G: GenerationService + Send + Sync,
    S: MessageStore + Send + Sync,
{
    /// Create a new turn manager.
    pub fn new(generator: G, store: S, config: TurnConfig) -> Self {
        info!(
            "Creating turn manager: model={}, history_limit={}, timeout={:?}",
            generator.model(),
            config.history_limit,
            config.generation_timeout
        );

        Self {
            generator,
            store,
            config,
            locks: ConversationLocks::new(),
            sentiment: Box::new(LexiconSentiment::new()),
        }
    }

    /// Replace the sentiment analyzer.
    #[must_use]
    pub fn with_sentiment_analyzer<A>(mut self, analyzer: A) -> Self
    where
        A: SentimentAnalyzer + 'static,
    {
        self.sentiment = Box::new(analyzer);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &TurnConfig {
        &self.config
    }

    /// The `window_size` most recent messages, oldest first, as turns.
    ///
    /// A window of zero is treated as one.
    pub async fn build_context(
        &self,
        conversation_id: &str,
        window_size: usize,
    ) -> Result<Vec<Turn>, ConversationError> {
        Self::check_conversation_id(conversation_id)?;
        let recent = self.fetch_recent(conversation_id, window_size).await?;
        Ok(context_from_recent(recent))
    }

    async fn fetch_recent(
        &self,
        conversation_id: &str,
        window_size: usize,
    ) -> Result<Vec<Message>, ConversationError> {
        self.store
            .query_recent(conversation_id, window_size.max(1))
            .await
            .map_err(ConversationError::Store)
    }

    /// Process one turn.
    ///
    /// Only store failures are returned as errors. A failed or timed-out
    /// generation yields [`TurnOutcome::Fallback`] and leaves the log as it was.
    pub async fn take_turn(&self, request: TurnRequest) -> Result<TurnOutcome, ConversationError> {
        let conversation_id = request.conversation_id.as_str();
        Self::check_conversation_id(conversation_id)?;

        let started_at = Utc::now();
        let _guard = if self.config.serialize_writes {
            Some(self.locks.acquire(conversation_id).await)
        } else {
            None
        };

        let recent = self
            .fetch_recent(conversation_id, self.config.history_limit)
            .await?;
        // New messages never sort before what is already stored, whatever
        // the local clock says.
        let not_before = recent
            .first()
            .map_or(started_at, |newest| newest.timestamp.max(started_at));
        let context = context_from_recent(recent);
        let stats = ContextStats::of(&context);
        debug!(
            "Context for {conversation_id}: {} turns (~{} tokens)",
            stats.total_turns, stats.estimated_tokens
        );

        let persona = persona_with_emotion(&self.config.persona, request.emotion.as_deref());
        let sentiment = self.sentiment.polarity(&request.user_text);

        let generated = tokio::time::timeout(
            self.config.generation_timeout,
            self.generator
                .generate(&persona, &context, &request.user_text),
        )
        .await
        .unwrap_or(Err(GenerationError::Timeout(self.config.generation_timeout)));

        let generation = match generated {
            Ok(generation) => generation,
            Err(error) => {
                warn!(
                    "Generation failed for {conversation_id} ({}): {error}",
                    error.kind()
                );
                return Ok(TurnOutcome::Fallback { error, sentiment });
            }
        };

        if let Some(usage) = &generation.usage {
            debug!(
                "Tokens: {} prompt + {} completion = {} total",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        let user_at = ceil_to_micros(Utc::now().max(not_before));
        let assistant_at = ceil_to_micros(Utc::now().max(user_at));
        let (user_message_id, assistant_message_id) = self
            .store
            .insert_exchange(
                NewMessage::user(conversation_id, &request.user_text, user_at)
                    .with_sentiment(sentiment),
                NewMessage::assistant(conversation_id, &generation.text, assistant_at),
            )
            .await
            .map_err(ConversationError::Store)?;

        info!("Turn committed for conversation: {conversation_id}");

        Ok(TurnOutcome::Replied {
            reply: generation.text,
            sentiment,
            user_message_id,
            assistant_message_id,
        })
    }

    /// Reply to `user_text`, falling back to the fixed reply on generation failure.
    pub async fn converse(
        &self,
        conversation_id: &str,
        user_text: &str,
    ) -> Result<String, ConversationError> {
        self.take_turn(TurnRequest::new(conversation_id, user_text))
            .await
            .map(TurnOutcome::into_reply)
    }

    /// The last `limit` sentiment scores of a conversation, oldest first.
    pub async fn mood_history(
        &self,
        conversation_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<MoodPoint>, ConversationError> {
        Self::check_conversation_id(conversation_id)?;

        let limit = limit.unwrap_or(self.config.mood_history_limit);
        let recent = self
            .store
            .recent_scored_user_messages(conversation_id, limit)
            .await
            .map_err(ConversationError::Store)?;

        Ok(mood_points(recent))
    }

    /// Number of messages logged for a conversation.
    pub async fn message_count(&self, conversation_id: &str) -> Result<u64, ConversationError> {
        self.store
            .count(conversation_id)
            .await
            .map_err(ConversationError::Store)
    }

    fn check_conversation_id(conversation_id: &str) -> Result<(), ConversationError> {
        if conversation_id.trim().is_empty() {
            return Err(ConversationError::EmptyConversationId);
        }
        Ok(())
    }
}
