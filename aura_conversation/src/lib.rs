#![warn(
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

//! Conversation turn-history protocol.
//!
//! Every turn replays the most recent messages of a conversation as an
//! explicit, chronological context window, asks the generation service for
//! a reply, and appends the user and assistant messages to the log.
//!
//! # Key Features
//! - Stateless context replay (no remote chat session)
//! - Explicit [`TurnOutcome`] separating replies from recoverable failures
//! - Bounded generation timeout
//! - Optional per-conversation write serialization
//! - Sentiment scoring and mood history for user messages

mod history;
mod locks;
mod manager;

pub use history::{ContextStats, MoodPoint, context_from_recent, mood_points};
pub use locks::ConversationLocks;
pub use manager::{ConversationError, TurnConfig, TurnManager, TurnOutcome, TurnRequest};
