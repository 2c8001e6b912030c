//! Context window assembly.
//!
//! The store hands back the most recent messages newest first; the
//! generation service wants them oldest first, tagged with a role.

use aura_core::{Message, Turn};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Turn a newest-first slice of stored messages into a chronological context.
#[must_use]
pub fn context_from_recent(mut recent: Vec<Message>) -> Vec<Turn> {
    recent.reverse();
    recent.iter().map(Message::to_turn).collect()
}

/// One point of a user's mood trend.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct MoodPoint {
    pub score: f32,
    pub time: DateTime<Utc>,
}

/// Mood points from newest-first scored messages, oldest first.
#[must_use]
pub fn mood_points(mut recent: Vec<Message>) -> Vec<MoodPoint> {
    recent.reverse();
    recent
        .into_iter()
        .filter_map(|m| {
            m.sentiment.map(|score| MoodPoint {
                score,
                time: m.timestamp,
            })
        })
        .collect()
}

/// Statistics about a context window.
#[derive(Debug, Clone, Default)]
pub struct ContextStats {
    pub total_turns: usize,
    pub user_turns: usize,
    pub assistant_turns: usize,
    pub total_characters: usize,
    pub estimated_tokens: usize,
}

impl ContextStats {
    #[must_use]
    pub fn of(turns: &[Turn]) -> Self {
        let total_characters: usize = turns.iter().map(|t| t.text.len()).sum();
        let user_turns = turns
            .iter()
            .filter(|t| t.role == aura_core::Role::User)
            .count();

        Self {
            total_turns: turns.len(),
            user_turns,
            assistant_turns: turns.len() - user_turns,
            total_characters,
            estimated_tokens: total_characters / 4, // Rough estimate: 4 chars per token
        }
    }
}
