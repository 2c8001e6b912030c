use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Role, Turn};

/// Who authored a stored message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Parse a persisted sender label. Anything other than `user` is
    /// treated as the assistant.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        if label.eq_ignore_ascii_case("user") {
            Self::User
        } else {
            Self::Assistant
        }
    }

    #[must_use]
    pub const fn role(self) -> Role {
        match self {
            Self::User => Role::User,
            Self::Assistant => Role::Assistant,
        }
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted entry of the conversation log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: i64,
    pub conversation_id: String,
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Polarity in `[-1.0, 1.0]`, only present on user messages.
    pub sentiment: Option<f32>,
}

impl Message {
    #[must_use]
    pub fn to_turn(&self) -> Turn {
        Turn {
            role: self.sender.role(),
            text: self.text.clone(),
        }
    }
}

/// A message about to be appended; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub conversation_id: String,
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub sentiment: Option<f32>,
}

impl NewMessage {
    #[must_use]
    pub fn user(conversation_id: &str, text: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            conversation_id: conversation_id.to_string(),
            sender: Sender::User,
            text: text.to_string(),
            timestamp,
            sentiment: None,
        }
    }

    #[must_use]
    pub fn assistant(conversation_id: &str, text: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            conversation_id: conversation_id.to_string(),
            sender: Sender::Assistant,
            text: text.to_string(),
            timestamp,
            sentiment: None,
        }
    }

    #[must_use]
    pub const fn with_sentiment(mut self, score: f32) -> Self {
        self.sentiment = Some(score);
        self
    }
}
