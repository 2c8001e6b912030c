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

pub mod schema;

pub use schema::{
    Config, ConversationSettings, DATABASE_URL_ENV, DatabaseConfig, GEMINI_API_KEY_ENV,
    GeminiConfig, PersonaConfig, ProvidersConfig, ServerConfig,
};
