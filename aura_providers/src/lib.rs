//! Generation service implementations.

mod gemini;

pub use gemini::{DEFAULT_MODEL, GeminiProvider};
