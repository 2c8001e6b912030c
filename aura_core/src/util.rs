//! Fixed strings shared by every surface of the companion.

/// Reply returned whenever the generation service fails or times out.
pub const FALLBACK_REPLY: &str = "I'm having trouble connecting, but I'm here for you.";

/// Conversation used when a caller does not identify itself.
pub const DEFAULT_CONVERSATION_ID: &str = "default";

/// Default persona instruction for the companion.
pub const DEFAULT_PERSONA_INSTRUCTION: &str = "You are Serenity, an empathetic AI companion. \
Keep responses short, warm, and supportive. \
Never diagnose or prescribe; if the user may be in danger, gently encourage them to contact local emergency services or a crisis line.";

/// Extend a persona instruction with a detected facial-expression label.
///
/// Blank labels leave the instruction untouched.
#[must_use]
pub fn persona_with_emotion(persona: &str, emotion: Option<&str>) -> String {
    match emotion.map(str::trim) {
        Some(label) if !label.is_empty() => format!(
            "{persona}\n\nThe user is communicating via video chat. \
Their facial expression analysis detects: [{}]. Acknowledge their visible emotion subtly.",
            label.to_uppercase()
        ),
        _ => persona.to_string(),
    }
}
