//! Request handlers.

use aura_conversation::{MoodPoint, TurnRequest};
use aura_core::DEFAULT_CONVERSATION_ID;
use axum::Json;
use axum::extract::{Query, State};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::AppState;
use crate::error::Result;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub user_input: String,
    #[serde(default)]
    pub user_id: Option<String>,
    /// Facial-expression label from the video client
    #[serde(default)]
    pub emotion: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub sentiment: f32,
}

#[derive(Debug, Deserialize)]
pub struct MoodHistoryQuery {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

/// Blank or missing ids share the default conversation.
fn resolve_conversation_id(user_id: Option<String>) -> String {
    user_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CONVERSATION_ID.to_string())
}

pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let conversation_id = resolve_conversation_id(request.user_id);
    debug!("POST /chat for conversation: {conversation_id}");

    let outcome = state
        .turns
        .take_turn(
            TurnRequest::new(conversation_id, request.user_input).with_emotion(request.emotion),
        )
        .await?;

    let sentiment = outcome.sentiment();
    Ok(Json(ChatResponse {
        response: outcome.into_reply(),
        sentiment,
    }))
}

pub async fn mood_history(
    State(state): State<AppState>,
    Query(query): Query<MoodHistoryQuery>,
) -> Result<Json<Vec<MoodPoint>>> {
    let conversation_id = resolve_conversation_id(query.user_id);
    let points = state
        .turns
        .mood_history(&conversation_id, query.limit)
        .await?;
    Ok(Json(points))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_id_defaults() {
        assert_eq!(resolve_conversation_id(None), "default");
        assert_eq!(resolve_conversation_id(Some("  ".to_string())), "default");
        assert_eq!(resolve_conversation_id(Some("u42".to_string())), "u42");
    }
}
