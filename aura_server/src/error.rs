use aura_conversation::ConversationError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Conversation(#[from] ConversationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Conversation(ConversationError::EmptyConversationId) => StatusCode::BAD_REQUEST,
            Self::Conversation(ConversationError::Store(_)) | Self::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {self:#}");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
