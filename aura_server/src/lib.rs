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

//! HTTP API for the companion chat.
//!
//! - `POST /chat`: take one turn
//! - `GET /mood-history`: sentiment trend of a conversation
//! - `GET /health`: liveness probe

mod error;
mod routes;

use std::sync::Arc;

use aura_conversation::TurnManager;
use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::{Error, Result};
pub use routes::{ChatRequest, ChatResponse, HealthResponse, MoodHistoryQuery};

/// Handles shared by every request, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub turns: Arc<TurnManager>,
}

impl AppState {
    #[must_use]
    pub const fn new(turns: Arc<TurnManager>) -> Self {
        Self { turns }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(routes::chat))
        .route("/mood-history", get(routes::mood_history))
        .route("/health", get(routes::health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `host:port`. `host` may be a name such as `localhost`.
pub async fn bind(host: &str, port: u16) -> Result<TcpListener> {
    let listener = TcpListener::bind((host, port)).await?;
    info!("Bound {host}:{port} to {}", listener.local_addr()?);
    Ok(listener)
}

/// Serve until Ctrl-C.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
