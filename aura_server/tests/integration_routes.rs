//! HTTP tests driving the router with `oneshot`.

use std::sync::Arc;

use async_trait::async_trait;
use aura_conversation::{TurnConfig, TurnManager};
use aura_core::{
    FALLBACK_REPLY, Generation, GenerationError, GenerationService, Message, MessageStore,
    NewMessage, Turn,
};
use aura_server::{AppState, ChatResponse, HealthResponse, router};
use aura_store::InMemoryMessageStore;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tower::ServiceExt;

struct FixedGenerator(Option<&'static str>);

#[async_trait]
impl GenerationService for FixedGenerator {
    async fn generate(
        &self,
        _persona: &str,
        _prior_turns: &[Turn],
        _new_message: &str,
    ) -> Result<Generation, GenerationError> {
        self.0.map_or(Err(GenerationError::EmptyResponse), |text| {
            Ok(Generation {
                text: text.to_string(),
                usage: None,
            })
        })
    }

    fn model(&self) -> &str {
        "fixed"
    }
}

struct UnavailableStore;

#[async_trait]
impl MessageStore for UnavailableStore {
    async fn insert(&self, _message: NewMessage) -> anyhow::Result<i64> {
        anyhow::bail!("database is down")
    }

    async fn insert_exchange(
        &self,
        _user: NewMessage,
        _assistant: NewMessage,
    ) -> anyhow::Result<(i64, i64)> {
        anyhow::bail!("database is down")
    }

    async fn query_recent(&self, _id: &str, _limit: usize) -> anyhow::Result<Vec<Message>> {
        anyhow::bail!("database is down")
    }

    async fn count(&self, _id: &str) -> anyhow::Result<u64> {
        anyhow::bail!("database is down")
    }

    async fn recent_scored_user_messages(
        &self,
        _id: &str,
        _limit: usize,
    ) -> anyhow::Result<Vec<Message>> {
        anyhow::bail!("database is down")
    }
}

fn app_with(reply: Option<&'static str>, store: Arc<dyn MessageStore>) -> axum::Router {
    let turns = TurnManager::new(
        Arc::new(FixedGenerator(reply)) as Arc<dyn GenerationService>,
        store,
        TurnConfig::default(),
    );
    router(AppState::new(Arc::new(turns)))
}

fn post_chat(body: &Value) -> Request<Body> {
    Request::post("/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn body_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn test_chat_replies_and_logs_under_user_id() {
    let store = Arc::new(InMemoryMessageStore::new());
    let app = app_with(Some("I'm glad to hear that."), store.clone());

    let response = app
        .oneshot(post_chat(&json!({
            "user_input": "I feel great today",
            "user_id": "u1",
        })))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body: ChatResponse = body_json(response).await;
    assert_eq!(body.response, "I'm glad to hear that.");
    assert!(body.sentiment > 0.0);

    let logged = store.all("u1").await;
    assert_eq!(logged.len(), 2);
    assert_eq!(logged[0].text, "I feel great today");
}

#[tokio::test]
async fn test_chat_without_user_id_uses_default_conversation() {
    let store = Arc::new(InMemoryMessageStore::new());
    let app = app_with(Some("Hi."), store.clone());

    let response = app
        .oneshot(post_chat(&json!({ "user_input": "hello" })))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.all("default").await.len(), 2);
}

#[tokio::test]
async fn test_chat_generation_failure_returns_fallback() {
    let store = Arc::new(InMemoryMessageStore::new());
    let app = app_with(None, store.clone());

    let response = app
        .oneshot(post_chat(&json!({ "user_input": "hello", "user_id": "u2" })))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body: ChatResponse = body_json(response).await;
    assert_eq!(body.response, FALLBACK_REPLY);
    assert!(store.all("u2").await.is_empty());
}

#[tokio::test]
async fn test_chat_store_failure_is_500() {
    let app = app_with(Some("unused"), Arc::new(UnavailableStore));

    let response = app
        .oneshot(post_chat(&json!({ "user_input": "hello" })))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = body_json(response).await;
    assert!(
        body["error"]
            .as_str()
            .is_some_and(|e| e.contains("database is down"))
    );
}

#[tokio::test]
async fn test_mood_history_returns_scored_points() {
    let store = Arc::new(InMemoryMessageStore::new());
    let app = app_with(Some("ok"), store.clone());

    for text in ["I am happy", "I am sad", "what a wonderful day"] {
        let response = app
            .clone()
            .oneshot(post_chat(&json!({ "user_input": text, "user_id": "u3" })))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(
            Request::get("/mood-history?user_id=u3&limit=2")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let points: Vec<Value> = body_json(response).await;
    assert_eq!(points.len(), 2);
    assert!(points[0]["score"].as_f64().is_some_and(|s| s < 0.0));
    assert!(points[1]["score"].as_f64().is_some_and(|s| s > 0.0));
    assert!(points[0]["time"].is_string());
}

#[tokio::test]
async fn test_health() {
    let app = app_with(Some("unused"), Arc::new(InMemoryMessageStore::new()));

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body: HealthResponse = body_json(response).await;
    assert_eq!(body.status, "healthy");
    assert!(!body.timestamp.is_empty());
}

#[tokio::test]
async fn test_cors_preflight_is_allowed() {
    let app = app_with(Some("unused"), Arc::new(InMemoryMessageStore::new()));

    let response = app
        .oneshot(
            Request::options("/chat")
                .header(header::ORIGIN, "http://localhost:3000")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
    );
}
