//! Integration tests for the sea-orm message store on a sqlite file.
//!
//! These tests verify that:
//! - The schema is created on first connect and reused afterwards
//! - `query_recent` returns newest first and honours the limit
//! - Equal timestamps fall back to insertion order
//! - Scored user messages are filtered for mood history
//! - An exchange is committed whole or not at all

use aura_core::{MessageStore, NewMessage, Sender};
use aura_store::DatabaseMessageStore;
use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use sea_orm::ConnectionTrait;
use tempfile::TempDir;

async fn open_store(dir: &TempDir) -> DatabaseMessageStore {
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("aura.db").display());
    DatabaseMessageStore::connect(&url)
        .await
        .expect("Failed to open sqlite store")
}

#[tokio::test]
async fn test_query_recent_newest_first_with_limit() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir).await;
    let base = Utc::now();

    for i in 0..5 {
        store
            .insert(NewMessage::user(
                "c1",
                &format!("m{i}"),
                base + Duration::milliseconds(i),
            ))
            .await
            .expect("insert");
    }

    let recent = store.query_recent("c1", 3).await.expect("query");
    let texts: Vec<_> = recent.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["m4", "m3", "m2"]);

    let all = store.query_recent("c1", 100).await.expect("query");
    assert_eq!(all.len(), 5);
    assert_eq!(store.count("c1").await.expect("count"), 5);
}

#[tokio::test]
async fn test_equal_timestamps_keep_insertion_order() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir).await;
    let now = Utc::now();

    store
        .insert(NewMessage::user("c1", "question", now))
        .await
        .expect("insert");
    store
        .insert(NewMessage::assistant("c1", "answer", now))
        .await
        .expect("insert");

    let recent = store.query_recent("c1", 10).await.expect("query");
    assert_eq!(recent[0].sender, Sender::Assistant);
    assert_eq!(recent[1].sender, Sender::User);
}

#[tokio::test]
async fn test_timestamp_round_trips_at_microsecond_precision() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir).await;
    let now = Utc::now();

    store
        .insert(NewMessage::user("c1", "hi", now).with_sentiment(0.25))
        .await
        .expect("insert");

    let stored = store.query_recent("c1", 1).await.expect("query");
    assert_eq!(
        stored[0].timestamp.timestamp_micros(),
        now.timestamp_micros()
    );
    assert_eq!(stored[0].sentiment, Some(0.25));
}

#[tokio::test]
async fn test_scored_user_messages_only() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir).await;
    let base = Utc::now();

    store
        .insert(NewMessage::user("c1", "good day", base).with_sentiment(0.7))
        .await
        .expect("insert");
    store
        .insert(NewMessage::assistant(
            "c1",
            "glad",
            base + Duration::milliseconds(1),
        ))
        .await
        .expect("insert");
    store
        .insert(NewMessage::user(
            "c1",
            "unscored",
            base + Duration::milliseconds(2),
        ))
        .await
        .expect("insert");
    store
        .insert(NewMessage::user("c2", "other", base).with_sentiment(-0.5))
        .await
        .expect("insert");

    let scored = store
        .recent_scored_user_messages("c1", 7)
        .await
        .expect("query");
    assert_eq!(scored.len(), 1);
    assert_eq!(scored[0].text, "good day");
}

#[tokio::test]
async fn test_reconnect_reuses_existing_table() {
    let dir = TempDir::new().expect("tempdir");

    {
        let store = open_store(&dir).await;
        store
            .insert(NewMessage::user("c1", "persisted", Utc::now()))
            .await
            .expect("insert");
        store.close().await.expect("close");
    }

    let store = open_store(&dir).await;
    store.ping().await.expect("ping");
    assert_eq!(store.count("c1").await.expect("count"), 1);
}

#[tokio::test]
async fn test_insert_exchange_commits_both_messages() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir).await;
    let now = Utc::now();

    let (user_id, assistant_id) = store
        .insert_exchange(
            NewMessage::user("c1", "hello", now).with_sentiment(0.0),
            NewMessage::assistant("c1", "hi there", now),
        )
        .await
        .expect("insert_exchange");

    assert!(assistant_id > user_id);
    let recent = store.query_recent("c1", 10).await.expect("query");
    let texts: Vec<_> = recent.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["hi there", "hello"]);
}

#[tokio::test]
async fn test_insert_exchange_rolls_back_when_reply_insert_fails() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir).await;
    store
        .insert(NewMessage::user("c1", "earlier", Utc::now()))
        .await
        .expect("insert");

    store
        .db()
        .execute_unprepared(
            "CREATE TRIGGER reject_replies BEFORE INSERT ON messages \
             WHEN NEW.sender = 'assistant' \
             BEGIN SELECT RAISE(ABORT, 'replies rejected'); END;",
        )
        .await
        .expect("create trigger");

    let now = Utc::now();
    let result = store
        .insert_exchange(
            NewMessage::user("c1", "hello", now),
            NewMessage::assistant("c1", "hi there", now),
        )
        .await;

    assert!(result.is_err());
    assert_eq!(store.count("c1").await.expect("count"), 1);
    let recent = store.query_recent("c1", 10).await.expect("query");
    assert_eq!(recent[0].text, "earlier");
}
