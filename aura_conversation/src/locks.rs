//! Per-conversation serialization.
//!
//! A turn holds its conversation's lock from context fetch until both new
//! messages are committed, so two turns of the same conversation never
//! interleave. Different conversations never contend.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub struct ConversationLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ConversationLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to a conversation.
    pub async fn acquire(&self, conversation_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Entries nobody holds or waits on can go.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(conversation_id.to_string()).or_default())
        };

        lock.lock_owned().await
    }

    /// Number of conversations currently tracked.
    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.locks.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_conversation_is_exclusive() {
        let locks = Arc::new(ConversationLocks::new());
        let guard = locks.acquire("c1").await;

        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire("c1").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        assert!(
            tokio::time::timeout(Duration::from_secs(1), contender)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_other_conversations_do_not_contend() {
        let locks = ConversationLocks::new();
        let _c1 = locks.acquire("c1").await;

        let acquired = tokio::time::timeout(Duration::from_millis(100), locks.acquire("c2")).await;
        assert!(acquired.is_ok());
    }

    #[tokio::test]
    async fn test_released_entries_are_pruned() {
        let locks = ConversationLocks::new();
        drop(locks.acquire("c1").await);
        drop(locks.acquire("c2").await);

        // acquiring c3 prunes the idle c1 and c2 entries
        let _c3 = locks.acquire("c3").await;
        assert_eq!(locks.tracked().await, 1);
    }
}
