//! In-memory message store.
//!
//! Used by unit and integration tests, and by `STORE_BACKEND=memory` for
//! local development without a database. Ordering and id assignment match
//! the PostgreSQL store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::message::{Message, NewMessage};

use super::MessageStore;

/// Configuration for in-memory store behavior.
#[derive(Debug, Clone, Default)]
pub struct MemoryStoreConfig {
    /// Whether to fail list requests.
    pub fail_reads: bool,
    /// Whether to fail create requests.
    pub fail_writes: bool,
    /// Simulated latency in milliseconds.
    pub latency_ms: u64,
}

#[derive(Debug, Default)]
struct Rows {
    next_id: i32,
    messages: Vec<Message>,
}

/// Message store that keeps rows in process memory.
#[derive(Debug, Clone)]
pub struct MemoryMessageStore {
    rows: Arc<RwLock<Rows>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    latency_ms: u64,
}

impl MemoryMessageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::with_config(MemoryStoreConfig::default())
    }

    /// Create an empty store with custom behavior.
    pub fn with_config(config: MemoryStoreConfig) -> Self {
        Self {
            rows: Arc::new(RwLock::new(Rows {
                next_id: 1,
                messages: Vec::new(),
            })),
            fail_reads: Arc::new(AtomicBool::new(config.fail_reads)),
            fail_writes: Arc::new(AtomicBool::new(config.fail_writes)),
            latency_ms: config.latency_ms,
        }
    }

    /// Toggle read failures.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Toggle write failures.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of stored rows.
    pub async fn len(&self) -> usize {
        self.rows.read().await.messages.len()
    }

    /// Whether the store holds no rows.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn simulate_latency(&self) {
        if self.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.latency_ms)).await;
        }
    }
}

impl Default for MemoryMessageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn list_messages(&self) -> Result<Vec<Message>, StorageError> {
        self.simulate_latency().await;

        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("reads disabled".to_string()));
        }

        let rows = self.rows.read().await;
        let mut messages = rows.messages.clone();
        messages.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(messages)
    }

    async fn create_message(&self, new: NewMessage) -> Result<Message, StorageError> {
        self.simulate_latency().await;

        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("writes disabled".to_string()));
        }

        let mut rows = self.rows.write().await;
        let message = Message {
            id: rows.next_id,
            name: new.name,
            message: new.message,
            created_at: OffsetDateTime::now_utc(),
        };
        rows.next_id += 1;
        rows.messages.push(message.clone());
        Ok(message)
    }

    async fn ping(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{validate, CreateMessageRequest};

    fn new_message(name: &str, message: &str) -> NewMessage {
        validate(&CreateMessageRequest::new(name, message)).unwrap()
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let store = MemoryMessageStore::new();
        let a = store.create_message(new_message("Ada", "first")).await.unwrap();
        let b = store.create_message(new_message("Bob", "second")).await.unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert!(b.created_at >= a.created_at);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = MemoryMessageStore::new();
        for name in ["A", "B", "C"] {
            store.create_message(new_message(name, "hi")).await.unwrap();
        }

        let names: Vec<_> = store
            .list_messages()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["C", "B", "A"]);
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let store = MemoryMessageStore::new();
        assert!(store.is_empty().await);
        assert!(store.list_messages().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn fault_injection_fails_operations() {
        let store = MemoryMessageStore::with_config(MemoryStoreConfig {
            fail_writes: true,
            ..Default::default()
        });

        assert!(store.create_message(new_message("Ada", "hi")).await.is_err());
        assert!(store.is_empty().await);

        store.set_fail_writes(false);
        store.set_fail_reads(true);
        assert!(store.create_message(new_message("Ada", "hi")).await.is_ok());
        assert!(store.list_messages().await.is_err());
    }

    #[tokio::test]
    async fn clones_share_rows() {
        let store = MemoryMessageStore::new();
        let handle = store.clone();
        handle.create_message(new_message("Ada", "hi")).await.unwrap();
        assert_eq!(store.len().await, 1);
    }
}
