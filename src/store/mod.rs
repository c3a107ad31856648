//! Storage for guestbook messages.
//!
//! This module handles:
//! - The [`MessageStore`] trait handed to request handlers
//! - PostgreSQL-backed storage with structured and raw query modes
//! - In-memory storage for tests and local development

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::{de, Deserialize, Deserializer};
use strum::{Display, EnumString};

use crate::error::StorageError;
use crate::message::{Message, NewMessage};

pub use memory::{MemoryMessageStore, MemoryStoreConfig};
pub use postgres::{PgMessageStore, QueryMode, StoreConfig};

/// Persistence operations the API depends on.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// All messages, newest first.
    async fn list_messages(&self) -> Result<Vec<Message>, StorageError>;

    /// Persist a validated message and return the stored row.
    async fn create_message(&self, new: NewMessage) -> Result<Message, StorageError>;

    /// Check the store is reachable.
    async fn ping(&self) -> Result<(), StorageError>;
}

/// Which store implementation backs the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StoreBackend {
    /// PostgreSQL through a sqlx pool.
    #[default]
    Postgres,
    /// Process-local memory; contents are lost on exit.
    Memory,
}

// Same parsing for `STORE_BACKEND` and `--store`.
impl<'de> Deserialize<'de> for StoreBackend {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value
            .parse()
            .map_err(|_| de::Error::unknown_variant(&value, &["postgres", "memory"]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn store_backend_from_string_works() {
        assert_eq!(StoreBackend::from_str("postgres").unwrap(), StoreBackend::Postgres);
        assert_eq!(StoreBackend::from_str("Memory").unwrap(), StoreBackend::Memory);
        assert!(StoreBackend::from_str("redis").is_err());
    }

    #[test]
    fn store_backend_deserializes_case_insensitively() {
        let backend: StoreBackend = serde_json::from_str(r#""MEMORY""#).unwrap();
        assert_eq!(backend, StoreBackend::Memory);
        let backend: StoreBackend = serde_json::from_str(r#""Postgres""#).unwrap();
        assert_eq!(backend, StoreBackend::Postgres);
        assert!(serde_json::from_str::<StoreBackend>(r#""redis""#).is_err());
    }

    #[test]
    fn store_backend_displays_lowercase() {
        assert_eq!(StoreBackend::Postgres.to_string(), "postgres");
        assert_eq!(StoreBackend::Memory.to_string(), "memory");
    }
}
