//! Guestbook message types.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;

/// A persisted guestbook entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Store-assigned identifier.
    pub id: i32,
    /// Author label.
    pub name: String,
    /// Message body.
    pub message: String,
    /// Store-assigned creation time.
    #[serde(with = "time::serde::rfc3339")]
    #[sqlx(rename = "createdAt")]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: OffsetDateTime,
}

/// Body of `POST /messages` exactly as received.
///
/// Both fields are optional so that a missing field is reported as a
/// validation failure rather than a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateMessageRequest {
    /// Author label.
    #[serde(default)]
    pub name: Option<String>,
    /// Message body.
    #[serde(default)]
    pub message: Option<String>,
}

impl CreateMessageRequest {
    /// Build a request from form values.
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            message: Some(message.into()),
        }
    }
}

/// Validated, trimmed input ready to be stored.
///
/// Only [`super::validate`] constructs this, so a store never sees unchecked input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub(crate) name: String,
    pub(crate) message: String,
}

impl NewMessage {
    /// Trimmed author label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Trimmed message body.
    pub fn message(&self) -> &str {
        &self.message
    }
}
